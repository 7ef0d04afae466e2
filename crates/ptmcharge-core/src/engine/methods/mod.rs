//! The four interchangeable total-charge engines.
//!
//! Each submodule exposes `run(dataset, ctx) -> Result<Distribution, EngineError>` and every
//! engine returns a distribution over the dataset's full theoretical support (the Gaussian
//! engine over a window of it). [`Method`] is the closed set used for dispatch.

pub mod enumeration;
pub mod exact;
pub mod fft;
pub mod gaussian;

use super::context::ComputeContext;
use super::error::EngineError;
use crate::core::models::dataset::Dataset;
use crate::core::models::distribution::Distribution;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    Enumeration,
    Exact,
    Fft,
    Gaussian,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Enumeration,
        Method::Exact,
        Method::Fft,
        Method::Gaussian,
    ];

    pub fn run(self, dataset: &Dataset, ctx: &ComputeContext) -> Result<Distribution, EngineError> {
        match self {
            Method::Enumeration => enumeration::run(dataset, ctx),
            Method::Exact => exact::run(dataset, ctx),
            Method::Fft => fft::run(dataset, ctx),
            Method::Gaussian => gaussian::run(dataset, ctx),
        }
    }

    /// Whether the method computes the distribution exactly (up to floating-point rounding).
    pub fn is_exact(self) -> bool {
        !matches!(self, Method::Gaussian)
    }

    pub fn label(self) -> &'static str {
        match self {
            Method::Enumeration => "Enumeration",
            Method::Exact => "Exact convolution",
            Method::Fft => "FFT convolution",
            Method::Gaussian => "Gaussian approximation",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Enumeration => "enumeration",
            Method::Exact => "exact",
            Method::Fft => "fft",
            Method::Gaussian => "gaussian",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown method '{0}'. Expected one of: enumeration, exact, fft, gaussian")]
pub struct ParseMethodError(String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enumeration" | "enum" | "brute-force" => Ok(Method::Enumeration),
            "exact" | "convolution" | "yergeev" => Ok(Method::Exact),
            "fft" => Ok(Method::Fft),
            "gaussian" | "clt" | "normal" => Ok(Method::Gaussian),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_parse_with_aliases() {
        assert_eq!("exact".parse(), Ok(Method::Exact));
        assert_eq!("Yergeev".parse(), Ok(Method::Exact));
        assert_eq!(" FFT ".parse(), Ok(Method::Fft));
        assert_eq!("clt".parse(), Ok(Method::Gaussian));
        assert_eq!("brute-force".parse(), Ok(Method::Enumeration));
        assert!("monte-carlo".parse::<Method>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse(), Ok(method));
        }
    }

    #[test]
    fn only_gaussian_is_approximate() {
        let approximate: Vec<_> = Method::ALL.into_iter().filter(|m| !m.is_exact()).collect();
        assert_eq!(approximate, vec![Method::Gaussian]);
    }
}
