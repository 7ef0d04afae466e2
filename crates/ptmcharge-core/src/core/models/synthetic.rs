use super::dataset::Dataset;
use super::error::ModelError;
use super::site::SiteModel;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_SEED: u64 = 42;

/// How copy counts are assigned to generated sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CopiesPattern {
    #[default]
    #[serde(rename = "all-1")]
    AllOne,
    #[serde(rename = "all-2")]
    AllTwo,
    #[serde(rename = "all-3")]
    AllThree,
    /// 1, 2, 3, 1, 2, 3, ...
    #[serde(rename = "varied")]
    Varied,
    /// Uniform in 1..=5.
    #[serde(rename = "random")]
    Random,
}

impl CopiesPattern {
    fn copies_for(self, index: usize, rng: &mut impl Rng) -> i64 {
        match self {
            CopiesPattern::AllOne => 1,
            CopiesPattern::AllTwo => 2,
            CopiesPattern::AllThree => 3,
            CopiesPattern::Varied => (index % 3) as i64 + 1,
            CopiesPattern::Random => rng.gen_range(1..=5),
        }
    }
}

impl fmt::Display for CopiesPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CopiesPattern::AllOne => "all-1",
            CopiesPattern::AllTwo => "all-2",
            CopiesPattern::AllThree => "all-3",
            CopiesPattern::Varied => "varied",
            CopiesPattern::Random => "random",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown copies pattern '{0}'. Expected one of: all-1, all-2, all-3, varied, random")]
pub struct ParseCopiesPatternError(String);

impl FromStr for CopiesPattern {
    type Err = ParseCopiesPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-1" => Ok(CopiesPattern::AllOne),
            "all-2" => Ok(CopiesPattern::AllTwo),
            "all-3" => Ok(CopiesPattern::AllThree),
            "varied" => Ok(CopiesPattern::Varied),
            "random" => Ok(CopiesPattern::Random),
            _ => Err(ParseCopiesPatternError(s.to_string())),
        }
    }
}

/// Seeded generator of random, valid datasets for stress tests and benchmarks.
///
/// Each site draws its charge-state probabilities from a flat Dirichlet
/// distribution over `[min_charge, max_charge]`.
#[derive(Debug, Clone)]
pub struct SyntheticDatasetBuilder {
    n_sites: usize,
    min_charge: i64,
    max_charge: i64,
    copies: CopiesPattern,
    seed: u64,
}

impl SyntheticDatasetBuilder {
    pub fn new(n_sites: usize) -> Self {
        Self {
            n_sites,
            min_charge: -2,
            max_charge: 2,
            copies: CopiesPattern::default(),
            seed: DEFAULT_SEED,
        }
    }

    pub fn charge_range(mut self, min_charge: i64, max_charge: i64) -> Self {
        self.min_charge = min_charge;
        self.max_charge = max_charge;
        self
    }

    pub fn copies(mut self, pattern: CopiesPattern) -> Self {
        self.copies = pattern;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Dataset, ModelError> {
        if self.min_charge > self.max_charge {
            return Err(ModelError::InvalidSupport {
                lo: self.min_charge,
                hi: self.max_charge,
            });
        }
        let n_states = (self.max_charge - self.min_charge + 1) as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..self.n_sites)
            .map(|index| {
                let copies = self.copies.copies_for(index, &mut rng);
                let probabilities = flat_dirichlet(n_states, &mut rng);
                SiteModel::new(
                    format!("Site_{}", index + 1),
                    copies,
                    self.min_charge,
                    probabilities,
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .and_then(Dataset::new)
    }
}

fn flat_dirichlet(n: usize, rng: &mut impl Rng) -> Vec<f64> {
    // Normalized unit exponentials are Dirichlet(1, ..., 1).
    let draws: Vec<f64> = (0..n)
        .map(|_| -(1.0 - rng.gen_range(0.0..1.0_f64)).ln())
        .collect();
    let total: f64 = draws.iter().sum();
    if total > 0.0 {
        draws.into_iter().map(|x| x / total).collect()
    } else {
        vec![1.0 / n as f64; n]
    }
}
