use super::config::EngineConfig;
use super::methods::Method;
use crate::core::models::dataset::Dataset;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionReason {
    EmptyDataset,
    PreferredEnumeration,
    WithinExactLimit,
    WithinFftLimit,
    AboveFftLimit,
    Explicit,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SelectionReason::EmptyDataset => "dataset has no sites",
            SelectionReason::PreferredEnumeration => "enumeration preferred and within limits",
            SelectionReason::WithinExactLimit => "total copies within the exact limit",
            SelectionReason::WithinFftLimit => "total copies within the FFT limit",
            SelectionReason::AboveFftLimit => "total copies above the FFT limit",
            SelectionReason::Explicit => "method requested explicitly",
        };
        f.write_str(text)
    }
}

/// The outcome of the adaptive selection policy for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub method: Method,
    pub total_copies: u64,
    pub reason: SelectionReason,
    /// Whether enumeration is small enough to serve as a ground truth.
    pub enumeration_available: bool,
}

impl Selection {
    /// Records a caller's explicit choice, keeping the size facts about the dataset.
    pub fn explicit(method: Method, dataset: &Dataset, config: &EngineConfig) -> Self {
        Self {
            method,
            reason: SelectionReason::Explicit,
            ..select(dataset, config)
        }
    }

    /// The method whose output serves as the reference in validation runs.
    pub fn benchmark_method(&self) -> Method {
        if self.enumeration_available {
            Method::Enumeration
        } else {
            Method::Exact
        }
    }
}

/// Chooses an engine from the total number of site copies.
///
/// `N <= exact_max_copies` runs exact convolution, `N <= fft_max_copies` runs FFT
/// convolution and anything larger falls back to the Gaussian approximation. Enumeration is
/// only offered (as `enumeration_available`) unless `prefer_enumeration` is set.
pub fn select(dataset: &Dataset, config: &EngineConfig) -> Selection {
    let thresholds = &config.selection;
    let total_copies = dataset.total_copies();
    let enumeration_available = total_copies <= thresholds.enumeration_max_copies
        && dataset.combination_count() <= u128::from(config.enumeration_max_combinations);

    let (method, reason) = if dataset.is_empty() {
        (Method::Exact, SelectionReason::EmptyDataset)
    } else if thresholds.prefer_enumeration && enumeration_available {
        (Method::Enumeration, SelectionReason::PreferredEnumeration)
    } else if total_copies <= thresholds.exact_max_copies {
        (Method::Exact, SelectionReason::WithinExactLimit)
    } else if total_copies <= thresholds.fft_max_copies {
        (Method::Fft, SelectionReason::WithinFftLimit)
    } else {
        (Method::Gaussian, SelectionReason::AboveFftLimit)
    };

    Selection {
        method,
        total_copies,
        reason,
        enumeration_available,
    }
}
