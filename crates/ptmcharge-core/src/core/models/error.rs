use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Site '{site}' has invalid charge-state probabilities: {reason}")]
    InvalidSiteProbabilities { site: String, reason: String },

    #[error("Site '{site}' has a non-positive copy count ({copies})")]
    NonPositiveCopies { site: String, copies: i64 },

    #[error("Site '{site}' copy count {copies} exceeds the supported maximum of {max}")]
    CopiesOutOfRange { site: String, copies: i64, max: u32 },

    #[error("Invalid support [{lo}, {hi}]: lower bound exceeds upper bound")]
    InvalidSupport { lo: i64, hi: i64 },

    #[error("Dense values of length {actual} do not cover a support of length {expected}")]
    DenseLengthMismatch { expected: usize, actual: usize },

    #[error("Probabilities sum to {total}, expected 1 within {tolerance:e}")]
    MassNotNormalized { total: f64, tolerance: f64 },

    #[error("Site '{site}' pushes the total charge range beyond ±{bound}")]
    ChargeRangeTooLarge { site: String, bound: i64 },

    #[error("Invalid probability {value} at charge {charge}")]
    InvalidProbability { charge: i64, value: f64 },
}
