use thiserror::Error;

use super::config::ConfigError;
use super::methods::Method;
use crate::core::models::error::ModelError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Enumeration refused: {combinations} combinations exceed the cap of {cap}. Use the exact or FFT method instead"
    )]
    EnumerationTooLarge { combinations: u128, cap: u64 },

    #[error("Numeric instability in {method} engine: {detail}")]
    NumericInstability { method: Method, detail: String },

    #[error("Computation was cancelled")]
    Cancelled,

    #[error("Internal logic error: {0}")]
    Internal(String),
}
