//! Error types for ratewatch-core.

use crate::rate::PriceSide;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid {side} price: {value:?}")]
    NumericParse { side: PriceSide, value: String },

    #[error("Invalid price mode: {0}")]
    InvalidPriceMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
