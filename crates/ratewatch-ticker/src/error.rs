//! Ticker error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickerError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode ticker response: {0}")]
    Decode(String),
}

pub type TickerResult<T> = Result<T, TickerError>;
