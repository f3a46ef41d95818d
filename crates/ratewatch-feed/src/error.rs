//! Feed error types.

use ratewatch_core::{CoreError, PriceSide};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    #[error("Pair not tracked: {0}")]
    PairNotFound(String),

    #[error("Cannot compute {side} percentage against a zero baseline")]
    ZeroBaseline { side: PriceSide },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type FeedResult<T> = Result<T, FeedError>;
