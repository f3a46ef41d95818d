//! Tracked rate state for ratewatch.
//!
//! Holds the last-accepted rate per currency pair and decides whether a
//! fresh observation moved far enough to be recorded.

pub mod error;
pub mod oscillation;
pub mod rate_cache;

pub use error::{FeedError, FeedResult};
pub use oscillation::{evaluate, evaluate_side, Evaluation};
pub use rate_cache::{RateCache, SideChange};
