//! Ticker endpoint access for ratewatch.
//!
//! `TickerSource` is the seam the tracker fetches through; `TickerClient`
//! talks HTTP to the real endpoint and `MockTicker` replays scripted
//! responses in tests.

pub mod client;
pub mod error;
pub mod source;

pub use client::{TickerClient, DEFAULT_BASE_URL};
pub use error::{TickerError, TickerResult};
pub use source::{DynTickerSource, MockTicker, TickerSource};
