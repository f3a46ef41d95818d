//! Tracker error types.

use ratewatch_core::CoreError;
use ratewatch_feed::FeedError;
use ratewatch_persistence::PersistenceError;
use ratewatch_telemetry::TelemetryError;
use ratewatch_ticker::TickerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed for {pair}: {source}")]
    Fetch {
        pair: String,
        #[source]
        source: TickerError,
    },

    #[error("Storage failed for {pair}: {source}")]
    Storage {
        pair: String,
        #[source]
        source: PersistenceError,
    },

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] FeedError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Ticker error: {0}")]
    Ticker(#[from] TickerError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("Supervisor already started")]
    AlreadyStarted,

    #[error("Worker task failed: {0}")]
    Join(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
