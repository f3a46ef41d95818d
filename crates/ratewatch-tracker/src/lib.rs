//! ratewatch tracker.
//!
//! Orchestrates the per-pair polling loop:
//! - Ticker fetch per pair on a fixed interval
//! - Oscillation check against the tracked rate
//! - Change records to the record store
//! - Supervised shutdown of every worker

pub mod app;
pub mod config;
pub mod error;
pub mod supervisor;
pub mod update;
pub mod worker;

pub use app::Application;
pub use config::AppConfig;
pub use error::{TrackerError, TrackerResult};
pub use supervisor::{TrackerSupervisor, WorkerHandle};
pub use update::{RateUpdater, UpdateOutcome};
pub use worker::{ExitReason, PairWorker, RetryPolicy, WorkerExit, WorkerState};
