//! Per-pair polling worker.
//!
//! One worker per currency pair. Each tick fetches the current rate and
//! runs it through the update protocol. A fetch, evaluation or storage
//! error ends this worker only; other pairs keep polling.
//!
//! # State transitions
//!
//! ```text
//! Idle -> Polling -> Updating -> Polling
//!            |           |
//!            v           v
//!         Stopped      Failed
//! ```

use crate::error::{TrackerError, TrackerResult};
use crate::update::RateUpdater;
use parking_lot::RwLock;
use ratewatch_core::Rate;
use ratewatch_persistence::DynRecordStore;
use ratewatch_telemetry::Metrics;
use ratewatch_ticker::DynTickerSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, not yet running.
    Idle,
    /// Waiting for the next tick or fetching.
    Polling,
    /// Applying a fetched rate.
    Updating,
    /// Exited on an error.
    Failed,
    /// Exited on cancellation.
    Stopped,
}

/// Why a worker exited.
#[derive(Debug)]
pub enum ExitReason {
    Cancelled,
    Failed(TrackerError),
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }
}

/// Final report of a worker.
#[derive(Debug)]
pub struct WorkerExit {
    pub pair: String,
    pub reason: ExitReason,
}

impl WorkerExit {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.reason, ExitReason::Cancelled)
    }

    pub fn error(&self) -> Option<&TrackerError> {
        match &self.reason {
            ExitReason::Cancelled => None,
            ExitReason::Failed(e) => Some(e),
        }
    }
}

/// Fetch retry policy within one tick.
///
/// The default of zero retries stops the worker on the first fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::from_secs(1),
        }
    }
}

/// Polls one pair until cancelled or failed.
pub struct PairWorker {
    pair: String,
    interval: Duration,
    ticker: DynTickerSource,
    store: DynRecordStore,
    updater: RateUpdater,
    token: CancellationToken,
    state: Arc<RwLock<WorkerState>>,
    retry: RetryPolicy,
}

impl PairWorker {
    pub fn new(
        pair: impl Into<String>,
        ticker: DynTickerSource,
        store: DynRecordStore,
        updater: RateUpdater,
        token: CancellationToken,
    ) -> Self {
        Self {
            pair: pair.into(),
            interval: updater.settings().fetch_interval(),
            ticker,
            store,
            updater,
            token,
            state: Arc::new(RwLock::new(WorkerState::Idle)),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// Shared handle onto this worker's state.
    pub fn state_handle(&self) -> Arc<RwLock<WorkerState>> {
        Arc::clone(&self.state)
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.write() = state;
    }

    /// Run until cancelled or the first error.
    ///
    /// The first tick fires one interval after start. A tick delayed by a
    /// slow fetch or store is followed by a full interval, never a burst.
    pub async fn run(self) -> WorkerExit {
        Metrics::worker_started();
        self.set_state(WorkerState::Polling);
        info!(pair = %self.pair, interval = ?self.interval, "Worker started");

        let mut timer = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            tokio::select! {
                _ = self.token.cancelled() => break ExitReason::Cancelled,
                _ = timer.tick() => {}
            }

            match self.track_once().await {
                Ok(true) => self.set_state(WorkerState::Polling),
                Ok(false) => break ExitReason::Cancelled,
                Err(e) => {
                    error!(pair = %self.pair, error = %e, "Worker failed");
                    break ExitReason::Failed(e);
                }
            }
        };

        self.set_state(match reason {
            ExitReason::Cancelled => WorkerState::Stopped,
            ExitReason::Failed(_) => WorkerState::Failed,
        });
        Metrics::worker_exited(&self.pair, reason.as_str());
        info!(pair = %self.pair, reason = reason.as_str(), "Worker exited");

        WorkerExit {
            pair: self.pair,
            reason,
        }
    }

    /// One fetch-then-update iteration. `Ok(false)` means cancelled
    /// while waiting to retry a fetch.
    async fn track_once(&self) -> TrackerResult<bool> {
        let Some(rate) = self.fetch().await? else {
            return Ok(false);
        };

        self.set_state(WorkerState::Updating);
        let outcome = self
            .updater
            .update(&self.pair, rate, self.store.as_ref())
            .await?;
        debug!(pair = %self.pair, ?outcome, "Update applied");

        Ok(true)
    }

    async fn fetch(&self) -> TrackerResult<Option<Rate>> {
        let mut attempt = 0;
        loop {
            match self.ticker.fetch(&self.pair).await {
                Ok(rate) => {
                    Metrics::rate_fetched(&self.pair);
                    return Ok(Some(rate));
                }
                Err(source) => {
                    Metrics::rate_fetch_failed(&self.pair);
                    if attempt >= self.retry.max_retries {
                        return Err(TrackerError::Fetch {
                            pair: self.pair.clone(),
                            source,
                        });
                    }
                    attempt += 1;
                    warn!(
                        pair = %self.pair,
                        attempt,
                        max_retries = self.retry.max_retries,
                        error = %source,
                        "Fetch failed, retrying"
                    );

                    tokio::select! {
                        _ = self.token.cancelled() => return Ok(None),
                        _ = tokio::time::sleep(self.retry.delay) => {}
                    }
                }
            }
        }
    }
}
