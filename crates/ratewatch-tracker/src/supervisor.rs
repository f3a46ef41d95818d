//! Worker supervisor.
//!
//! Spawns one [`PairWorker`] per pair, all cancelled through one shared
//! token. `stop` only signals; `shutdown` signals and joins.

use crate::config::normalize_pairs;
use crate::error::{TrackerError, TrackerResult};
use crate::update::RateUpdater;
use crate::worker::{ExitReason, PairWorker, RetryPolicy, WorkerExit, WorkerState};
use parking_lot::RwLock;
use ratewatch_core::Settings;
use ratewatch_feed::RateCache;
use ratewatch_persistence::StoreFactory;
use ratewatch_ticker::DynTickerSource;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Observer for one running worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    pair: String,
    state: Arc<RwLock<WorkerState>>,
}

impl WorkerHandle {
    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }
}

pub struct TrackerSupervisor {
    pairs: Vec<String>,
    settings: Arc<Settings>,
    cache: Arc<RateCache>,
    ticker: DynTickerSource,
    store_factory: StoreFactory,
    retry: RetryPolicy,
    token: CancellationToken,
    started: bool,
    handles: Vec<WorkerHandle>,
    joins: Vec<(String, JoinHandle<WorkerExit>)>,
}

impl TrackerSupervisor {
    /// Create a supervisor for `pairs`. Duplicates collapse to one worker.
    pub fn new(
        pairs: Vec<String>,
        settings: Arc<Settings>,
        cache: Arc<RateCache>,
        ticker: DynTickerSource,
        store_factory: StoreFactory,
    ) -> TrackerResult<Self> {
        let pairs = normalize_pairs(pairs.iter().map(String::as_str));
        if pairs.is_empty() {
            return Err(TrackerError::Config(
                "at least one currency pair is required".to_string(),
            ));
        }

        Ok(Self {
            pairs,
            settings,
            cache,
            ticker,
            store_factory,
            retry: RetryPolicy::default(),
            token: CancellationToken::new(),
            started: false,
            handles: Vec::new(),
            joins: Vec::new(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bind every worker to `parent`: cancelling it stops the tracker.
    ///
    /// `stop` and `shutdown` still only cancel this supervisor's own
    /// child of `parent`.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.token = parent.child_token();
        self
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.handles
    }

    /// Spawn every worker. Must be called from within a tokio runtime.
    ///
    /// If a store handle cannot be built, workers already spawned are
    /// cancelled and the error is returned.
    pub fn start(&mut self) -> TrackerResult<()> {
        if self.started {
            return Err(TrackerError::AlreadyStarted);
        }
        self.started = true;

        let updater = RateUpdater::new(Arc::clone(&self.cache), Arc::clone(&self.settings));

        for pair in &self.pairs {
            let store = match (self.store_factory)(pair) {
                Ok(store) => store,
                Err(source) => {
                    error!(pair = %pair, error = %source, "Failed to open record store");
                    self.token.cancel();
                    return Err(TrackerError::Storage {
                        pair: pair.clone(),
                        source,
                    });
                }
            };

            let worker = PairWorker::new(
                pair.clone(),
                Arc::clone(&self.ticker),
                store,
                updater.clone(),
                self.token.child_token(),
            )
            .with_retry(self.retry);

            self.handles.push(WorkerHandle {
                pair: pair.clone(),
                state: worker.state_handle(),
            });
            self.joins.push((pair.clone(), tokio::spawn(worker.run())));
        }

        info!(workers = self.joins.len(), settings = %self.settings, "Tracker started");
        Ok(())
    }

    /// Signal every worker to stop without waiting.
    pub fn stop(&self) {
        info!("Stopping tracker");
        self.token.cancel();
    }

    /// Whether every spawned worker has exited.
    pub fn all_finished(&self) -> bool {
        self.joins.iter().all(|(_, join)| join.is_finished())
    }

    /// Stop every worker and wait for all of them to exit.
    pub async fn shutdown(self) -> Vec<WorkerExit> {
        self.token.cancel();

        let mut exits = Vec::with_capacity(self.joins.len());
        for (pair, join) in self.joins {
            match join.await {
                Ok(exit) => exits.push(exit),
                Err(e) => {
                    error!(pair = %pair, ?e, "Worker task did not complete");
                    exits.push(WorkerExit {
                        pair,
                        reason: ExitReason::Failed(TrackerError::Join(e.to_string())),
                    });
                }
            }
        }

        info!(workers = exits.len(), "Tracker shut down");
        exits
    }
}
