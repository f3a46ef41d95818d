//! Application wiring and main loop.

use crate::config::AppConfig;
use crate::error::TrackerResult;
use crate::supervisor::TrackerSupervisor;
use crate::worker::ExitReason;
use ratewatch_core::Settings;
use ratewatch_feed::RateCache;
use ratewatch_persistence::JsonLinesStore;
use ratewatch_telemetry::Metrics;
use ratewatch_ticker::{DynTickerSource, TickerClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often the main loop checks whether any worker is still running.
const WORKER_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Main application.
pub struct Application {
    config: AppConfig,
    settings: Arc<Settings>,
    pairs: Vec<String>,
}

impl Application {
    /// Create a new application, validating the configuration.
    pub fn new(config: AppConfig) -> TrackerResult<Self> {
        let settings = Arc::new(config.settings()?);
        let pairs = config.pairs()?;

        Ok(Self {
            config,
            settings,
            pairs,
        })
    }

    /// Run until Ctrl+C or until every worker has exited.
    pub async fn run(self) -> TrackerResult<()> {
        let ticker: DynTickerSource = Arc::new(TickerClient::new(
            self.config.ticker.base_url.clone(),
            Some(self.config.ticker.timeout()),
        )?);
        let store = JsonLinesStore::new(&self.config.persistence.data_dir)?;

        info!(
            data_dir = %self.config.persistence.data_dir,
            settings = %self.settings,
            "Record store ready"
        );

        let mut supervisor = TrackerSupervisor::new(
            self.pairs,
            self.settings,
            Arc::new(RateCache::new()),
            ticker,
            store.factory(),
        )?
        .with_retry(self.config.retry_policy());
        supervisor.start()?;

        let mut check = tokio::time::interval(WORKER_CHECK_INTERVAL);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = check.tick() => {
                    if supervisor.all_finished() {
                        warn!("All workers have exited");
                        break;
                    }
                }

                _ = &mut ctrl_c => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        let exits = supervisor.shutdown().await;
        for exit in &exits {
            match &exit.reason {
                ExitReason::Cancelled => info!(pair = %exit.pair, "Worker stopped"),
                ExitReason::Failed(e) => warn!(pair = %exit.pair, error = %e, "Worker failed"),
            }
        }

        store.close();

        match Metrics::render() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(?e, "Failed to render metrics"),
        }

        Ok(())
    }
}
