//! Prometheus metrics for the rate tracker.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. Registration only
//! fails on duplicate metric names, which is a programming error caught
//! on first access at startup.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_gauge, CounterVec, Encoder, IntGauge, TextEncoder,
};

/// Ticker fetches that returned a rate.
pub static RATE_FETCH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_rate_fetch_total",
        "Successful ticker fetches",
        &["pair"]
    )
    .unwrap()
});

/// Ticker fetches that failed.
pub static RATE_FETCH_FAILED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_rate_fetch_failed_total",
        "Failed ticker fetches",
        &["pair"]
    )
    .unwrap()
});

/// Oscillations that passed the threshold.
pub static OSCILLATION_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_oscillation_total",
        "Detected oscillations",
        &["pair", "side"]
    )
    .unwrap()
});

/// Records accepted by the store.
pub static RECORD_STORED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_record_stored_total",
        "Records persisted",
        &["pair", "trigger"]
    )
    .unwrap()
});

/// Records the store rejected.
pub static RECORD_STORE_FAILED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_record_store_failed_total",
        "Records the store failed to persist",
        &["pair"]
    )
    .unwrap()
});

/// Worker exits by reason (cancelled/failed).
pub static WORKER_EXIT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ratewatch_worker_exit_total",
        "Pair worker exits",
        &["pair", "reason"]
    )
    .unwrap()
});

/// Pair workers currently polling.
pub static ACTIVE_WORKERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("ratewatch_active_workers", "Pair workers currently running").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn rate_fetched(pair: &str) {
        RATE_FETCH_TOTAL.with_label_values(&[pair]).inc();
    }

    pub fn rate_fetch_failed(pair: &str) {
        RATE_FETCH_FAILED_TOTAL.with_label_values(&[pair]).inc();
    }

    pub fn oscillation(pair: &str, side: &str) {
        OSCILLATION_TOTAL.with_label_values(&[pair, side]).inc();
    }

    pub fn record_stored(pair: &str, trigger: &str) {
        RECORD_STORED_TOTAL.with_label_values(&[pair, trigger]).inc();
    }

    pub fn record_store_failed(pair: &str) {
        RECORD_STORE_FAILED_TOTAL.with_label_values(&[pair]).inc();
    }

    pub fn worker_started() {
        ACTIVE_WORKERS.inc();
    }

    pub fn worker_exited(pair: &str, reason: &str) {
        ACTIVE_WORKERS.dec();
        WORKER_EXIT_TOTAL.with_label_values(&[pair, reason]).inc();
    }

    /// Render every registered metric in Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = RECORD_STORED_TOTAL
            .with_label_values(&["TEST-METRIC", "ask"])
            .get();
        Metrics::record_stored("TEST-METRIC", "ask");
        let after = RECORD_STORED_TOTAL
            .with_label_values(&["TEST-METRIC", "ask"])
            .get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_render_contains_registered_metrics() {
        Metrics::oscillation("TEST-RENDER", "bid");
        let text = Metrics::render().unwrap();
        assert!(text.contains("ratewatch_oscillation_total"));
        assert!(text.contains("TEST-RENDER"));
    }
}
