//! Supervisor end-to-end tests with a scripted ticker.

mod integration;
use integration::common::{rate, settings, BTC_USD, ETH_USD};

use ratewatch_core::{PriceMode, Record, Trigger};
use ratewatch_feed::RateCache;
use ratewatch_persistence::{JsonLinesStore, MemoryStore};
use ratewatch_ticker::{MockTicker, TickerError};
use ratewatch_tracker::{ExitReason, TrackerError, TrackerSupervisor, WorkerState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn unavailable() -> TickerError {
    TickerError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// A failing pair stops alone; the other keeps tracking until shutdown.
#[tokio::test(start_paused = true)]
async fn test_fetch_error_stops_only_that_pair() {
    let ticker = Arc::new(MockTicker::new());
    ticker.push_rates(BTC_USD, [rate("100", "100"), rate("102", "100")]);
    ticker.push_results(ETH_USD, [Err(unavailable())]);
    let store = MemoryStore::new();

    let mut supervisor = TrackerSupervisor::new(
        vec![BTC_USD.to_string(), ETH_USD.to_string()],
        settings(1.0, PriceMode::Both),
        Arc::new(RateCache::new()),
        ticker.clone(),
        store.factory(),
    )
    .unwrap();
    supervisor.start().unwrap();

    tokio::time::sleep(Duration::from_secs(16)).await;

    let states: Vec<_> = supervisor
        .workers()
        .iter()
        .map(|w| (w.pair().to_string(), w.state()))
        .collect();
    assert_eq!(
        states,
        vec![
            (BTC_USD.to_string(), WorkerState::Polling),
            (ETH_USD.to_string(), WorkerState::Failed),
        ]
    );
    assert_eq!(ticker.fetch_count(ETH_USD), 1);
    assert_eq!(ticker.fetch_count(BTC_USD), 3);

    let triggers: Vec<_> = store
        .records_for(BTC_USD)
        .iter()
        .map(|r| r.trigger())
        .collect();
    assert_eq!(triggers, vec![Trigger::Initial, Trigger::Ask]);
    assert!(store.records_for(ETH_USD).is_empty());
    assert!(!supervisor.cache().contains(ETH_USD));

    let exits = supervisor.shutdown().await;
    assert_eq!(exits.len(), 2);
    assert!(matches!(exits[0].reason, ExitReason::Cancelled));
    assert!(matches!(
        exits[1].reason,
        ExitReason::Failed(TrackerError::Fetch { ref pair, .. }) if pair == ETH_USD
    ));
}

#[tokio::test(start_paused = true)]
async fn test_all_finished_after_every_worker_fails() {
    let ticker = Arc::new(MockTicker::new());
    ticker.push_results(BTC_USD, [Err(unavailable())]);
    let store = MemoryStore::new();

    let mut supervisor = TrackerSupervisor::new(
        vec![BTC_USD.to_string()],
        settings(1.0, PriceMode::Both),
        Arc::new(RateCache::new()),
        ticker,
        store.factory(),
    )
    .unwrap();
    supervisor.start().unwrap();
    assert!(!supervisor.all_finished());

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(supervisor.all_finished());
}

#[tokio::test(start_paused = true)]
async fn test_records_land_in_json_lines_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonLinesStore::new(temp_dir.path()).unwrap();
    let ticker = Arc::new(MockTicker::new());
    ticker.push_rates(BTC_USD, [rate("100", "100"), rate("100", "90")]);

    let mut supervisor = TrackerSupervisor::new(
        vec![BTC_USD.to_string()],
        settings(1.0, PriceMode::Bid),
        Arc::new(RateCache::new()),
        ticker,
        store.factory(),
    )
    .unwrap();
    supervisor.start().unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;
    supervisor.shutdown().await;
    store.close();

    let mut lines = Vec::new();
    for entry in std::fs::read_dir(temp_dir.path()).unwrap() {
        let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
        lines.extend(content.lines().map(str::to_string));
    }
    assert_eq!(lines.len(), 2);

    let last: Record = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(last.trigger(), Trigger::Bid);
    assert_eq!(last.diff.value, -10.0);
    assert_eq!(last.diff.percentage, -10.0);

    let raw: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(raw["currency_pair"], "BTC-USD");
    assert_eq!(raw["settings"]["price"], "bid");
}
