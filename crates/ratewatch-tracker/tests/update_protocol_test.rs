//! Update protocol integration tests.
//!
//! Drives `RateUpdater` through observation sequences and checks the
//! tracked rate and the emitted records.

mod integration;
use integration::common::{rate, updater, BTC_USD, ETH_USD};

use ratewatch_core::{CoreError, Diff, PriceMode, PriceSide, Trigger};
use ratewatch_feed::FeedError;
use ratewatch_persistence::MemoryStore;
use ratewatch_tracker::{TrackerError, UpdateOutcome};

#[tokio::test]
async fn test_new_pair_records_zero_diff() {
    let updater = updater(0.01, PriceMode::Both);
    let store = MemoryStore::new();

    let outcome = updater
        .update(BTC_USD, rate("34123.45", "34100.10"), &store)
        .await
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::Initial);
    assert_eq!(
        updater.cache().get(BTC_USD).unwrap(),
        rate("34123.45", "34100.10")
    );
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].diff, Diff::ZERO);
    assert_eq!(records[0].settings.price, Trigger::Initial);
    assert_eq!(records[0].settings.fetch_interval, 5);
}

#[tokio::test]
async fn test_repeated_rate_changes_nothing() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    updater
        .update(BTC_USD, rate("100", "100"), &store)
        .await
        .unwrap();
    let outcome = updater
        .update(BTC_USD, rate("100", "100"), &store)
        .await
        .unwrap();

    assert!(!outcome.changed());
    assert_eq!(store.len(), 1);
    assert_eq!(updater.cache().get(BTC_USD).unwrap(), rate("100", "100"));
}

#[tokio::test]
async fn test_ask_only_change_keeps_bid_text() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    updater
        .update(BTC_USD, rate("100", "100.000"), &store)
        .await
        .unwrap();
    updater
        .update(BTC_USD, rate("105", "100.001"), &store)
        .await
        .unwrap();

    let tracked = updater.cache().get(BTC_USD).unwrap();
    assert_eq!(tracked.ask, "105");
    assert_eq!(tracked.bid, "100.000");
}

#[tokio::test]
async fn test_equal_to_threshold_counts_as_change() {
    let updater = updater(1.0, PriceMode::Ask);
    let store = MemoryStore::new();

    updater
        .update(BTC_USD, rate("100", "1"), &store)
        .await
        .unwrap();
    let outcome = updater
        .update(BTC_USD, rate("101", "1"), &store)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Evaluated {
            ask: Some(Diff::rounded(1.0, 1.0)),
            bid: None,
        }
    );
}

/// Ask mode, 1%: 100 -> 102 -> 103 -> 99 tracks 100, 102, 102, 99.
#[tokio::test]
async fn test_ask_mode_sequence() {
    let updater = updater(1.0, PriceMode::Ask);
    let store = MemoryStore::new();

    let mut tracked = Vec::new();
    for ask in ["100", "102", "103", "99"] {
        updater.update(BTC_USD, rate(ask, "50"), &store).await.unwrap();
        tracked.push(updater.cache().get(BTC_USD).unwrap().ask);
    }

    assert_eq!(tracked, vec!["100", "102", "102", "99"]);
    let triggers: Vec<_> = store.records().iter().map(|r| r.trigger()).collect();
    assert_eq!(triggers, vec![Trigger::Initial, Trigger::Ask, Trigger::Ask]);
}

/// Both mode, 1%: ask and bid move on their own baselines.
#[tokio::test]
async fn test_both_mode_sides_independent() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    for (ask, bid) in [("100", "100"), ("99", "105"), ("99.5", "103"), ("102", "102")] {
        updater.update(BTC_USD, rate(ask, bid), &store).await.unwrap();
    }

    assert_eq!(updater.cache().get(BTC_USD).unwrap(), rate("102", "103"));
    // initial, ask+bid, bid, ask
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_concurrent_distinct_pairs() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    let (btc, eth) = tokio::join!(
        updater.update(BTC_USD, rate("34000", "33990"), &store),
        updater.update(ETH_USD, rate("1800", "1799"), &store),
    );
    btc.unwrap();
    eth.unwrap();

    assert_eq!(updater.cache().len(), 2);
    assert_eq!(updater.cache().get(BTC_USD).unwrap(), rate("34000", "33990"));
    assert_eq!(updater.cache().get(ETH_USD).unwrap(), rate("1800", "1799"));
}

#[tokio::test]
async fn test_concurrent_tasks_same_cache() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    let mut handles = Vec::new();
    for pair in [BTC_USD, ETH_USD] {
        let updater = updater.clone();
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            updater.update(pair, rate("10", "10"), &store).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(updater.cache().len(), 2);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_storage_error_on_initial_keeps_insert() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::failing();

    let err = updater
        .update(BTC_USD, rate("100", "100"), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Storage { .. }));
    assert_eq!(updater.cache().get(BTC_USD).unwrap(), rate("100", "100"));
}

#[tokio::test]
async fn test_storage_error_on_change_keeps_new_value() {
    let updater = updater(1.0, PriceMode::Ask);
    let store = MemoryStore::new();

    updater
        .update(BTC_USD, rate("100", "100"), &store)
        .await
        .unwrap();
    store.set_failing(true);

    let err = updater
        .update(BTC_USD, rate("110", "100"), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Storage { .. }));
    assert_eq!(updater.cache().get(BTC_USD).unwrap().ask, "110");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_non_numeric_first_observation_rejected() {
    let updater = updater(1.0, PriceMode::Both);
    let store = MemoryStore::new();

    let err = updater
        .update(BTC_USD, rate("abc", "100"), &store)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Evaluation(FeedError::Core(CoreError::NumericParse {
            side: PriceSide::Ask,
            ..
        }))
    ));
    assert!(updater.cache().is_empty());
    assert!(store.is_empty());

    // A later valid rate is treated as the first observation
    let outcome = updater
        .update(BTC_USD, rate("100", "100"), &store)
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Initial);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_zero_baseline_with_zero_diff_is_error() {
    let updater = updater(1.0, PriceMode::Bid);
    let store = MemoryStore::new();

    updater
        .update(BTC_USD, rate("100", "0"), &store)
        .await
        .unwrap();
    let err = updater
        .update(BTC_USD, rate("100", "0"), &store)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Evaluation(FeedError::ZeroBaseline {
            side: PriceSide::Bid
        })
    ));
    assert_eq!(updater.cache().get(BTC_USD).unwrap(), rate("100", "0"));
    assert_eq!(store.len(), 1);
}
