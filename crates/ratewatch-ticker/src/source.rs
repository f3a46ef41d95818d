//! Ticker source trait.
//!
//! Abstracts "fetch one rate for one pair" so the tracker can be driven
//! by the HTTP client in production and by scripted responses in tests.

use crate::error::{TickerError, TickerResult};
use parking_lot::Mutex;
use ratewatch_core::{BoxFuture, Rate};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Source of current rates.
pub trait TickerSource: Send + Sync {
    /// Fetch the current rate for `pair`.
    ///
    /// No retry is implied; a failure is returned as is.
    fn fetch<'a>(&'a self, pair: &'a str) -> BoxFuture<'a, TickerResult<Rate>>;
}

/// Arc wrapper for TickerSource trait objects.
pub type DynTickerSource = Arc<dyn TickerSource>;

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<TickerResult<Rate>>,
    last_rate: Option<Rate>,
    fetches: usize,
}

/// Scripted ticker for tests.
///
/// Each pair replays its queued responses in order. Once the queue is
/// drained the last successful rate is served again, so a worker keeps
/// polling a flat market instead of failing.
#[derive(Debug, Default)]
pub struct MockTicker {
    scripts: Mutex<HashMap<String, Script>>,
}

impl MockTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue successful responses for `pair`.
    pub fn push_rates<I>(&self, pair: &str, rates: I)
    where
        I: IntoIterator<Item = Rate>,
    {
        self.push_results(pair, rates.into_iter().map(Ok));
    }

    /// Queue arbitrary responses (including errors) for `pair`.
    pub fn push_results<I>(&self, pair: &str, results: I)
    where
        I: IntoIterator<Item = TickerResult<Rate>>,
    {
        let mut scripts = self.scripts.lock();
        scripts
            .entry(pair.to_string())
            .or_default()
            .queued
            .extend(results);
    }

    /// Number of fetches issued for `pair`.
    pub fn fetch_count(&self, pair: &str) -> usize {
        self.scripts
            .lock()
            .get(pair)
            .map(|script| script.fetches)
            .unwrap_or(0)
    }

    fn next(&self, pair: &str) -> TickerResult<Rate> {
        let mut scripts = self.scripts.lock();
        let script = scripts.entry(pair.to_string()).or_default();
        script.fetches += 1;

        match script.queued.pop_front() {
            Some(Ok(rate)) => {
                script.last_rate = Some(rate.clone());
                Ok(rate)
            }
            Some(Err(e)) => Err(e),
            None => script
                .last_rate
                .clone()
                .ok_or_else(|| TickerError::HttpClient(format!("no scripted rate for {pair}"))),
        }
    }
}

impl TickerSource for MockTicker {
    fn fetch<'a>(&'a self, pair: &'a str) -> BoxFuture<'a, TickerResult<Rate>> {
        let result = self.next(pair);
        Box::pin(async move { result })
    }
}
