//! Last-accepted rate per currency pair.
//!
//! The tracked rate is NOT the latest market quote: each side only moves
//! when an observation oscillates past the threshold, so ask and bid are
//! tracked independently. Latest quotes go to the log and the store.

use crate::error::{FeedError, FeedResult};
use crate::oscillation::evaluate_side;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ratewatch_core::{Diff, PriceSide, Rate};
use tracing::debug;

/// Result of a side that passed the threshold and was committed.
#[derive(Debug, Clone, PartialEq)]
pub struct SideChange {
    pub side: PriceSide,
    pub diff: Diff,
    /// Tracked entry after the replacement.
    pub tracked: Rate,
}

/// Concurrent pair -> tracked rate map.
///
/// Thread-safe via DashMap; each operation below holds the pair's shard
/// lock for its whole duration, so updates to one pair are linearized.
pub struct RateCache {
    rates: DashMap<String, Rate>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            rates: DashMap::new(),
        }
    }

    /// Insert `rate` for `pair` if nothing is tracked yet.
    ///
    /// Returns `true` when the insert happened, i.e. this is the first
    /// observation for the pair.
    pub fn insert_if_absent(&self, pair: &str, rate: Rate) -> bool {
        match self.rates.entry(pair.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(rate);
                true
            }
        }
    }

    /// Current tracked rate for `pair`.
    pub fn get(&self, pair: &str) -> FeedResult<Rate> {
        self.rates
            .get(pair)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FeedError::PairNotFound(pair.to_string()))
    }

    /// Unconditionally replace the tracked rate for `pair`.
    pub fn set(&self, pair: &str, rate: Rate) {
        self.rates.insert(pair.to_string(), rate);
    }

    /// Compare-and-replace one side in a single critical section.
    ///
    /// Reads the tracked value for `side`, evaluates `current` against it
    /// and, if it oscillated, replaces only that side. The opposite side
    /// keeps its own last-accepted value.
    pub fn commit_side(
        &self,
        pair: &str,
        side: PriceSide,
        current: &Rate,
        osc_percentage: f64,
    ) -> FeedResult<Option<SideChange>> {
        let mut entry = self
            .rates
            .get_mut(pair)
            .ok_or_else(|| FeedError::PairNotFound(pair.to_string()))?;

        let previous = entry.side_as_f64(side)?;
        let observed = current.side_as_f64(side)?;

        let Some(diff) = evaluate_side(side, previous, observed, osc_percentage)? else {
            return Ok(None);
        };

        let tracked = entry.with_side(side, current.side(side));
        *entry = tracked.clone();

        debug!(
            pair,
            side = %side,
            previous,
            observed,
            diff = diff.value,
            "Tracked side replaced"
        );

        Ok(Some(SideChange {
            side,
            diff,
            tracked,
        }))
    }

    pub fn contains(&self, pair: &str) -> bool {
        self.rates.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All tracked pairs.
    pub fn pairs(&self) -> Vec<String> {
        self.rates.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Copy of every tracked entry.
    pub fn snapshot(&self) -> Vec<(String, Rate)> {
        self.rates
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}
