//! Cache-update protocol for one observed rate.
//!
//! The first observation of a pair is stored as-is with a zero diff. Later
//! observations are compared side by side (ask first, then bid) and each
//! side that oscillated past the threshold is committed to the cache and
//! recorded. The first failed store ends the update; cache changes made
//! before it stay in place.

use crate::error::{TrackerError, TrackerResult};
use ratewatch_core::{Diff, PriceSide, Rate, Record, Settings};
use ratewatch_feed::{FeedError, RateCache};
use ratewatch_persistence::RecordStore;
use ratewatch_telemetry::Metrics;
use std::sync::Arc;
use tracing::{debug, info};

/// What a single update did to the tracked rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// First observation; the rate was inserted and recorded.
    Initial,
    /// Existing pair; each side carries its diff if it changed.
    Evaluated {
        ask: Option<Diff>,
        bid: Option<Diff>,
    },
}

impl UpdateOutcome {
    /// Whether any side of an existing pair changed.
    pub fn changed(&self) -> bool {
        match self {
            Self::Initial => false,
            Self::Evaluated { ask, bid } => ask.is_some() || bid.is_some(),
        }
    }
}

/// Applies observed rates to the shared cache.
#[derive(Clone)]
pub struct RateUpdater {
    cache: Arc<RateCache>,
    settings: Arc<Settings>,
}

impl RateUpdater {
    pub fn new(cache: Arc<RateCache>, settings: Arc<Settings>) -> Self {
        Self { cache, settings }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply `rate` observed for `pair`, storing records through `store`.
    pub async fn update(
        &self,
        pair: &str,
        rate: Rate,
        store: &dyn RecordStore,
    ) -> TrackerResult<UpdateOutcome> {
        // An unparseable side must never become a tracked baseline
        for side in PriceSide::ALL {
            if self.settings.price_mode().tracks(side) {
                rate.side_as_f64(side).map_err(FeedError::from)?;
            }
        }

        if self.cache.insert_if_absent(pair, rate.clone()) {
            info!(pair, %rate, "First rate observed");
            let record = Record::initial(pair, rate, &self.settings);
            persist(store, record).await?;
            return Ok(UpdateOutcome::Initial);
        }

        let mut ask = None;
        let mut bid = None;

        for side in PriceSide::ALL {
            if !self.settings.price_mode().tracks(side) {
                continue;
            }

            let Some(change) =
                self.cache
                    .commit_side(pair, side, &rate, self.settings.osc_percentage())?
            else {
                continue;
            };

            Metrics::oscillation(pair, side.as_str());
            info!(
                pair,
                side = %side,
                diff = change.diff.value,
                percentage = change.diff.percentage,
                tracked = %change.tracked,
                "Oscillation detected"
            );

            let record = Record::new(
                pair,
                rate.clone(),
                change.diff,
                self.settings.snapshot(side.into()),
            );
            persist(store, record).await?;

            match side {
                PriceSide::Ask => ask = Some(change.diff),
                PriceSide::Bid => bid = Some(change.diff),
            }
        }

        if ask.is_none() && bid.is_none() {
            debug!(pair, %rate, "No oscillation");
        }

        Ok(UpdateOutcome::Evaluated { ask, bid })
    }
}

async fn persist(store: &dyn RecordStore, record: Record) -> TrackerResult<()> {
    let pair = record.currency_pair.clone();
    let trigger = record.trigger();

    match store.store(record).await {
        Ok(()) => {
            Metrics::record_stored(&pair, trigger.as_str());
            Ok(())
        }
        Err(source) => {
            Metrics::record_store_failed(&pair);
            Err(TrackerError::Storage { pair, source })
        }
    }
}
