//! Shared fixtures.

use ratewatch_core::{PriceMode, Rate, Settings};
use ratewatch_feed::RateCache;
use ratewatch_tracker::RateUpdater;
use std::sync::Arc;
use std::time::Duration;

pub const BTC_USD: &str = "BTC-USD";
pub const ETH_USD: &str = "ETH-USD";

pub fn settings(osc_percentage: f64, mode: PriceMode) -> Arc<Settings> {
    Arc::new(Settings::new(Duration::from_secs(5), osc_percentage, mode).unwrap())
}

pub fn updater(osc_percentage: f64, mode: PriceMode) -> RateUpdater {
    RateUpdater::new(Arc::new(RateCache::new()), settings(osc_percentage, mode))
}

pub fn rate(ask: &str, bid: &str) -> Rate {
    Rate::new(ask, bid)
}
