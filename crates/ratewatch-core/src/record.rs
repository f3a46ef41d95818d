//! Change records emitted to persistence.

use crate::rate::{PriceSide, Rate};
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side that caused a record to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// First observation of a pair; no comparison was made.
    #[serde(rename = "none")]
    Initial,
    Ask,
    Bid,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "none",
            Self::Ask => "ask",
            Self::Bid => "bid",
        }
    }
}

impl From<PriceSide> for Trigger {
    fn from(side: PriceSide) -> Self {
        match side {
            PriceSide::Ask => Self::Ask,
            PriceSide::Bid => Self::Bid,
        }
    }
}

/// Signed movement of one side and its percentage of the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Diff {
    pub value: f64,
    pub percentage: f64,
}

impl Diff {
    pub const ZERO: Self = Self {
        value: 0.0,
        percentage: 0.0,
    };

    /// Build a diff limited to 4 decimal places (half away from zero).
    pub fn rounded(value: f64, percentage: f64) -> Self {
        Self {
            value: round4(value),
            percentage: round4(percentage),
        }
    }
}

#[inline]
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Settings as stored alongside each record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Fetch interval in whole seconds.
    pub fetch_interval: u64,
    pub osc_percentage: f64,
    pub price: Trigger,
}

/// Append-only change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub currency_pair: String,
    #[serde(flatten)]
    pub rate: Rate,
    pub diff: Diff,
    pub settings: SettingsSnapshot,
}

impl Record {
    pub fn new(
        currency_pair: impl Into<String>,
        rate: Rate,
        diff: Diff,
        settings: SettingsSnapshot,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            currency_pair: currency_pair.into(),
            rate,
            diff,
            settings,
        }
    }

    /// Zero-diff record for the first observation of a pair.
    pub fn initial(currency_pair: impl Into<String>, rate: Rate, settings: &Settings) -> Self {
        Self::new(
            currency_pair,
            rate,
            Diff::ZERO,
            settings.snapshot(Trigger::Initial),
        )
    }

    pub fn trigger(&self) -> Trigger {
        self.settings.price
    }
}
