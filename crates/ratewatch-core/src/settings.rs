//! Tracker settings shared by every pair worker.

use crate::error::{CoreError, Result};
use crate::rate::PriceSide;
use crate::record::{SettingsSnapshot, Trigger};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which sides of the quote are monitored for oscillation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    Ask,
    Bid,
    #[default]
    Both,
}

impl PriceMode {
    /// Whether `side` is evaluated under this mode.
    #[inline]
    pub fn tracks(&self, side: PriceSide) -> bool {
        match self {
            Self::Both => true,
            Self::Ask => side == PriceSide::Ask,
            Self::Bid => side == PriceSide::Bid,
        }
    }
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ask => "ask",
            Self::Bid => "bid",
            Self::Both => "both",
        };
        f.write_str(s)
    }
}

impl FromStr for PriceMode {
    type Err = CoreError;

    /// Case-insensitive, so `PRICE=BOTH` and `price = "both"` are equivalent.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "bid" => Ok(Self::Bid),
            "both" => Ok(Self::Both),
            _ => Err(CoreError::InvalidPriceMode(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PriceMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Validated tracker settings.
///
/// `osc_percentage` is applied verbatim as `osc_percentage * previous / 100`,
/// so `1.0` means one percent and `0.01` means one hundredth of a percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    fetch_interval: Duration,
    osc_percentage: f64,
    price_mode: PriceMode,
}

impl Settings {
    pub fn new(fetch_interval: Duration, osc_percentage: f64, price_mode: PriceMode) -> Result<Self> {
        if fetch_interval.is_zero() {
            return Err(CoreError::InvalidConfig(
                "fetch interval must be greater than zero".to_string(),
            ));
        }
        if !osc_percentage.is_finite() || osc_percentage < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "oscillation percentage must be a finite value >= 0, got {osc_percentage}"
            )));
        }

        Ok(Self {
            fetch_interval,
            osc_percentage,
            price_mode,
        })
    }

    #[inline]
    pub fn fetch_interval(&self) -> Duration {
        self.fetch_interval
    }

    #[inline]
    pub fn osc_percentage(&self) -> f64 {
        self.osc_percentage
    }

    #[inline]
    pub fn price_mode(&self) -> PriceMode {
        self.price_mode
    }

    /// Storage form of these settings, tagged with the side that triggered
    /// the record and the interval truncated to whole seconds.
    pub fn snapshot(&self, trigger: Trigger) -> SettingsSnapshot {
        SettingsSnapshot {
            fetch_interval: self.fetch_interval.as_secs(),
            osc_percentage: self.osc_percentage,
            price: trigger,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetch_interval={}s osc_percentage={} price={}",
            self.fetch_interval.as_secs_f64(),
            self.osc_percentage,
            self.price_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_mode_parse_case_insensitive() {
        assert_eq!("BOTH".parse::<PriceMode>().unwrap(), PriceMode::Both);
        assert_eq!("Ask".parse::<PriceMode>().unwrap(), PriceMode::Ask);
        assert_eq!(" bid ".parse::<PriceMode>().unwrap(), PriceMode::Bid);
        assert!(matches!(
            "mid".parse::<PriceMode>(),
            Err(CoreError::InvalidPriceMode(_))
        ));
    }

    #[test]
    fn test_price_mode_tracks() {
        assert!(PriceMode::Both.tracks(PriceSide::Ask));
        assert!(PriceMode::Both.tracks(PriceSide::Bid));
        assert!(PriceMode::Ask.tracks(PriceSide::Ask));
        assert!(!PriceMode::Ask.tracks(PriceSide::Bid));
        assert!(!PriceMode::Bid.tracks(PriceSide::Ask));
    }

    #[test]
    fn test_settings_validation() {
        assert!(Settings::new(Duration::ZERO, 1.0, PriceMode::Both).is_err());
        assert!(Settings::new(Duration::from_secs(5), -0.5, PriceMode::Both).is_err());
        assert!(Settings::new(Duration::from_secs(5), f64::NAN, PriceMode::Both).is_err());
        assert!(Settings::new(Duration::from_secs(5), 0.0, PriceMode::Both).is_ok());
    }

    #[test]
    fn test_snapshot_normalizes_interval() {
        let settings = Settings::new(Duration::from_millis(5_900), 0.01, PriceMode::Both).unwrap();
        let snapshot = settings.snapshot(Trigger::Bid);

        assert_eq!(snapshot.fetch_interval, 5);
        assert_eq!(snapshot.osc_percentage, 0.01);
        assert_eq!(snapshot.price, Trigger::Bid);
    }
}
