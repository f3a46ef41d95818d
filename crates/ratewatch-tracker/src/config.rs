//! Application configuration.
//!
//! Loaded from TOML, then overridden by environment variables. Every field
//! has a default so an absent file yields a runnable configuration.

use crate::error::{TrackerError, TrackerResult};
use crate::worker::RetryPolicy;
use ratewatch_core::{PriceMode, Settings};
use ratewatch_ticker::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file used when neither `--config` nor `RATEWATCH_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RATEWATCH_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Polling and oscillation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Comma-separated currency pairs, e.g. "BTC-USD,ETH-USD".
    #[serde(default = "default_pairs")]
    pub pairs: String,
    #[serde(default = "default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,
    /// Threshold as a percentage of the tracked value.
    #[serde(default = "default_osc_percentage")]
    pub osc_percentage: f64,
    #[serde(default)]
    pub price: PriceMode,
    /// Extra fetch attempts per tick before the worker gives up.
    /// Zero keeps the stop-on-first-error behavior.
    #[serde(default)]
    pub fetch_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_pairs() -> String {
    "BTC-USD".to_string()
}

fn default_fetch_interval_secs() -> u64 {
    5
}

fn default_osc_percentage() -> f64 {
    0.01
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            fetch_interval_secs: default_fetch_interval_secs(),
            osc_percentage: default_osc_percentage(),
            price: PriceMode::default(),
            fetch_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Ticker endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerConfig {
    /// URL prefix; the pair is appended verbatim.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TickerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Record store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "./data/records".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> TrackerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config: {e}")))
    }

    /// Resolve and load the configuration, then apply env overrides.
    ///
    /// Path order: `path` > `RATEWATCH_CONFIG` > `config/default.toml`.
    /// An explicit path must exist; a missing default file falls back to
    /// built-in defaults.
    pub fn load(path: Option<&str>) -> TrackerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path =
                    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                if Path::new(&path).exists() {
                    Self::from_file(&path)?
                } else {
                    warn!(path = %path, "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TrackerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pairs) = lookup("CURRENCY_PAIRS") {
            self.tracker.pairs = pairs;
        }
        if let Some(raw) = lookup("FETCH_INTERVAL") {
            self.tracker.fetch_interval_secs = raw.trim().parse().map_err(|e| {
                TrackerError::Config(format!("Invalid FETCH_INTERVAL '{raw}': {e}"))
            })?;
        }
        if let Some(raw) = lookup("OSC_PERCENTAGE") {
            self.tracker.osc_percentage = raw.trim().parse().map_err(|e| {
                TrackerError::Config(format!("Invalid OSC_PERCENTAGE '{raw}': {e}"))
            })?;
        }
        if let Some(raw) = lookup("PRICE") {
            self.tracker.price = raw.parse()?;
        }
        if let Some(url) = lookup("TICKER_BASE_URL") {
            self.ticker.base_url = url;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.persistence.data_dir = dir;
        }
        Ok(())
    }

    /// Validated tracker settings.
    pub fn settings(&self) -> TrackerResult<Settings> {
        let settings = Settings::new(
            Duration::from_secs(self.tracker.fetch_interval_secs),
            self.tracker.osc_percentage,
            self.tracker.price,
        )?;
        Ok(settings)
    }

    /// Configured pairs, trimmed and de-duplicated in first-seen order.
    pub fn pairs(&self) -> TrackerResult<Vec<String>> {
        let pairs = normalize_pairs(self.tracker.pairs.split(','));
        if pairs.is_empty() {
            return Err(TrackerError::Config(
                "at least one currency pair is required".to_string(),
            ));
        }
        info!(?pairs, "Currency pairs configured");
        Ok(pairs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.tracker.fetch_retries,
            delay: Duration::from_millis(self.tracker.retry_delay_ms),
        }
    }
}

/// Trim, drop blanks and de-duplicate, keeping first-seen order.
pub(crate) fn normalize_pairs<'a, I>(pairs: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    for pair in pairs.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
        if !seen.iter().any(|p: &String| p == pair) {
            seen.push(pair.to_string());
        }
    }
    seen
}
