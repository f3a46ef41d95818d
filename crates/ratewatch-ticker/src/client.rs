//! HTTP client for the ticker endpoint.
//!
//! Issues `GET {base_url}{pair}` and decodes `{"ask": .., "bid": .., ..}`.

use crate::error::{TickerError, TickerResult};
use crate::source::TickerSource;
use ratewatch_core::{BoxFuture, PriceSide, Rate};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Sandbox ticker endpoint; the pair identifier is appended verbatim.
pub const DEFAULT_BASE_URL: &str = "https://api-sandbox.uphold.com/v0/ticker/";

/// Default timeout for ticker requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for fetching rates from the ticker endpoint.
pub struct TickerClient {
    /// HTTP client.
    client: Client,
    /// Base URL, always ending with `/`.
    base_url: String,
}

impl TickerClient {
    /// Create a new ticker client.
    ///
    /// # Arguments
    /// * `base_url` - ticker URL prefix (e.g., "https://api-sandbox.uphold.com/v0/ticker/")
    /// * `timeout` - per-request timeout; `None` uses 10 seconds
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> TickerResult<Self> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| TickerError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        info!(base_url = %base_url, "Ticker client ready");

        Ok(Self { client, base_url })
    }

    /// Full URL for `pair`.
    pub fn endpoint(&self, pair: &str) -> String {
        format!("{}{}", self.base_url, pair)
    }

    /// Fetch the current rate for `pair`.
    pub async fn fetch_rate(&self, pair: &str) -> TickerResult<Rate> {
        let url = self.endpoint(pair);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TickerError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TickerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TickerError::HttpClient(format!("Failed to read response: {e}")))?;

        let rate: Rate =
            serde_json::from_str(&body).map_err(|e| TickerError::Decode(e.to_string()))?;

        // Both sides must be numeric for the rate to be usable
        for side in PriceSide::ALL {
            rate.side_as_f64(side)
                .map_err(|e| TickerError::Decode(e.to_string()))?;
        }

        debug!(pair, %rate, "Received rate");

        Ok(rate)
    }
}

impl TickerSource for TickerClient {
    fn fetch<'a>(&'a self, pair: &'a str) -> BoxFuture<'a, TickerResult<Rate>> {
        Box::pin(self.fetch_rate(pair))
    }
}
