//! Reference feed binding.
//!
//! The reference exposes TradingView-style candle history. The last element
//! of the close series `c` is taken as the reference last price. Short
//! resolutions are tried first and coarser ones used as fallback, since the
//! intraday series is empty outside trading hours.

use crate::collaborator::{BoxFuture, PriceSource};
use crate::config::ReferenceConfig;
use crate::error::{VenueError, VenueResult};
use crate::retry::check_status;
use arb_core::{Price, PriceQuote};
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Reference feed client.
pub struct ReferenceFeedClient {
    client: Client,
    config: ReferenceConfig,
}

impl ReferenceFeedClient {
    pub fn new(config: ReferenceConfig) -> VenueResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| VenueError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ReferenceConfig {
        &self.config
    }

    fn history_path(&self) -> &'static str {
        if self.config.commodity {
            "/api/v1/FutureTradingView/History"
        } else {
            "/api/v1/TradingView/history"
        }
    }

    /// Last close from a candle-history body.
    ///
    /// A series needs more than one point to be usable.
    pub fn parse_last_close(body: &serde_json::Value, resolution: &str) -> VenueResult<Price> {
        let series = body
            .get("c")
            .and_then(|c| c.as_array())
            .filter(|c| c.len() > 1)
            .ok_or_else(|| {
                VenueError::DataUnavailable(format!("Resolution {resolution} price list is empty"))
            })?;

        series
            .last()
            .and_then(Price::from_json)
            .ok_or_else(|| {
                VenueError::DataUnavailable(format!(
                    "Resolution {resolution} last close is not a positive number"
                ))
            })
    }

    async fn fetch_history(&self, symbol: &str, resolution: &str) -> VenueResult<serde_json::Value> {
        let now = Utc::now().timestamp();
        let from = now.saturating_sub(self.config.lookback_secs).to_string();
        let to = now.to_string();
        let url = format!("{}{}", self.config.base_url, self.history_path());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("resolution", resolution),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await?;
        let body = check_status(response).await?.json().await?;
        Ok(body)
    }

    /// Last close at a single resolution, retried per the configured policy.
    pub async fn last_close(&self, symbol: &str, resolution: &str) -> VenueResult<PriceQuote> {
        let body = self
            .config
            .retry
            .run("reference_history", || self.fetch_history(symbol, resolution))
            .await?;
        let price = Self::parse_last_close(&body, resolution)?;
        Ok(PriceQuote::new(price))
    }
}

impl PriceSource for ReferenceFeedClient {
    fn last_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, VenueResult<PriceQuote>> {
        Box::pin(async move {
            let mut last_error = None;
            for resolution in &self.config.resolutions {
                match self.last_close(symbol, resolution).await {
                    Ok(quote) => {
                        debug!(symbol, resolution = %resolution, price = %quote.value, "Reference last close");
                        return Ok(quote);
                    }
                    Err(e) => {
                        debug!(symbol, resolution = %resolution, error = %e, "Reference resolution unusable");
                        last_error = Some(e);
                    }
                }
            }

            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no resolutions configured".to_string());
            warn!(symbol, %reason, "Reference price unavailable at every resolution");
            Err(VenueError::DataUnavailable(format!(
                "reference price for {symbol} unavailable: {reason}"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_last_close() {
        let body = json!({"s": "ok", "c": [100, 101.5, 102]});
        let price = ReferenceFeedClient::parse_last_close(&body, "1").unwrap();
        assert_eq!(price.inner(), dec!(102));
    }

    #[test]
    fn test_single_point_series_is_empty() {
        let body = json!({"c": [100]});
        assert!(matches!(
            ReferenceFeedClient::parse_last_close(&body, "1"),
            Err(VenueError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_series() {
        let body = json!({"s": "no_data"});
        let err = ReferenceFeedClient::parse_last_close(&body, "5").unwrap_err();
        assert!(err.to_string().contains("Resolution 5"));
    }

    #[test]
    fn test_invalid_last_close() {
        let body = json!({"c": [100, null]});
        assert!(ReferenceFeedClient::parse_last_close(&body, "1D").is_err());
    }

    #[test]
    fn test_history_path() {
        let client = ReferenceFeedClient::new(ReferenceConfig {
            commodity: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.history_path(), "/api/v1/FutureTradingView/History");
    }
}
