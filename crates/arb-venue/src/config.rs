//! Collaborator configuration.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Venue REST configuration.
///
/// The bearer token is never stored here; only the name of the environment
/// variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Order endpoint base (`{base_url}/orders`).
    #[serde(default = "default_venue_base_url")]
    pub base_url: String,
    /// Market-data endpoint base (`{market_url}/market/...`).
    #[serde(default = "default_venue_market_url")]
    pub market_url: String,
    /// `from=` tag on the rolling-price endpoint.
    #[serde(default = "default_price_feed_tag")]
    pub price_feed_tag: String,
    /// Environment variable holding the API bearer token.
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,
    /// Per-request timeout (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_venue_base_url() -> String {
    "https://api.mazdax.ir".to_string()
}

fn default_venue_market_url() -> String {
    "https://api.mazdax.ir".to_string()
}

fn default_price_feed_tag() -> String {
    "mazdax".to_string()
}

fn default_api_token_env() -> String {
    "ARB_VENUE_TOKEN".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            base_url: default_venue_base_url(),
            market_url: default_venue_market_url(),
            price_feed_tag: default_price_feed_tag(),
            api_token_env: default_api_token_env(),
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

impl VenueConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() || self.market_url.is_empty() {
            return Err("venue base_url and market_url must be set".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("venue request_timeout_ms must be positive".to_string());
        }
        self.retry.validate()
    }
}

/// Reference feed (candle history) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_base_url")]
    pub base_url: String,
    /// Resolutions tried in order until one yields a usable series.
    #[serde(default = "default_resolutions")]
    pub resolutions: Vec<String>,
    /// Resolution used for the daily close capture.
    #[serde(default = "default_daily_resolution")]
    pub daily_resolution: String,
    /// History window requested (seconds). Default: 4 days.
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: i64,
    /// Use the futures/commodity history endpoint.
    #[serde(default)]
    pub commodity: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_reference_base_url() -> String {
    "https://sahra.ir".to_string()
}

fn default_resolutions() -> Vec<String> {
    ["1", "5", "15", "60", "1D"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_daily_resolution() -> String {
    "1D".to_string()
}

fn default_lookback_secs() -> i64 {
    4 * 24 * 60 * 60
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_reference_base_url(),
            resolutions: default_resolutions(),
            daily_resolution: default_daily_resolution(),
            lookback_secs: default_lookback_secs(),
            commodity: false,
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ReferenceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("reference base_url must be set".to_string());
        }
        if self.resolutions.is_empty() {
            return Err("reference resolutions must not be empty".to_string());
        }
        if self.lookback_secs <= 0 {
            return Err(format!(
                "reference lookback_secs ({}) must be positive",
                self.lookback_secs
            ));
        }
        self.retry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(VenueConfig::default().validate().is_ok());
        assert!(ReferenceConfig::default().validate().is_ok());
        assert_eq!(ReferenceConfig::default().resolutions, vec!["1", "5", "15", "60", "1D"]);
    }

    #[test]
    fn test_reference_from_toml() {
        let config: ReferenceConfig = toml::from_str(
            r#"
            base_url = "http://localhost:9000"
            resolutions = ["1D"]
            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.resolutions, vec!["1D"]);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.lookback_secs, 345_600);
    }

    #[test]
    fn test_empty_resolutions_rejected() {
        let config = ReferenceConfig {
            resolutions: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
