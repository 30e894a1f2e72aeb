//! Execution and monitoring configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sweep execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Book depth fetched for the sweep. Default: 20.
    #[serde(default = "default_sweep_book_depth")]
    pub sweep_book_depth: u32,
    /// Synthetic top-up added when depth runs out before the target. Default: 50.
    #[serde(default = "default_top_up_size")]
    pub top_up_size: Decimal,
    /// Quote market identifier. Default: "IRR".
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_short_source")]
    pub short_source: String,
    #[serde(default = "default_long_source")]
    pub long_source: String,
    /// Seconds between divergence ticks. Default: 60.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

fn default_sweep_book_depth() -> u32 {
    20
}

fn default_top_up_size() -> Decimal {
    Decimal::from(50)
}

fn default_market() -> String {
    "IRR".to_string()
}

fn default_short_source() -> String {
    "short-mechanism".to_string()
}

fn default_long_source() -> String {
    "long-mechanism".to_string()
}

fn default_tick_interval_secs() -> u64 {
    60
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            sweep_book_depth: default_sweep_book_depth(),
            top_up_size: default_top_up_size(),
            market: default_market(),
            short_source: default_short_source(),
            long_source: default_long_source(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_book_depth == 0 {
            return Err("sweep_book_depth must be at least 1".to_string());
        }
        if self.top_up_size.is_sign_negative() {
            return Err(format!(
                "top_up_size ({}) must be non-negative",
                self.top_up_size
            ));
        }
        if self.tick_interval_secs == 0 {
            return Err("tick_interval_secs must be positive".to_string());
        }
        Ok(())
    }
}

/// Buy-back monitoring session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds between price checks. Default: 10.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Wall-clock budget for the whole session (seconds). Default: 1800 (30 minutes).
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
    /// Quote notional the buy-back order must cover. Default: 100,000.
    #[serde(default = "default_buyback_notional")]
    pub buyback_notional: Decimal,
    #[serde(default = "default_buyback_source")]
    pub buyback_source: String,
}

fn default_check_interval_secs() -> u64 {
    10
}

fn default_max_wait_secs() -> u64 {
    30 * 60
}

fn default_buyback_notional() -> Decimal {
    Decimal::from(100_000)
}

fn default_buyback_source() -> String {
    "short-mechanism-buyback".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
            buyback_notional: default_buyback_notional(),
            buyback_source: default_buyback_source(),
        }
    }
}

impl SessionConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.check_interval_secs == 0 {
            return Err("check_interval_secs must be positive".to_string());
        }
        if self.max_wait_secs < self.check_interval_secs {
            return Err(format!(
                "max_wait_secs ({}) must be at least check_interval_secs ({})",
                self.max_wait_secs, self.check_interval_secs
            ));
        }
        if self.buyback_notional.is_sign_negative() || self.buyback_notional.is_zero() {
            return Err(format!(
                "buyback_notional ({}) must be positive",
                self.buyback_notional
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let exec = ExecutionConfig::default();
        assert_eq!(exec.sweep_book_depth, 20);
        assert_eq!(exec.top_up_size, dec!(50));
        assert!(exec.validate().is_ok());

        let session = SessionConfig::default();
        assert_eq!(session.check_interval(), Duration::from_secs(10));
        assert_eq!(session.max_wait(), Duration::from_secs(1800));
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_session_from_toml() {
        let session: SessionConfig = toml::from_str("max_wait_secs = 600").unwrap();
        assert_eq!(session.max_wait_secs, 600);
        assert_eq!(session.buyback_notional, dec!(100000));
    }

    #[test]
    fn test_session_wait_shorter_than_interval() {
        let session = SessionConfig {
            check_interval_secs: 30,
            max_wait_secs: 10,
            ..Default::default()
        };
        assert!(session.validate().is_err());
    }
}
