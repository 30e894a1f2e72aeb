//! Ladder configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ladder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Size of each ladder order. Default: 50.
    #[serde(default = "default_order_size")]
    pub order_size: Decimal,
    /// Price levels placed for a thin or wide book. Default: 10.
    #[serde(default = "default_max_levels")]
    pub max_levels: i64,
    /// Gap at or above which the full ladder is spread out. Default: 10.
    #[serde(default = "default_wide_gap")]
    pub wide_gap: i64,
    /// Book depth fetched to read the top of each side. Default: 1.
    #[serde(default = "default_book_depth")]
    pub book_depth: u32,
    /// Quote market identifier. Default: "IRR".
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_buy_source")]
    pub buy_source: String,
    #[serde(default = "default_sell_source")]
    pub sell_source: String,
    /// Seconds between maintainer ticks. Default: 60.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

fn default_order_size() -> Decimal {
    Decimal::from(50)
}

fn default_max_levels() -> i64 {
    10
}

fn default_wide_gap() -> i64 {
    10
}

fn default_book_depth() -> u32 {
    1
}

fn default_market() -> String {
    "IRR".to_string()
}

fn default_buy_source() -> String {
    "short-mechanism-ladder".to_string()
}

fn default_sell_source() -> String {
    "short-mechanism-sell-ladder".to_string()
}

fn default_tick_interval_secs() -> u64 {
    60
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            order_size: default_order_size(),
            max_levels: default_max_levels(),
            wide_gap: default_wide_gap(),
            book_depth: default_book_depth(),
            market: default_market(),
            buy_source: default_buy_source(),
            sell_source: default_sell_source(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl LadderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.order_size.is_sign_negative() || self.order_size.is_zero() {
            return Err(format!("order_size ({}) must be positive", self.order_size));
        }
        if !(1..=10).contains(&self.max_levels) {
            return Err(format!(
                "max_levels ({}) must be between 1 and 10",
                self.max_levels
            ));
        }
        if self.wide_gap <= 1 || self.wide_gap > self.max_levels {
            return Err(format!(
                "wide_gap ({}) must be greater than 1 and at most max_levels ({})",
                self.wide_gap, self.max_levels
            ));
        }
        if self.book_depth == 0 {
            return Err("book_depth must be at least 1".to_string());
        }
        if self.tick_interval_secs == 0 {
            return Err("tick_interval_secs must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = LadderConfig::default();
        assert_eq!(config.order_size, dec!(50));
        assert_eq!(config.max_levels, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config: LadderConfig = toml::from_str(
            r#"
            order_size = "25"
            market = "USDT"
            "#,
        )
        .unwrap();
        assert_eq!(config.order_size, dec!(25));
        assert_eq!(config.market, "USDT");
        assert_eq!(config.wide_gap, 10);
    }

    #[test]
    fn test_wide_gap_beyond_max_levels_rejected() {
        let config = LadderConfig {
            wide_gap: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LadderConfig {
            max_levels: 5,
            wide_gap: 5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_too_many_levels_rejected() {
        let config = LadderConfig {
            max_levels: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
