//! Detector configuration.

use crate::error::{DetectorError, DetectorResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for divergence detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum relative divergence to act on (0.01 = 1%).
    #[serde(default = "default_threshold")]
    pub threshold: Decimal,
    /// Offset applied to the reference price to derive the execution target.
    /// Short target = reference * (1 + offset), long target = reference * (1 - offset).
    #[serde(default = "default_target_offset")]
    pub target_offset: Decimal,
}

fn default_threshold() -> Decimal {
    Decimal::new(1, 2) // 1%
}

fn default_target_offset() -> Decimal {
    Decimal::new(1, 2) // 1%
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            target_offset: default_target_offset(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold.is_sign_negative() || self.threshold.is_zero() {
            return Err(format!("threshold ({}) must be positive", self.threshold));
        }

        if self.target_offset.is_sign_negative() || self.target_offset >= Decimal::ONE {
            return Err(format!(
                "target_offset ({}) must be in [0, 1)",
                self.target_offset
            ));
        }

        Ok(())
    }

    /// Validate and wrap the failure in `DetectorError`.
    pub fn validated(self) -> DetectorResult<Self> {
        self.validate().map_err(DetectorError::ConfigError)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.threshold, dec!(0.01));
        assert_eq!(config.target_offset, dec!(0.01));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DetectorConfig = toml::from_str(r#"threshold = "0.02""#).unwrap();
        assert_eq!(config.threshold, dec!(0.02));
        assert_eq!(config.target_offset, dec!(0.01));
    }

    #[test]
    fn test_invalid_threshold() {
        let config = DetectorConfig {
            threshold: dec!(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(
            config.validated(),
            Err(DetectorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_offset() {
        let config = DetectorConfig {
            target_offset: dec!(1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
