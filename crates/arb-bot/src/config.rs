//! Application configuration.

use crate::close_recorder::CloseCaptureConfig;
use crate::error::{AppError, AppResult};
use arb_detector::DetectorConfig;
use arb_executor::{ExecutionConfig, SessionConfig};
use arb_mm::LadderConfig;
use arb_venue::{ReferenceConfig, VenueConfig};
use serde::{Deserialize, Serialize};

/// The traded instrument on both sides of the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolsConfig {
    /// Venue symbol (e.g., "AHRM1IRR").
    #[serde(default = "default_venue_symbol")]
    pub venue: String,
    /// Reference feed symbol (e.g., "IRT1AHRM0001:1").
    #[serde(default = "default_reference_symbol")]
    pub reference: String,
}

fn default_venue_symbol() -> String {
    "AHRM1IRR".to_string()
}

fn default_reference_symbol() -> String {
    "IRT1AHRM0001:1".to_string()
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            venue: default_venue_symbol(),
            reference: default_reference_symbol(),
        }
    }
}

impl SymbolsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.venue.trim().is_empty() {
            return Err("symbols.venue must not be empty".to_string());
        }
        if self.reference.trim().is_empty() {
            return Err("symbols.reference must not be empty".to_string());
        }
        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Statistics summary interval (seconds). Default: 3600.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub ladder: LadderConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub venue: VenueConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub close_capture: CloseCaptureConfig,
}

fn default_stats_interval_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stats_interval_secs: default_stats_interval_secs(),
            symbols: SymbolsConfig::default(),
            detector: DetectorConfig::default(),
            ladder: LadderConfig::default(),
            execution: ExecutionConfig::default(),
            session: SessionConfig::default(),
            venue: VenueConfig::default(),
            reference: ReferenceConfig::default(),
            close_capture: CloseCaptureConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Validate every section, reporting the first failure with its section name.
    pub fn validate(&self) -> AppResult<()> {
        let checks = [
            ("symbols", self.symbols.validate()),
            ("detector", self.detector.validate()),
            ("ladder", self.ladder.validate()),
            ("execution", self.execution.validate()),
            ("session", self.session.validate()),
            ("venue", self.venue.validate()),
            ("reference", self.reference.validate()),
            ("close_capture", self.close_capture.validate()),
        ];

        for (section, result) in checks {
            result.map_err(|e| AppError::Config(format!("[{section}] {e}")))?;
        }

        if self.stats_interval_secs == 0 {
            return Err(AppError::Config(
                "stats_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
