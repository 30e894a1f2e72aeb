//! Daily reference close capture.
//!
//! Once per local trading day, at a fixed wall-clock time, the reference
//! close at the daily resolution is appended to a per-symbol JSON array on
//! disk. Failed fetches are recorded too, with `status: false`.

use crate::error::{AppError, AppResult};
use arb_core::PriceQuote;
use arb_venue::{ReferenceFeedClient, VenueResult};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Close capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseCaptureConfig {
    /// Run the daily scheduler. Default: true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Local offset from UTC (seconds). Default: 12,600 (+03:30).
    #[serde(default = "default_utc_offset_secs")]
    pub utc_offset_secs: i32,
    /// Local capture hour. Default: 12.
    #[serde(default = "default_hour")]
    pub hour: u32,
    /// Local capture minute. Default: 30.
    #[serde(default = "default_minute")]
    pub minute: u32,
    /// Directory holding `close-price-{symbol}.json`. Default: "data".
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_enabled() -> bool {
    true
}

fn default_utc_offset_secs() -> i32 {
    12_600
}

fn default_hour() -> u32 {
    12
}

fn default_minute() -> u32 {
    30
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for CloseCaptureConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            utc_offset_secs: default_utc_offset_secs(),
            hour: default_hour(),
            minute: default_minute(),
            data_dir: default_data_dir(),
        }
    }
}

impl CloseCaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if FixedOffset::east_opt(self.utc_offset_secs).is_none() {
            return Err(format!(
                "utc_offset_secs ({}) is out of range",
                self.utc_offset_secs
            ));
        }
        if self.hour > 23 {
            return Err(format!("hour ({}) must be 0-23", self.hour));
        }
        if self.minute > 59 {
            return Err(format!("minute ({}) must be 0-59", self.minute));
        }
        if self.data_dir.trim().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        Ok(())
    }
}

/// One appended entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRecord {
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub local_time: String,
    pub iso_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CloseRecord {
    pub fn is_success(&self) -> bool {
        self.close.is_some()
    }
}

/// Scheduler and writer for daily close records.
#[derive(Debug)]
pub struct CloseRecorder {
    config: CloseCaptureConfig,
    offset: FixedOffset,
    last_fired: Option<NaiveDate>,
}

impl CloseRecorder {
    pub fn new(config: CloseCaptureConfig) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_secs).ok_or_else(|| {
            AppError::Config(format!(
                "close_capture.utc_offset_secs ({}) is out of range",
                config.utc_offset_secs
            ))
        })?;
        Ok(Self {
            config,
            offset,
            last_fired: None,
        })
    }

    pub fn config(&self) -> &CloseCaptureConfig {
        &self.config
    }

    /// Whether a capture should run at `now`.
    ///
    /// True during the configured local minute, at most once per local date.
    /// Marks the date as fired when returning true.
    pub fn poll_due(&mut self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        let today = local.date_naive();

        if self.last_fired == Some(today) {
            return false;
        }
        if local.hour() != self.config.hour || local.minute() != self.config.minute {
            return false;
        }

        self.last_fired = Some(today);
        true
    }

    /// Path of the record file for `symbol`.
    pub fn record_path(&self, symbol: &str) -> PathBuf {
        Path::new(&self.config.data_dir).join(format!("close-price-{symbol}.json"))
    }

    /// Build the record for a fetch result observed at `now`.
    pub fn record_for(
        &self,
        symbol: &str,
        result: &VenueResult<PriceQuote>,
        now: DateTime<Utc>,
    ) -> CloseRecord {
        let local_time = now
            .with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let iso_utc = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        match result {
            Ok(quote) => CloseRecord {
                local_time,
                iso_utc,
                symbol: Some(symbol.to_string()),
                close: Some(quote.value.inner()),
                status: None,
                message: None,
            },
            Err(e) => CloseRecord {
                local_time,
                iso_utc,
                symbol: None,
                close: None,
                status: Some(false),
                message: Some(e.to_string()),
            },
        }
    }

    /// Append `record` to the symbol's JSON array, starting a new array when
    /// the file is missing or unreadable.
    pub fn append(&self, symbol: &str, record: &CloseRecord) -> AppResult<PathBuf> {
        std::fs::create_dir_all(&self.config.data_dir)?;
        let path = self.record_path(symbol);

        let mut records: Vec<serde_json::Value> = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Close record file unreadable, starting a new array");
                Vec::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        records.push(serde_json::to_value(record)?);
        std::fs::write(&path, serde_json::to_string_pretty(&records)?)?;
        Ok(path)
    }

    /// Fetch the daily close and append it.
    pub async fn capture(
        &self,
        reference: &ReferenceFeedClient,
        symbol: &str,
    ) -> AppResult<CloseRecord> {
        let resolution = reference.config().daily_resolution.clone();
        let result = reference.last_close(symbol, &resolution).await;
        let record = self.record_for(symbol, &result, Utc::now());
        let path = self.append(symbol, &record)?;

        match &result {
            Ok(quote) => info!(
                symbol,
                close = %quote.value,
                path = %path.display(),
                "Stored daily close"
            ),
            Err(e) => warn!(
                symbol,
                error = %e,
                path = %path.display(),
                "Daily close unavailable, failure recorded"
            ),
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arb_core::Price;
    use arb_venue::VenueError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn recorder(dir: &TempDir) -> CloseRecorder {
        CloseRecorder::new(CloseCaptureConfig {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..CloseCaptureConfig::default()
        })
        .unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_due_once_per_local_day() {
        let dir = TempDir::new().unwrap();
        let mut rec = recorder(&dir);

        // 09:00 UTC = 12:30 at +03:30
        assert!(!rec.poll_due(utc(2024, 5, 1, 8, 59, 59)));
        assert!(rec.poll_due(utc(2024, 5, 1, 9, 0, 0)));
        assert!(!rec.poll_due(utc(2024, 5, 1, 9, 0, 1)));
        assert!(!rec.poll_due(utc(2024, 5, 1, 9, 1, 0)));
        assert!(rec.poll_due(utc(2024, 5, 2, 9, 0, 30)));
    }

    #[test]
    fn test_local_date_follows_offset() {
        let dir = TempDir::new().unwrap();
        let mut rec = CloseRecorder::new(CloseCaptureConfig {
            hour: 0,
            minute: 10,
            data_dir: dir.path().to_string_lossy().to_string(),
            ..CloseCaptureConfig::default()
        })
        .unwrap();

        // 20:40 UTC on the 1st is 00:10 local on the 2nd.
        assert!(rec.poll_due(utc(2024, 5, 1, 20, 40, 0)));
        assert_eq!(rec.last_fired, NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn test_record_for_success_and_failure() {
        let dir = TempDir::new().unwrap();
        let rec = recorder(&dir);
        let now = utc(2024, 5, 1, 9, 0, 0);

        let ok = rec.record_for("AHRM1IRR", &Ok(PriceQuote::new(Price::new(dec!(1234)))), now);
        assert_eq!(ok.local_time, "2024-05-01 12:30:00");
        assert_eq!(ok.iso_utc, "2024-05-01T09:00:00.000Z");
        assert_eq!(ok.close, Some(dec!(1234)));
        assert!(ok.is_success());

        let err = rec.record_for(
            "AHRM1IRR",
            &Err(VenueError::DataUnavailable("empty series".to_string())),
            now,
        );
        assert_eq!(err.status, Some(false));
        assert!(err.message.unwrap().contains("empty series"));
        assert!(err.symbol.is_none());
    }

    #[test]
    fn test_append_accumulates_records() {
        let dir = TempDir::new().unwrap();
        let rec = recorder(&dir);
        let now = utc(2024, 5, 1, 9, 0, 0);
        let record = rec.record_for("S", &Ok(PriceQuote::new(Price::new(dec!(10)))), now);

        rec.append("S", &record).unwrap();
        let path = rec.append("S", &record).unwrap();

        let stored: Vec<CloseRecord> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1], record);
    }

    #[test]
    fn test_append_restarts_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let rec = recorder(&dir);
        std::fs::write(rec.record_path("S"), "{not json").unwrap();

        let record = rec.record_for(
            "S",
            &Ok(PriceQuote::new(Price::new(dec!(10)))),
            utc(2024, 5, 1, 9, 0, 0),
        );
        let path = rec.append("S", &record).unwrap();

        let stored: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["symbol"], "S");
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let config = CloseCaptureConfig {
            utc_offset_secs: 100_000,
            ..CloseCaptureConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(CloseRecorder::new(config).is_err());
    }
}
