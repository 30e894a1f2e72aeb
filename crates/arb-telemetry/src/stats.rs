//! Periodic statistics summary.
//!
//! Reads the counters in `metrics` back out and logs a compact summary of
//! what the bot has done since start-up.

use crate::metrics::{
    ACTIVE_SESSIONS, LADDER_ORDERS_TOTAL, SESSION_OUTCOMES_TOTAL, SIGNALS_TOTAL, SWEEP_TOTAL,
};
use chrono::{DateTime, Utc};
use prometheus::CounterVec;
use serde::Serialize;
use tracing::info;

/// Snapshot of activity counters.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub since: DateTime<Utc>,
    pub signals_short: u64,
    pub signals_long: u64,
    pub sweeps_submitted: u64,
    pub sweeps_no_liquidity: u64,
    pub ladder_placed: u64,
    pub ladder_failed: u64,
    pub sessions_satisfied: u64,
    pub sessions_timed_out: u64,
    pub sessions_active: i64,
}

/// Produces `RunStats` snapshots.
pub struct StatsReporter {
    start_time: DateTime<Utc>,
}

impl Default for StatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsReporter {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
        }
    }

    fn counter(counter: &CounterVec, labels: &[&str]) -> u64 {
        counter.with_label_values(labels).get() as u64
    }

    /// Current counter values.
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            since: self.start_time,
            signals_short: Self::counter(&SIGNALS_TOTAL, &["short"]),
            signals_long: Self::counter(&SIGNALS_TOTAL, &["long"]),
            sweeps_submitted: Self::counter(&SWEEP_TOTAL, &["short", "submitted"])
                + Self::counter(&SWEEP_TOTAL, &["long", "submitted"]),
            sweeps_no_liquidity: Self::counter(&SWEEP_TOTAL, &["short", "no_liquidity"])
                + Self::counter(&SWEEP_TOTAL, &["long", "no_liquidity"]),
            ladder_placed: Self::counter(&LADDER_ORDERS_TOTAL, &["BUY", "placed"])
                + Self::counter(&LADDER_ORDERS_TOTAL, &["SELL", "placed"]),
            ladder_failed: Self::counter(&LADDER_ORDERS_TOTAL, &["BUY", "failed"])
                + Self::counter(&LADDER_ORDERS_TOTAL, &["SELL", "failed"]),
            sessions_satisfied: Self::counter(&SESSION_OUTCOMES_TOTAL, &["satisfied"]),
            sessions_timed_out: Self::counter(&SESSION_OUTCOMES_TOTAL, &["timed_out"]),
            sessions_active: ACTIVE_SESSIONS.get(),
        }
    }

    /// Log the current snapshot.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            since = %s.since,
            signals_short = s.signals_short,
            signals_long = s.signals_long,
            sweeps_submitted = s.sweeps_submitted,
            sweeps_no_liquidity = s.sweeps_no_liquidity,
            ladder_placed = s.ladder_placed,
            ladder_failed = s.ladder_failed,
            sessions_satisfied = s.sessions_satisfied,
            sessions_timed_out = s.sessions_timed_out,
            sessions_active = s.sessions_active,
            "Run statistics"
        );
    }
}
