//! Prometheus metrics for the divergence arbitrage bot.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a startup-time programming error, so these panics only
//! occur during static initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, Encoder,
    HistogramVec, IntGauge, TextEncoder,
};

/// Divergence signals detected.
/// Labels: direction (short/long)
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_signals_total",
        "Divergence signals detected",
        &["direction"]
    )
    .unwrap()
});

/// Ticks skipped because a collaborator returned no usable data.
/// Labels: source (reference/venue/book)
pub static DATA_UNAVAILABLE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_data_unavailable_total",
        "Ticks skipped for missing or invalid collaborator data",
        &["source"]
    )
    .unwrap()
});

/// Sweep orders by outcome.
/// Labels: direction, outcome (submitted/no_liquidity/failed)
pub static SWEEP_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_sweep_total",
        "Liquidity sweep executions by outcome",
        &["direction", "outcome"]
    )
    .unwrap()
});

/// Ladder order placements.
/// Labels: side (BUY/SELL), outcome (placed/failed)
pub static LADDER_ORDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_ladder_orders_total",
        "Ladder limit orders by outcome",
        &["side", "outcome"]
    )
    .unwrap()
});

/// Ladder refreshes.
/// Labels: result (replaced/unchanged/no_price/no_book)
pub static LADDER_TICKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_ladder_ticks_total",
        "Ladder maintainer ticks by result",
        &["result"]
    )
    .unwrap()
});

/// Batch cancel results for ladder orders.
/// Labels: outcome (succeeded/failed)
pub static LADDER_CANCELS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_ladder_cancels_total",
        "Ladder order cancellations by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Monitoring session results.
/// Labels: outcome (satisfied/timed_out/cancelled/order_failed)
pub static SESSION_OUTCOMES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_session_outcomes_total",
        "Monitoring session terminal outcomes",
        &["outcome"]
    )
    .unwrap()
});

/// Monitoring sessions currently polling.
pub static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("arb_active_sessions", "Monitoring sessions currently polling").unwrap()
});

/// Collaborator retries.
/// Labels: operation
pub static COLLABORATOR_RETRY_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "arb_collaborator_retry_total",
        "Retried collaborator calls",
        &["operation"]
    )
    .unwrap()
});

/// Collaborator call latency in milliseconds, including retries.
/// Labels: operation
pub static COLLABORATOR_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "arb_collaborator_latency_ms",
        "Collaborator call latency in milliseconds",
        &["operation"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    /// Record a divergence signal.
    pub fn signal_detected(direction: &str) {
        SIGNALS_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record a tick skipped for missing data.
    pub fn data_unavailable(source: &str) {
        DATA_UNAVAILABLE_TOTAL.with_label_values(&[source]).inc();
    }

    /// Record a sweep outcome.
    pub fn sweep(direction: &str, outcome: &str) {
        SWEEP_TOTAL.with_label_values(&[direction, outcome]).inc();
    }

    pub fn ladder_order_placed(side: &str) {
        LADDER_ORDERS_TOTAL.with_label_values(&[side, "placed"]).inc();
    }

    pub fn ladder_order_failed(side: &str) {
        LADDER_ORDERS_TOTAL.with_label_values(&[side, "failed"]).inc();
    }

    pub fn ladder_tick(result: &str) {
        LADDER_TICKS_TOTAL.with_label_values(&[result]).inc();
    }

    /// Record the outcome of a batch cancel.
    pub fn ladder_cancels(succeeded: usize, failed: usize) {
        LADDER_CANCELS_TOTAL
            .with_label_values(&["succeeded"])
            .inc_by(succeeded as f64);
        LADDER_CANCELS_TOTAL
            .with_label_values(&["failed"])
            .inc_by(failed as f64);
    }

    /// Record a session entering the polling state.
    pub fn session_started() {
        ACTIVE_SESSIONS.inc();
    }

    /// Record a session reaching a terminal state.
    pub fn session_finished(outcome: &str) {
        ACTIVE_SESSIONS.dec();
        SESSION_OUTCOMES_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn collaborator_retry(operation: &str) {
        COLLABORATOR_RETRY_TOTAL.with_label_values(&[operation]).inc();
    }

    pub fn collaborator_latency(operation: &str, latency_ms: f64) {
        COLLABORATOR_LATENCY_MS
            .with_label_values(&[operation])
            .observe(latency_ms);
    }

    /// Render the default registry in text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_text_contains_recorded_metric() {
        Metrics::sweep("short", "submitted");
        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("arb_sweep_total"));
    }

    #[test]
    fn test_ladder_cancels_count_both_outcomes() {
        let before_ok = LADDER_CANCELS_TOTAL.with_label_values(&["succeeded"]).get();
        let before_failed = LADDER_CANCELS_TOTAL.with_label_values(&["failed"]).get();
        Metrics::ladder_cancels(3, 1);
        assert!(LADDER_CANCELS_TOTAL.with_label_values(&["succeeded"]).get() >= before_ok + 3.0);
        assert!(LADDER_CANCELS_TOTAL.with_label_values(&["failed"]).get() >= before_failed + 1.0);
    }
}
