//! Buy-back monitoring session.
//!
//! After a short sweep the session polls the venue price until it falls to
//! the target, then places one limit BUY at the target. The state machine is
//! pure (`on_poll`, `expire`, `cancel`); `run` drives it from a tokio
//! interval so it can be tested on a paused clock.

use crate::config::SessionConfig;
use arb_core::{OrderRequest, OrderSide, Price, Size};
use arb_telemetry::Metrics;
use arb_venue::{DynOrderGateway, DynPriceSource};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Polling,
    /// Price reached the target at `price`. Terminal.
    Satisfied { price: Price },
    /// Deadline passed first. Terminal.
    TimedOut,
    /// Stopped by a supervisor. Terminal.
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Polling)
    }
}

/// One poll result fed into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    Observed(Price),
    FetchFailed,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Buy-back placed.
    Satisfied {
        order_id: Option<u64>,
        amount: Size,
    },
    /// Condition met but the buy-back order was rejected.
    OrderFailed { reason: String },
    TimedOut,
    Cancelled,
}

impl SessionOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Satisfied { .. } => "satisfied",
            Self::OrderFailed { .. } => "order_failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Final session report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub symbol: String,
    pub target: Price,
    pub initial: Price,
    pub outcome: SessionOutcome,
    /// Successful price observations.
    pub checks_performed: u32,
    /// Price fetches that failed.
    pub failed_fetches: u32,
    pub elapsed: Duration,
    pub last_price: Option<Price>,
    /// `(initial - last) / initial * 100`.
    pub price_drop_pct: Option<Decimal>,
}

/// Bounded polling state machine.
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    symbol: String,
    target: Price,
    initial: Price,
    started_at: Instant,
    check_interval: Duration,
    max_wait: Duration,
    checks_performed: u32,
    failed_fetches: u32,
    last_price: Option<Price>,
    state: SessionState,
}

impl MonitoringSession {
    pub fn new(
        symbol: impl Into<String>,
        target: Price,
        initial: Price,
        started_at: Instant,
        check_interval: Duration,
        max_wait: Duration,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            target,
            initial,
            started_at,
            check_interval,
            max_wait,
            checks_performed: 0,
            failed_fetches: 0,
            last_price: None,
            state: SessionState::Polling,
        }
    }

    /// Session starting now with intervals from `config`.
    pub fn from_config(
        symbol: impl Into<String>,
        target: Price,
        initial: Price,
        config: &SessionConfig,
    ) -> Self {
        Self::new(
            symbol,
            target,
            initial,
            Instant::now(),
            config.check_interval(),
            config.max_wait(),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn checks_performed(&self) -> u32 {
        self.checks_performed
    }

    pub fn failed_fetches(&self) -> u32 {
        self.failed_fetches
    }

    pub fn target(&self) -> Price {
        self.target
    }

    /// `None` when `max_wait` runs past what `Instant` can represent.
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.checked_add(self.max_wait)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Apply one poll result. Ignored once terminal.
    ///
    /// Failed fetches are counted separately and never satisfy the session;
    /// the deadline keeps running regardless.
    pub fn on_poll(&mut self, event: PollEvent) -> SessionState {
        if self.state.is_terminal() {
            return self.state;
        }

        match event {
            PollEvent::FetchFailed => {
                self.failed_fetches += 1;
            }
            PollEvent::Observed(price) => {
                self.checks_performed += 1;
                self.last_price = Some(price);
                if price <= self.target {
                    self.state = SessionState::Satisfied { price };
                }
            }
        }
        self.state
    }

    /// Transition to `TimedOut` if still polling.
    pub fn expire(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::TimedOut;
        }
    }

    /// Transition to `Cancelled` if still polling.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Cancelled;
        }
    }

    /// Buy-back size covering `notional` at the target.
    pub fn buyback_amount(&self, notional: Decimal) -> Option<Size> {
        Size::covering_notional(notional, self.target)
    }

    fn report(&self, outcome: SessionOutcome, now: Instant) -> SessionReport {
        SessionReport {
            symbol: self.symbol.clone(),
            target: self.target,
            initial: self.initial,
            outcome,
            checks_performed: self.checks_performed,
            failed_fetches: self.failed_fetches,
            elapsed: now.saturating_duration_since(self.started_at),
            last_price: self.last_price,
            price_drop_pct: self.last_price.and_then(|p| p.pct_drop_from(self.initial)),
        }
    }

    /// Drive the session to a terminal state.
    ///
    /// The first check runs immediately, then one per `check_interval`.
    /// Cancellation and the deadline are checked at the top of every
    /// iteration, never during the buy-back submission.
    pub async fn run(
        mut self,
        prices: DynPriceSource,
        gateway: DynOrderGateway,
        config: SessionConfig,
        market: String,
        cancel: CancellationToken,
    ) -> SessionReport {
        info!(
            symbol = %self.symbol,
            target = %self.target,
            initial = %self.initial,
            check_interval_secs = self.check_interval.as_secs(),
            max_wait_secs = self.max_wait.as_secs(),
            "Monitoring session started"
        );
        Metrics::session_started();

        let mut ticker = tokio::time::interval_at(self.started_at, self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancel();
                }
                _ = ticker.tick() => {}
            }

            if cancel.is_cancelled() {
                self.cancel();
            }
            if self.state == SessionState::Cancelled {
                break SessionOutcome::Cancelled;
            }
            if self.is_expired(Instant::now()) {
                self.expire();
                break SessionOutcome::TimedOut;
            }

            let event = match prices.last_price(&self.symbol).await {
                Ok(quote) => PollEvent::Observed(quote.value),
                Err(e) => {
                    warn!(symbol = %self.symbol, error = %e, "Session price fetch failed");
                    PollEvent::FetchFailed
                }
            };

            if let SessionState::Satisfied { price } = self.on_poll(event) {
                info!(
                    symbol = %self.symbol,
                    price = %price,
                    target = %self.target,
                    check = self.checks_performed,
                    "Target reached, placing buy-back"
                );
                break self.place_buyback(&gateway, &config, &market).await;
            }

            debug!(
                symbol = %self.symbol,
                check = self.checks_performed,
                failed_fetches = self.failed_fetches,
                last_price = ?self.last_price,
                target = %self.target,
                "Target not reached"
            );
        };

        let report = self.report(outcome, Instant::now());
        Metrics::session_finished(report.outcome.as_label());
        info!(
            symbol = %report.symbol,
            outcome = report.outcome.as_label(),
            checks = report.checks_performed,
            failed_fetches = report.failed_fetches,
            elapsed_secs = report.elapsed.as_secs(),
            price_drop_pct = ?report.price_drop_pct,
            "Monitoring session finished"
        );
        report
    }

    async fn place_buyback(
        &self,
        gateway: &DynOrderGateway,
        config: &SessionConfig,
        market: &str,
    ) -> SessionOutcome {
        let Some(amount) = self.buyback_amount(config.buyback_notional) else {
            return SessionOutcome::OrderFailed {
                reason: format!("no buy-back size for target {}", self.target),
            };
        };

        let request = OrderRequest::limit(&self.symbol, OrderSide::Buy, market, amount, self.target)
            .with_source(config.buyback_source.clone());

        match gateway.place_order(request).await {
            Ok(placed) => SessionOutcome::Satisfied {
                order_id: placed.id,
                amount,
            },
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Buy-back order failed");
                SessionOutcome::OrderFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
