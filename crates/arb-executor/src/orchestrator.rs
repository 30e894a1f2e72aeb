//! Execution orchestrator.
//!
//! Turns a divergence signal into orders. The short path sells into bids,
//! refreshes the ladder and hands off to a monitoring session for the
//! buy-back. The long path buys up the asks with a quote-denominated market
//! order and stops there.

use crate::config::{ExecutionConfig, SessionConfig};
use crate::error::{ExecutorError, ExecutorResult};
use crate::registry::SessionRegistry;
use crate::session::{MonitoringSession, SessionReport};
use crate::sweep::{sweep_asks, sweep_bids, SweepResult};
use arb_core::{OrderRequest, Price, Size};
use arb_detector::{DivergenceSignal, SignalDirection};
use arb_mm::{LadderMaintainer, LadderTickReport};
use arb_telemetry::Metrics;
use arb_venue::{DynOrderBookSource, DynOrderGateway, DynPriceSource, PlacedOrder};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Result of a short execution.
#[derive(Debug)]
pub struct ShortExecution {
    pub target: Price,
    pub sweep: SweepResult,
    pub order: PlacedOrder,
    pub ladder: LadderTickReport,
    /// Venue price seeding the session; `None` means no session was started.
    pub initial_price: Option<Price>,
    /// Spawned buy-back session.
    pub session: Option<JoinHandle<SessionReport>>,
}

/// Result of a long execution.
#[derive(Debug, Clone)]
pub struct LongExecution {
    pub target: Price,
    pub sweep: SweepResult,
    /// Quote notional submitted (`round(total_notional)`).
    pub total_amount: Decimal,
    pub order: PlacedOrder,
}

/// Execution orchestrator for one symbol.
pub struct ExecutionOrchestrator {
    symbol: String,
    config: ExecutionConfig,
    session_config: SessionConfig,
    prices: DynPriceSource,
    book: DynOrderBookSource,
    gateway: DynOrderGateway,
    ladder: Arc<Mutex<LadderMaintainer>>,
    sessions: SessionRegistry,
}

impl ExecutionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        config: ExecutionConfig,
        session_config: SessionConfig,
        prices: DynPriceSource,
        book: DynOrderBookSource,
        gateway: DynOrderGateway,
        ladder: Arc<Mutex<LadderMaintainer>>,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            config,
            session_config,
            prices,
            book,
            gateway,
            ladder,
            sessions,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Dispatch a signal to the matching path.
    ///
    /// Returns the short session handle when one was started.
    pub async fn execute(
        &self,
        signal: &DivergenceSignal,
    ) -> ExecutorResult<Option<JoinHandle<SessionReport>>> {
        match signal.direction {
            SignalDirection::Short => {
                let exec = self
                    .execute_short(signal.reference_px, signal.target_px)
                    .await?;
                Ok(exec.session)
            }
            SignalDirection::Long => {
                self.execute_long(signal.reference_px, signal.target_px)
                    .await?;
                Ok(None)
            }
        }
    }

    /// Short path: market SELL sized by the bid sweep down to `target`.
    pub async fn execute_short(
        &self,
        reference: Price,
        target: Price,
    ) -> ExecutorResult<ShortExecution> {
        let direction = SignalDirection::Short;
        // Claimed before sweeping so overlapping shorts are rejected up front.
        let guard = self.sessions.try_acquire(&self.symbol, target)?;

        let book = self
            .book
            .order_book(&self.symbol, self.config.sweep_book_depth)
            .await?;
        let sweep = sweep_bids(&book.bids, target, Size::new(self.config.top_up_size));

        info!(
            symbol = %self.symbol,
            reference = %reference,
            target = %target,
            total_quantity = %sweep.total_quantity,
            exact_match = sweep.exact_match_found,
            needed_top_up = sweep.needed_top_up,
            "Bid sweep computed"
        );

        if !sweep.total_quantity.is_positive() {
            Metrics::sweep(&direction.to_string(), "no_liquidity");
            warn!(symbol = %self.symbol, target = %target, "No qualifying bids");
            return Err(ExecutorError::NoQualifyingLiquidity {
                direction,
                reason: "no qualifying bids".to_string(),
            });
        }

        let request = OrderRequest::market_sell(&self.symbol, &self.config.market, sweep.total_quantity)
            .with_source(self.config.short_source.clone());
        let order = match self.gateway.place_order(request).await {
            Ok(order) => order,
            Err(e) => {
                Metrics::sweep(&direction.to_string(), "failed");
                error!(symbol = %self.symbol, error = %e, "Market SELL failed");
                return Err(e.into());
            }
        };
        Metrics::sweep(&direction.to_string(), "submitted");
        info!(
            symbol = %self.symbol,
            amount = %sweep.total_quantity,
            order_id = ?order.id,
            "Market SELL submitted"
        );

        // Observed before the ladder re-quote, which may take several retries.
        let initial_price = match self.prices.last_price(&self.symbol).await {
            Ok(quote) => Some(quote.value),
            Err(e) => {
                warn!(
                    symbol = %self.symbol,
                    error = %e,
                    "Venue price unavailable after sweep, skipping buy-back session"
                );
                Metrics::data_unavailable("venue");
                None
            }
        };

        let ladder = self.ladder.lock().await.tick(true).await;

        let session = initial_price.map(|initial| {
            let session =
                MonitoringSession::from_config(&self.symbol, target, initial, &self.session_config);
            let prices = self.prices.clone();
            let gateway = self.gateway.clone();
            let config = self.session_config.clone();
            let market = self.config.market.clone();
            tokio::spawn(async move {
                let token = guard.token();
                let report = session.run(prices, gateway, config, market, token).await;
                drop(guard);
                report
            })
        });

        Ok(ShortExecution {
            target,
            sweep,
            order,
            ladder,
            initial_price,
            session,
        })
    }

    /// Long path: market BUY for the notional of the ask sweep up to `target`.
    pub async fn execute_long(
        &self,
        reference: Price,
        target: Price,
    ) -> ExecutorResult<LongExecution> {
        let direction = SignalDirection::Long;
        let book = self
            .book
            .order_book(&self.symbol, self.config.sweep_book_depth)
            .await?;
        let sweep = sweep_asks(&book.asks, target, Size::new(self.config.top_up_size));
        let total_amount = sweep
            .total_notional
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        info!(
            symbol = %self.symbol,
            reference = %reference,
            target = %target,
            total_units = %sweep.total_quantity,
            total_quote = %sweep.total_notional,
            needed_top_up = sweep.needed_top_up,
            "Ask sweep computed"
        );

        if !sweep.has_liquidity() || total_amount <= Decimal::ZERO {
            Metrics::sweep(&direction.to_string(), "no_liquidity");
            warn!(symbol = %self.symbol, target = %target, "No qualifying asks");
            return Err(ExecutorError::NoQualifyingLiquidity {
                direction,
                reason: "no qualifying asks".to_string(),
            });
        }

        let request = OrderRequest::market_buy(&self.symbol, &self.config.market, total_amount)
            .with_source(self.config.long_source.clone());
        let order = match self.gateway.place_order(request).await {
            Ok(order) => order,
            Err(e) => {
                Metrics::sweep(&direction.to_string(), "failed");
                error!(symbol = %self.symbol, error = %e, "Market BUY failed");
                return Err(e.into());
            }
        };
        Metrics::sweep(&direction.to_string(), "submitted");
        info!(
            symbol = %self.symbol,
            total_amount = %total_amount,
            order_id = ?order.id,
            "Market BUY submitted"
        );

        Ok(LongExecution {
            target,
            sweep,
            total_amount,
            order,
        })
    }
}
