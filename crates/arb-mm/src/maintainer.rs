//! Ladder maintainer state machine.
//!
//! Owned by a single task; every tick takes `&mut self`. Tracked orders are
//! never patched: a price move cancels the whole set and places a new one.

use crate::config::LadderConfig;
use crate::ladder::{ladder_prices, LadderOrderSet};
use arb_core::{OrderBookSide, OrderRequest, OrderSide, Price, Size};
use arb_telemetry::Metrics;
use arb_venue::{DynOrderBookSource, DynOrderGateway, DynPriceSource};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Maintainer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderState {
    /// No standing orders tracked.
    Idle,
    /// Ladder placed at `last_price`.
    Active {
        buy: LadderOrderSet,
        sell: LadderOrderSet,
        last_price: i64,
    },
}

impl LadderState {
    pub fn last_price(&self) -> Option<i64> {
        match self {
            Self::Idle => None,
            Self::Active { last_price, .. } => Some(*last_price),
        }
    }

    /// All tracked order ids, buy side first.
    pub fn tracked_ids(&self) -> Vec<u64> {
        match self {
            Self::Idle => Vec::new(),
            Self::Active { buy, sell, .. } => buy
                .order_ids
                .iter()
                .chain(sell.order_ids.iter())
                .copied()
                .collect(),
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderTickOutcome {
    /// Venue price missing or invalid; nothing touched.
    PriceUnavailable,
    /// Floored price equal to the last placement; nothing touched.
    Unchanged,
    /// Old set cancelled but the book could not be read; state is idle.
    BookUnavailable,
    /// Old set cancelled and a new one placed.
    Replaced,
}

impl LadderTickOutcome {
    fn as_label(&self) -> &'static str {
        match self {
            Self::PriceUnavailable => "no_price",
            Self::Unchanged => "unchanged",
            Self::BookUnavailable => "no_book",
            Self::Replaced => "replaced",
        }
    }
}

/// A ladder level that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelFailure {
    pub side: OrderSide,
    /// `None` when the whole side was skipped before pricing.
    pub price: Option<i64>,
    pub reason: String,
}

/// Result of one maintainer tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderTickReport {
    pub outcome: LadderTickOutcome,
    /// Floored venue price observed this tick.
    pub price: Option<i64>,
    pub cancelled: usize,
    pub cancel_failed: usize,
    pub placed: usize,
    /// Per-level placement failures. Non-empty means a partial ladder.
    pub failures: Vec<LevelFailure>,
}

impl LadderTickReport {
    fn new(outcome: LadderTickOutcome, price: Option<i64>) -> Self {
        Self {
            outcome,
            price,
            cancelled: 0,
            cancel_failed: 0,
            placed: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Maintains the defensive ladder for one symbol.
pub struct LadderMaintainer {
    symbol: String,
    config: LadderConfig,
    price_source: DynPriceSource,
    book_source: DynOrderBookSource,
    gateway: DynOrderGateway,
    state: LadderState,
}

impl LadderMaintainer {
    pub fn new(
        symbol: impl Into<String>,
        config: LadderConfig,
        price_source: DynPriceSource,
        book_source: DynOrderBookSource,
        gateway: DynOrderGateway,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            config,
            price_source,
            book_source,
            gateway,
            state: LadderState::Idle,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> &LadderState {
        &self.state
    }

    pub fn tracked_order_count(&self) -> usize {
        self.state.tracked_ids().len()
    }

    /// Run one maintenance cycle.
    ///
    /// `force` skips the unchanged-price check; used right after a sweep.
    pub async fn tick(&mut self, force: bool) -> LadderTickReport {
        let report = self.run_tick(force).await;
        Metrics::ladder_tick(report.outcome.as_label());
        report
    }

    async fn run_tick(&mut self, force: bool) -> LadderTickReport {
        let current = match self.price_source.last_price(&self.symbol).await {
            Ok(quote) => quote.value.floor_ticks(),
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Ladder tick: venue price unavailable");
                None
            }
        };
        let Some(current) = current else {
            Metrics::data_unavailable("venue");
            return LadderTickReport::new(LadderTickOutcome::PriceUnavailable, None);
        };

        if !force && self.state.last_price() == Some(current) {
            debug!(symbol = %self.symbol, price = current, "Ladder price unchanged, skipping");
            return LadderTickReport::new(LadderTickOutcome::Unchanged, Some(current));
        }

        let mut report = LadderTickReport::new(LadderTickOutcome::Replaced, Some(current));
        let (cancelled, cancel_failed) = self.cancel_tracked().await;
        report.cancelled = cancelled;
        report.cancel_failed = cancel_failed;

        let book = match self
            .book_source
            .order_book(&self.symbol, self.config.book_depth)
            .await
        {
            Ok(book) => book,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Ladder tick: order book unavailable");
                Metrics::data_unavailable("book");
                report.outcome = LadderTickOutcome::BookUnavailable;
                return report;
            }
        };

        let ((buy, buy_failures), (sell, sell_failures)) = tokio::join!(
            self.place_side(OrderSide::Buy, current, &book.bids),
            self.place_side(OrderSide::Sell, current, &book.asks),
        );

        report.placed = buy.order_ids.len() + sell.order_ids.len();
        report.failures.extend(buy_failures);
        report.failures.extend(sell_failures);

        info!(
            symbol = %self.symbol,
            price = current,
            buy_levels = buy.order_ids.len(),
            sell_levels = sell.order_ids.len(),
            failed_levels = report.failures.len(),
            cancelled = report.cancelled,
            "Ladder replaced"
        );

        self.state = LadderState::Active {
            buy,
            sell,
            last_price: current,
        };
        report
    }

    /// Cancel every tracked order in one batch and drop the tracked set.
    ///
    /// Cancellation failures are logged and counted, never propagated.
    /// Returns `(succeeded, failed)`.
    pub async fn cancel_tracked(&mut self) -> (usize, usize) {
        let ids = self.state.tracked_ids();
        self.state = LadderState::Idle;
        if ids.is_empty() {
            return (0, 0);
        }

        let total = ids.len();
        match self.gateway.cancel_orders(ids).await {
            Ok(result) => {
                let failed = result.failed.len();
                let succeeded = result.succeeded.len();
                if failed > 0 {
                    warn!(
                        symbol = %self.symbol,
                        failed,
                        succeeded,
                        "Some ladder orders failed to cancel"
                    );
                }
                Metrics::ladder_cancels(succeeded, failed);
                (succeeded, failed)
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, count = total, "Ladder cancel failed");
                Metrics::ladder_cancels(0, total);
                (0, total)
            }
        }
    }

    async fn place_side(
        &self,
        side: OrderSide,
        current: i64,
        book_side: &OrderBookSide,
    ) -> (LadderOrderSet, Vec<LevelFailure>) {
        let mut set = LadderOrderSet::empty(side);
        let mut failures = Vec::new();

        let Some(top) = book_side.best_price().and_then(|p| p.floor_ticks()) else {
            warn!(symbol = %self.symbol, side = %side, "No top of book, skipping ladder side");
            failures.push(LevelFailure {
                side,
                price: None,
                reason: format!("invalid orderbook {side} side"),
            });
            return (set, failures);
        };

        let gap = (current - top).abs();
        let prices = ladder_prices(
            side,
            current,
            gap,
            self.config.max_levels,
            self.config.wide_gap,
        );
        debug!(symbol = %self.symbol, side = %side, gap, levels = prices.len(), "Ladder levels derived");

        let source = match side {
            OrderSide::Buy => &self.config.buy_source,
            OrderSide::Sell => &self.config.sell_source,
        };
        let size = Size::new(self.config.order_size);

        for price in prices {
            let request = OrderRequest::limit(
                &self.symbol,
                side,
                &self.config.market,
                size,
                Price::from_ticks(price),
            )
            .with_source(source.clone());

            set.prices.push(price);
            match self.gateway.place_order(request).await {
                Ok(placed) => {
                    Metrics::ladder_order_placed(&side.to_string());
                    match placed.id {
                        Some(id) => set.order_ids.push(id),
                        None => warn!(
                            symbol = %self.symbol,
                            side = %side,
                            price,
                            "Ladder order placed without an id, it will not be tracked"
                        ),
                    }
                }
                Err(e) => {
                    Metrics::ladder_order_failed(&side.to_string());
                    warn!(symbol = %self.symbol, side = %side, price, error = %e, "Ladder level failed");
                    failures.push(LevelFailure {
                        side,
                        price: Some(price),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (set, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arb_core::{OrderBookSnapshot, OrderType};
    use arb_venue::MockVenue;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn book(bid: Decimal, ask: Decimal) -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            vec![(Price::new(bid), Size::new(dec!(10)))].into(),
            vec![(Price::new(ask), Size::new(dec!(10)))].into(),
        )
    }

    fn maintainer(venue: &Arc<MockVenue>) -> LadderMaintainer {
        LadderMaintainer::new(
            "AHRM1IRR",
            LadderConfig::default(),
            venue.clone(),
            venue.clone(),
            venue.clone(),
        )
    }

    #[tokio::test]
    async fn test_first_tick_places_both_sides() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000.7))));
        venue.set_book(Some(book(dec!(996), dec!(1015))));
        let mut m = maintainer(&venue);

        let report = m.tick(false).await;

        assert_eq!(report.outcome, LadderTickOutcome::Replaced);
        assert_eq!(report.price, Some(1000));
        // bid gap 4 -> 4 orders at 999, ask gap 15 -> 1001..=1010
        let orders = venue.placed_orders();
        let buys: Vec<_> = orders.iter().filter(|o| o.side == OrderSide::Buy).collect();
        let sells: Vec<_> = orders.iter().filter(|o| o.side == OrderSide::Sell).collect();
        assert_eq!(buys.len(), 4);
        assert!(buys.iter().all(|o| o.price == Some(Price::new(dec!(999)))));
        assert_eq!(sells.len(), 10);
        assert!(orders.iter().all(|o| o.order_type == OrderType::Limit));
        assert!(orders.iter().all(|o| o.amount == Some(Size::new(dec!(50)))));
        assert_eq!(m.tracked_order_count(), 14);
        assert!(venue.cancel_batches().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_price_is_noop() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000.2))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);

        m.tick(false).await;
        venue.clear_calls();
        venue.set_price(Some(Price::new(dec!(1000.9))));

        let report = m.tick(false).await;

        assert_eq!(report.outcome, LadderTickOutcome::Unchanged);
        assert!(venue.placed_orders().is_empty());
        assert!(venue.cancel_batches().is_empty());
        assert_eq!(venue.book_calls(), 1);
    }

    #[tokio::test]
    async fn test_price_change_cancels_then_replaces() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);

        m.tick(false).await;
        let first_ids = m.state().tracked_ids();
        assert_eq!(first_ids.len(), 20);

        venue.clear_calls();
        venue.set_price(Some(Price::new(dec!(1002))));
        let report = m.tick(false).await;

        assert_eq!(venue.cancel_batches(), vec![first_ids.clone()]);
        assert_eq!(report.cancelled, 20);
        assert_eq!(m.state().last_price(), Some(1002));
        assert!(m.state().tracked_ids().iter().all(|id| !first_ids.contains(id)));
    }

    #[tokio::test]
    async fn test_cancel_failure_does_not_block_replacement() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);
        m.tick(false).await;

        venue.set_reject_cancels(true);
        venue.set_price(Some(Price::new(dec!(1005))));
        let report = m.tick(false).await;

        assert_eq!(report.outcome, LadderTickOutcome::Replaced);
        assert_eq!(report.cancel_failed, 20);
        assert_eq!(m.state().last_price(), Some(1005));
    }

    #[tokio::test]
    async fn test_price_unavailable_is_noop() {
        let venue = Arc::new(MockVenue::new());
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);

        let report = m.tick(false).await;

        assert_eq!(report.outcome, LadderTickOutcome::PriceUnavailable);
        assert_eq!(venue.book_calls(), 0);
        assert_eq!(m.state(), &LadderState::Idle);
    }

    #[tokio::test]
    async fn test_book_unavailable_goes_idle_and_retries() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);
        m.tick(false).await;

        venue.set_book(None);
        venue.set_price(Some(Price::new(dec!(1003))));
        let report = m.tick(false).await;
        assert_eq!(report.outcome, LadderTickOutcome::BookUnavailable);
        assert_eq!(m.state(), &LadderState::Idle);

        // Same price again: idle state means the ladder is rebuilt.
        venue.set_book(Some(book(dec!(1002), dec!(1004))));
        let report = m.tick(false).await;
        assert_eq!(report.outcome, LadderTickOutcome::Replaced);
    }

    #[tokio::test]
    async fn test_partial_failure_recorded_per_level() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        venue.fail_orders_at(Price::new(dec!(995)));
        let mut m = maintainer(&venue);

        let report = m.tick(false).await;

        assert!(report.is_partial_failure());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].price, Some(995));
        assert_eq!(report.placed, 19);
        assert_eq!(venue.placed_orders().len(), 20);
    }

    #[tokio::test]
    async fn test_force_replaces_at_same_price() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(book(dec!(999), dec!(1001))));
        let mut m = maintainer(&venue);
        m.tick(false).await;
        venue.clear_calls();

        let report = m.tick(true).await;

        assert_eq!(report.outcome, LadderTickOutcome::Replaced);
        assert_eq!(venue.cancel_batches().len(), 1);
        assert_eq!(venue.placed_orders().len(), 20);
    }

    #[tokio::test]
    async fn test_empty_book_side_skipped() {
        let venue = Arc::new(MockVenue::new());
        venue.set_price(Some(Price::new(dec!(1000))));
        venue.set_book(Some(OrderBookSnapshot::new(
            vec![(Price::new(dec!(990)), Size::new(dec!(1)))].into(),
            OrderBookSide::default(),
        )));
        let mut m = maintainer(&venue);

        let report = m.tick(false).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].side, OrderSide::Sell);
        assert_eq!(report.failures[0].price, None);
        assert_eq!(report.placed, 10);
    }
}
