//! Gap policy and ladder order sets.

use arb_core::OrderSide;
use serde::{Deserialize, Serialize};

/// Price levels for one side of the ladder.
///
/// `gap` is the distance in ticks between the current price and the top of
/// the same side of the book. BUY levels sit below `current`, SELL above:
/// - `gap <= 1`: `max_levels` levels at 1..=max_levels ticks away
/// - `1 < gap < wide_gap`: `gap` copies of the level 1 tick away
/// - `gap >= wide_gap`: `max_levels` levels at 1..=max_levels ticks away
///
/// Never more than `max_levels` prices. Non-positive prices and prices
/// past the `i64` range are dropped.
pub fn ladder_prices(
    side: OrderSide,
    current: i64,
    gap: i64,
    max_levels: i64,
    wide_gap: i64,
) -> Vec<i64> {
    let dir = side.ladder_direction();
    let gap = gap.saturating_abs();
    let stacked = gap > 1 && gap < wide_gap;
    let count = if stacked { gap.min(max_levels) } else { max_levels };

    (1..=count)
        .map(|i| if stacked { dir } else { dir * i })
        .filter_map(|offset| current.checked_add(offset))
        .filter(|p| *p > 0)
        .collect()
}

/// Standing ladder orders for one side.
///
/// Replaced wholesale on every effective price change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderOrderSet {
    pub side: OrderSide,
    /// Prices submitted, in submission order.
    pub prices: Vec<i64>,
    /// Ids acknowledged by the venue.
    pub order_ids: Vec<u64>,
}

impl LadderOrderSet {
    pub fn empty(side: OrderSide) -> Self {
        Self {
            side,
            prices: Vec::new(),
            order_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thin_book_places_full_ladder() {
        let prices = ladder_prices(OrderSide::Buy, 1000, 1, 10, 10);
        assert_eq!(prices, (1..=10).map(|i| 1000 - i).collect::<Vec<_>>());

        let prices = ladder_prices(OrderSide::Buy, 1000, 0, 10, 10);
        assert_eq!(prices.len(), 10);
    }

    #[test]
    fn test_mid_gap_stacks_at_one_tick() {
        let prices = ladder_prices(OrderSide::Buy, 1000, 4, 10, 10);
        assert_eq!(prices, vec![999, 999, 999, 999]);

        let prices = ladder_prices(OrderSide::Sell, 1000, 9, 10, 10);
        assert_eq!(prices, vec![1001; 9]);
    }

    #[test]
    fn test_wide_gap_spreads_ladder() {
        let prices = ladder_prices(OrderSide::Buy, 1000, 15, 10, 10);
        assert_eq!(prices, (1..=10).map(|i| 1000 - i).collect::<Vec<_>>());

        let prices = ladder_prices(OrderSide::Buy, 1000, 10, 10, 10);
        assert_eq!(prices.len(), 10);
    }

    #[test]
    fn test_sell_side_is_symmetric() {
        let prices = ladder_prices(OrderSide::Sell, 1000, 1, 10, 10);
        assert_eq!(prices, (1..=10).map(|i| 1000 + i).collect::<Vec<_>>());
    }

    #[test]
    fn test_mid_gap_capped_at_max_levels() {
        let prices = ladder_prices(OrderSide::Buy, 1000, 30, 10, 50);
        assert_eq!(prices, vec![999; 10]);
    }

    #[test]
    fn test_levels_past_i64_range_dropped() {
        let prices = ladder_prices(OrderSide::Sell, i64::MAX - 3, 1, 10, 10);
        assert_eq!(prices, vec![i64::MAX - 2, i64::MAX - 1, i64::MAX]);

        let prices = ladder_prices(OrderSide::Buy, 1000, i64::MIN, 10, 10);
        assert_eq!(prices.len(), 10);
    }

    #[test]
    fn test_non_positive_levels_dropped() {
        let prices = ladder_prices(OrderSide::Buy, 5, 20, 10, 10);
        assert_eq!(prices, vec![4, 3, 2, 1]);
    }
}
