//! Liquidity sweep sizing.
//!
//! Answers "how much must be traded at or better than `target` to clear the
//! book down (bids) or up (asks) to it". Single pass over a pre-sorted side:
//! accumulate levels strictly better than the target, include an exact match
//! and stop, stop at the first level beyond it. When the walk stopped beyond
//! the target without an exact match, a fixed top-up priced at the target is
//! added. An exhausted book gets no top-up.
//!
//! A level whose quantity or notional would overflow the running totals is
//! skipped like a malformed one. A top-up that would overflow leaves the
//! sweep with no liquidity.

use arb_core::{OrderBookSide, Price, Size};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// Sweep sizing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepResult {
    /// Base units, top-up included.
    pub total_quantity: Size,
    /// Quote notional (`price * quantity`), top-up included.
    pub total_notional: Decimal,
    pub exact_match_found: bool,
    /// The walk hit a level beyond the target without an exact match.
    pub needed_top_up: bool,
    /// Book levels consumed (top-up excluded).
    pub levels_consumed: usize,
}

impl SweepResult {
    fn empty() -> Self {
        Self {
            total_quantity: Size::ZERO,
            total_notional: Decimal::ZERO,
            exact_match_found: false,
            needed_top_up: false,
            levels_consumed: 0,
        }
    }

    /// Positive quantity and notional.
    pub fn has_liquidity(&self) -> bool {
        self.total_quantity.is_positive() && self.total_notional > Decimal::ZERO
    }

    /// Add `quantity` at `price` to the totals, leaving them untouched on overflow.
    fn absorb(&mut self, quantity: Size, price: Price) -> bool {
        let totals = quantity.notional(price).and_then(|notional| {
            Some((
                self.total_quantity.checked_add(quantity)?,
                self.total_notional.checked_add(notional)?,
            ))
        });
        match totals {
            Some((total_quantity, total_notional)) => {
                self.total_quantity = total_quantity;
                self.total_notional = total_notional;
                true
            }
            None => false,
        }
    }
}

/// Sweep bids from the highest price down to `target`.
pub fn sweep_bids(bids: &OrderBookSide, target: Price, top_up: Size) -> SweepResult {
    // A bid is "better" than the target when priced above it.
    sweep(bids, target, top_up, Ordering::Greater)
}

/// Sweep asks from the lowest price up to `target`.
pub fn sweep_asks(asks: &OrderBookSide, target: Price, top_up: Size) -> SweepResult {
    sweep(asks, target, top_up, Ordering::Less)
}

fn sweep(side: &OrderBookSide, target: Price, top_up: Size, better: Ordering) -> SweepResult {
    let mut result = SweepResult::empty();
    let mut stopped_beyond = false;

    for level in side.levels() {
        if !level.is_well_formed() {
            continue;
        }

        match level.price.cmp(&target) {
            Ordering::Equal => {
                if !result.absorb(level.quantity, level.price) {
                    continue;
                }
                result.levels_consumed += 1;
                result.exact_match_found = true;
                break;
            }
            ord if ord == better => {
                if result.absorb(level.quantity, level.price) {
                    result.levels_consumed += 1;
                }
            }
            _ => {
                stopped_beyond = true;
                break;
            }
        }
    }

    if stopped_beyond && !result.exact_match_found {
        if !result.absorb(top_up, target) {
            return SweepResult::empty();
        }
        result.needed_top_up = true;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn side(levels: &[(Decimal, Decimal)]) -> OrderBookSide {
        levels
            .iter()
            .map(|(p, q)| (Price::new(*p), Size::new(*q)))
            .collect::<Vec<_>>()
            .into()
    }

    fn top_up() -> Size {
        Size::new(dec!(50))
    }

    #[test]
    fn test_bids_exact_match() {
        let bids = side(&[(dec!(105), dec!(10)), (dec!(103), dec!(5)), (dec!(101), dec!(8))]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());

        assert_eq!(r.total_quantity.inner(), dec!(15));
        assert!(r.exact_match_found);
        assert!(!r.needed_top_up);
        assert_eq!(r.levels_consumed, 2);
    }

    #[test]
    fn test_bids_gap_needs_top_up() {
        let bids = side(&[(dec!(105), dec!(10)), (dec!(98), dec!(5))]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());

        assert!(r.needed_top_up);
        assert!(!r.exact_match_found);
        assert_eq!(r.total_quantity.inner(), dec!(60));
        assert_eq!(r.total_notional, dec!(1050) + dec!(50) * dec!(103));
    }

    #[test]
    fn test_bids_all_below_target() {
        let bids = side(&[(dec!(99), dec!(10))]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());
        assert_eq!(r.total_quantity.inner(), dec!(50));
        assert_eq!(r.levels_consumed, 0);
    }

    #[test]
    fn test_bids_exhausted_without_top_up() {
        let bids = side(&[(dec!(110), dec!(3)), (dec!(108), dec!(4))]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());
        assert_eq!(r.total_quantity.inner(), dec!(7));
        assert!(!r.needed_top_up);
    }

    #[test]
    fn test_empty_book_has_no_liquidity() {
        let r = sweep_bids(&OrderBookSide::default(), Price::new(dec!(103)), top_up());
        assert!(!r.has_liquidity());
        assert_eq!(r.total_quantity, Size::ZERO);
    }

    #[test]
    fn test_asks_top_up() {
        let asks = side(&[(dec!(100), dec!(4)), (dec!(102), dec!(6))]);
        let r = sweep_asks(&asks, Price::new(dec!(101)), top_up());

        assert_eq!(r.total_quantity.inner(), dec!(54));
        assert_eq!(r.total_notional, dec!(400) + dec!(50) * dec!(101));
        assert!(r.needed_top_up);
        assert!(!r.exact_match_found);
    }

    #[test]
    fn test_asks_exact_match() {
        let asks = side(&[(dec!(100), dec!(4)), (dec!(101), dec!(6)), (dec!(102), dec!(9))]);
        let r = sweep_asks(&asks, Price::new(dec!(101)), top_up());

        assert_eq!(r.total_quantity.inner(), dec!(10));
        assert_eq!(r.total_notional, dec!(1006));
        assert!(r.exact_match_found);
        assert!(!r.needed_top_up);
    }

    #[test]
    fn test_malformed_levels_skipped() {
        let bids = side(&[
            (dec!(0), dec!(100)),
            (dec!(105), dec!(-1)),
            (dec!(104), dec!(2)),
            (dec!(103), dec!(1)),
        ]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());
        assert_eq!(r.total_quantity.inner(), dec!(3));
        assert!(r.exact_match_found);
    }

    #[test]
    fn test_overflowing_level_skipped() {
        let bids = side(&[(dec!(1000000000000000), dec!(1000000000000000))]);
        let r = sweep_bids(&bids, Price::new(dec!(1)), top_up());
        assert!(!r.has_liquidity());
        assert_eq!(r.levels_consumed, 0);

        let bids = side(&[
            (dec!(1000000000000000), dec!(1000000000000000)),
            (dec!(104), dec!(2)),
            (dec!(103), dec!(1)),
        ]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), top_up());
        assert_eq!(r.total_quantity.inner(), dec!(3));
        assert_eq!(r.total_notional, dec!(311));
        assert_eq!(r.levels_consumed, 2);
        assert!(r.exact_match_found);
    }

    #[test]
    fn test_overflowing_exact_match_falls_through_to_top_up() {
        let asks = side(&[
            (dec!(100), dec!(4)),
            (dec!(101), Decimal::MAX),
            (dec!(102), dec!(6)),
        ]);
        let r = sweep_asks(&asks, Price::new(dec!(101)), top_up());
        assert!(!r.exact_match_found);
        assert!(r.needed_top_up);
        assert_eq!(r.total_quantity.inner(), dec!(54));
    }

    #[test]
    fn test_overflowing_top_up_leaves_no_liquidity() {
        let bids = side(&[(dec!(99), dec!(10))]);
        let r = sweep_bids(&bids, Price::new(dec!(103)), Size::new(Decimal::MAX));
        assert!(!r.has_liquidity());
        assert!(!r.needed_top_up);
    }

    #[test]
    fn test_fractional_target() {
        // reference 1000 * 1.01
        let bids = side(&[(dec!(1012), dec!(7)), (dec!(1010), dec!(3))]);
        let r = sweep_bids(&bids, Price::new(dec!(1010.00)), top_up());
        assert!(r.exact_match_found);
        assert_eq!(r.total_quantity.inner(), dec!(10));
    }
}
