//! Precision-safe decimal types for trading.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in sweep sizing and target prices.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Whole ticks below or at this price.
    ///
    /// Returns `None` if the floored value does not fit in an `i64`.
    #[inline]
    pub fn floor_ticks(&self) -> Option<i64> {
        self.0.floor().to_i64()
    }

    /// Build a price from an integral tick count.
    #[inline]
    pub fn from_ticks(ticks: i64) -> Self {
        Self(Decimal::from(ticks))
    }

    /// Percentage drop from `initial` to this price: `(initial - self) / initial * 100`.
    ///
    /// `None` for a zero `initial` or on overflow.
    #[inline]
    pub fn pct_drop_from(&self, initial: Price) -> Option<Decimal> {
        if initial.is_zero() {
            return None;
        }
        initial
            .0
            .checked_sub(self.0)?
            .checked_div(initial.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Parse a price out of a loosely-typed JSON payload field.
    ///
    /// Accepts numbers and numeric strings. Anything else, and any
    /// non-positive value, yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        decimal_from_json(value).map(Self).filter(Price::is_positive)
    }
}

/// Parse a `Decimal` from a JSON number or numeric string.
pub fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        }
        serde_json::Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Size/quantity with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// sizes with prices in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Calculate notional value: size * price. `None` on overflow.
    #[inline]
    pub fn notional(&self, price: Price) -> Option<Decimal> {
        self.0.checked_mul(price.0)
    }

    /// Sum of two sizes. `None` on overflow.
    #[inline]
    pub fn checked_add(&self, rhs: Size) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Smallest whole size able to cover `notional` at `price`.
    ///
    /// Returns `None` for a non-positive price or when the quotient overflows.
    pub fn covering_notional(notional: Decimal, price: Price) -> Option<Self> {
        if !price.is_positive() {
            return None;
        }
        notional.checked_div(price.0).map(|q| Self(q.ceil()))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_floor_ticks() {
        assert_eq!(Price::new(dec!(1234.99)).floor_ticks(), Some(1234));
        assert_eq!(Price::new(dec!(1234)).floor_ticks(), Some(1234));
    }

    #[test]
    fn test_pct_drop_from() {
        let initial = Price::new(dec!(200));
        let current = Price::new(dec!(190));
        assert_eq!(current.pct_drop_from(initial), Some(dec!(5)));
        assert_eq!(current.pct_drop_from(Price::ZERO), None);
    }

    #[test]
    fn test_covering_notional() {
        // 100000 / 1010 = 99.0099.. -> 100
        let size = Size::covering_notional(dec!(100000), Price::new(dec!(1010))).unwrap();
        assert_eq!(size.inner(), dec!(100));

        let exact = Size::covering_notional(dec!(100000), Price::new(dec!(1000))).unwrap();
        assert_eq!(exact.inner(), dec!(100));

        assert!(Size::covering_notional(dec!(100000), Price::ZERO).is_none());
    }

    #[test]
    fn test_covering_notional_overflow_is_none() {
        let tiny = Price::new(Decimal::new(1, 28));
        assert!(Size::covering_notional(Decimal::MAX, tiny).is_none());
    }

    #[test]
    fn test_notional_overflow_is_none() {
        let size = Size::new(dec!(1000000000000000));
        let price = Price::new(dec!(1000000000000000));
        assert!(size.notional(price).is_none());
        assert!(Size::new(Decimal::MAX).checked_add(Size::new(dec!(1))).is_none());
    }

    #[test]
    fn test_price_from_json() {
        assert_eq!(Price::from_json(&json!(1500)), Some(Price::new(dec!(1500))));
        assert_eq!(
            Price::from_json(&json!("1500.5")),
            Some(Price::new(dec!(1500.5)))
        );
        assert_eq!(Price::from_json(&json!(12.25)), Some(Price::new(dec!(12.25))));
        assert_eq!(Price::from_json(&json!("abc")), None);
        assert_eq!(Price::from_json(&json!(null)), None);
        assert_eq!(Price::from_json(&json!(0)), None);
        assert_eq!(Price::from_json(&json!(-3)), None);
    }

    #[test]
    fn test_notional_calculation() {
        let size = Size::new(dec!(50));
        let price = Price::new(dec!(101));
        assert_eq!(size.notional(price), Some(dec!(5050)));
    }
}
