//! Divergence detector implementation.

use crate::config::DetectorConfig;
use crate::signal::{DivergenceSignal, SignalDirection};
use arb_core::Price;
use arb_telemetry::Metrics;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// `|compare - base| / base`, or `None` when `base` is zero or the ratio overflows.
pub fn relative_divergence(base: Price, compare: Price) -> Option<Decimal> {
    if base.is_zero() {
        return None;
    }
    compare
        .inner()
        .checked_sub(base.inner())?
        .abs()
        .checked_div(base.inner())
}

/// Venue above reference by at least `threshold`.
pub fn should_short(venue: Price, reference: Price, threshold: Decimal) -> bool {
    match relative_divergence(reference, venue) {
        Some(diff) => venue > reference && diff >= threshold,
        None => false,
    }
}

/// Venue below reference by at least `threshold`.
pub fn should_long(venue: Price, reference: Price, threshold: Decimal) -> bool {
    match relative_divergence(reference, venue) {
        Some(diff) => venue < reference && diff >= threshold,
        None => false,
    }
}

/// Divergence detector.
///
/// Strategy: compare venue last price against reference last price.
/// - Short: venue >= reference * (1 + threshold), target = reference * (1 + offset)
/// - Long: venue <= reference * (1 - threshold), target = reference * (1 - offset)
#[derive(Debug, Clone)]
pub struct DivergenceDetector {
    config: DetectorConfig,
}

impl DivergenceDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify a pair of last prices.
    ///
    /// Returns `None` when the divergence is undefined or below threshold.
    pub fn check(&self, venue: Price, reference: Price) -> Option<DivergenceSignal> {
        let divergence = relative_divergence(reference, venue)?;

        debug!(
            venue_px = %venue,
            reference_px = %reference,
            divergence = %divergence,
            "Divergence evaluated"
        );

        let direction = if should_short(venue, reference, self.config.threshold) {
            SignalDirection::Short
        } else if should_long(venue, reference, self.config.threshold) {
            SignalDirection::Long
        } else {
            return None;
        };

        let Some(target_px) = self.target_for(direction, reference) else {
            warn!(
                direction = %direction,
                reference_px = %reference,
                "Execution target out of range, signal dropped"
            );
            return None;
        };

        info!(
            direction = %direction,
            venue_px = %venue,
            reference_px = %reference,
            divergence = %divergence,
            target_px = %target_px,
            "Divergence signal detected"
        );
        Metrics::signal_detected(&direction.to_string());

        Some(DivergenceSignal {
            direction,
            venue_px: venue,
            reference_px: reference,
            divergence,
            target_px,
            detected_at: Utc::now(),
        })
    }

    /// Execution target for `direction` given the reference price.
    ///
    /// `None` if the product overflows.
    pub fn target_for(&self, direction: SignalDirection, reference: Price) -> Option<Price> {
        let factor = match direction {
            SignalDirection::Short => Decimal::ONE + self.config.target_offset,
            SignalDirection::Long => Decimal::ONE - self.config.target_offset,
        };
        reference.inner().checked_mul(factor).map(Price::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn px(d: Decimal) -> Price {
        Price::new(d)
    }

    #[test]
    fn test_relative_divergence_identity() {
        for base in [dec!(1), dec!(1000), dec!(0.5), dec!(-20)] {
            assert_eq!(relative_divergence(px(base), px(base)), Some(Decimal::ZERO));
        }
    }

    #[test]
    fn test_relative_divergence_zero_base() {
        assert_eq!(relative_divergence(Price::ZERO, px(dec!(100))), None);
    }

    #[test]
    fn test_relative_divergence_overflow_is_none() {
        let tiny = px(Decimal::new(1, 28));
        assert_eq!(relative_divergence(tiny, px(Decimal::MAX)), None);
        assert_eq!(relative_divergence(px(Decimal::MIN), px(Decimal::MAX)), None);
    }

    #[test]
    fn test_target_overflow_drops_signal() {
        let detector = DivergenceDetector::new(DetectorConfig {
            target_offset: dec!(0.5),
            ..DetectorConfig::default()
        });
        let reference = px(Decimal::MAX / dec!(1.2));
        assert!(detector.target_for(SignalDirection::Short, reference).is_none());
        assert!(detector.check(px(Decimal::MAX), reference).is_none());
    }

    #[test]
    fn test_relative_divergence_value() {
        assert_eq!(
            relative_divergence(px(dec!(1000)), px(dec!(1015))),
            Some(dec!(0.015))
        );
        assert_eq!(
            relative_divergence(px(dec!(1000)), px(dec!(985))),
            Some(dec!(0.015))
        );
    }

    #[test]
    fn test_short_and_long_mutually_exclusive() {
        let threshold = dec!(0.01);
        let reference = px(dec!(1000));
        for venue in [dec!(900), dec!(990), dec!(995), dec!(1000), dec!(1005), dec!(1010), dec!(1100)] {
            let s = should_short(px(venue), reference, threshold);
            let l = should_long(px(venue), reference, threshold);
            assert!(!(s && l), "both signals for venue {venue}");
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let reference = px(dec!(1000));
        assert!(should_short(px(dec!(1010)), reference, dec!(0.01)));
        assert!(!should_short(px(dec!(1009)), reference, dec!(0.01)));
        assert!(should_long(px(dec!(990)), reference, dec!(0.01)));
        assert!(!should_long(px(dec!(991)), reference, dec!(0.01)));
    }

    #[test]
    fn test_zero_reference_never_signals() {
        assert!(!should_short(px(dec!(10)), Price::ZERO, dec!(0.01)));
        assert!(!should_long(px(dec!(-10)), Price::ZERO, dec!(0.01)));
    }

    #[test]
    fn test_check_short_signal() {
        let detector = DivergenceDetector::new(DetectorConfig::default());
        let signal = detector.check(px(dec!(1020)), px(dec!(1000))).unwrap();

        assert_eq!(signal.direction, SignalDirection::Short);
        assert_eq!(signal.divergence, dec!(0.02));
        assert_eq!(signal.target_px.inner(), dec!(1010));
        assert_eq!(signal.signed_pct(), dec!(2));
    }

    #[test]
    fn test_check_long_signal() {
        let detector = DivergenceDetector::new(DetectorConfig::default());
        let signal = detector.check(px(dec!(980)), px(dec!(1000))).unwrap();

        assert_eq!(signal.direction, SignalDirection::Long);
        assert_eq!(signal.target_px.inner(), dec!(990));
        assert_eq!(signal.direction.sweep_side(), arb_core::OrderSide::Buy);
    }

    #[test]
    fn test_check_no_signal_inside_band() {
        let detector = DivergenceDetector::new(DetectorConfig::default());
        assert!(detector.check(px(dec!(1005)), px(dec!(1000))).is_none());
        assert!(detector.check(px(dec!(1005)), Price::ZERO).is_none());
    }
}
