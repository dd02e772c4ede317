//! Stub signal sources.

use std::cmp::Ordering;

use rand::Rng;
use rust_decimal::Decimal;

use crate::signal::{IndicatorSnapshot, SignalSource};

/// Randomized stand-in for a real indicator suite.
///
/// Every feature is drawn fresh on each call; only the output shape is
/// meaningful. The demo terminal runs on this source, tests use
/// deterministic fakes instead.
pub struct RandomSignalSource;

impl SignalSource for RandomSignalSource {
    fn evaluate(&self, _symbol: &str) -> IndicatorSnapshot {
        let mut rng = rand::thread_rng();

        let strength: f64 = rng.gen_range(0.0..100.0);
        // Momentum in [-1, 1], two decimal places.
        let momentum = Decimal::new(rng.gen_range(-100i64..=100), 2);
        let price_vs_average = if rng.gen_bool(0.5) {
            Ordering::Greater
        } else {
            Ordering::Less
        };

        IndicatorSnapshot {
            oversold: strength < 30.0,
            overbought: strength > 70.0,
            momentum,
            price_vs_average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_both_oversold_and_overbought() {
        let source = RandomSignalSource;
        for _ in 0..200 {
            let snapshot = source.evaluate("BTC/USDT");
            assert!(!(snapshot.oversold && snapshot.overbought));
            assert!(snapshot.momentum >= Decimal::NEGATIVE_ONE);
            assert!(snapshot.momentum <= Decimal::ONE);
        }
    }
}
