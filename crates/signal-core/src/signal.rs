//! Signal types and the fixed trade decision rule.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
}

/// An actionable signal produced for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub symbol: String,
    /// Price at the time the signal was generated.
    pub price: Decimal,
    /// Confidence in [0, 1].
    pub confidence: Decimal,
    pub reason: String,
    pub generated_at_ms: i64,
}

/// Indicator-derived features for one symbol at one instant.
///
/// The concrete indicator math is deliberately opaque behind `SignalSource`;
/// only the feature shape matters to the decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSnapshot {
    /// Short-term oscillator reads oversold.
    pub oversold: bool,
    /// Short-term oscillator reads overbought.
    pub overbought: bool,
    /// Momentum reading; positive is bullish.
    pub momentum: Decimal,
    /// Latest price relative to its moving average.
    pub price_vs_average: Ordering,
}

/// Evaluate indicator features for a symbol.
///
/// Injected into the bot so tests can substitute deterministic fakes for the
/// randomized stub.
pub trait SignalSource: Send + Sync {
    fn evaluate(&self, symbol: &str) -> IndicatorSnapshot;
}

/// The fixed decision rule mapping features to a trade direction.
///
/// Buy requires oversold + positive momentum + price above its average;
/// Sell requires the mirror image. Anything else produces no signal.
pub fn decide(snapshot: &IndicatorSnapshot) -> Option<SignalKind> {
    if snapshot.oversold
        && snapshot.momentum > Decimal::ZERO
        && snapshot.price_vs_average == Ordering::Greater
    {
        Some(SignalKind::Buy)
    } else if snapshot.overbought
        && snapshot.momentum < Decimal::ZERO
        && snapshot.price_vs_average == Ordering::Less
    {
        Some(SignalKind::Sell)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy_setup() -> IndicatorSnapshot {
        IndicatorSnapshot {
            oversold: true,
            overbought: false,
            momentum: dec!(0.5),
            price_vs_average: Ordering::Greater,
        }
    }

    fn sell_setup() -> IndicatorSnapshot {
        IndicatorSnapshot {
            oversold: false,
            overbought: true,
            momentum: dec!(-0.5),
            price_vs_average: Ordering::Less,
        }
    }

    #[test]
    fn test_buy_requires_all_three() {
        assert_eq!(decide(&buy_setup()), Some(SignalKind::Buy));

        let mut snapshot = buy_setup();
        snapshot.oversold = false;
        assert_eq!(decide(&snapshot), None);

        let mut snapshot = buy_setup();
        snapshot.momentum = dec!(-0.1);
        assert_eq!(decide(&snapshot), None);

        let mut snapshot = buy_setup();
        snapshot.price_vs_average = Ordering::Less;
        assert_eq!(decide(&snapshot), None);
    }

    #[test]
    fn test_sell_requires_all_three() {
        assert_eq!(decide(&sell_setup()), Some(SignalKind::Sell));

        let mut snapshot = sell_setup();
        snapshot.overbought = false;
        assert_eq!(decide(&snapshot), None);

        let mut snapshot = sell_setup();
        snapshot.momentum = dec!(0.1);
        assert_eq!(decide(&snapshot), None);

        let mut snapshot = sell_setup();
        snapshot.price_vs_average = Ordering::Greater;
        assert_eq!(decide(&snapshot), None);
    }

    #[test]
    fn test_neutral_zone_is_silent() {
        let snapshot = IndicatorSnapshot {
            oversold: false,
            overbought: false,
            momentum: dec!(0.8),
            price_vs_average: Ordering::Greater,
        };
        assert_eq!(decide(&snapshot), None);
    }

    #[test]
    fn test_zero_momentum_is_silent() {
        let mut snapshot = buy_setup();
        snapshot.momentum = Decimal::ZERO;
        assert_eq!(decide(&snapshot), None);
    }
}
