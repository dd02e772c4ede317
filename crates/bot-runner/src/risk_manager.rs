//! Risk manager for pre-trade checks and session loss tracking.
//!
//! The risk manager sits between order construction and the ledger. It holds
//! only its own limit configuration and loss counter; the slice of engine
//! state a check needs (open positions for the symbol) arrives as a snapshot
//! inside the candidate, so the two components stay uncoupled.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;

use ledger_core::Side;

use crate::error::RiskViolation;
use crate::risk_config::RiskLimits;

/// A proposed order together with the engine-state snapshot the checks need.
#[derive(Debug, Clone)]
pub struct OrderCandidate {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    /// Current price the notional is computed from.
    pub price: Decimal,
    pub leverage: Decimal,
    /// Open positions already held for this symbol.
    pub open_positions_for_symbol: usize,
}

/// Result of a risk check on an order.
#[derive(Debug, Clone)]
pub struct RiskCheck {
    /// Whether the order may proceed to the ledger.
    pub valid: bool,
    /// Every violated rule, empty when valid.
    pub violations: Vec<RiskViolation>,
}

/// Risk manager enforcing static limits and the daily loss cap.
pub struct RiskManager {
    limits: RiskLimits,
    daily_loss: Mutex<Decimal>,
}

impl RiskManager {
    /// Create a new risk manager with the given limits.
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            daily_loss: Mutex::new(Decimal::ZERO),
        }
    }

    /// Check a candidate order against every limit.
    ///
    /// All rules are evaluated (no short-circuit) so the caller can report
    /// the complete violation list. Never mutates anything.
    pub fn validate_order(&self, candidate: &OrderCandidate) -> RiskCheck {
        let mut violations = Vec::new();

        let notional = candidate.quantity * candidate.price * candidate.leverage;
        if notional > self.limits.max_position_notional {
            violations.push(RiskViolation::NotionalExceeded {
                notional,
                limit: self.limits.max_position_notional,
            });
        }

        if candidate.leverage > self.limits.max_leverage {
            violations.push(RiskViolation::LeverageExceeded {
                leverage: candidate.leverage,
                limit: self.limits.max_leverage,
            });
        }

        if candidate.open_positions_for_symbol >= self.limits.max_positions_per_symbol {
            violations.push(RiskViolation::TooManyPositionsForSymbol {
                symbol: candidate.symbol.clone(),
                current: candidate.open_positions_for_symbol,
                limit: self.limits.max_positions_per_symbol,
            });
        }

        let daily_loss = *self.daily_loss.lock();
        if daily_loss >= self.limits.max_daily_loss {
            violations.push(RiskViolation::DailyLossLimitReached {
                current: daily_loss,
                limit: self.limits.max_daily_loss,
            });
        }

        RiskCheck {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Accumulate a realized loss into the session counter.
    ///
    /// Profitable closes leave the counter untouched.
    pub fn update_daily_loss(&self, pnl: Decimal) {
        if pnl < Decimal::ZERO {
            let mut daily_loss = self.daily_loss.lock();
            *daily_loss += pnl.abs();
        }
    }

    /// Zero the session loss counter (invoked on an external day boundary).
    pub fn reset_daily_loss(&self) {
        *self.daily_loss.lock() = Decimal::ZERO;
        info!("daily loss counter reset");
    }

    /// Current accumulated session loss.
    pub fn daily_loss(&self) -> Decimal {
        *self.daily_loss.lock()
    }

    /// The configured limits.
    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_candidate(quantity: Decimal, price: Decimal, leverage: Decimal) -> OrderCandidate {
        OrderCandidate {
            symbol: "BTC/USDT".to_string(),
            side: Side::Long,
            quantity,
            price,
            leverage,
            open_positions_for_symbol: 0,
        }
    }

    #[test]
    fn test_order_within_limits_approved() {
        let rm = RiskManager::new(RiskLimits::default());

        let check = rm.validate_order(&make_candidate(dec!(0.01), dec!(43250), dec!(1)));
        assert!(check.valid);
        assert!(check.violations.is_empty());
    }

    #[test]
    fn test_notional_exceeded() {
        // maxPositionNotional 1000; 1 * 2000 * 1 = 2000
        let rm = RiskManager::new(RiskLimits::default().with_max_position_notional(dec!(1000)));

        let check = rm.validate_order(&make_candidate(dec!(1), dec!(2000), dec!(1)));
        assert!(!check.valid);
        assert!(check
            .violations
            .iter()
            .any(|v| matches!(v, RiskViolation::NotionalExceeded { .. })));
    }

    #[test]
    fn test_leverage_exceeded() {
        let rm = RiskManager::new(RiskLimits::default().with_max_leverage(dec!(10)));

        let check = rm.validate_order(&make_candidate(dec!(0.001), dec!(100), dec!(20)));
        assert!(!check.valid);
        assert!(check
            .violations
            .iter()
            .any(|v| matches!(v, RiskViolation::LeverageExceeded { .. })));
    }

    #[test]
    fn test_position_count_limit() {
        let rm = RiskManager::new(RiskLimits::default().with_max_positions_per_symbol(2));

        let mut candidate = make_candidate(dec!(0.001), dec!(100), dec!(1));
        candidate.open_positions_for_symbol = 2;

        let check = rm.validate_order(&candidate);
        assert!(!check.valid);
        assert!(check.violations.iter().any(|v| matches!(
            v,
            RiskViolation::TooManyPositionsForSymbol {
                current: 2,
                limit: 2,
                ..
            }
        )));
    }

    #[test]
    fn test_daily_loss_blocks_orders() {
        let rm = RiskManager::new(RiskLimits::default().with_max_daily_loss(dec!(100)));

        rm.update_daily_loss(dec!(-60));
        rm.update_daily_loss(dec!(-40));
        assert_eq!(rm.daily_loss(), dec!(100));

        let check = rm.validate_order(&make_candidate(dec!(0.001), dec!(100), dec!(1)));
        assert!(!check.valid);
        assert!(check
            .violations
            .iter()
            .any(|v| matches!(v, RiskViolation::DailyLossLimitReached { .. })));

        rm.reset_daily_loss();
        assert_eq!(rm.daily_loss(), Decimal::ZERO);
        assert!(rm
            .validate_order(&make_candidate(dec!(0.001), dec!(100), dec!(1)))
            .valid);
    }

    #[test]
    fn test_profit_does_not_reduce_daily_loss() {
        let rm = RiskManager::new(RiskLimits::default());

        rm.update_daily_loss(dec!(-30));
        rm.update_daily_loss(dec!(50));
        assert_eq!(rm.daily_loss(), dec!(30));
    }

    #[test]
    fn test_all_violations_collected() {
        let rm = RiskManager::new(
            RiskLimits::default()
                .with_max_position_notional(dec!(10))
                .with_max_leverage(dec!(5))
                .with_max_positions_per_symbol(1)
                .with_max_daily_loss(dec!(1)),
        );
        rm.update_daily_loss(dec!(-5));

        let mut candidate = make_candidate(dec!(1), dec!(100), dec!(10));
        candidate.open_positions_for_symbol = 3;

        let check = rm.validate_order(&candidate);
        assert!(!check.valid);
        // Every rule fails and every failure is reported.
        assert_eq!(check.violations.len(), 4);
    }
}
