//! Risk limit configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Static limits the risk manager enforces on order entry.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Maximum notional (quantity * price * leverage) for a single position.
    pub max_position_notional: Decimal,

    /// Maximum leverage per order.
    pub max_leverage: Decimal,

    /// Maximum number of open positions per symbol.
    pub max_positions_per_symbol: usize,

    /// Maximum accumulated session loss before new orders are blocked.
    pub max_daily_loss: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_notional: dec!(1000),
            max_leverage: dec!(100),
            max_positions_per_symbol: 3,
            max_daily_loss: dec!(500),
        }
    }
}

impl RiskLimits {
    /// Create limits with all default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the per-position notional cap.
    pub fn with_max_position_notional(mut self, limit: Decimal) -> Self {
        self.max_position_notional = limit;
        self
    }

    /// Builder method to set the leverage cap.
    pub fn with_max_leverage(mut self, limit: Decimal) -> Self {
        self.max_leverage = limit;
        self
    }

    /// Builder method to set the per-symbol position cap.
    pub fn with_max_positions_per_symbol(mut self, limit: usize) -> Self {
        self.max_positions_per_symbol = limit;
        self
    }

    /// Builder method to set the daily loss cap.
    pub fn with_max_daily_loss(mut self, limit: Decimal) -> Self {
        self.max_daily_loss = limit;
        self
    }
}
