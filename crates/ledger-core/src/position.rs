//! Position type and mark-to-market math.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ids::PositionId;

/// Fraction of the entry price the mark may move against a position before
/// it is force-closed.
pub const MAINTENANCE_MARGIN: Decimal = dec!(0.005);

/// Direction of a leveraged exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Why a position left the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Manual,
    StopLoss,
    TakeProfit,
    Liquidation,
}

/// An open leveraged exposure in the paper ledger.
///
/// Margin is the capital committed at open (`quantity * entry_price`);
/// leverage scales the notional and therefore the PnL, not the margin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    /// Last observed price.
    pub current_price: Decimal,
    pub leverage: Decimal,
    /// Capital reserved against this position.
    pub margin: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    /// Unrealized PnL as a percentage of margin.
    pub unrealized_pnl_pct: Decimal,
    pub opened_at_ms: i64,
    pub status: PositionStatus,
}

impl Position {
    /// Total exposure: `quantity * entry_price * leverage`.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.entry_price * self.leverage
    }

    /// Signed PnL at `price`.
    ///
    /// Long profits when the price rises above entry, Short when it falls
    /// below. Leverage multiplies the move.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        match self.side {
            Side::Long => (price - self.entry_price) * self.quantity * self.leverage,
            Side::Short => (self.entry_price - price) * self.quantity * self.leverage,
        }
    }

    /// Refresh the mark price and the unrealized PnL fields.
    pub fn mark(&mut self, price: Decimal) {
        self.current_price = price;
        self.unrealized_pnl = self.pnl_at(price);
        self.unrealized_pnl_pct = if self.margin > Decimal::ZERO {
            self.unrealized_pnl / self.margin * dec!(100)
        } else {
            Decimal::ZERO
        };
    }

    /// Side-appropriate stop-loss trigger check.
    pub fn stop_loss_hit(&self, price: Decimal) -> bool {
        match (self.side, self.stop_loss) {
            (Side::Long, Some(stop)) => price <= stop,
            (Side::Short, Some(stop)) => price >= stop,
            (_, None) => false,
        }
    }

    /// Side-appropriate take-profit trigger check.
    pub fn take_profit_hit(&self, price: Decimal) -> bool {
        match (self.side, self.take_profit) {
            (Side::Long, Some(target)) => price >= target,
            (Side::Short, Some(target)) => price <= target,
            (_, None) => false,
        }
    }

    /// Price at which maintenance margin is breached.
    pub fn liquidation_price(&self) -> Decimal {
        match self.side {
            Side::Long => self.entry_price * (Decimal::ONE - MAINTENANCE_MARGIN),
            Side::Short => self.entry_price * (Decimal::ONE + MAINTENANCE_MARGIN),
        }
    }

    /// Whether `price` has crossed the liquidation threshold.
    pub fn liquidation_hit(&self, price: Decimal) -> bool {
        match self.side {
            Side::Long => price <= self.liquidation_price(),
            Side::Short => price >= self.liquidation_price(),
        }
    }
}
