//! Pending order types.
//!
//! Limit and stop orders rest in the ledger without reserving margin; margin
//! is committed only when an order converts to a position. Fill-triggering is
//! not implemented, so pending orders stay inert until cancelled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::OrderId;
use crate::position::Side;

/// Kind of resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    Stop,
}

/// Status of a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Check if this is a terminal status (order is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }
}

/// An order waiting in the ledger, not yet converted to a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: OrderId,
    pub kind: OrderKind,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    /// Limit price for limit orders, trigger price for stop orders.
    pub price: Decimal,
    pub leverage: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub status: OrderStatus,
    pub created_at_ms: i64,
}
