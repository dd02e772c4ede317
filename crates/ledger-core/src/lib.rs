//! Core ledger types and the paper-trading engine.
//!
//! This crate provides the fundamental pieces of the simulated account:
//!
//! - **Position types**: `Position`, `Side`, `PositionStatus`, `CloseReason`
//! - **Order types**: `PendingOrder`, `OrderKind`, `OrderStatus`
//! - **Engine**: `LedgerEngine` owning balance, positions and pending orders
//! - **Identifiers**: `PositionId` / `OrderId`, unique by construction
//!
//! # Position Lifecycle
//!
//! 1. A market order passes parameter validation and the balance check
//! 2. Margin is debited and the position enters the open set (atomically)
//! 3. Each price tick re-marks the position; stop-loss, take-profit and
//!    liquidation checks may force a closure
//! 4. `close_position` realizes the PnL and credits margin + PnL back;
//!    every exit path routes through this single accounting step
//!
//! Limit and stop orders only rest in the ledger; converting them to
//! positions (fill-triggering) is deliberately not implemented.

mod engine;
mod error;
mod ids;
mod order;
mod position;

pub use engine::{
    AccountSummary, CloseReceipt, LedgerEngine, MarketOrderRequest, PriceSource, Reevaluation,
    RestingOrderRequest, DEFAULT_STARTING_BALANCE,
};
pub use error::LedgerError;
pub use ids::{OrderId, PositionId};
pub use order::{OrderKind, OrderStatus, PendingOrder};
pub use position::{CloseReason, Position, PositionStatus, Side, MAINTENANCE_MARGIN};
