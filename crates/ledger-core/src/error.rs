//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::{OrderId, PositionId};

/// Errors produced by ledger operations.
///
/// All variants are synchronous, local and non-fatal: a rejected operation
/// leaves the ledger untouched and the caller decides whether to report or
/// move on.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// Opening the position would overdraw the free balance.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Margin the order would reserve.
        required: Decimal,
        /// Free balance at the time of the check.
        available: Decimal,
    },

    /// The referenced position does not exist or was already closed.
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),

    /// The referenced pending order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Non-positive quantity, leverage below one, or a missing target price.
    #[error("invalid order parameters: {0}")]
    InvalidOrderParameters(String),

    /// The price source has no usable quote for the symbol.
    #[error("no price available for {0}")]
    UnknownSymbol(String),
}
