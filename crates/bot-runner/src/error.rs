//! Risk violation types.

use rust_decimal::Decimal;
use thiserror::Error;

/// A single violated risk rule.
///
/// `RiskManager::validate_order` evaluates every rule and returns the full
/// list, so a caller can report all problems with an order at once.
#[derive(Debug, Clone, Error)]
pub enum RiskViolation {
    /// Order notional exceeds the per-position cap.
    #[error("notional {notional} exceeds limit {limit}")]
    NotionalExceeded {
        /// quantity * price * leverage of the candidate.
        notional: Decimal,
        limit: Decimal,
    },

    /// Requested leverage exceeds the cap.
    #[error("leverage {leverage} exceeds limit {limit}")]
    LeverageExceeded { leverage: Decimal, limit: Decimal },

    /// The symbol already carries the maximum number of open positions.
    #[error("{symbol} already has {current} open positions (limit {limit})")]
    TooManyPositionsForSymbol {
        symbol: String,
        current: usize,
        limit: usize,
    },

    /// Accumulated session loss has reached the daily cap.
    #[error("daily loss {current} has reached limit {limit}")]
    DailyLossLimitReached { current: Decimal, limit: Decimal },
}
