//! Bot runtime for the paper-trading terminal.
//!
//! This crate wires the autonomous pieces around the ledger:
//!
//! - **RiskManager**: pre-trade checks against static limits
//! - **SignalBot**: recurring watch-list analysis with idempotent start/stop
//! - **Mark loop**: tick-driven position re-evaluation and forced closures
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  ticks   ┌─────────────┐  reevaluate / liquidate
//! │ feed-sim │─────────>│  mark loop  │────────────────┐
//! └──────────┘          └─────────────┘                v
//!                                               ┌──────────────┐
//! ┌───────────┐  validate  ┌─────────────┐      │ LedgerEngine │
//! │ SignalBot │───────────>│ RiskManager │      └──────────────┘
//! └───────────┘            └─────────────┘             ^
//!       └────────────── execute_market_order ──────────┘
//! ```

mod bot;
mod error;
mod mark;
mod risk_config;
mod risk_manager;

pub use bot::{BotStatus, ExecutedSignal, SignalBot, SignalBotConfig};
pub use error::RiskViolation;
pub use mark::run_mark_loop;
pub use risk_config::RiskLimits;
pub use risk_manager::{OrderCandidate, RiskCheck, RiskManager};
