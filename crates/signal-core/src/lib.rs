//! Market state and signal primitives for the paper-trading terminal.
//!
//! - **MarketState**: latest-tick price store, the engine's `PriceSource`
//! - **Signal types**: `Signal`, `IndicatorSnapshot`, the `SignalSource`
//!   capability and the fixed `decide` rule
//! - **RandomSignalSource**: the randomized stub the demo terminal runs on

mod market;
mod signal;
mod sources;

pub use market::{create_market_state, MarketState, SharedMarketState};
pub use signal::{decide, IndicatorSnapshot, Signal, SignalKind, SignalSource};
pub use sources::RandomSignalSource;
