//! Latest-tick market state shared between the feed and the trading core.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use ledger_core::PriceSource;
use model::{Instrument, PriceTick};

/// Latest observed tick per symbol.
///
/// The feed writes, everyone else reads. This is the terminal's only price
/// store and doubles as the engine's `PriceSource`.
pub struct MarketState {
    ticks: RwLock<HashMap<String, PriceTick>>,
}

impl MarketState {
    /// Create a new empty market state.
    pub fn new() -> Self {
        Self {
            ticks: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a symbol from its catalog entry so quotes exist before the
    /// first tick arrives.
    pub fn seed(&self, instrument: &Instrument) {
        let mut ticks = self.ticks.write();
        ticks.insert(
            instrument.symbol.clone(),
            PriceTick {
                symbol: instrument.symbol.clone(),
                price: instrument.initial_price,
                change_pct: instrument.initial_change_pct,
                timestamp_ms: 0,
            },
        );
    }

    /// Store the latest tick for its symbol.
    pub fn apply_tick(&self, tick: &PriceTick) {
        let mut ticks = self.ticks.write();
        ticks.insert(tick.symbol.clone(), tick.clone());
    }

    /// Get the latest tick for a symbol.
    pub fn last_tick(&self, symbol: &str) -> Option<PriceTick> {
        let ticks = self.ticks.read();
        ticks.get(symbol).cloned()
    }

    /// Get the latest price for a symbol.
    pub fn last_price(&self, symbol: &str) -> Option<Decimal> {
        let ticks = self.ticks.read();
        ticks.get(symbol).map(|t| t.price)
    }

    /// All symbols with at least one observation.
    pub fn symbols(&self) -> Vec<String> {
        let ticks = self.ticks.read();
        ticks.keys().cloned().collect()
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for MarketState {
    fn current_price(&self, symbol: &str) -> Option<Decimal> {
        self.last_price(symbol)
    }
}

/// Shared market state handle.
pub type SharedMarketState = Arc<MarketState>;

/// Create a new shared market state.
pub fn create_market_state() -> SharedMarketState {
    Arc::new(MarketState::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{default_catalog, InstrumentKind};
    use rust_decimal_macros::dec;

    fn make_tick(symbol: &str, price: Decimal) -> PriceTick {
        PriceTick {
            symbol: symbol.to_string(),
            price,
            change_pct: dec!(0.5),
            timestamp_ms: 1000,
        }
    }

    #[test]
    fn test_apply_tick_overwrites() {
        let state = MarketState::new();

        assert!(state.last_price("BTC/USDT").is_none());

        state.apply_tick(&make_tick("BTC/USDT", dec!(43250)));
        assert_eq!(state.last_price("BTC/USDT"), Some(dec!(43250)));

        state.apply_tick(&make_tick("BTC/USDT", dec!(43300)));
        assert_eq!(state.last_price("BTC/USDT"), Some(dec!(43300)));
    }

    #[test]
    fn test_seed_from_catalog() {
        let state = MarketState::new();
        for instrument in default_catalog() {
            state.seed(&instrument);
        }

        assert_eq!(state.last_price("BTC/USDT"), Some(dec!(43250.00)));
        assert_eq!(state.symbols().len(), 12);

        let gold = default_catalog()
            .into_iter()
            .find(|i| i.kind == InstrumentKind::Commodity)
            .unwrap();
        assert!(state.last_price(&gold.symbol).is_some());
    }

    #[test]
    fn test_price_source_impl() {
        let state = MarketState::new();
        state.apply_tick(&make_tick("ETH/USDT", dec!(2280.50)));

        let source: &dyn PriceSource = &state;
        assert_eq!(source.current_price("ETH/USDT"), Some(dec!(2280.50)));
        assert_eq!(source.current_price("UNSEEN"), None);
    }
}
