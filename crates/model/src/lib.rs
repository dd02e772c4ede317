use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Asset class of a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    Crypto,
    Forex,
    Commodity,
}

/// A tradable instrument in the terminal's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub kind: InstrumentKind,
    /// Price the synthetic feed starts its random walk from.
    pub initial_price: Decimal,
    /// 24h change shown before the first tick arrives.
    pub initial_change_pct: Decimal,
}

impl Instrument {
    pub fn new(
        symbol: &str,
        name: &str,
        kind: InstrumentKind,
        initial_price: Decimal,
        initial_change_pct: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            kind,
            initial_price,
            initial_change_pct,
        }
    }
}

/// A single synthetic price observation for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: String,
    pub price: Decimal,
    pub change_pct: Decimal,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketEvent {
    Tick(PriceTick),
}

/// The fixed instrument set seeded at startup.
pub fn default_catalog() -> Vec<Instrument> {
    use InstrumentKind::*;

    vec![
        Instrument::new("BTC/USDT", "Bitcoin", Crypto, dec!(43250.00), dec!(2.45)),
        Instrument::new("ETH/USDT", "Ethereum", Crypto, dec!(2280.50), dec!(1.82)),
        Instrument::new("BNB/USDT", "Binance Coin", Crypto, dec!(312.45), dec!(-0.56)),
        Instrument::new("XRP/USDT", "Ripple", Crypto, dec!(0.5234), dec!(3.21)),
        Instrument::new("ADA/USDT", "Cardano", Crypto, dec!(0.4521), dec!(-1.23)),
        Instrument::new("SOL/USDT", "Solana", Crypto, dec!(98.76), dec!(4.56)),
        Instrument::new("DOGE/USDT", "Dogecoin", Crypto, dec!(0.0823), dec!(8.92)),
        Instrument::new("EUR/USD", "Euro/US Dollar", Forex, dec!(1.0876), dec!(0.12)),
        Instrument::new("GBP/USD", "Pound/US Dollar", Forex, dec!(1.2634), dec!(-0.23)),
        Instrument::new("USD/JPY", "US Dollar/Yen", Forex, dec!(149.82), dec!(0.45)),
        Instrument::new("GOLD", "Gold", Commodity, dec!(2034.50), dec!(0.78)),
        Instrument::new("OIL", "Crude Oil", Commodity, dec!(78.45), dec!(-1.34)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_symbols_unique() {
        let catalog = default_catalog();
        let symbols: HashSet<_> = catalog.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols.len(), catalog.len());
    }

    #[test]
    fn test_catalog_prices_positive() {
        for instrument in default_catalog() {
            assert!(
                instrument.initial_price > Decimal::ZERO,
                "{} has non-positive initial price",
                instrument.symbol
            );
        }
    }

    #[test]
    fn test_catalog_covers_all_kinds() {
        let catalog = default_catalog();
        assert!(catalog.iter().any(|i| i.kind == InstrumentKind::Crypto));
        assert!(catalog.iter().any(|i| i.kind == InstrumentKind::Forex));
        assert!(catalog.iter().any(|i| i.kind == InstrumentKind::Commodity));
    }
}
