//! Synthetic market data feed.
//!
//! Random-walks every catalog instrument on a fixed interval and publishes a
//! `MarketEvent::Tick` per instrument per interval. Stands in for real market
//! connectivity; nothing downstream knows the prices are made up.

use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use model::{default_catalog, Instrument, MarketEvent, PriceTick};

pub type EventSender = mpsc::Sender<MarketEvent>;
pub type EventReceiver = mpsc::Receiver<MarketEvent>;

pub fn create_event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity)
}

/// Configuration for the synthetic feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Instruments to walk.
    pub instruments: Vec<Instrument>,
    /// Interval between tick batches.
    pub tick_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            instruments: default_catalog(),
            tick_interval: Duration::from_secs(3),
        }
    }
}

struct InstrumentWalk {
    symbol: String,
    price: Decimal,
    change_pct: Decimal,
}

impl InstrumentWalk {
    fn new(instrument: &Instrument) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            price: instrument.initial_price,
            change_pct: instrument.initial_change_pct,
        }
    }

    /// Advance one random-walk step: up to +/-0.25% on price, a small drift
    /// on the displayed 24h change.
    fn step(&mut self) {
        let mut rng = rand::thread_rng();
        let step_pct = Decimal::new(rng.gen_range(-25i64..=25), 4);
        self.price += self.price * step_pct;
        self.change_pct += Decimal::new(rng.gen_range(-5i64..=5), 2);
    }
}

/// Run the feed until shutdown or until the event channel closes.
pub async fn run_feed(
    config: FeedConfig,
    sender: EventSender,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut walks: Vec<InstrumentWalk> = config.instruments.iter().map(InstrumentWalk::new).collect();

    info!(
        instruments = walks.len(),
        interval_ms = %config.tick_interval.as_millis(),
        "starting synthetic feed"
    );

    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let now = common::timestamp_ms();
                for walk in &mut walks {
                    walk.step();
                    let tick = PriceTick {
                        symbol: walk.symbol.clone(),
                        price: walk.price,
                        change_pct: walk.change_pct,
                        timestamp_ms: now,
                    };
                    debug!(symbol = %tick.symbol, price = %tick.price, "tick");
                    if sender.send(MarketEvent::Tick(tick)).await.is_err() {
                        warn!("event channel closed, stopping feed");
                        return;
                    }
                }
            }
        }
    }

    info!("synthetic feed stopped");
}
