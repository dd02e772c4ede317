//! Autonomous signal bot.
//!
//! The bot polls a fixed watch list on a recurring tick, derives a signal per
//! symbol through an injected `SignalSource`, gates the resulting order
//! through the risk manager and submits it to the ledger. Start and stop are
//! idempotent; `disable` joins the worker task, so once it returns no further
//! submissions can occur.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use ledger_core::{LedgerEngine, MarketOrderRequest, PositionId, PriceSource, Side};
use metrics::SharedMetrics;
use signal_core::{decide, Signal, SignalKind, SignalSource};

use crate::risk_manager::{OrderCandidate, RiskManager};

/// Configuration for the signal bot.
#[derive(Debug, Clone)]
pub struct SignalBotConfig {
    /// Symbols analyzed on every tick.
    pub watch_list: Vec<String>,
    /// Interval between analysis ticks.
    pub tick_interval: Duration,
    /// Quantity submitted with every signal order.
    pub order_quantity: Decimal,
    /// Leverage submitted with every signal order.
    pub order_leverage: Decimal,
    /// Confidence stamped onto generated signals.
    pub confidence: Decimal,
}

impl Default for SignalBotConfig {
    fn default() -> Self {
        Self {
            watch_list: vec![
                "BTC/USDT".to_string(),
                "ETH/USDT".to_string(),
                "XRP/USDT".to_string(),
            ],
            tick_interval: Duration::from_secs(60),
            order_quantity: dec!(0.01),
            order_leverage: dec!(10),
            confidence: dec!(0.85),
        }
    }
}

/// One executed signal in the bot's append-only history.
#[derive(Debug, Clone)]
pub struct ExecutedSignal {
    pub signal: Signal,
    pub position_id: PositionId,
    pub executed_at_ms: i64,
}

/// Point-in-time bot status for presentation.
#[derive(Debug, Clone)]
pub struct BotStatus {
    pub enabled: bool,
    pub signals_executed: usize,
    pub last_executed_at_ms: Option<i64>,
}

struct BotTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// The autonomous trading bot.
pub struct SignalBot {
    config: SignalBotConfig,
    engine: Arc<LedgerEngine>,
    risk: Arc<RiskManager>,
    prices: Arc<dyn PriceSource>,
    signals: Arc<dyn SignalSource>,
    metrics: SharedMetrics,
    history: Arc<RwLock<Vec<ExecutedSignal>>>,
    task: Mutex<Option<BotTask>>,
}

impl SignalBot {
    pub fn new(
        config: SignalBotConfig,
        engine: Arc<LedgerEngine>,
        risk: Arc<RiskManager>,
        prices: Arc<dyn PriceSource>,
        signals: Arc<dyn SignalSource>,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            config,
            engine,
            risk,
            prices,
            signals,
            metrics,
            history: Arc::new(RwLock::new(Vec::new())),
            task: Mutex::new(None),
        }
    }

    /// Start the recurring analysis tick. No-op when already enabled.
    pub fn enable(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            debug!("signal bot already enabled");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let worker = BotWorker {
            config: self.config.clone(),
            engine: Arc::clone(&self.engine),
            risk: Arc::clone(&self.risk),
            prices: Arc::clone(&self.prices),
            signals: Arc::clone(&self.signals),
            metrics: Arc::clone(&self.metrics),
            history: Arc::clone(&self.history),
        };
        let interval = self.config.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; consume it so
            // the first analysis happens one full interval after enabling.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        worker.run_tick();
                    }
                }
            }
        });

        *task = Some(BotTask {
            shutdown_tx,
            handle,
        });
        info!(
            watch_list = ?self.config.watch_list,
            interval_ms = %self.config.tick_interval.as_millis(),
            "signal bot enabled"
        );
    }

    /// Stop the recurring tick. No-op when already disabled.
    ///
    /// Joins the worker task before returning, so afterwards no further
    /// order submissions can occur.
    pub async fn disable(&self) {
        let task = self.task.lock().take();
        if let Some(BotTask {
            shutdown_tx,
            handle,
        }) = task
        {
            let _ = shutdown_tx.send(true);
            let _ = handle.await;
            info!("signal bot disabled");
        }
    }

    /// Toggle the bot into the requested state.
    pub async fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable().await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Snapshot of the executed-signal history.
    pub fn history(&self) -> Vec<ExecutedSignal> {
        self.history.read().clone()
    }

    pub fn status(&self) -> BotStatus {
        let history = self.history.read();
        BotStatus {
            enabled: self.is_enabled(),
            signals_executed: history.len(),
            last_executed_at_ms: history.last().map(|s| s.executed_at_ms),
        }
    }
}

/// The per-tick analysis worker, detached from the bot handle so it can move
/// into the spawned task.
struct BotWorker {
    config: SignalBotConfig,
    engine: Arc<LedgerEngine>,
    risk: Arc<RiskManager>,
    prices: Arc<dyn PriceSource>,
    signals: Arc<dyn SignalSource>,
    metrics: SharedMetrics,
    history: Arc<RwLock<Vec<ExecutedSignal>>>,
}

impl BotWorker {
    /// Analyze every watched symbol. A failure on one symbol never aborts
    /// the rest of the tick.
    fn run_tick(&self) {
        debug!("analyzing watch list");
        for symbol in &self.config.watch_list {
            self.analyze_symbol(symbol);
        }
    }

    fn analyze_symbol(&self, symbol: &str) {
        let price = match self.prices.current_price(symbol) {
            Some(price) if price > Decimal::ZERO => price,
            _ => {
                debug!(symbol, "no usable price, skipping");
                return;
            }
        };

        let snapshot = self.signals.evaluate(symbol);
        let Some(kind) = decide(&snapshot) else {
            return;
        };

        let reason = match kind {
            SignalKind::Buy => "short-term oversold, momentum positive, price above average",
            SignalKind::Sell => "short-term overbought, momentum negative, price below average",
        };
        let signal = Signal {
            kind,
            symbol: symbol.to_string(),
            price,
            confidence: self.config.confidence,
            reason: reason.to_string(),
            generated_at_ms: common::timestamp_ms(),
        };

        info!(
            symbol,
            kind = ?signal.kind,
            price = %signal.price,
            confidence = %signal.confidence,
            "signal generated"
        );

        let side = match kind {
            SignalKind::Buy => Side::Long,
            SignalKind::Sell => Side::Short,
        };
        let candidate = OrderCandidate {
            symbol: symbol.to_string(),
            side,
            quantity: self.config.order_quantity,
            price,
            leverage: self.config.order_leverage,
            open_positions_for_symbol: self.engine.open_position_count_for(symbol),
        };

        let check = self.risk.validate_order(&candidate);
        if !check.valid {
            warn!(
                symbol,
                violations = ?check.violations,
                "signal rejected by risk checks"
            );
            self.metrics.inc_signals_failed();
            return;
        }

        let request = MarketOrderRequest::new(
            symbol,
            side,
            self.config.order_quantity,
            self.config.order_leverage,
        );
        match self.engine.execute_market_order(request) {
            Ok(position) => {
                info!(symbol, position_id = %position.id, "signal executed");
                self.metrics.inc_signals_executed();
                self.history.write().push(ExecutedSignal {
                    signal,
                    position_id: position.id,
                    executed_at_ms: common::timestamp_ms(),
                });
            }
            Err(e) => {
                warn!(symbol, error = %e, "failed to execute signal");
                self.metrics.inc_signals_failed();
            }
        }
    }
}
