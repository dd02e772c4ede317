use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use bot_runner::{run_mark_loop, RiskLimits, RiskManager, SignalBot, SignalBotConfig};
use feed_sim::{create_event_channel, FeedConfig};
use ledger_core::{LedgerEngine, PriceSource};
use metrics::create_metrics;
use model::default_catalog;
use signal_core::{create_market_state, RandomSignalSource};

/// Interval for periodic account summary logging.
const SUMMARY_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Tick channel capacity.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() {
    common::init_logging();

    let bot_requested = std::env::args().skip(1).any(|arg| arg == "--bot");

    let catalog = default_catalog();
    info!(instruments = catalog.len(), "starting paper-trading terminal");

    let market = create_market_state();
    // Seed quotes so orders can execute before the first tick lands.
    for instrument in &catalog {
        market.seed(instrument);
    }
    let prices: Arc<dyn PriceSource> = Arc::clone(&market) as Arc<dyn PriceSource>;

    let metrics = create_metrics();
    let engine = Arc::new(LedgerEngine::new(Arc::clone(&prices)));
    let risk = Arc::new(RiskManager::new(RiskLimits::default()));
    let bot = Arc::new(SignalBot::new(
        SignalBotConfig::default(),
        Arc::clone(&engine),
        Arc::clone(&risk),
        Arc::clone(&prices),
        Arc::new(RandomSignalSource),
        Arc::clone(&metrics),
    ));

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (tick_tx, tick_rx) = create_event_channel(EVENT_CHANNEL_CAPACITY);

    // Spawn the synthetic feed
    let feed_config = FeedConfig {
        instruments: catalog,
        ..FeedConfig::default()
    };
    let feed_handle = tokio::spawn(feed_sim::run_feed(feed_config, tick_tx, shutdown_rx.clone()));

    // Spawn the mark-to-market loop
    let mark_handle = tokio::spawn(run_mark_loop(
        Arc::clone(&engine),
        Arc::clone(&risk),
        Arc::clone(&market),
        tick_rx,
        shutdown_rx.clone(),
        Arc::clone(&metrics),
    ));

    bot.set_enabled(bot_requested).await;

    // Spawn ctrl_c handler
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, initiating shutdown");
            let _ = shutdown_tx_clone.send(true);
        }
    });

    // Periodic account summary until shutdown
    let mut summary_shutdown_rx = shutdown_rx.clone();
    let mut interval = tokio::time::interval(SUMMARY_LOG_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let summary = engine.account_summary();
                let bot_status = bot.status();
                info!(
                    balance = %summary.balance,
                    available = %summary.available_balance,
                    open_positions = summary.open_position_count,
                    reserved_margin = %summary.reserved_margin,
                    unrealized_pnl = %summary.unrealized_pnl_total,
                    realized_session = %summary.realized_pnl_session,
                    bot_enabled = bot_status.enabled,
                    signals_executed = bot_status.signals_executed,
                    "account summary"
                );
            }
            _ = summary_shutdown_rx.changed() => {
                if *summary_shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    // Stop the bot first so nothing trades during teardown.
    bot.disable().await;
    let _ = feed_handle.await;
    let _ = mark_handle.await;

    // Print final metrics
    println!("\n{}", metrics.snapshot());
    info!("shutdown complete");
}
