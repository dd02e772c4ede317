//! Mark-to-market loop.
//!
//! Consumes the synthetic tick stream, refreshes market state and drives the
//! exit-condition checks over every open position in the ticked symbol. This
//! is the only place stop-loss/take-profit and liquidation checks are
//! sequenced per tick; whichever closes the position first wins and the
//! other check's `PositionNotFound` is treated as a no-op.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use ledger_core::{CloseReason, CloseReceipt, LedgerEngine, LedgerError, Reevaluation};
use metrics::SharedMetrics;
use model::{MarketEvent, PriceTick};
use signal_core::SharedMarketState;

use crate::risk_manager::RiskManager;

/// Run the re-evaluation loop until shutdown or channel close.
pub async fn run_mark_loop(
    engine: Arc<LedgerEngine>,
    risk: Arc<RiskManager>,
    market: SharedMarketState,
    mut tick_rx: mpsc::Receiver<MarketEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
    metrics: SharedMetrics,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }

            event = tick_rx.recv() => {
                match event {
                    Some(MarketEvent::Tick(tick)) => {
                        handle_tick(&engine, &risk, &market, &metrics, tick);
                    }
                    None => {
                        warn!("tick channel closed");
                        break;
                    }
                }
            }
        }
    }

    info!("mark-to-market loop stopped");
}

fn handle_tick(
    engine: &LedgerEngine,
    risk: &RiskManager,
    market: &SharedMarketState,
    metrics: &SharedMetrics,
    tick: PriceTick,
) {
    market.apply_tick(&tick);
    metrics.inc_ticks_received();

    for id in engine.open_position_ids_for(&tick.symbol) {
        match engine.reevaluate(id) {
            Ok(Reevaluation::Open) => {}
            Ok(Reevaluation::Closed(receipt)) => {
                record_close(risk, metrics, &receipt);
                continue;
            }
            Err(LedgerError::PositionNotFound(_)) => continue,
            Err(e) => {
                warn!(position_id = %id, error = %e, "reevaluation failed");
                continue;
            }
        }

        match engine.check_liquidation(id) {
            Ok(Some(receipt)) => record_close(risk, metrics, &receipt),
            Ok(None) => {}
            // Closed by another path in between; nothing left to do.
            Err(LedgerError::PositionNotFound(_)) => {}
            Err(e) => {
                warn!(position_id = %id, error = %e, "liquidation check failed");
            }
        }
    }
}

fn record_close(risk: &RiskManager, metrics: &SharedMetrics, receipt: &CloseReceipt) {
    risk.update_daily_loss(receipt.realized_pnl);
    metrics.inc_positions_closed();
    match receipt.reason {
        CloseReason::StopLoss => metrics.inc_stop_loss_closes(),
        CloseReason::TakeProfit => metrics.inc_take_profit_closes(),
        CloseReason::Liquidation => metrics.inc_liquidations(),
        CloseReason::Manual => {}
    }

    info!(
        position_id = %receipt.position.id,
        symbol = %receipt.position.symbol,
        reason = ?receipt.reason,
        realized_pnl = %receipt.realized_pnl,
        balance = %receipt.new_balance,
        "position auto-closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use ledger_core::{MarketOrderRequest, PriceSource, Side};
    use metrics::create_metrics;
    use model::default_catalog;
    use signal_core::create_market_state;

    use crate::risk_config::RiskLimits;

    struct Harness {
        engine: Arc<LedgerEngine>,
        risk: Arc<RiskManager>,
        market: SharedMarketState,
        metrics: SharedMetrics,
        tick_tx: mpsc::Sender<MarketEvent>,
        shutdown_tx: watch::Sender<bool>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_harness() -> Harness {
        let market = create_market_state();
        for instrument in default_catalog() {
            market.seed(&instrument);
        }
        let engine = Arc::new(LedgerEngine::new(
            Arc::clone(&market) as Arc<dyn PriceSource>
        ));
        let risk = Arc::new(RiskManager::new(RiskLimits::default()));
        let metrics = create_metrics();

        let (tick_tx, tick_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_mark_loop(
            Arc::clone(&engine),
            Arc::clone(&risk),
            Arc::clone(&market),
            tick_rx,
            shutdown_rx,
            Arc::clone(&metrics),
        ));

        Harness {
            engine,
            risk,
            market,
            metrics,
            tick_tx,
            shutdown_tx,
            handle,
        }
    }

    fn make_tick(symbol: &str, price: Decimal) -> MarketEvent {
        MarketEvent::Tick(PriceTick {
            symbol: symbol.to_string(),
            price,
            change_pct: Decimal::ZERO,
            timestamp_ms: 1000,
        })
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    async fn shut_down(harness: Harness) {
        let _ = harness.shutdown_tx.send(true);
        let _ = harness.handle.await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tick_updates_market_state() {
        let harness = spawn_harness();

        harness
            .tick_tx
            .send(make_tick("BTC/USDT", dec!(44000)))
            .await
            .unwrap();

        let market = Arc::clone(&harness.market);
        assert!(
            wait_until(move || market.last_price("BTC/USDT") == Some(dec!(44000))).await,
            "tick was not applied to market state"
        );
        assert!(harness.metrics.ticks_received() >= 1);

        shut_down(harness).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_loss_closed_via_tick() {
        let harness = spawn_harness();

        // Long 0.1 BTC at the seeded 43250, stop at 42000.
        let position = harness
            .engine
            .execute_market_order(
                MarketOrderRequest::new("BTC/USDT", Side::Long, dec!(0.1), dec!(1))
                    .with_stop_loss(dec!(42000)),
            )
            .unwrap();

        harness
            .tick_tx
            .send(make_tick("BTC/USDT", dec!(41900)))
            .await
            .unwrap();

        let engine = Arc::clone(&harness.engine);
        assert!(
            wait_until(move || engine.positions().is_empty()).await,
            "stop-loss did not close the position"
        );
        assert!(harness.engine.position(position.id).is_none());
        assert_eq!(harness.metrics.stop_loss_closes(), 1);
        // Realized loss (43250 - 41900) * 0.1 = 135 accumulates into the
        // session loss counter.
        assert_eq!(harness.risk.daily_loss(), dec!(135));

        shut_down(harness).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_take_profit_closed_via_tick() {
        let harness = spawn_harness();

        let position = harness
            .engine
            .execute_market_order(
                MarketOrderRequest::new("ETH/USDT", Side::Short, dec!(1), dec!(1))
                    .with_take_profit(dec!(2200)),
            )
            .unwrap();

        harness
            .tick_tx
            .send(make_tick("ETH/USDT", dec!(2195)))
            .await
            .unwrap();

        let engine = Arc::clone(&harness.engine);
        assert!(
            wait_until(move || engine.positions().is_empty()).await,
            "take-profit did not close the position"
        );
        assert!(harness.engine.position(position.id).is_none());
        assert_eq!(harness.metrics.take_profit_closes(), 1);
        // Profitable close leaves the loss counter alone.
        assert_eq!(harness.risk.daily_loss(), Decimal::ZERO);

        shut_down(harness).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_liquidation_via_tick() {
        let harness = spawn_harness();

        // No stop levels: only the liquidation check can close it.
        harness
            .engine
            .execute_market_order(MarketOrderRequest::new(
                "BTC/USDT",
                Side::Long,
                dec!(0.01),
                dec!(1),
            ))
            .unwrap();

        // Liquidation price is 43250 * 0.995 = 43033.75.
        harness
            .tick_tx
            .send(make_tick("BTC/USDT", dec!(43033.75)))
            .await
            .unwrap();

        let engine = Arc::clone(&harness.engine);
        assert!(
            wait_until(move || engine.positions().is_empty()).await,
            "liquidation did not close the position"
        );
        assert_eq!(harness.metrics.liquidations(), 1);

        shut_down(harness).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unrelated_symbol_leaves_position_open() {
        let harness = spawn_harness();

        harness
            .engine
            .execute_market_order(
                MarketOrderRequest::new("BTC/USDT", Side::Long, dec!(0.01), dec!(1))
                    .with_stop_loss(dec!(42000)),
            )
            .unwrap();

        harness
            .tick_tx
            .send(make_tick("ETH/USDT", dec!(1)))
            .await
            .unwrap();

        let market = Arc::clone(&harness.market);
        assert!(wait_until(move || market.last_price("ETH/USDT") == Some(dec!(1))).await);
        assert_eq!(harness.engine.positions().len(), 1);

        shut_down(harness).await;
    }
}
