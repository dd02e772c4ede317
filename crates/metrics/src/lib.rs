use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe metrics collector for the paper-trading terminal.
#[derive(Debug)]
pub struct TerminalMetrics {
    // Counters
    ticks_received: AtomicU64,
    orders_executed: AtomicU64,
    orders_rejected: AtomicU64,
    positions_closed: AtomicU64,
    stop_loss_closes: AtomicU64,
    take_profit_closes: AtomicU64,
    liquidations: AtomicU64,
    signals_executed: AtomicU64,
    signals_failed: AtomicU64,

    // Timestamps
    inner: RwLock<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    start_time: Instant,
    last_tick_time: Option<Instant>,
    last_close_time: Option<Instant>,
}

impl Default for TerminalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalMetrics {
    pub fn new() -> Self {
        Self {
            ticks_received: AtomicU64::new(0),
            orders_executed: AtomicU64::new(0),
            orders_rejected: AtomicU64::new(0),
            positions_closed: AtomicU64::new(0),
            stop_loss_closes: AtomicU64::new(0),
            take_profit_closes: AtomicU64::new(0),
            liquidations: AtomicU64::new(0),
            signals_executed: AtomicU64::new(0),
            signals_failed: AtomicU64::new(0),
            inner: RwLock::new(MetricsInner {
                start_time: Instant::now(),
                last_tick_time: None,
                last_close_time: None,
            }),
        }
    }

    // --- Increment methods ---

    pub fn inc_ticks_received(&self) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_tick_time = Some(Instant::now());
    }

    pub fn inc_orders_executed(&self) {
        self.orders_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orders_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_positions_closed(&self) {
        self.positions_closed.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_close_time = Some(Instant::now());
    }

    pub fn inc_stop_loss_closes(&self) {
        self.stop_loss_closes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_take_profit_closes(&self) {
        self.take_profit_closes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_liquidations(&self) {
        self.liquidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_signals_executed(&self) {
        self.signals_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_signals_failed(&self) {
        self.signals_failed.fetch_add(1, Ordering::Relaxed);
    }

    // --- Getter methods ---

    pub fn ticks_received(&self) -> u64 {
        self.ticks_received.load(Ordering::Relaxed)
    }

    pub fn orders_executed(&self) -> u64 {
        self.orders_executed.load(Ordering::Relaxed)
    }

    pub fn orders_rejected(&self) -> u64 {
        self.orders_rejected.load(Ordering::Relaxed)
    }

    pub fn positions_closed(&self) -> u64 {
        self.positions_closed.load(Ordering::Relaxed)
    }

    pub fn stop_loss_closes(&self) -> u64 {
        self.stop_loss_closes.load(Ordering::Relaxed)
    }

    pub fn take_profit_closes(&self) -> u64 {
        self.take_profit_closes.load(Ordering::Relaxed)
    }

    pub fn liquidations(&self) -> u64 {
        self.liquidations.load(Ordering::Relaxed)
    }

    pub fn signals_executed(&self) -> u64 {
        self.signals_executed.load(Ordering::Relaxed)
    }

    pub fn signals_failed(&self) -> u64 {
        self.signals_failed.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.inner.read().start_time.elapsed().as_secs_f64()
    }

    pub fn secs_since_last_tick(&self) -> Option<f64> {
        self.inner
            .read()
            .last_tick_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    /// Calculate ticks per second since start.
    pub fn ticks_per_second(&self) -> f64 {
        let uptime = self.uptime_secs();
        if uptime > 0.0 {
            self.ticks_received() as f64 / uptime
        } else {
            0.0
        }
    }

    /// Generate a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_received: self.ticks_received(),
            orders_executed: self.orders_executed(),
            orders_rejected: self.orders_rejected(),
            positions_closed: self.positions_closed(),
            stop_loss_closes: self.stop_loss_closes(),
            take_profit_closes: self.take_profit_closes(),
            liquidations: self.liquidations(),
            signals_executed: self.signals_executed(),
            signals_failed: self.signals_failed(),
            uptime_secs: self.uptime_secs(),
            ticks_per_second: self.ticks_per_second(),
            secs_since_last_tick: self.secs_since_last_tick(),
        }
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub ticks_received: u64,
    pub orders_executed: u64,
    pub orders_rejected: u64,
    pub positions_closed: u64,
    pub stop_loss_closes: u64,
    pub take_profit_closes: u64,
    pub liquidations: u64,
    pub signals_executed: u64,
    pub signals_failed: u64,
    pub uptime_secs: f64,
    pub ticks_per_second: f64,
    pub secs_since_last_tick: Option<f64>,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Terminal Metrics ===")?;
        writeln!(f, "Uptime:             {:.1}s", self.uptime_secs)?;
        writeln!(f, "Ticks received:     {}", self.ticks_received)?;
        writeln!(f, "Ticks/sec:          {:.2}", self.ticks_per_second)?;
        writeln!(f, "Orders executed:    {}", self.orders_executed)?;
        writeln!(f, "Orders rejected:    {}", self.orders_rejected)?;
        writeln!(f, "Positions closed:   {}", self.positions_closed)?;
        writeln!(f, "  stop-loss:        {}", self.stop_loss_closes)?;
        writeln!(f, "  take-profit:      {}", self.take_profit_closes)?;
        writeln!(f, "  liquidation:      {}", self.liquidations)?;
        writeln!(f, "Signals executed:   {}", self.signals_executed)?;
        writeln!(f, "Signals failed:     {}", self.signals_failed)?;
        if let Some(secs) = self.secs_since_last_tick {
            writeln!(f, "Since last tick:    {:.1}s", secs)?;
        }
        Ok(())
    }
}

/// Shared handle to metrics.
pub type SharedMetrics = Arc<TerminalMetrics>;

pub fn create_metrics() -> SharedMetrics {
    Arc::new(TerminalMetrics::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = TerminalMetrics::new();

        metrics.inc_ticks_received();
        metrics.inc_ticks_received();
        metrics.inc_orders_executed();
        metrics.inc_orders_rejected();

        assert_eq!(metrics.ticks_received(), 2);
        assert_eq!(metrics.orders_executed(), 1);
        assert_eq!(metrics.orders_rejected(), 1);
    }

    #[test]
    fn test_close_reason_counters_independent() {
        let metrics = TerminalMetrics::new();

        metrics.inc_positions_closed();
        metrics.inc_stop_loss_closes();
        metrics.inc_positions_closed();
        metrics.inc_liquidations();

        assert_eq!(metrics.positions_closed(), 2);
        assert_eq!(metrics.stop_loss_closes(), 1);
        assert_eq!(metrics.take_profit_closes(), 0);
        assert_eq!(metrics.liquidations(), 1);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = TerminalMetrics::new();

        metrics.inc_ticks_received();
        metrics.inc_signals_executed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks_received, 1);
        assert_eq!(snapshot.signals_executed, 1);
        assert!(snapshot.uptime_secs >= 0.0);
    }

    #[test]
    fn test_last_tick_time() {
        let metrics = TerminalMetrics::new();

        assert!(metrics.secs_since_last_tick().is_none());

        metrics.inc_ticks_received();

        let secs = metrics.secs_since_last_tick();
        assert!(secs.is_some());
        assert!(secs.unwrap() < 1.0);
    }
}
