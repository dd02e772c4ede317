//! Paper-trading ledger engine.
//!
//! Owns the account balance and the open position / pending order sets. All
//! state lives behind a single mutex, so a balance check and the mutation it
//! guards can never interleave with another order or close.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ids::{OrderId, PositionId};
use crate::order::{OrderKind, OrderStatus, PendingOrder};
use crate::position::{CloseReason, Position, PositionStatus, Side};

/// Starting balance of a fresh paper account.
pub const DEFAULT_STARTING_BALANCE: Decimal = dec!(10000);

/// Read access to the latest observed price for a symbol.
///
/// Implemented by the market-state layer and injected into the engine so
/// tests can pin prices deterministically. Lookups are synchronous reads of
/// the latest known tick; there is no I/O behind this trait.
pub trait PriceSource: Send + Sync {
    /// Latest price for `symbol`, or `None` when the symbol is unknown.
    fn current_price(&self, symbol: &str) -> Option<Decimal>;
}

/// Parameters for a market order.
#[derive(Debug, Clone)]
pub struct MarketOrderRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub leverage: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl MarketOrderRequest {
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Decimal, leverage: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            leverage,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Builder method to attach a stop-loss level.
    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Builder method to attach a take-profit level.
    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }
}

/// Parameters for a resting (limit or stop) order.
#[derive(Debug, Clone)]
pub struct RestingOrderRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    /// Limit price for limit orders, trigger price for stop orders.
    pub price: Decimal,
    pub leverage: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl RestingOrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        leverage: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            leverage,
            stop_loss: None,
            take_profit: None,
        }
    }
}

/// Result of realizing a position's PnL.
#[derive(Debug, Clone)]
pub struct CloseReceipt {
    /// The closed position with its final mark.
    pub position: Position,
    pub reason: CloseReason,
    pub realized_pnl: Decimal,
    /// Account balance after crediting margin + PnL.
    pub new_balance: Decimal,
}

/// Outcome of a mark-to-market pass over one position.
#[derive(Debug, Clone)]
pub enum Reevaluation {
    /// Position stays open; its mark fields were refreshed.
    Open,
    /// An exit condition fired and the position was closed.
    Closed(CloseReceipt),
}

/// Aggregate account state, computed atomically under the ledger lock.
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub balance: Decimal,
    pub realized_pnl_total: Decimal,
    pub realized_pnl_session: Decimal,
    pub open_position_count: usize,
    /// Sum of open positions' margin.
    pub reserved_margin: Decimal,
    pub unrealized_pnl_total: Decimal,
    /// `balance - reserved_margin`.
    pub available_balance: Decimal,
}

struct LedgerState {
    balance: Decimal,
    realized_pnl_total: Decimal,
    realized_pnl_session: Decimal,
    positions: HashMap<PositionId, Position>,
    orders: HashMap<OrderId, PendingOrder>,
}

/// The paper-trading ledger.
///
/// All mutation goes through `&self` methods that take the internal lock
/// once, so `execute_market_order` and `close_position` are atomic with
/// respect to each other.
pub struct LedgerEngine {
    prices: Arc<dyn PriceSource>,
    state: Mutex<LedgerState>,
}

impl LedgerEngine {
    /// Create an engine with the default starting balance.
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        Self::with_balance(prices, DEFAULT_STARTING_BALANCE)
    }

    /// Create an engine with an explicit starting balance.
    pub fn with_balance(prices: Arc<dyn PriceSource>, starting_balance: Decimal) -> Self {
        Self {
            prices,
            state: Mutex::new(LedgerState {
                balance: starting_balance,
                realized_pnl_total: Decimal::ZERO,
                realized_pnl_session: Decimal::ZERO,
                positions: HashMap::new(),
                orders: HashMap::new(),
            }),
        }
    }

    /// Open a position at the current price.
    ///
    /// Margin (`quantity * price`) is debited atomically with the position
    /// insert; an order that would overdraw the balance is rejected without
    /// touching any state. There are no partial fills.
    pub fn execute_market_order(&self, req: MarketOrderRequest) -> Result<Position, LedgerError> {
        validate_params(req.quantity, req.leverage)?;
        let price = self.quote(&req.symbol)?;
        let margin = req.quantity * price;

        let mut state = self.state.lock();
        if margin > state.balance {
            return Err(LedgerError::InsufficientBalance {
                required: margin,
                available: state.balance,
            });
        }

        let position = Position {
            id: PositionId::generate(),
            symbol: req.symbol,
            side: req.side,
            quantity: req.quantity,
            entry_price: price,
            current_price: price,
            leverage: req.leverage,
            margin,
            stop_loss: req.stop_loss,
            take_profit: req.take_profit,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: Decimal::ZERO,
            opened_at_ms: common::timestamp_ms(),
            status: PositionStatus::Open,
        };

        state.balance -= margin;
        state.positions.insert(position.id, position.clone());

        info!(
            position_id = %position.id,
            symbol = %position.symbol,
            side = ?position.side,
            quantity = %position.quantity,
            entry_price = %position.entry_price,
            leverage = %position.leverage,
            margin = %margin,
            balance = %state.balance,
            "position opened"
        );

        Ok(position)
    }

    /// Submit a limit order. No margin is reserved until it fills.
    pub fn execute_limit_order(&self, req: RestingOrderRequest) -> Result<PendingOrder, LedgerError> {
        self.submit_resting(OrderKind::Limit, req)
    }

    /// Submit a stop order. No margin is reserved until it fills.
    pub fn execute_stop_order(&self, req: RestingOrderRequest) -> Result<PendingOrder, LedgerError> {
        self.submit_resting(OrderKind::Stop, req)
    }

    fn submit_resting(
        &self,
        kind: OrderKind,
        req: RestingOrderRequest,
    ) -> Result<PendingOrder, LedgerError> {
        validate_params(req.quantity, req.leverage)?;
        if req.price <= Decimal::ZERO {
            return Err(LedgerError::InvalidOrderParameters(
                "target price must be positive".to_string(),
            ));
        }

        let order = PendingOrder {
            id: OrderId::generate(),
            kind,
            symbol: req.symbol,
            side: req.side,
            quantity: req.quantity,
            price: req.price,
            leverage: req.leverage,
            stop_loss: req.stop_loss,
            take_profit: req.take_profit,
            status: OrderStatus::Pending,
            created_at_ms: common::timestamp_ms(),
        };

        self.state.lock().orders.insert(order.id, order.clone());

        info!(
            order_id = %order.id,
            kind = ?order.kind,
            symbol = %order.symbol,
            side = ?order.side,
            quantity = %order.quantity,
            price = %order.price,
            "pending order submitted"
        );

        Ok(order)
    }

    /// Cancel a pending order, removing it from the ledger.
    pub fn cancel_order(&self, id: OrderId) -> Result<PendingOrder, LedgerError> {
        let mut state = self.state.lock();
        let mut order = state
            .orders
            .remove(&id)
            .ok_or(LedgerError::OrderNotFound(id))?;
        order.status = OrderStatus::Cancelled;

        info!(order_id = %order.id, symbol = %order.symbol, "pending order cancelled");
        Ok(order)
    }

    /// Close a position at the current price and realize its PnL.
    ///
    /// This is the single realization path: stop-loss, take-profit and
    /// liquidation closures all route through the same accounting.
    pub fn close_position(&self, id: PositionId) -> Result<CloseReceipt, LedgerError> {
        let mut state = self.state.lock();
        self.close_locked(&mut state, id, CloseReason::Manual)
    }

    /// Refresh a position's mark and evaluate its exit conditions.
    ///
    /// Stop-loss is checked before take-profit; when one tick crosses both
    /// thresholds the stop wins. Liquidation is a separate entry point
    /// (`check_liquidation`) and is not part of this ordering.
    pub fn reevaluate(&self, id: PositionId) -> Result<Reevaluation, LedgerError> {
        let mut state = self.state.lock();

        let (stop_hit, target_hit) = {
            let position = state
                .positions
                .get_mut(&id)
                .ok_or(LedgerError::PositionNotFound(id))?;
            let price = self.quote(&position.symbol)?;
            position.mark(price);
            (position.stop_loss_hit(price), position.take_profit_hit(price))
        };

        if stop_hit {
            let receipt = self.close_locked(&mut state, id, CloseReason::StopLoss)?;
            return Ok(Reevaluation::Closed(receipt));
        }
        if target_hit {
            let receipt = self.close_locked(&mut state, id, CloseReason::TakeProfit)?;
            return Ok(Reevaluation::Closed(receipt));
        }

        Ok(Reevaluation::Open)
    }

    /// Force-close the position if the mark has crossed its liquidation
    /// price (`entry * (1 -/+ maintenance margin)` for Long/Short).
    ///
    /// Returns the close receipt when a liquidation fired. Calling this on a
    /// position that was already closed this tick yields `PositionNotFound`,
    /// which per-tick callers treat as a no-op.
    pub fn check_liquidation(&self, id: PositionId) -> Result<Option<CloseReceipt>, LedgerError> {
        let mut state = self.state.lock();

        let crossed = {
            let position = state
                .positions
                .get_mut(&id)
                .ok_or(LedgerError::PositionNotFound(id))?;
            let price = self.quote(&position.symbol)?;
            position.mark(price);
            position.liquidation_hit(price)
        };

        if !crossed {
            return Ok(None);
        }

        let receipt = self.close_locked(&mut state, id, CloseReason::Liquidation)?;
        warn!(
            position_id = %receipt.position.id,
            symbol = %receipt.position.symbol,
            liquidation_price = %receipt.position.liquidation_price(),
            realized_pnl = %receipt.realized_pnl,
            "position liquidated"
        );
        Ok(Some(receipt))
    }

    /// Aggregate account state. Pure read, no mutation.
    pub fn account_summary(&self) -> AccountSummary {
        let state = self.state.lock();
        let reserved_margin: Decimal = state.positions.values().map(|p| p.margin).sum();
        let unrealized_pnl_total: Decimal =
            state.positions.values().map(|p| p.unrealized_pnl).sum();

        AccountSummary {
            balance: state.balance,
            realized_pnl_total: state.realized_pnl_total,
            realized_pnl_session: state.realized_pnl_session,
            open_position_count: state.positions.len(),
            reserved_margin,
            unrealized_pnl_total,
            available_balance: state.balance - reserved_margin,
        }
    }

    /// Free balance.
    pub fn balance(&self) -> Decimal {
        self.state.lock().balance
    }

    /// Snapshot of a single position.
    pub fn position(&self, id: PositionId) -> Option<Position> {
        self.state.lock().positions.get(&id).cloned()
    }

    /// Snapshot of all open positions.
    pub fn positions(&self) -> Vec<Position> {
        self.state.lock().positions.values().cloned().collect()
    }

    /// Ids of open positions in one symbol.
    pub fn open_position_ids_for(&self, symbol: &str) -> Vec<PositionId> {
        self.state
            .lock()
            .positions
            .values()
            .filter(|p| p.symbol == symbol)
            .map(|p| p.id)
            .collect()
    }

    /// Number of open positions in one symbol.
    pub fn open_position_count_for(&self, symbol: &str) -> usize {
        self.state
            .lock()
            .positions
            .values()
            .filter(|p| p.symbol == symbol)
            .count()
    }

    /// Snapshot of all pending orders.
    pub fn pending_orders(&self) -> Vec<PendingOrder> {
        self.state.lock().orders.values().cloned().collect()
    }

    fn quote(&self, symbol: &str) -> Result<Decimal, LedgerError> {
        match self.prices.current_price(symbol) {
            Some(price) if price > Decimal::ZERO => Ok(price),
            _ => Err(LedgerError::UnknownSymbol(symbol.to_string())),
        }
    }

    fn close_locked(
        &self,
        state: &mut LedgerState,
        id: PositionId,
        reason: CloseReason,
    ) -> Result<CloseReceipt, LedgerError> {
        let symbol = match state.positions.get(&id) {
            Some(position) => position.symbol.clone(),
            None => return Err(LedgerError::PositionNotFound(id)),
        };
        let price = self.quote(&symbol)?;

        // Checks passed; from here the mutation is all-or-nothing.
        let mut position = state
            .positions
            .remove(&id)
            .ok_or(LedgerError::PositionNotFound(id))?;
        position.mark(price);
        position.status = PositionStatus::Closed;
        let realized_pnl = position.unrealized_pnl;

        state.balance += position.margin + realized_pnl;
        state.realized_pnl_total += realized_pnl;
        state.realized_pnl_session += realized_pnl;

        info!(
            position_id = %position.id,
            symbol = %position.symbol,
            reason = ?reason,
            exit_price = %price,
            realized_pnl = %realized_pnl,
            balance = %state.balance,
            "position closed"
        );

        Ok(CloseReceipt {
            position,
            reason,
            realized_pnl,
            new_balance: state.balance,
        })
    }
}

fn validate_params(quantity: Decimal, leverage: Decimal) -> Result<(), LedgerError> {
    if quantity <= Decimal::ZERO {
        return Err(LedgerError::InvalidOrderParameters(
            "quantity must be positive".to_string(),
        ));
    }
    if leverage < Decimal::ONE {
        return Err(LedgerError::InvalidOrderParameters(
            "leverage must be at least 1".to_string(),
        ));
    }
    Ok(())
}
