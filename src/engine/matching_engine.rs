// ============================================================================
// Matching Engine
// Core business logic for order matching
// ============================================================================

use crate::domain::{
    Bbo, DepthView, Order, OrderBookSide, OrderError, OrderId, OrderRequest, OrderType, Price,
    Quantity, Side, Trade,
};
use crate::engine::PriceTimePriority;
use crate::interfaces::{MatchingAlgorithm, OrderEvent};
use crate::utils::Clock;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Terminal outcome of a submitted order after its matching pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Entire quantity executed
    Filled,
    /// Limit remainder now resting in the book
    Rested { remaining: Quantity },
    /// Market/IOC remainder discarded (possibly the whole order)
    Cancelled { remaining: Quantity },
    /// FOK could not be satisfied; no trades, book untouched
    Killed { available: Quantity },
}

/// Everything a caller needs after `submit` returns
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// The order as accepted (identity, timestamp and sequence assigned)
    pub order: Order,
    /// Trades in execution order
    pub trades: Vec<Trade>,
    pub disposition: Disposition,
}

impl SubmitOutcome {
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// Event stream for collaborators, in causal order
    pub fn events(&self) -> Vec<OrderEvent> {
        let mut events = Vec::with_capacity(self.trades.len() + 2);
        let order_id = self.order.id;

        events.push(OrderEvent::OrderAccepted {
            order: self.order.clone(),
        });

        for trade in &self.trades {
            events.push(OrderEvent::TradeExecuted {
                trade: trade.clone(),
            });
        }

        events.push(match self.disposition {
            Disposition::Filled => OrderEvent::OrderFilled {
                order_id,
                total_filled: self.filled_quantity(),
            },
            Disposition::Rested { remaining } => OrderEvent::OrderRested {
                order_id,
                remaining_quantity: remaining,
            },
            Disposition::Cancelled { remaining } => OrderEvent::RemainderCancelled {
                order_id,
                filled_quantity: self.filled_quantity(),
                cancelled_quantity: remaining,
            },
            Disposition::Killed { available } => OrderEvent::OrderKilled {
                order_id,
                available_quantity: available,
            },
        });

        events
    }
}

/// Single-symbol order book with a pluggable matching pass.
///
/// `submit` takes `&mut self`: one submission runs to completion before any
/// other call observes the book. Shared access goes through
/// [`MatchingService`](crate::engine::MatchingService) or the task-owned
/// handle behind the `async` feature.
pub struct MatchingEngine {
    /// Trading symbol (e.g., "BTC-USDT")
    symbol: String,

    /// Bid side of the order book
    bids: OrderBookSide,

    /// Ask side of the order book
    asks: OrderBookSide,

    /// Pluggable matching algorithm
    algorithm: Box<dyn MatchingAlgorithm>,

    /// Append-only log of every executed trade
    trade_log: Vec<Trade>,

    /// Default number of levels in `snapshot`
    depth_limit: Option<usize>,

    clock: Clock,

    /// Sequence counter for arrival order
    sequence_counter: u64,

    /// Every id this engine has accepted; ids are never reused
    accepted_ids: HashSet<OrderId>,
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(symbol: impl Into<String>, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: OrderBookSide::new(Side::Buy),
            asks: OrderBookSide::new(Side::Sell),
            algorithm,
            trade_log: Vec::new(),
            depth_limit: None,
            clock: Clock::new(),
            sequence_counter: 0,
            accepted_ids: HashSet::new(),
        }
    }

    /// Price/time priority engine, the standard configuration
    pub fn price_time(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Box::new(PriceTimePriority::new()))
    }

    pub fn with_depth_limit(mut self, depth_limit: Option<usize>) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Validate, accept and match a submission
    pub fn submit(&mut self, request: OrderRequest) -> Result<SubmitOutcome, OrderError> {
        if let Err(reason) = self.validate_request(&request) {
            tracing::warn!(symbol = %request.symbol, %reason, "order rejected");
            return Err(reason);
        }

        let order_id = request.order_id.unwrap_or_default();
        let timestamp = match request.timestamp {
            Some(ts) => self.clock.observe(ts),
            None => self.clock.now(),
        };
        let seq = self.next_sequence();

        let order = Order::accept(request, order_id, timestamp, seq);
        Ok(self.execute(order))
    }

    /// Submit an order the caller has already built; identity is kept,
    /// the timestamp is clamped to the engine clock and a sequence assigned.
    ///
    /// Only the remaining quantity is submitted: it becomes the accepted
    /// order's `quantity`, so any earlier fills are not carried over.
    pub fn submit_order(&mut self, mut order: Order) -> Result<SubmitOutcome, OrderError> {
        let request = OrderRequest {
            symbol: order.symbol.clone(),
            order_type: order.order_type,
            side: order.side,
            quantity: order.remaining_quantity(),
            price: order.price,
            order_id: Some(order.id),
            timestamp: Some(order.timestamp),
        };
        self.validate_request(&request)?;

        order.quantity = order.remaining_quantity();
        order.timestamp = self.clock.observe(order.timestamp);
        let seq = self.next_sequence();
        order.set_sequence_number(seq);

        Ok(self.execute(order))
    }

    /// Best bid and offer
    pub fn bbo(&self) -> Bbo {
        Bbo {
            symbol: self.symbol.clone(),
            best_bid: self.bids.best_price(),
            best_ask: self.asks.best_price(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Aggregated depth, limited to the configured number of levels
    pub fn snapshot(&self) -> DepthView {
        self.snapshot_depth(self.depth_limit)
    }

    /// Aggregated depth with an explicit level limit (None = full book)
    pub fn snapshot_depth(&self, depth: Option<usize>) -> DepthView {
        DepthView::with_depth(
            self.symbol.clone(),
            self.bids.get_depth(depth),
            self.asks.get_depth(depth),
            chrono::Utc::now(),
        )
    }

    /// Get spread
    pub fn spread(&self) -> Option<Price> {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Price> {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }

    /// Every trade executed by this engine, oldest first
    pub fn trades(&self) -> &[Trade] {
        &self.trade_log
    }

    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    /// Look up a resting order by id
    pub fn resting_order(&self, order_id: OrderId) -> Option<&Order> {
        self.bids
            .levels_best_first()
            .chain(self.asks.levels_best_first())
            .flat_map(|level| level.orders())
            .find(|order| order.id == order_id)
    }

    pub fn resting_order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// Get the symbol name
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    /// Panics if any book invariant is broken; such a state is a logic defect
    pub fn assert_invariants(&self) {
        self.bids.assert_invariants();
        self.asks.assert_invariants();

        if let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) {
            assert!(bid < ask, "crossed book: bid {} >= ask {}", bid, ask);
        }
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn execute(&mut self, mut order: Order) -> SubmitOutcome {
        self.accepted_ids.insert(order.id);
        let accepted = order.clone();
        let executed_at = self.clock.now();

        let (opposite_side, own_side) = match order.side {
            Side::Buy => (&mut self.asks, &mut self.bids),
            Side::Sell => (&mut self.bids, &mut self.asks),
        };

        // All-or-nothing: check feasibility on a read-only pass before touching the book
        if order.order_type == OrderType::Fok {
            let available = self.algorithm.fillable_quantity(&order, opposite_side);
            if available < order.remaining_quantity() {
                tracing::debug!(order_id = %order.id, %available, "fok order killed");
                return SubmitOutcome {
                    order: accepted,
                    trades: Vec::new(),
                    disposition: Disposition::Killed { available },
                };
            }
        }

        let trades = self
            .algorithm
            .match_order(&mut order, opposite_side, executed_at);

        let remaining = order.remaining_quantity();
        let disposition = if remaining.is_zero() {
            Disposition::Filled
        } else if order.order_type.can_rest() {
            match order.price {
                Some(price) => {
                    tracing::debug!(order_id = %order.id, %price, %remaining, "order rested");
                    own_side.add_order(price, order);
                    Disposition::Rested { remaining }
                },
                None => unreachable!("validated limit order without price"),
            }
        } else {
            Disposition::Cancelled { remaining }
        };

        self.trade_log.extend(trades.iter().cloned());

        #[cfg(debug_assertions)]
        self.assert_invariants();

        SubmitOutcome {
            order: accepted,
            trades,
            disposition,
        }
    }

    fn validate_request(&self, request: &OrderRequest) -> Result<(), OrderError> {
        request.validate()?;

        if request.symbol != self.symbol {
            return Err(OrderError::SymbolMismatch {
                expected: self.symbol.clone(),
                got: request.symbol.clone(),
            });
        }

        if let Some(id) = request.order_id {
            if self.accepted_ids.contains(&id) {
                return Err(OrderError::DuplicateOrderId(id));
            }
        }

        Ok(())
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }
}

impl std::fmt::Debug for MatchingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingEngine")
            .field("symbol", &self.symbol)
            .field("algorithm", &self.algorithm.name())
            .field("bid_levels", &self.bids.level_count())
            .field("ask_levels", &self.asks.level_count())
            .field("trades", &self.trade_log.len())
            .finish()
    }
}
