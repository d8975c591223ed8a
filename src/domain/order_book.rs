// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

use super::{Order, OrderId, Price, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// Result of executing against the head of a price level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFill {
    pub maker_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    /// Maker quantity left after this fill; zero means it was removed
    pub maker_remaining: Quantity,
}

/// FIFO queue of resting orders at one price.
///
/// `total_quantity` always equals the sum of the queued orders' remaining
/// quantities, and no queued order has a zero remainder.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<Order>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Decimal::ZERO,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Append at the tail (lowest time priority)
    pub fn push_back(&mut self, order: Order) {
        debug_assert!(order.remaining_quantity() > Decimal::ZERO);
        self.total_quantity += order.remaining_quantity();
        self.orders.push_back(order);
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Execute up to `quantity` against the head order.
    ///
    /// The head is popped once it is exhausted, otherwise it keeps its position.
    pub fn fill_front(&mut self, quantity: Quantity) -> Option<LevelFill> {
        let maker = self.orders.front_mut()?;
        let executed = quantity.min(maker.remaining_quantity());
        if executed <= Decimal::ZERO {
            return None;
        }

        maker.fill(executed);
        self.total_quantity -= executed;

        let fill = LevelFill {
            maker_order_id: maker.id,
            price: self.price,
            quantity: executed,
            maker_remaining: maker.remaining_quantity(),
        };

        if fill.maker_remaining.is_zero() {
            self.orders.pop_front();
        }

        Some(fill)
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

// ============================================================================
// Order Book Side
// ============================================================================

/// One side of the book (bids or asks), price levels keyed by price.
///
/// A level present in the map is never empty.
#[derive(Debug, Clone)]
pub struct OrderBookSide {
    levels: BTreeMap<Price, PriceLevel>,
    side: Side,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Rest an order at the tail of its price level, creating the level if absent
    pub fn add_order(&mut self, price: Price, order: Order) {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(order);
    }

    /// Get the best (top-of-book) price
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Buy => self.levels.keys().next_back().copied(),
            // Lowest ask (first in sorted order)
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Drop a level once its queue has drained
    pub fn remove_level_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    /// Levels from best to worst price
    pub fn levels_best_first(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Aggregated (price, quantity) pairs, best first, optionally truncated
    pub fn get_depth(&self, num_levels: Option<usize>) -> Vec<(Price, Quantity)> {
        self.levels_best_first()
            .take(num_levels.unwrap_or(usize::MAX))
            .map(|level| (level.price(), level.total_quantity()))
            .collect()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().map(PriceLevel::total_quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Panics if a structural invariant of the side is broken
    pub fn assert_invariants(&self) {
        for (price, level) in &self.levels {
            assert_eq!(*price, level.price(), "level keyed under wrong price");
            assert!(!level.is_empty(), "empty level left at {}", price);

            let mut sum = Decimal::ZERO;
            for order in level.orders() {
                assert!(
                    order.remaining_quantity() > Decimal::ZERO,
                    "order {} resting with {}",
                    order.id,
                    order.remaining_quantity()
                );
                assert_eq!(order.side, self.side, "order {} on wrong side", order.id);
                sum += order.remaining_quantity();
            }
            assert_eq!(sum, level.total_quantity(), "level total drift at {}", price);
        }
    }
}

// ============================================================================
// Best Bid / Offer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bbo {
    pub symbol: String,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub timestamp: DateTime<Utc>,
}

impl Bbo {
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

// ============================================================================
// Depth View
// ============================================================================

/// Immutable snapshot of aggregated book depth
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepthView {
    pub symbol: String,
    /// Bid levels (price, quantity), highest price first
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels (price, quantity), lowest price first
    pub asks: Vec<(Price, Quantity)>,
    /// Current spread (ask - bid)
    pub spread: Option<Price>,
    /// Mid price
    pub mid_price: Option<Price>,
    pub timestamp: DateTime<Utc>,
}

impl DepthView {
    pub fn with_depth(
        symbol: String,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let spread = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        };

        let mid_price = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        };

        Self {
            symbol,
            bids,
            asks,
            spread,
            mid_price,
            timestamp,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_quantity(&self) -> Quantity {
        self.bids.iter().map(|(_, qty)| qty).sum()
    }

    pub fn total_ask_quantity(&self) -> Quantity {
        self.asks.iter().map(|(_, qty)| qty).sum()
    }
}
