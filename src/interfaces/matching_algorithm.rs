// ============================================================================
// Matching Algorithm Interface
// Defines the contract for the book's matching pass
// ============================================================================

use crate::domain::{Order, OrderBookSide, OrderType, Price, Quantity, Side, Trade};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Strategy pattern interface for matching algorithms
pub trait MatchingAlgorithm: Send + Sync {
    /// Match an incoming order against the opposite side of the book
    ///
    /// # Arguments
    /// * `incoming_order` - The new order; its remaining quantity is decremented
    /// * `opposite_side` - The opposite side of the order book
    /// * `executed_at` - Timestamp stamped on every trade of this pass
    ///
    /// # Returns
    /// Trades in execution order
    fn match_order(
        &self,
        incoming_order: &mut Order,
        opposite_side: &mut OrderBookSide,
        executed_at: DateTime<Utc>,
    ) -> Vec<Trade>;

    /// Get the algorithm name for logging
    fn name(&self) -> &str;

    /// Check if an incoming order may trade at a resting price
    /// Market orders cross any price
    fn prices_cross(&self, incoming: &Order, book_price: Price) -> bool {
        if incoming.order_type == OrderType::Market {
            return true;
        }

        match (incoming.side, incoming.price) {
            (_, None) => true,
            (Side::Buy, Some(limit)) => book_price <= limit,
            (Side::Sell, Some(limit)) => book_price >= limit,
        }
    }

    /// Quantity the incoming order could execute right now, without mutating the book.
    ///
    /// Walks eligible levels best first and stops once the order's remaining
    /// quantity is covered, so the result never exceeds that remainder.
    fn fillable_quantity(&self, incoming: &Order, opposite_side: &OrderBookSide) -> Quantity {
        let wanted = incoming.remaining_quantity();
        let mut available = Decimal::ZERO;

        for level in opposite_side.levels_best_first() {
            if available >= wanted || !self.prices_cross(incoming, level.price()) {
                break;
            }
            available += level.total_quantity();
        }

        available.min(wanted)
    }
}
