// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// Most common in traditional exchanges (NASDAQ, NYSE, etc.)
// ============================================================================

use crate::domain::{Order, OrderBookSide, Trade};
use crate::interfaces::MatchingAlgorithm;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price/Time Priority (FIFO) matching algorithm
///
/// Levels are visited best price first; orders at the same price level are
/// matched in arrival order. Every trade executes at the resting price.
///
/// # Example
/// ```text
/// Book:  30000 @ 1.0 BTC (Order A, t=100)
///        30000 @ 2.0 BTC (Order B, t=101)
///
/// Incoming: Buy 1.5 BTC @ 30000
/// Result: Match 1.0 with A, then 0.5 with B (B keeps 1.5, stays at head)
/// ```
#[derive(Debug, Default)]
pub struct PriceTimePriority;

impl PriceTimePriority {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn match_order(
        &self,
        incoming_order: &mut Order,
        opposite_side: &mut OrderBookSide,
        executed_at: DateTime<Utc>,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();

        while incoming_order.remaining_quantity() > Decimal::ZERO {
            // Get best price level
            let best_price = match opposite_side.best_price() {
                Some(price) => price,
                None => break,
            };

            // Levels are visited best first, so the first miss ends the scan
            if !self.prices_cross(incoming_order, best_price) {
                break;
            }

            let Some(level) = opposite_side.level_mut(best_price) else {
                unreachable!("best price {} has no level", best_price);
            };

            while incoming_order.remaining_quantity() > Decimal::ZERO {
                let Some(fill) = level.fill_front(incoming_order.remaining_quantity()) else {
                    break;
                };

                incoming_order.fill(fill.quantity);

                tracing::debug!(
                    maker = %fill.maker_order_id,
                    taker = %incoming_order.id,
                    price = %fill.price,
                    quantity = %fill.quantity,
                    "trade executed"
                );

                trades.push(Trade::new(
                    incoming_order.symbol.clone(),
                    fill.maker_order_id,
                    incoming_order.id,
                    incoming_order.side,
                    fill.price,
                    fill.quantity,
                    executed_at,
                ));

                // A maker left with quantity absorbed the whole remainder
                if fill.maker_remaining > Decimal::ZERO {
                    break;
                }
            }

            // Clean up empty levels
            opposite_side.remove_level_if_empty(best_price);
        }

        trades
    }

    fn name(&self) -> &str {
        "PriceTime"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderType, Side};

    fn order(side: Side, order_type: OrderType, price: Option<i64>, qty: Decimal) -> Order {
        Order::new("BTC-USDT", side, order_type, price.map(Decimal::from), qty)
    }

    fn rest(side: &mut OrderBookSide, order: Order) {
        let price = order.price.unwrap();
        side.add_order(price, order);
    }

    #[test]
    fn test_price_time_fifo_order() {
        let algo = PriceTimePriority::new();
        let mut asks = OrderBookSide::new(Side::Sell);

        // Two sell orders at same price, different arrival
        let sell1 = order(Side::Sell, OrderType::Limit, Some(30000), Decimal::ONE);
        let sell2 = order(Side::Sell, OrderType::Limit, Some(30000), Decimal::ONE);
        let sell1_id = sell1.id;
        let sell2_id = sell2.id;
        rest(&mut asks, sell1);
        rest(&mut asks, sell2);

        let mut buy = order(Side::Buy, OrderType::Limit, Some(30000), Decimal::ONE);
        let trades = algo.match_order(&mut buy, &mut asks, Utc::now());

        assert_eq!(trades.len(), 1);
        // Should match with first order (sell1) due to FIFO
        assert_eq!(trades[0].maker_order_id, sell1_id);
        assert_eq!(
            asks.level(Decimal::from(30000)).and_then(|l| l.front()).map(|o| o.id),
            Some(sell2_id)
        );
    }

    #[test]
    fn test_price_time_partial_fill() {
        let algo = PriceTimePriority::new();
        let mut asks = OrderBookSide::new(Side::Sell);
        rest(
            &mut asks,
            order(Side::Sell, OrderType::Limit, Some(30000), Decimal::ONE),
        );

        // Buy more than available
        let mut buy = order(Side::Buy, OrderType::Limit, Some(30000), Decimal::from(2));
        let trades = algo.match_order(&mut buy, &mut asks, Utc::now());

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, Decimal::ONE);
        assert_eq!(buy.remaining_quantity(), Decimal::ONE);
        assert!(asks.is_empty());
    }

    #[test]
    fn test_best_price_first_and_maker_price() {
        let algo = PriceTimePriority::new();
        let mut asks = OrderBookSide::new(Side::Sell);
        rest(&mut asks, order(Side::Sell, OrderType::Limit, Some(30500), Decimal::ONE));
        rest(&mut asks, order(Side::Sell, OrderType::Limit, Some(30000), Decimal::ONE));
        rest(&mut asks, order(Side::Sell, OrderType::Limit, Some(31000), Decimal::ONE));

        let mut buy = order(Side::Buy, OrderType::Limit, Some(30600), Decimal::from(3));
        let trades = algo.match_order(&mut buy, &mut asks, Utc::now());

        // Stops at 31000, which is above the limit
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, Decimal::from(30000));
        assert_eq!(trades[1].price, Decimal::from(30500));
        assert!(trades.iter().all(|t| t.aggressor_side == Side::Buy));
        assert_eq!(asks.best_price(), Some(Decimal::from(31000)));
        assert_eq!(buy.remaining_quantity(), Decimal::ONE);
    }

    #[test]
    fn test_sell_walks_bids_descending() {
        let algo = PriceTimePriority::new();
        let mut bids = OrderBookSide::new(Side::Buy);
        rest(&mut bids, order(Side::Buy, OrderType::Limit, Some(29000), Decimal::ONE));
        rest(&mut bids, order(Side::Buy, OrderType::Limit, Some(29500), Decimal::ONE));

        let mut sell = order(Side::Sell, OrderType::Market, None, Decimal::from(5));
        let trades = algo.match_order(&mut sell, &mut bids, Utc::now());

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, Decimal::from(29500));
        assert_eq!(trades[1].price, Decimal::from(29000));
        assert!(bids.is_empty());
        assert_eq!(sell.remaining_quantity(), Decimal::from(3));
    }

    #[test]
    fn test_fillable_quantity_respects_limit() {
        let algo = PriceTimePriority::new();
        let mut asks = OrderBookSide::new(Side::Sell);
        rest(&mut asks, order(Side::Sell, OrderType::Limit, Some(30000), Decimal::new(5, 1)));
        rest(&mut asks, order(Side::Sell, OrderType::Limit, Some(30100), Decimal::from(4)));

        let fok = order(Side::Buy, OrderType::Fok, Some(30000), Decimal::ONE);
        assert_eq!(algo.fillable_quantity(&fok, &asks), Decimal::new(5, 1));

        let wider = order(Side::Buy, OrderType::Fok, Some(30100), Decimal::ONE);
        assert_eq!(algo.fillable_quantity(&wider, &asks), Decimal::ONE);

        // Read-only: nothing consumed
        assert_eq!(asks.total_quantity(), Decimal::new(45, 1));
    }
}
