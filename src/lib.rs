// ============================================================================
// Spot Engine Library
// Single-symbol limit order book with price/time matching
// ============================================================================

//! # Spot Engine
//!
//! An in-memory order book for one trading symbol that matches incoming
//! orders against resting liquidity under strict price/time priority.
//!
//! ## Features
//!
//! - **Market, limit, IOC and FOK orders** validated at the submission boundary
//! - **Exact decimal arithmetic** for prices and quantities
//! - **Aggregated depth and BBO** views taken after every submission
//! - **Market data fan-out** that never blocks on a slow subscriber
//! - **JSON-lines journal** of accepted orders and trades (`serde` feature)
//! - **Single-task engine actor** over tokio channels (`async` feature)
//!
//! ## Example
//!
//! ```rust
//! use spot_engine::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let mut engine = MatchingEngine::price_time("BTC-USDT");
//!
//! engine
//!     .submit(OrderRequest::limit("BTC-USDT", Side::Sell, Decimal::from(30000), Decimal::from(2)))
//!     .unwrap();
//! let outcome = engine
//!     .submit(OrderRequest::market("BTC-USDT", Side::Buy, Decimal::ONE))
//!     .unwrap();
//!
//! assert_eq!(outcome.trades.len(), 1);
//! assert_eq!(outcome.disposition, Disposition::Filled);
//!
//! let snapshot = engine.snapshot();
//! println!("Best ask: {:?}", snapshot.best_ask());
//! println!("Spread: {:?}", snapshot.spread);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod market_data;
#[cfg(feature = "serde")]
pub mod persistence;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Bbo, ConfigError, DepthView, EngineConfig, Order, OrderBookSide, OrderError, OrderId,
        OrderRequest, OrderType, Price, Quantity, Side, Trade, TradeId,
    };
    #[cfg(feature = "async")]
    pub use crate::engine::actor::{spawn_engine, EngineHandle, EngineHandleError};
    pub use crate::engine::{
        create_from_config, create_service, BuildError, Disposition, MatchingEngine,
        MatchingEngineBuilder, MatchingService, PriceTimePriority, SubmitOutcome,
    };
    pub use crate::interfaces::{
        EventHandler, LoggingEventHandler, MatchingAlgorithm, NoOpEventHandler, OrderEvent,
    };
    pub use crate::market_data::{Broadcaster, Channel, MarketMessage, Subscription};
    #[cfg(feature = "serde")]
    pub use crate::persistence::{JournalRecord, TradeJournal};
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use quickcheck::quickcheck;
    use rust_decimal::Decimal;

    const SYMBOL: &str = "BTC-USDT";

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_market_buy_partially_consumes_resting_sell() {
        let mut engine = MatchingEngine::price_time(SYMBOL);
        engine
            .submit(OrderRequest::limit(SYMBOL, Side::Sell, dec("30000"), dec("2")))
            .unwrap();

        let outcome = engine
            .submit(OrderRequest::market(SYMBOL, Side::Buy, dec("1")))
            .unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].quantity, dec("1"));
        assert_eq!(outcome.trades[0].price, dec("30000"));
        assert_eq!(engine.snapshot().asks, vec![(dec("30000"), dec("1"))]);
    }

    #[test]
    fn test_fok_fully_fillable_executes() {
        let mut engine = MatchingEngine::price_time(SYMBOL);
        engine
            .submit(OrderRequest::limit(SYMBOL, Side::Sell, dec("30000"), dec("1")))
            .unwrap();

        let outcome = engine
            .submit(OrderRequest::fok(SYMBOL, Side::Buy, dec("30000"), dec("1")))
            .unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].quantity, dec("1"));
        assert_eq!(outcome.trades[0].price, dec("30000"));
        let snapshot = engine.snapshot();
        assert!(snapshot.bids.is_empty());
        assert!(snapshot.asks.is_empty());
    }

    #[test]
    fn test_fok_short_of_liquidity_leaves_book_untouched() {
        let mut engine = MatchingEngine::price_time(SYMBOL);
        engine
            .submit(OrderRequest::limit(SYMBOL, Side::Sell, dec("30000"), dec("0.5")))
            .unwrap();

        let outcome = engine
            .submit(OrderRequest::fok(SYMBOL, Side::Buy, dec("30000"), dec("1")))
            .unwrap();

        assert!(outcome.trades.is_empty());
        assert_eq!(
            outcome.disposition,
            Disposition::Killed {
                available: dec("0.5")
            }
        );
        assert_eq!(engine.snapshot().asks, vec![(dec("30000"), dec("0.5"))]);
        assert!(engine.trades().is_empty());
    }

    #[test]
    fn test_bbo_reports_inner_prices() {
        let mut engine = MatchingEngine::price_time(SYMBOL);
        for (side, price) in [
            (Side::Buy, "29000"),
            (Side::Buy, "29500"),
            (Side::Sell, "31000"),
            (Side::Sell, "30500"),
        ] {
            engine
                .submit(OrderRequest::limit(SYMBOL, side, dec(price), dec("1")))
                .unwrap();
        }

        let bbo = engine.bbo();
        assert_eq!(bbo.best_bid, Some(dec("29500")));
        assert_eq!(bbo.best_ask, Some(dec("30500")));
        assert_eq!(bbo.spread(), Some(dec("1000")));
    }

    #[test]
    fn test_string_boundary_rejects_unknown_type() {
        let err = OrderRequest::parse(SYMBOL, "stop", "buy", dec("1"), None).unwrap_err();
        assert_eq!(err, OrderError::UnknownOrderType("stop".to_string()));
    }

    quickcheck! {
        fn prop_snapshot_sorted_and_uncrossed(orders: Vec<(u8, u8, bool)>) -> bool {
            let mut engine = MatchingEngine::price_time(SYMBOL);
            for (price, quantity, is_buy) in orders {
                let side = if is_buy { Side::Buy } else { Side::Sell };
                let price = Decimal::from(u32::from(price) % 50 + 100);
                let quantity = Decimal::from(u32::from(quantity) % 5 + 1);
                if engine.submit(OrderRequest::limit(SYMBOL, side, price, quantity)).is_err() {
                    return false;
                }
            }

            let snapshot = engine.snapshot();
            let bids_desc = snapshot.bids.windows(2).all(|w| w[0].0 > w[1].0);
            let asks_asc = snapshot.asks.windows(2).all(|w| w[0].0 < w[1].0);
            let uncrossed = match (snapshot.best_bid(), snapshot.best_ask()) {
                (Some(bid), Some(ask)) => bid < ask,
                _ => true,
            };
            bids_desc && asks_asc && uncrossed
        }
    }
}
