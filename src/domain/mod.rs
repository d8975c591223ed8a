// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod errors;
pub mod order;
pub mod order_book;
pub mod trade;

pub use config::EngineConfig;
pub use errors::{ConfigError, OrderError};
pub use order::{
    Order, OrderId, OrderRequest, OrderType, Price, Quantity, Side, MAX_MAGNITUDE,
};
pub use order_book::{Bbo, DepthView, LevelFill, OrderBookSide, PriceLevel};
pub use trade::{Trade, TradeId};
