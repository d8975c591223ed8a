// ============================================================================
// Domain Errors
// Validation failures raised at the submission and configuration boundaries
// ============================================================================

use super::order::{OrderId, OrderType, Price, Quantity};
use thiserror::Error;

/// Reasons an order is rejected before it reaches the matching pass.
///
/// A rejected order never mutates the book and never produces a trade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Quantity),

    #[error("{0} orders must have a price")]
    MissingPrice(OrderType),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Price),

    #[error("quantity {0} exceeds the accepted maximum")]
    QuantityOutOfRange(Quantity),

    #[error("price {0} exceeds the accepted maximum")]
    PriceOutOfRange(Price),

    #[error("order id {0} has already been used")]
    DuplicateOrderId(OrderId),

    #[error("unknown order type: {0:?}")]
    UnknownOrderType(String),

    #[error("unknown side: {0:?}")]
    UnknownSide(String),

    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("order for {got} submitted to the {expected} book")]
    SymbolMismatch { expected: String, got: String },
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("depth limit must be at least one level")]
    ZeroDepthLimit,

    #[error("subscriber capacity must be at least one message")]
    ZeroSubscriberCapacity,
}
