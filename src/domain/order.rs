// ============================================================================
// Order Domain Model
// ============================================================================

use super::errors::OrderError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Limit and execution prices
pub type Price = Decimal;

/// Order and trade quantities (fractional lots allowed)
pub type Quantity = Decimal;

/// Largest price or quantity accepted at submission. Keeps level totals,
/// liquidity sums and mid prices far inside `Decimal`'s range.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000_000;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(OrderError::UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrderType {
    /// Takes any available liquidity, price ignored, never rests
    Market,
    /// Takes price-eligible liquidity, remainder rests
    Limit,
    /// Immediate Or Cancel - takes price-eligible liquidity, remainder discarded
    Ioc,
    /// Fill Or Kill - fills the whole quantity at eligible prices or nothing
    Fok,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Ioc => "ioc",
            OrderType::Fok => "fok",
        }
    }

    /// Every type except market carries a limit price
    pub fn requires_price(self) -> bool {
        !matches!(self, OrderType::Market)
    }

    /// Only limit orders may leave a remainder in the book
    pub fn can_rest(self) -> bool {
        matches!(self, OrderType::Limit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "ioc" => Ok(OrderType::Ioc),
            "fok" => Ok(OrderType::Fok),
            _ => Err(OrderError::UnknownOrderType(s.to_string())),
        }
    }
}

// ============================================================================
// Submission Request
// ============================================================================

/// An order as submitted by a caller, before the engine assigns identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    #[cfg_attr(feature = "serde", serde(default))]
    pub price: Option<Price>,
    /// Caller-supplied identity; generated when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub order_id: Option<OrderId>,
    /// Caller-supplied submission time; taken from the engine clock when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<DateTime<Utc>>,
}

impl OrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        order_type: OrderType,
        side: Side,
        quantity: Quantity,
        price: Option<Price>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            order_type,
            side,
            quantity,
            price,
            order_id: None,
            timestamp: None,
        }
    }

    pub fn market(symbol: impl Into<String>, side: Side, quantity: Quantity) -> Self {
        Self::new(symbol, OrderType::Market, side, quantity, None)
    }

    pub fn limit(symbol: impl Into<String>, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(symbol, OrderType::Limit, side, quantity, Some(price))
    }

    pub fn ioc(symbol: impl Into<String>, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(symbol, OrderType::Ioc, side, quantity, Some(price))
    }

    pub fn fok(symbol: impl Into<String>, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(symbol, OrderType::Fok, side, quantity, Some(price))
    }

    /// Build a request from untyped wire fields, rejecting unknown types and sides.
    pub fn parse(
        symbol: &str,
        order_type: &str,
        side: &str,
        quantity: Quantity,
        price: Option<Price>,
    ) -> Result<Self, OrderError> {
        Ok(Self::new(
            symbol,
            order_type.parse()?,
            side.parse()?,
            quantity,
            price,
        ))
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Well-formedness checks that do not depend on book state.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderError::EmptySymbol);
        }

        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::NonPositiveQuantity(self.quantity));
        }

        if self.quantity > Decimal::from(MAX_MAGNITUDE) {
            return Err(OrderError::QuantityOutOfRange(self.quantity));
        }

        if self.order_type.requires_price() {
            match self.price {
                None => return Err(OrderError::MissingPrice(self.order_type)),
                Some(price) if price <= Decimal::ZERO => {
                    return Err(OrderError::NonPositivePrice(price))
                },
                Some(price) if price > Decimal::from(MAX_MAGNITUDE) => {
                    return Err(OrderError::PriceOutOfRange(price))
                },
                Some(_) => {},
            }
        }

        Ok(())
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// An accepted order. Once resting, only the engine mutates its remaining quantity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    /// Limit price; always `None` for market orders
    pub price: Option<Price>,
    /// Quantity at submission
    pub quantity: Quantity,
    pub timestamp: DateTime<Utc>,
    remaining_quantity: Quantity,
    sequence_number: u64,
}

impl Order {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        price: Option<Price>,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: OrderId::new(),
            symbol: symbol.into(),
            order_type,
            side,
            price: if order_type.requires_price() { price } else { None },
            quantity,
            timestamp: Utc::now(),
            remaining_quantity: quantity,
            sequence_number: 0,
        }
    }

    /// Accept a validated request with the identity and time assigned by the engine.
    pub(crate) fn accept(
        request: OrderRequest,
        id: OrderId,
        timestamp: DateTime<Utc>,
        sequence_number: u64,
    ) -> Self {
        let price = if request.order_type.requires_price() {
            request.price
        } else {
            None
        };

        Self {
            id,
            symbol: request.symbol,
            order_type: request.order_type,
            side: request.side,
            price,
            quantity: request.quantity,
            timestamp,
            remaining_quantity: request.quantity,
            sequence_number,
        }
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub(crate) fn set_sequence_number(&mut self, seq: u64) {
        self.sequence_number = seq;
    }

    /// Reduce the remaining quantity by an executed amount.
    pub(crate) fn fill(&mut self, quantity: Quantity) {
        debug_assert!(quantity > Decimal::ZERO, "fill of non-positive quantity");
        debug_assert!(
            quantity <= self.remaining_quantity,
            "overfill: {} > {}",
            quantity,
            self.remaining_quantity
        );
        self.remaining_quantity -= quantity;
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.order_type, OrderType::Limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_creation() {
        let order = Order::new(
            "BTC-USDT",
            Side::Buy,
            OrderType::Limit,
            Some(Decimal::from(30000)),
            Decimal::from(1),
        );

        assert_eq!(order.remaining_quantity(), Decimal::from(1));
        assert_eq!(order.filled_quantity(), Decimal::ZERO);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_market_order_drops_price() {
        let order = Order::new(
            "BTC-USDT",
            Side::Buy,
            OrderType::Market,
            Some(Decimal::from(30000)),
            Decimal::from(1),
        );
        assert_eq!(order.price, None);
        assert!(order.is_market_order());
    }

    #[test]
    fn test_fill() {
        let mut order = Order::new(
            "BTC-USDT",
            Side::Sell,
            OrderType::Limit,
            Some(Decimal::from(30000)),
            Decimal::from(10),
        );

        order.fill(Decimal::from(3));
        assert_eq!(order.filled_quantity(), Decimal::from(3));
        assert_eq!(order.remaining_quantity(), Decimal::from(7));

        order.fill(Decimal::from(7));
        assert!(order.is_filled());
    }

    #[test]
    fn test_parse_side_and_type() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!("fok".parse::<OrderType>().unwrap(), OrderType::Fok);
        assert_eq!(" Ioc ".parse::<OrderType>().unwrap(), OrderType::Ioc);

        assert_eq!(
            "short".parse::<Side>(),
            Err(OrderError::UnknownSide("short".to_string()))
        );
        assert_eq!(
            "stop".parse::<OrderType>(),
            Err(OrderError::UnknownOrderType("stop".to_string()))
        );
    }

    #[test]
    fn test_request_parse() {
        let request =
            OrderRequest::parse("BTC-USDT", "limit", "sell", Decimal::from(2), Some(Decimal::from(30000)))
                .unwrap();
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.side, Side::Sell);

        assert!(OrderRequest::parse("BTC-USDT", "gtc", "sell", Decimal::ONE, None).is_err());
    }

    #[test]
    fn test_request_validation() {
        let missing_price = OrderRequest::new(
            "BTC-USDT",
            OrderType::Ioc,
            Side::Buy,
            Decimal::ONE,
            None,
        );
        assert_eq!(
            missing_price.validate(),
            Err(OrderError::MissingPrice(OrderType::Ioc))
        );

        let zero_qty = OrderRequest::market("BTC-USDT", Side::Buy, Decimal::ZERO);
        assert_eq!(
            zero_qty.validate(),
            Err(OrderError::NonPositiveQuantity(Decimal::ZERO))
        );

        let negative_price =
            OrderRequest::limit("BTC-USDT", Side::Buy, Decimal::from(-5), Decimal::ONE);
        assert_eq!(
            negative_price.validate(),
            Err(OrderError::NonPositivePrice(Decimal::from(-5)))
        );

        let empty_symbol = OrderRequest::market("  ", Side::Sell, Decimal::ONE);
        assert_eq!(empty_symbol.validate(), Err(OrderError::EmptySymbol));

        // Market orders need no price
        assert!(OrderRequest::market("BTC-USDT", Side::Sell, Decimal::ONE)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_request_magnitude_bounds() {
        let huge_qty = OrderRequest::limit("BTC-USDT", Side::Sell, Decimal::ONE, Decimal::MAX);
        assert_eq!(
            huge_qty.validate(),
            Err(OrderError::QuantityOutOfRange(Decimal::MAX))
        );

        let huge_price = OrderRequest::limit("BTC-USDT", Side::Sell, Decimal::MAX, Decimal::ONE);
        assert_eq!(
            huge_price.validate(),
            Err(OrderError::PriceOutOfRange(Decimal::MAX))
        );

        let at_bound = OrderRequest::limit(
            "BTC-USDT",
            Side::Sell,
            Decimal::from(MAX_MAGNITUDE),
            Decimal::from(MAX_MAGNITUDE),
        );
        assert!(at_bound.validate().is_ok());
    }
}
