// ============================================================================
// Market Data Messages
// ============================================================================

use crate::domain::{DepthView, Trade};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Subscription channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    /// Every executed trade, in execution order
    Trades,
    /// Aggregated depth after every submission
    OrderBook,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Trades => "trades",
            Channel::OrderBook => "orderbook",
        }
    }
}

/// Payload pushed to subscribers.
///
/// On the wire: `{"type": "trade", "data": {...}}` or
/// `{"type": "order_book", "data": {...}}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "data", rename_all = "snake_case")
)]
pub enum MarketMessage {
    Trade(Trade),
    OrderBook(DepthView),
}

impl MarketMessage {
    pub fn channel(&self) -> Channel {
        match self {
            MarketMessage::Trade(_) => Channel::Trades,
            MarketMessage::OrderBook(_) => Channel::OrderBook,
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
