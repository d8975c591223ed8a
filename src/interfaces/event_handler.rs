// ============================================================================
// Event Handler Interface
// Event sourcing pattern for audit trail, persistence and market data
// ============================================================================

use crate::domain::{DepthView, Order, OrderId, Quantity, Trade};
use chrono::{DateTime, Utc};

/// All events emitted around the matching engine
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// Order passed validation; identity and timestamp assigned
    OrderAccepted { order: Order },

    /// Order rejected with reason
    OrderRejected {
        order_id: Option<OrderId>,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order matched, trade generated
    TradeExecuted { trade: Trade },

    /// Order fully filled
    OrderFilled {
        order_id: OrderId,
        total_filled: Quantity,
    },

    /// Limit order remainder added to book
    OrderRested {
        order_id: OrderId,
        remaining_quantity: Quantity,
    },

    /// Market or IOC remainder discarded after the matching pass
    RemainderCancelled {
        order_id: OrderId,
        filled_quantity: Quantity,
        cancelled_quantity: Quantity,
    },

    /// FOK order could not be filled completely; nothing executed
    OrderKilled {
        order_id: OrderId,
        available_quantity: Quantity,
    },

    /// Book depth after a completed submission
    BookUpdated { snapshot: DepthView },
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, persistence, market data fan-out, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: &OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: &[OrderEvent]) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: &OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: &OrderEvent) {
        tracing::debug!("Matching engine event: {:?}", event);
    }
}
