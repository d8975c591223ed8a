// ============================================================================
// Market Data Broadcaster
// Best-effort fan-out of trades and depth to subscribers
// ============================================================================

use super::message::{Channel, MarketMessage};
use crate::domain::{DepthView, Trade};
use crate::interfaces::{EventHandler, OrderEvent};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub type SubscriberId = u64;

/// Receiving end handed to a subscriber
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub channel: Channel,
    pub receiver: Receiver<MarketMessage>,
}

struct Subscriber {
    id: SubscriberId,
    channel: Channel,
    sender: Sender<MarketMessage>,
}

/// Subscriber registry with non-blocking delivery.
///
/// Each subscriber owns a bounded queue. A push never waits: a subscriber
/// whose queue is full or whose receiver is gone is dropped from the set,
/// and delivery to everyone else continues.
pub struct Broadcaster {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, channel: Channel) -> Subscription {
        let (sender, receiver) = channel::bounded(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers.lock().push(Subscriber {
            id,
            channel,
            sender,
        });
        tracing::debug!(subscriber = id, channel = channel.as_str(), "subscribed");

        Subscription {
            id,
            channel,
            receiver,
        }
    }

    /// Returns false if the subscriber was already gone
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Push to every subscriber of the message's channel; returns deliveries
    pub fn publish(&self, message: &MarketMessage) -> usize {
        let channel = message.channel();
        let mut delivered = 0;

        self.subscribers.lock().retain(|subscriber| {
            if subscriber.channel != channel {
                return true;
            }

            match subscriber.sender.try_send(message.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                },
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = subscriber.id, "subscriber lagging, dropped");
                    false
                },
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!(subscriber = subscriber.id, "subscriber disconnected");
                    false
                },
            }
        });

        delivered
    }

    pub fn publish_trades(&self, trades: &[Trade]) {
        for trade in trades {
            self.publish(&MarketMessage::Trade(trade.clone()));
        }
    }

    pub fn publish_depth(&self, snapshot: &DepthView) {
        self.publish(&MarketMessage::OrderBook(snapshot.clone()));
    }
}

impl EventHandler for Broadcaster {
    fn on_event(&self, event: &OrderEvent) {
        match event {
            OrderEvent::TradeExecuted { trade } => {
                self.publish(&MarketMessage::Trade(trade.clone()));
            },
            OrderEvent::BookUpdated { snapshot } => self.publish_depth(snapshot),
            _ => {},
        }
    }
}
