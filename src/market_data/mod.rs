// ============================================================================
// Market Data Module
// Trade and depth fan-out to subscribers
// ============================================================================

mod broadcaster;
mod message;

pub use broadcaster::{Broadcaster, SubscriberId, Subscription};
pub use message::{Channel, MarketMessage};
