// ============================================================================
// Engine Configuration
// ============================================================================

use super::errors::ConfigError;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default buffer per market data subscriber before it is considered too slow
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 1024;

/// Configuration for a single-symbol matching engine and its collaborators
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// The only symbol this engine accepts (e.g., "BTC-USDT")
    pub symbol: String,

    /// Optional: number of levels per side in published depth snapshots
    /// None means full depth
    pub depth_limit: Option<usize>,

    /// Messages buffered per market data subscriber
    pub subscriber_capacity: usize,

    /// Optional: append-only journal for accepted orders and trades
    /// None disables persistence
    pub journal_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Create a new configuration with required parameters
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            depth_limit: None,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            journal_path: None,
        }
    }

    /// Builder method: Limit published depth
    pub fn with_depth_limit(mut self, levels: usize) -> Self {
        self.depth_limit = Some(levels);
        self
    }

    /// Builder method: Set per-subscriber buffer
    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity;
        self
    }

    /// Builder method: Enable the order/trade journal
    pub fn with_journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }

        if self.depth_limit == Some(0) {
            return Err(ConfigError::ZeroDepthLimit);
        }

        if self.subscriber_capacity == 0 {
            return Err(ConfigError::ZeroSubscriberCapacity);
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("BTC-USDT")
    }
}
