// ============================================================================
// Engine Factory
// Creates matching engines and wired services from configuration
// ============================================================================

use crate::domain::{ConfigError, EngineConfig};
use crate::engine::{MatchingEngine, MatchingService, PriceTimePriority};
use crate::interfaces::{LoggingEventHandler, MatchingAlgorithm};
use crate::market_data::Broadcaster;
use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "serde")]
use crate::persistence::{JournalError, TradeJournal};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[cfg(feature = "serde")]
    #[error("failed to open journal: {0}")]
    Journal(#[from] JournalError),
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a price/time matching engine from configuration
///
/// # Example
/// ```
/// use spot_engine::prelude::*;
///
/// let config = EngineConfig::new("BTC-USDT").with_depth_limit(10);
/// let engine = create_from_config(&config).unwrap();
/// assert_eq!(engine.symbol(), "BTC-USDT");
/// ```
pub fn create_from_config(config: &EngineConfig) -> Result<MatchingEngine, ConfigError> {
    MatchingEngineBuilder::from_config(config.clone()).build()
}

/// Creates a shared service with logging, the optional journal and market data
/// fan-out attached, in that order. Returns the broadcaster for subscribing.
pub fn create_service(
    config: &EngineConfig,
) -> Result<(MatchingService, Arc<Broadcaster>), BuildError> {
    let engine = create_from_config(config)?;
    let broadcaster = Arc::new(Broadcaster::new(config.subscriber_capacity));

    let service = MatchingService::new(engine).with_handler(Arc::new(LoggingEventHandler));
    let service = attach_journal(service, config)?;
    let service = service.with_handler(broadcaster.clone());

    tracing::info!(symbol = %config.symbol, "matching service ready");
    Ok((service, broadcaster))
}

#[cfg(feature = "serde")]
fn attach_journal(
    service: MatchingService,
    config: &EngineConfig,
) -> Result<MatchingService, BuildError> {
    match &config.journal_path {
        Some(path) => {
            let journal = TradeJournal::open(path)?;
            tracing::info!(path = %path.display(), "journal attached");
            Ok(service.with_handler(Arc::new(journal)))
        },
        None => Ok(service),
    }
}

#[cfg(not(feature = "serde"))]
fn attach_journal(
    service: MatchingService,
    config: &EngineConfig,
) -> Result<MatchingService, BuildError> {
    if config.journal_path.is_some() {
        tracing::warn!("journal_path ignored: built without the serde feature");
    }
    Ok(service)
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use spot_engine::prelude::*;
///
/// let engine = MatchingEngineBuilder::new("BTC-USDT")
///     .with_depth_limit(5)
///     .build()
///     .unwrap();
/// assert_eq!(engine.algorithm_name(), "PriceTime");
/// ```
pub struct MatchingEngineBuilder {
    config: EngineConfig,
    algorithm: Option<Box<dyn MatchingAlgorithm>>,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::from_config(EngineConfig::new(symbol))
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            algorithm: None,
        }
    }

    /// Set the number of levels per side returned by `snapshot`
    pub fn with_depth_limit(mut self, depth: usize) -> Self {
        self.config.depth_limit = Some(depth);
        self
    }

    /// Replace the default price/time algorithm
    pub fn with_algorithm(mut self, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Build the matching engine
    pub fn build(self) -> Result<MatchingEngine, ConfigError> {
        self.config.validate()?;

        let algorithm: Box<dyn MatchingAlgorithm> = match self.algorithm {
            Some(algorithm) => algorithm,
            None => Box::new(PriceTimePriority::new()),
        };

        Ok(MatchingEngine::new(self.config.symbol, algorithm)
            .with_depth_limit(self.config.depth_limit))
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }
}
