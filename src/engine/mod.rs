// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod matching_engine;
mod price_time;
mod service;

#[cfg(feature = "async")]
pub mod actor;
pub mod factory;

pub use factory::{create_from_config, create_service, BuildError, MatchingEngineBuilder};
pub use matching_engine::{Disposition, MatchingEngine, SubmitOutcome};
pub use price_time::PriceTimePriority;
pub use service::MatchingService;
