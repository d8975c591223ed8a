// ============================================================================
// Persistence Module
// ============================================================================

mod journal;

pub use journal::{JournalError, JournalRecord, TradeJournal};
