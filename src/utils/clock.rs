// ============================================================================
// Engine Clock
// Wall-clock timestamps that never go backwards within one engine
// ============================================================================

use chrono::{DateTime, Utc};

/// Monotonic (non-decreasing) UTC timestamp source.
///
/// The system clock may step backwards; every value handed out is clamped to
/// the latest one already issued so order and trade timestamps stay ordered.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    last: Option<DateTime<Utc>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time, never earlier than any previously issued timestamp
    pub fn now(&mut self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    /// Admit an externally supplied timestamp, clamping it forward if needed
    pub fn observe(&mut self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let stamped = match self.last {
            Some(last) if last > timestamp => last,
            _ => timestamp,
        };
        self.last = Some(stamped);
        stamped
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}
