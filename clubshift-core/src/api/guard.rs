//! Duplicate-Operation Guard
//!
//! Prevents duplicate enrollment creation from a double-tap or duplicate
//! deep-link delivery. In-memory and process-lifetime only: failed
//! attempts are released so retries work, consumed keys stay until the
//! process exits.

use std::collections::HashSet;

/// Outcome of asking the guard to admit an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed; the key is now in flight.
    Admitted,
    /// The same operation is already running.
    InFlight,
    /// The same operation already completed this session.
    Consumed,
}

/// Tracks in-flight and consumed operation keys.
#[derive(Default)]
pub struct OperationGuard {
    in_flight: HashSet<String>,
    consumed: HashSet<String>,
}

impl OperationGuard {
    /// Creates an empty guard.
    pub fn new() -> Self {
        OperationGuard::default()
    }

    /// Tries to admit an operation under the given key.
    pub fn begin(&mut self, key: &str) -> GuardDecision {
        if self.consumed.contains(key) {
            return GuardDecision::Consumed;
        }
        if !self.in_flight.insert(key.to_string()) {
            return GuardDecision::InFlight;
        }
        GuardDecision::Admitted
    }

    /// Marks an admitted operation as successfully completed. The key can
    /// never be admitted again this session.
    pub fn complete(&mut self, key: &str) {
        self.in_flight.remove(key);
        self.consumed.insert(key.to_string());
    }

    /// Releases an admitted operation that failed, allowing a retry.
    pub fn release(&mut self, key: &str) {
        self.in_flight.remove(key);
    }
}
