//! Re-entrancy guard for view operations
//!
//! Purchases and daily claims must not run twice for the same trigger, e.g.
//! a double-fired button handler. Beginning an operation while it is still
//! in flight is rejected; the caller settles the guard once the operation
//! has fully resolved, whether it succeeded or failed.

use std::collections::HashSet;

/// Tracks operations that have begun but not yet settled
#[derive(Debug, Default)]
pub struct OpGuard {
    in_flight: HashSet<String>,
}

impl OpGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an operation. Returns false when it is already in flight.
    pub fn begin(&mut self, op: &str) -> bool {
        self.in_flight.insert(op.to_owned())
    }

    /// Settle an operation so it may run again
    pub fn settle(&mut self, op: &str) {
        self.in_flight.remove(op);
    }

    pub fn is_in_flight(&self, op: &str) -> bool {
        self.in_flight.contains(op)
    }
}
