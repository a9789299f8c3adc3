//! Refresh Gate
//!
//! Bounded wait for the push-driven navigation flow: a handler that wants
//! to act on fresh shift data waits here for the next refresh to land,
//! and after the timeout proceeds with whatever is already resident
//! rather than blocking indefinitely.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::shifts::Shift;

#[derive(Default)]
struct GateState {
    generation: u64,
    shifts: Option<Vec<Shift>>,
}

/// Shared publish point for refreshed shift data.
#[derive(Default)]
pub struct RefreshGate {
    state: Mutex<GateState>,
    signal: Condvar,
}

impl RefreshGate {
    /// Creates an empty gate.
    pub fn new() -> Self {
        RefreshGate::default()
    }

    /// Publishes a refreshed shift pool, waking all waiters.
    pub fn publish(&self, shifts: Vec<Shift>) {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.shifts = Some(shifts);
        self.signal.notify_all();
    }

    /// Returns the resident shift pool without waiting.
    pub fn resident(&self) -> Option<Vec<Shift>> {
        self.state.lock().unwrap().shifts.clone()
    }

    /// Waits up to `timeout` for the next publish, then returns whatever
    /// data is resident. A publish that happens during the wait returns
    /// immediately; a timeout is not an error.
    pub fn wait_for_refresh(&self, timeout: Duration) -> Option<Vec<Shift>> {
        let state = self.state.lock().unwrap();
        let start_generation = state.generation;
        let (state, _timed_out) = self
            .signal
            .wait_timeout_while(state, timeout, |s| s.generation == start_generation)
            .unwrap();
        state.shifts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn wait_returns_resident_data_on_timeout() {
        let gate = RefreshGate::new();
        gate.publish(vec![]);
        let got = gate.wait_for_refresh(Duration::from_millis(10));
        assert_eq!(got, Some(vec![]));
    }

    #[test]
    fn publish_wakes_a_waiter() {
        let gate = Arc::new(RefreshGate::new());
        let waiter = {
            let gate = gate.clone();
            std::thread::spawn(move || gate.wait_for_refresh(Duration::from_secs(5)))
        };
        // Give the waiter a moment to park
        std::thread::sleep(Duration::from_millis(50));
        gate.publish(vec![]);

        let got = waiter.join().unwrap();
        assert_eq!(got, Some(vec![]));
    }

    #[test]
    fn empty_gate_times_out_with_nothing() {
        let gate = RefreshGate::new();
        assert_eq!(gate.wait_for_refresh(Duration::from_millis(10)), None);
    }
}
