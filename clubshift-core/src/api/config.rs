//! Configuration Types

use std::time::Duration;

/// Configuration for the ClubShift core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Bounded wait applied when a push-driven navigation waits for a
    /// shift refresh to land before acting. After the timeout the flow
    /// proceeds with whatever data is already resident.
    pub navigation_wait: Duration,
    /// Run a reconciliation pass automatically before each shift refresh.
    pub reconcile_on_refresh: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            navigation_wait: Duration::from_secs(2),
            reconcile_on_refresh: false,
        }
    }
}
