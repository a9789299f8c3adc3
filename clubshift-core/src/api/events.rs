//! Event System
//!
//! Callbacks for ClubShift events.

use std::sync::Arc;

/// Events emitted by the core.
#[derive(Debug, Clone)]
pub enum ClubShiftEvent {
    /// A new enrollment landed.
    EnrollmentAdded {
        /// The tenant enrolled with.
        tenant_slug: String,
        /// The new enrollment id.
        enrollment_id: String,
    },

    /// One enrollment was invalidated and removed.
    EnrollmentInvalidated {
        /// The removed enrollment id.
        enrollment_id: String,
        /// Its tenant.
        tenant_slug: String,
        /// Why it was removed.
        reason: String,
    },

    /// A whole tenant was revoked (season end). Its data remains visible
    /// until the user dismisses it.
    TenantRevoked {
        /// The revoked tenant.
        tenant_slug: String,
        /// Why it was revoked.
        reason: String,
    },

    /// A followed team was removed.
    TeamRemoved {
        /// The tenant the team belonged to.
        tenant_slug: String,
        /// The removed team ref.
        team_id: String,
    },

    /// A tenant was removed from the device.
    TenantRemoved {
        /// The removed tenant.
        tenant_slug: String,
    },

    /// A shift refresh completed.
    ShiftsRefreshed {
        /// Number of shifts in the merged pool.
        count: usize,
        /// Number of enrollments found invalid during the refresh.
        invalidated: usize,
    },

    /// The device no longer holds any enrollment.
    Unenrolled,
}

/// Event handler trait.
///
/// Implement this trait to receive ClubShift events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ClubShiftEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ClubShiftEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ClubShiftEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ClubShiftEvent) + Send + Sync,
{
    fn on_event(&self, event: ClubShiftEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: ClubShiftEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatch_reaches_all_handlers() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        for _ in 0..3 {
            let count = count.clone();
            dispatcher.add_handler(Arc::new(CallbackHandler::new(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })));
        }

        dispatcher.dispatch(ClubShiftEvent::Unenrolled);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
