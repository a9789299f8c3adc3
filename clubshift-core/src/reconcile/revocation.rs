//! Revocation Handler
//!
//! Single consumer of invalidation events. Translates each event into the
//! corresponding pure model mutation; committing and persisting the result
//! stays with the owner.

use crate::model::DeviceModel;

use super::events::InvalidationEvent;

/// Applies one invalidation event to the model.
///
/// Per-enrollment events delete exactly that enrollment (cascading per the
/// model contract); whole-tenant events freeze the tenant, clearing its
/// credentials while preserving teams and enrollments for the season
/// summary view. Events referring to state that is already gone are a
/// no-op — revocation must be idempotent because the same invalidation can
/// arrive from both the aggregator and the backend reconcile pass.
pub fn apply_event(model: &DeviceModel, event: &InvalidationEvent) -> DeviceModel {
    match event {
        InvalidationEvent::Enrollment {
            enrollment_id,
            tenant_slug,
            reason,
        } => {
            tracing::info!(
                enrollment = %enrollment_id,
                tenant = %tenant_slug,
                %reason,
                "removing invalidated enrollment"
            );
            match model.remove_enrollment(enrollment_id) {
                Ok(next) => next,
                Err(_) => model.clone(),
            }
        }
        InvalidationEvent::Tenant { tenant_slug, reason } => {
            tracing::info!(tenant = %tenant_slug, %reason, "revoking tenant");
            let mut next = model.clone();
            match next.tenants.get_mut(tenant_slug) {
                Some(tenant) => tenant.mark_season_ended(),
                None => return model.clone(),
            }
            // Data stays for the season summary, credentials do not.
            for enrollment in next
                .enrollments
                .values_mut()
                .filter(|e| &e.tenant_slug == tenant_slug)
            {
                enrollment.signed_token.clear();
            }
            next
        }
    }
}

/// Applies a batch of invalidation events in order.
pub fn apply_events(model: &DeviceModel, events: &[InvalidationEvent]) -> DeviceModel {
    events
        .iter()
        .fold(model.clone(), |model, event| apply_event(&model, event))
}
