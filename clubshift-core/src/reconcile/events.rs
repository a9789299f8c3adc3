//! Invalidation Events
//!
//! Structured events flowing from the reconciliation engine and the shift
//! aggregator to the revocation handler. The two shapes are never
//! conflated: one enrollment going stale is not a season ending.

use crate::gateway::ReconcileMismatch;

/// A credential invalidation detected locally or reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationEvent {
    /// Exactly one enrollment is no longer valid (stale device identity).
    Enrollment {
        /// The affected enrollment.
        enrollment_id: String,
        /// Its tenant.
        tenant_slug: String,
        /// Human-readable reason, for logging and UI.
        reason: String,
    },
    /// A whole tenant was revoked (season end). Data is preserved for the
    /// season summary view; only the credentials go.
    Tenant {
        /// The affected tenant.
        tenant_slug: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl From<ReconcileMismatch> for InvalidationEvent {
    fn from(mismatch: ReconcileMismatch) -> Self {
        match mismatch {
            ReconcileMismatch::Enrollment {
                enrollment_id,
                tenant_slug,
                reason,
            } => InvalidationEvent::Enrollment {
                enrollment_id,
                tenant_slug,
                reason,
            },
            ReconcileMismatch::Tenant { tenant_slug, reason } => {
                InvalidationEvent::Tenant { tenant_slug, reason }
            }
        }
    }
}
