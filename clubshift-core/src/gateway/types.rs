//! Gateway DTOs
//!
//! Wire-shaped types exchanged with the backend. The enrollment model has
//! its own types; these stay at the boundary.

use serde::{Deserialize, Serialize};

use crate::model::{EnrollmentDelta, TeamGrant};

/// Outcome of a successful registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationGrant {
    /// Stable tenant identifier.
    pub tenant_slug: String,
    /// Tenant display name.
    pub tenant_name: String,
    /// Club logo, if any.
    pub club_logo_url: Option<String>,
    /// Teams the grant covers.
    pub teams: Vec<TeamGrant>,
    /// Opaque signed token for this grant.
    pub signed_token: String,
    /// Manager email the token was issued for; absent for members.
    pub email: Option<String>,
}

impl From<RegistrationGrant> for EnrollmentDelta {
    fn from(grant: RegistrationGrant) -> Self {
        EnrollmentDelta {
            tenant_slug: grant.tenant_slug,
            tenant_name: grant.tenant_name,
            club_logo_url: grant.club_logo_url,
            teams: grant.teams,
            signed_token: grant.signed_token,
            email: grant.email,
        }
    }
}

/// One team in an authoritative membership snapshot or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    /// Backend team identifier.
    pub id: String,
    /// Human-readable code, when exposed.
    pub code: Option<String>,
    /// Display name.
    pub name: String,
}

/// Authoritative per-tenant membership, as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantInfo {
    /// Stable tenant identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Club logo, if any.
    pub logo_url: Option<String>,
    /// Whole-tenant revocation flag.
    pub season_ended: bool,
    /// Complete team membership for this device. An empty list means the
    /// membership is legitimately gone, not a fetch artifact.
    pub teams: Vec<TeamInfo>,
}

/// Tenant search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    /// Stable tenant identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Club logo, if any.
    pub logo_url: Option<String>,
}

/// Locally held enrollment, as presented to the reconciliation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentClaim {
    /// Local enrollment id.
    pub enrollment_id: String,
    /// Tenant the enrollment belongs to.
    pub tenant_slug: String,
    /// Team refs the enrollment covers.
    pub team_ids: Vec<String>,
}

/// Mismatch reported by the reconciliation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum ReconcileMismatch {
    /// One enrollment is no longer valid (stale device identity).
    Enrollment {
        /// The affected enrollment id.
        enrollment_id: String,
        /// Its tenant.
        tenant_slug: String,
        /// Backend-supplied reason.
        reason: String,
    },
    /// A whole tenant was revoked (season end).
    Tenant {
        /// The affected tenant.
        tenant_slug: String,
        /// Backend-supplied reason.
        reason: String,
    },
}
