//! Enrollment Records
//!
//! An enrollment is one authorization grant: a backend-issued signed token
//! plus the set of teams and the role it covers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a grant carries within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Team manager (enrolled via emailed magic link).
    Manager,
    /// Regular member (self-enrolled).
    Member,
}

impl Role {
    /// Returns true if this role outranks `other` when team entries merge.
    pub fn outranks(&self, other: &Role) -> bool {
        matches!((self, other), (Role::Manager, Role::Member))
    }
}

/// One team granted by an enrollment delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGrant {
    /// Backend team identifier.
    pub id: String,
    /// Human-readable team code, when the backend exposes one.
    pub code: Option<String>,
    /// Display name.
    pub name: String,
    /// Role granted for this team.
    pub role: Role,
}

/// Incoming enrollment data, as returned by a successful registration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDelta {
    /// Stable tenant identifier.
    pub tenant_slug: String,
    /// Tenant display name.
    pub tenant_name: String,
    /// Club logo, if the backend provides one.
    pub club_logo_url: Option<String>,
    /// Teams covered by this grant.
    pub teams: Vec<TeamGrant>,
    /// Opaque signed authorization token. Never parsed client-side.
    pub signed_token: String,
    /// Manager identity the token was issued for; absent for members.
    pub email: Option<String>,
}

/// A stored authorization grant.
///
/// Invariant: `teams` is non-empty. An enrollment whose team set drains is
/// deleted by the owning model, never persisted empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Opaque id, generated at creation.
    pub id: String,
    /// Tenant this grant belongs to.
    pub tenant_slug: String,
    /// Team refs covered by the grant. Mixed id/code representation is
    /// tolerated; matching falls back from id to code.
    pub teams: BTreeSet<String>,
    /// Role implied by the first granted team.
    pub role: Role,
    /// Backend-issued signed token.
    pub signed_token: String,
    /// Unix epoch milliseconds.
    pub enrolled_at: u64,
    /// Manager email, absent for members.
    pub email: Option<String>,
}

impl Enrollment {
    /// Creates an enrollment from a delta, capturing the given team refs.
    pub fn from_delta(delta: &EnrollmentDelta, team_refs: BTreeSet<String>, now_ms: u64) -> Self {
        let role = delta.teams.first().map(|t| t.role).unwrap_or(Role::Member);
        Enrollment {
            id: Uuid::new_v4().to_string(),
            tenant_slug: delta.tenant_slug.clone(),
            teams: team_refs,
            role,
            signed_token: delta.signed_token.clone(),
            enrolled_at: now_ms,
            email: delta.email.clone(),
        }
    }

    /// True if the grant still carries a usable token.
    pub fn has_token(&self) -> bool {
        !self.signed_token.is_empty()
    }

    /// True if the grant covers the given team ref (verbatim match).
    pub fn covers(&self, team_ref: &str) -> bool {
        self.teams.contains(team_ref)
    }
}
