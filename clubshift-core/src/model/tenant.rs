//! Tenants and Followed Teams
//!
//! A tenant is a club the device is enrolled with. Its team list is a
//! denormalized projection of the enrollments under it, kept for display;
//! authorization always flows from the enrollment records.

use serde::{Deserialize, Serialize};

use super::enrollment::{Role, TeamGrant};

/// A followed team inside a tenant (projection of enrollment data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Backend team identifier. Unique within one tenant.
    pub id: String,
    /// Human-readable code, used for matching when id spaces diverge
    /// between client and server.
    pub code: Option<String>,
    /// Display name, refreshed from the backend during reconciliation.
    pub name: String,
    /// Role the device holds for this team.
    pub role: Role,
    /// Manager email when the covering enrollment carries one.
    pub email: Option<String>,
    /// Unix epoch milliseconds.
    pub enrolled_at: u64,
}

impl Team {
    /// Builds a projection entry from a grant.
    pub fn from_grant(grant: &TeamGrant, email: Option<&str>, now_ms: u64) -> Self {
        Team {
            id: grant.id.clone(),
            code: grant.code.clone(),
            name: grant.name.clone(),
            role: grant.role,
            email: email.map(str::to_string),
            enrolled_at: now_ms,
        }
    }

    /// True if `team_ref` names this team by id or, failing that, by code.
    pub fn matches(&self, team_ref: &str) -> bool {
        self.id == team_ref || self.code.as_deref() == Some(team_ref)
    }
}

/// A club the device holds enrollments for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Stable identifier.
    pub slug: String,
    /// Display name, refreshed from the backend.
    pub name: String,
    /// Followed teams (projection, not authorization data).
    pub teams: Vec<Team>,
    /// Legacy device-wide token, superseded by per-enrollment tokens.
    pub primary_token: Option<String>,
    /// Back-references to the enrollments populating this tenant. Weak:
    /// deleting an enrollment must remove its id here too.
    pub enrollment_ids: Vec<String>,
    /// Set when the backend revokes the whole tenant at season end.
    /// Monotonic for the lifetime of the local model.
    pub season_ended: bool,
    /// Club logo, if any.
    pub club_logo_url: Option<String>,
}

impl Tenant {
    /// Creates an empty tenant shell.
    pub fn new(slug: &str, name: &str, club_logo_url: Option<String>) -> Self {
        Tenant {
            slug: slug.to_string(),
            name: name.to_string(),
            teams: Vec::new(),
            primary_token: None,
            enrollment_ids: Vec::new(),
            season_ended: false,
            club_logo_url,
        }
    }

    /// Looks up a followed team by id, then by code.
    pub fn find_team(&self, team_ref: &str) -> Option<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == team_ref)
            .or_else(|| self.teams.iter().find(|t| t.code.as_deref() == Some(team_ref)))
    }

    /// True if a team with this exact id is already followed.
    pub fn has_team_id(&self, id: &str) -> bool {
        self.teams.iter().any(|t| t.id == id)
    }

    /// Applies the season-ended revocation transform: clears the legacy
    /// token and freezes the tenant. Teams and enrollment back-references
    /// are retained for the season summary view.
    pub fn mark_season_ended(&mut self) {
        self.season_ended = true;
        self.primary_token = None;
    }
}
