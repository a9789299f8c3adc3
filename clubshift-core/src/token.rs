//! Token Resolution
//!
//! Picks the correct credential for an operation by walking a fixed
//! fallback chain over the enrollment model. Pure functions; a `None`
//! means "no authorized credential", not an error to retry.

use crate::model::{DeviceModel, Role};

/// Resolves the token authorized for a team-scoped operation.
///
/// Chain, short-circuiting on first hit:
/// 1. A season-ended tenant never yields a token, even if stale
///    enrollment records remain for historical display.
/// 2. An enrollment for the tenant whose team set contains `team_ref`
///    verbatim.
/// 3. The same search on the team's code, when the followed team has one
///    (covers client/server id-space mismatches).
/// 4. The tenant's legacy primary token, for enrollments created before
///    per-team tokens existed.
pub fn resolve<'a>(model: &'a DeviceModel, team_ref: &str, tenant_slug: &str) -> Option<&'a str> {
    let tenant = model.tenants.get(tenant_slug)?;
    if tenant.season_ended {
        return None;
    }

    let direct = model
        .enrollments
        .values()
        .find(|e| e.tenant_slug == tenant_slug && e.has_token() && e.covers(team_ref));
    if let Some(e) = direct {
        return Some(&e.signed_token);
    }

    if let Some(code) = tenant.find_team(team_ref).and_then(|t| t.code.as_deref()) {
        let by_code = model
            .enrollments
            .values()
            .find(|e| e.tenant_slug == tenant_slug && e.has_token() && e.covers(code));
        if let Some(e) = by_code {
            return Some(&e.signed_token);
        }
    }

    tenant.primary_token.as_deref()
}

/// Resolves a device-wide credential for operations that are not
/// team-scoped (push identifier registration, membership refresh).
///
/// Prefers an active manager enrollment, then any active enrollment;
/// ties break toward the newest `enrolled_at`.
pub fn primary_token(model: &DeviceModel) -> Option<&str> {
    let active = model.active_enrollments();
    active
        .iter()
        .filter(|e| e.role == Role::Manager)
        .max_by_key(|e| e.enrolled_at)
        .or_else(|| active.iter().max_by_key(|e| e.enrolled_at))
        .map(|e| e.signed_token.as_str())
}
