//! Device Model
//!
//! Root of the enrollment entity graph and the pure mutation contract.
//! Every mutation takes `&self` and returns a fresh model value; the owner
//! commits the result with a single assignment, so no locking is needed
//! around the model itself.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::enrollment::{Enrollment, EnrollmentDelta};
use super::tenant::{Team, Tenant};
use super::now_ms;

/// Hard device-level cap on followed teams across all tenants.
pub const MAX_TOTAL_TEAMS: usize = 5;

/// Errors from model mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A grant with no teams must be rejected at the call site, never stored.
    #[error("grant contains no teams")]
    EmptyGrant,

    /// The device-wide team cap leaves no room for any incoming team.
    #[error("device team limit of {MAX_TOTAL_TEAMS} reached")]
    TeamLimitReached,

    /// No tenant with this slug.
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    /// No followed team matches this ref within the tenant.
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    /// No enrollment with this id.
    #[error("unknown enrollment: {0}")]
    UnknownEnrollment(String),
}

/// Root of the local device state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Generated once, stable for the local installation.
    pub device_id: String,
    /// OS push identifier, once the host registered for notifications.
    pub push_token: Option<String>,
    /// Tenants keyed by slug.
    pub tenants: BTreeMap<String, Tenant>,
    /// Enrollments keyed by id.
    pub enrollments: BTreeMap<String, Enrollment>,
    /// Unix epoch milliseconds.
    pub created_at: u64,
    /// Unix epoch milliseconds, bumped on every committed mutation.
    pub updated_at: u64,
}

impl Default for DeviceModel {
    fn default() -> Self {
        DeviceModel::new()
    }
}

impl DeviceModel {
    /// Creates an empty model with a fresh device id.
    pub fn new() -> Self {
        let now = now_ms();
        DeviceModel {
            device_id: Uuid::new_v4().to_string(),
            push_token: None,
            tenants: BTreeMap::new(),
            enrollments: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Total followed teams across all tenants.
    pub fn team_count(&self) -> usize {
        self.tenants.values().map(|t| t.teams.len()).sum()
    }

    /// Remaining capacity under the device-wide cap.
    pub fn remaining_capacity(&self) -> usize {
        MAX_TOTAL_TEAMS.saturating_sub(self.team_count())
    }

    /// True while the device holds at least one tenant.
    pub fn is_enrolled(&self) -> bool {
        !self.tenants.is_empty()
    }

    /// Enrollments whose tenant is not season-ended and whose token is
    /// non-empty. These are the grants eligible for backend calls.
    pub fn active_enrollments(&self) -> Vec<&Enrollment> {
        self.enrollments
            .values()
            .filter(|e| e.has_token())
            .filter(|e| {
                self.tenants
                    .get(&e.tenant_slug)
                    .is_some_and(|t| !t.season_ended)
            })
            .collect()
    }

    /// Applies an enrollment grant returned by a registration call.
    ///
    /// Looks up or creates the tenant, dedups incoming teams against the
    /// projection (existing wins on id collision, except that a newer
    /// manager grant replaces a member entry), truncates the incoming list
    /// to the remaining device-wide capacity, and records one new
    /// enrollment covering exactly the team ids that landed.
    ///
    /// A delta that would contribute no team refs at all is rejected; a
    /// degenerate grant is never stored empty.
    pub fn apply_delta(&self, delta: &EnrollmentDelta) -> Result<DeviceModel, ModelError> {
        if delta.teams.is_empty() {
            return Err(ModelError::EmptyGrant);
        }

        let capacity = self.remaining_capacity();
        let now = now_ms();
        let mut next = self.clone();

        let tenant = next
            .tenants
            .entry(delta.tenant_slug.clone())
            .or_insert_with(|| Tenant::new(&delta.tenant_slug, &delta.tenant_name, None));

        // Registration responses carry current display data.
        tenant.name = delta.tenant_name.clone();
        if delta.club_logo_url.is_some() {
            tenant.club_logo_url = delta.club_logo_url.clone();
        }

        let mut enrolled_refs: BTreeSet<String> = BTreeSet::new();
        let mut fresh: Vec<&super::enrollment::TeamGrant> = Vec::new();
        for grant in &delta.teams {
            if tenant.has_team_id(&grant.id) {
                // Already followed. The newer grant's role wins only when
                // it upgrades member to manager; the older entry is dropped.
                enrolled_refs.insert(grant.id.clone());
                if let Some(existing) = tenant.teams.iter_mut().find(|t| t.id == grant.id) {
                    if grant.role.outranks(&existing.role) {
                        *existing = Team::from_grant(grant, delta.email.as_deref(), now);
                    }
                }
            } else if !fresh.iter().any(|g| g.id == grant.id) {
                // A grant may repeat a team id within one delta; only the
                // first occurrence lands, keeping per-tenant ids unique.
                fresh.push(grant);
            }
        }

        // The cap truncates the incoming list, never existing teams.
        for grant in fresh.into_iter().take(capacity) {
            enrolled_refs.insert(grant.id.clone());
            tenant
                .teams
                .push(Team::from_grant(grant, delta.email.as_deref(), now));
        }

        if enrolled_refs.is_empty() {
            return Err(ModelError::TeamLimitReached);
        }

        let enrollment = Enrollment::from_delta(delta, enrolled_refs, now);
        tenant.enrollment_ids.push(enrollment.id.clone());
        tracing::debug!(
            tenant = %delta.tenant_slug,
            enrollment = %enrollment.id,
            teams = enrollment.teams.len(),
            "applied enrollment delta"
        );
        next.enrollments.insert(enrollment.id.clone(), enrollment);
        next.updated_at = now;
        Ok(next)
    }

    /// Deletes a tenant and every enrollment referencing it.
    pub fn remove_tenant(&self, slug: &str) -> Result<DeviceModel, ModelError> {
        if !self.tenants.contains_key(slug) {
            return Err(ModelError::UnknownTenant(slug.to_string()));
        }
        let mut next = self.clone();
        next.tenants.remove(slug);
        next.enrollments.retain(|_, e| e.tenant_slug != slug);
        next.updated_at = now_ms();
        Ok(next)
    }

    /// Removes one followed team from a tenant.
    ///
    /// The team ref (and its code, when the team carries one) is stripped
    /// from every enrollment under the tenant; an enrollment left with an
    /// empty team set is deleted, and a tenant left with zero teams is
    /// deleted with it.
    pub fn remove_team(&self, slug: &str, team_ref: &str) -> Result<DeviceModel, ModelError> {
        let tenant = self
            .tenants
            .get(slug)
            .ok_or_else(|| ModelError::UnknownTenant(slug.to_string()))?;
        let team = tenant
            .find_team(team_ref)
            .ok_or_else(|| ModelError::UnknownTeam(team_ref.to_string()))?;

        let mut refs: BTreeSet<String> = BTreeSet::new();
        refs.insert(team.id.clone());
        if let Some(code) = &team.code {
            refs.insert(code.clone());
        }

        let mut next = self.clone();
        {
            let tenant = next.tenants.get_mut(slug).expect("tenant checked above");
            tenant.teams.retain(|t| !refs.contains(&t.id));
        }
        for e in next.enrollments.values_mut().filter(|e| e.tenant_slug == slug) {
            e.teams.retain(|r| !refs.contains(r));
        }
        next.enrollments
            .retain(|_, e| e.tenant_slug != slug || !e.teams.is_empty());

        if next.tenants.get(slug).is_some_and(|t| t.teams.is_empty()) {
            next.tenants.remove(slug);
        }
        next.updated_at = now_ms();
        Ok(next.cleanup_orphaned_enrollments())
    }

    /// Deletes exactly one enrollment, stripping its teams from the tenant
    /// projection. A tenant left with zero teams is deleted unless it is
    /// season-ended (frozen tenants stay visible until dismissed).
    pub fn remove_enrollment(&self, enrollment_id: &str) -> Result<DeviceModel, ModelError> {
        if !self.enrollments.contains_key(enrollment_id) {
            return Err(ModelError::UnknownEnrollment(enrollment_id.to_string()));
        }
        let mut next = self.clone();
        let enrollment = next
            .enrollments
            .remove(enrollment_id)
            .expect("enrollment checked above");

        if let Some(tenant) = next.tenants.get_mut(&enrollment.tenant_slug) {
            tenant.enrollment_ids.retain(|id| id != enrollment_id);
            tenant.teams.retain(|t| {
                !enrollment.covers(&t.id)
                    && !t.code.as_deref().is_some_and(|c| enrollment.covers(c))
            });
            if tenant.teams.is_empty() && !tenant.season_ended {
                next.tenants.remove(&enrollment.tenant_slug);
            }
        }
        next.updated_at = now_ms();
        Ok(next.cleanup_orphaned_enrollments())
    }

    /// Orphan sweep: drops enrollment back-references that no longer
    /// resolve (or resolve across tenants), then deletes every enrollment
    /// not reachable from its own tenant. Called after any operation that
    /// can produce divergence, notably the authoritative membership
    /// refresh.
    pub fn cleanup_orphaned_enrollments(&self) -> DeviceModel {
        let mut next = self.clone();
        for (slug, tenant) in next.tenants.iter_mut() {
            tenant.enrollment_ids.retain(|id| {
                next.enrollments
                    .get(id)
                    .is_some_and(|e| &e.tenant_slug == slug)
            });
        }
        let reachable: BTreeSet<&String> = next
            .tenants
            .values()
            .flat_map(|t| t.enrollment_ids.iter())
            .collect();
        let before = next.enrollments.len();
        let keep: BTreeSet<String> = reachable.into_iter().cloned().collect();
        next.enrollments.retain(|id, _| keep.contains(id));
        if next.enrollments.len() != before {
            tracing::debug!(
                removed = before - next.enrollments.len(),
                "orphan cleanup removed enrollments"
            );
        }
        next
    }
}
