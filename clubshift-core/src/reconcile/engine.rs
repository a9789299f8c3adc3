//! Reconciliation Engine
//!
//! Safety-gated background pass cross-checking locally held enrollments
//! against backend-authoritative membership. Linear state machine with no
//! branching back:
//!
//! `Idle -> RefreshingTenantInfo -> { Skipped | Reconciling } -> Idle`
//!
//! Reconciliation never proceeds on stale or unknown membership data:
//! when the authoritative fetch fails for any reason, the pass skips
//! without touching the model, and the caller goes on to refresh shifts
//! with whatever model it already had.

use std::collections::BTreeSet;

use crate::gateway::{BackendGateway, EnrollmentClaim, GatewayError, TeamInfo, TenantInfo};
use crate::model::{DeviceModel, Team};
use crate::token;

use super::events::InvalidationEvent;

/// Why a pass skipped. A skip is a valid terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No active credential to fetch membership with.
    NoCredential,
    /// The authoritative membership fetch failed.
    MembershipFetchFailed(GatewayError),
}

/// Outcome of one reconciliation pass.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Nothing was mutated; retry on the next natural trigger.
    Skipped(SkipReason),
    /// Membership was refreshed. The caller commits `model` and routes
    /// `invalidations` through the revocation handler.
    Completed {
        /// Model with authoritative display data applied and unmentioned
        /// teams pruned.
        model: DeviceModel,
        /// Revocations detected during the pass.
        invalidations: Vec<InvalidationEvent>,
    },
}

/// Runs one reconciliation pass. Strictly sequential; each step depends on
/// the previous one having fully succeeded.
pub fn run<G: BackendGateway>(gateway: &G, model: &DeviceModel) -> ReconcileOutcome {
    let Some(credential) = token::primary_token(model).map(str::to_string) else {
        tracing::debug!("reconciliation skipped: no active credential");
        return ReconcileOutcome::Skipped(SkipReason::NoCredential);
    };

    tracing::debug!("reconciliation: refreshing tenant info");
    let infos = match gateway.fetch_tenant_info(&credential) {
        Ok(infos) => infos,
        Err(e) => {
            tracing::warn!(error = %e, "reconciliation skipped: membership fetch failed");
            return ReconcileOutcome::Skipped(SkipReason::MembershipFetchFailed(e));
        }
    };

    let mut invalidations = Vec::new();
    let mut next = apply_membership(model, &infos, &mut invalidations);
    next = next.cleanup_orphaned_enrollments();

    if !next.enrollments.is_empty() {
        tracing::debug!("reconciliation: cross-checking enrollments");
        reconcile_with_backend(gateway, &next, &mut invalidations);
    }

    ReconcileOutcome::Completed {
        model: next,
        invalidations,
    }
}

/// Applies the authoritative snapshot: display refresh, team renames, and
/// pruning of local teams the backend no longer mentions. The snapshot is
/// treated as complete — the fetch succeeded, so an empty team list means
/// the membership is legitimately gone.
fn apply_membership(
    model: &DeviceModel,
    infos: &[TenantInfo],
    invalidations: &mut Vec<InvalidationEvent>,
) -> DeviceModel {
    let mut next = model.clone();

    // Tenants the snapshot does not cover at all lost their membership
    // entirely. Locally frozen tenants are exempt: their data stays for
    // the season summary until the user dismisses them.
    let gone: Vec<String> = next
        .tenants
        .values()
        .filter(|t| !t.season_ended && !infos.iter().any(|i| i.slug == t.slug))
        .map(|t| t.slug.clone())
        .collect();
    for slug in gone {
        tracing::info!(tenant = %slug, "membership gone, removing tenant");
        if let Ok(m) = next.remove_tenant(&slug) {
            next = m;
        }
    }

    for info in infos {
        let Some(tenant) = next.tenants.get(&info.slug) else {
            continue;
        };
        if tenant.season_ended {
            continue;
        }
        if info.season_ended {
            // The one case where team removal does not cascade: data must
            // stay visible for the season summary view.
            invalidations.push(InvalidationEvent::Tenant {
                tenant_slug: info.slug.clone(),
                reason: "season ended".into(),
            });
            continue;
        }

        {
            let tenant = next
                .tenants
                .get_mut(&info.slug)
                .expect("tenant checked above");
            tenant.name = info.name.clone();
            tenant.club_logo_url = info.logo_url.clone();
            for team in tenant.teams.iter_mut() {
                if let Some(authoritative) = info.teams.iter().find(|a| mentions(a, team)) {
                    team.name = authoritative.name.clone();
                    if team.code.is_none() {
                        team.code = authoritative.code.clone();
                    }
                }
            }
        }

        let stale: Vec<String> = next.tenants[&info.slug]
            .teams
            .iter()
            .filter(|t| !info.teams.iter().any(|a| mentions(a, t)))
            .map(|t| t.id.clone())
            .collect();
        for team_id in stale {
            tracing::info!(tenant = %info.slug, team = %team_id, "pruning team not in membership");
            if let Ok(m) = next.remove_team(&info.slug, &team_id) {
                next = m;
            }
        }
    }

    next
}

/// True if the authoritative entry names the local team, by id first and
/// by code as the fallback for diverging id spaces.
fn mentions(authoritative: &TeamInfo, team: &Team) -> bool {
    if authoritative.id == team.id {
        return true;
    }
    if authoritative.code.as_deref() == Some(team.id.as_str()) {
        return true;
    }
    match team.code.as_deref() {
        Some(code) => authoritative.id == code || authoritative.code.as_deref() == Some(code),
        None => false,
    }
}

/// Invokes the backend reconcile operation with the full local enrollment
/// set. A failure here is logged and swallowed: the membership refresh has
/// already been applied, and the next trigger retries.
///
/// The revocations collected so far have not been applied to the model
/// yet, so tenants with a pending revocation are excluded from credential
/// selection — their tokens are already dead backend-side.
fn reconcile_with_backend<G: BackendGateway>(
    gateway: &G,
    model: &DeviceModel,
    invalidations: &mut Vec<InvalidationEvent>,
) {
    let revoked: BTreeSet<String> = invalidations
        .iter()
        .filter_map(|event| match event {
            InvalidationEvent::Tenant { tenant_slug, .. } => Some(tenant_slug.clone()),
            _ => None,
        })
        .collect();
    let Some(credential) = model
        .active_enrollments()
        .into_iter()
        .filter(|e| !revoked.contains(&e.tenant_slug))
        .max_by_key(|e| e.enrolled_at)
        .map(|e| e.signed_token.clone())
    else {
        return;
    };

    let claims: Vec<EnrollmentClaim> = model
        .enrollments
        .values()
        .map(|e| EnrollmentClaim {
            enrollment_id: e.id.clone(),
            tenant_slug: e.tenant_slug.clone(),
            team_ids: e.teams.iter().cloned().collect(),
        })
        .collect();

    match gateway.reconcile_enrollments(&claims, &model.device_id, &credential) {
        Ok(mismatches) => {
            invalidations.extend(mismatches.into_iter().map(InvalidationEvent::from));
        }
        Err(e) => {
            tracing::warn!(error = %e, "enrollment cross-check failed, continuing");
        }
    }
}
