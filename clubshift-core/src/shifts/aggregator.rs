//! Shift Aggregation
//!
//! Fans out one fetch per eligible enrollment, joins on all completions,
//! and classifies each outcome. Partial results are valid results: the
//! fetch only fails as a whole when every attempt died on transport.

use std::sync::Mutex;

use crate::gateway::{BackendGateway, GatewayError, GatewayResult};
use crate::model::DeviceModel;
use crate::reconcile::InvalidationEvent;

use super::types::{merge_shifts, Shift};

/// Result of an aggregation pass.
#[derive(Debug, Default)]
pub struct ShiftFetch {
    /// Deduplicated merge pool across all successful fetches.
    pub shifts: Vec<Shift>,
    /// Token-level failures, translated into invalidation events for the
    /// revocation handler. Not errors: the caller keeps showing data from
    /// the other enrollments.
    pub invalidations: Vec<InvalidationEvent>,
    /// How many fetches were attempted.
    pub attempted: usize,
    /// How many fetches succeeded.
    pub succeeded: usize,
}

/// Fetches shifts for every eligible enrollment concurrently.
///
/// Eligible means: the tenant exists and is not season-ended, and the
/// enrollment carries a non-empty token. Each fetch authenticates with
/// that enrollment's own token — two enrollments for the same tenant may
/// hold disjoint team grants, so a shared token would over- or
/// under-authorize.
///
/// Returns `Err` only on total failure: every attempted fetch failed and
/// none of the failures were token-level. The error is the first
/// transport error in enrollment order, so the caller can tell "logged
/// out everywhere" from "network is down".
pub fn fetch_all<G: BackendGateway>(
    gateway: &G,
    model: &DeviceModel,
) -> Result<ShiftFetch, GatewayError> {
    let eligible = model.active_enrollments();
    if eligible.is_empty() {
        tracing::debug!("no eligible enrollments, nothing to fetch");
        return Ok(ShiftFetch::default());
    }

    // Counting join: every spawned fetch pushes exactly one entry, and the
    // scope exit waits for the last of them. After the join the
    // accumulator is closed and read without further synchronization.
    let accumulator: Mutex<Vec<(usize, GatewayResult<Vec<Shift>>)>> =
        Mutex::new(Vec::with_capacity(eligible.len()));
    std::thread::scope(|scope| {
        for (index, enrollment) in eligible.iter().enumerate() {
            let accumulator = &accumulator;
            scope.spawn(move || {
                let outcome = gateway.fetch_shifts(&enrollment.tenant_slug, &enrollment.signed_token);
                accumulator.lock().unwrap().push((index, outcome));
            });
        }
    });
    let mut outcomes = accumulator.into_inner().unwrap();
    outcomes.sort_by_key(|(index, _)| *index);

    let mut fetch = ShiftFetch {
        attempted: eligible.len(),
        ..Default::default()
    };
    let mut pools = Vec::new();
    let mut revoked_tenants: Vec<String> = Vec::new();
    let mut first_transport: Option<GatewayError> = None;
    let mut token_failures = 0usize;

    for (index, outcome) in outcomes {
        let enrollment = eligible[index];
        match outcome {
            Ok(shifts) => {
                fetch.succeeded += 1;
                pools.push(shifts);
            }
            Err(e) if e.is_enrollment_invalid() => {
                token_failures += 1;
                tracing::debug!(
                    enrollment = %enrollment.id,
                    tenant = %enrollment.tenant_slug,
                    error = %e,
                    "enrollment credential rejected"
                );
                fetch.invalidations.push(InvalidationEvent::Enrollment {
                    enrollment_id: enrollment.id.clone(),
                    tenant_slug: enrollment.tenant_slug.clone(),
                    reason: e.to_string(),
                });
            }
            Err(GatewayError::TokenRevoked { reason }) => {
                token_failures += 1;
                if !revoked_tenants.contains(&enrollment.tenant_slug) {
                    tracing::debug!(
                        tenant = %enrollment.tenant_slug,
                        %reason,
                        "tenant revoked"
                    );
                    revoked_tenants.push(enrollment.tenant_slug.clone());
                    fetch.invalidations.push(InvalidationEvent::Tenant {
                        tenant_slug: enrollment.tenant_slug.clone(),
                        reason,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(tenant = %enrollment.tenant_slug, error = %e, "shift fetch failed");
                if first_transport.is_none() {
                    first_transport = Some(e);
                }
            }
        }
    }

    if fetch.succeeded == 0 && token_failures == 0 {
        if let Some(e) = first_transport {
            return Err(e);
        }
    }

    fetch.shifts = merge_shifts(pools);
    Ok(fetch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::model::{DeviceModel, EnrollmentDelta, Role, TeamGrant};

    fn enroll(model: &DeviceModel, slug: &str, team: &str, token: &str) -> DeviceModel {
        model
            .apply_delta(&EnrollmentDelta {
                tenant_slug: slug.into(),
                tenant_name: slug.into(),
                club_logo_url: None,
                teams: vec![TeamGrant {
                    id: team.into(),
                    code: None,
                    name: team.into(),
                    role: Role::Member,
                }],
                signed_token: token.into(),
                email: None,
            })
            .unwrap()
    }

    fn shift(id: &str) -> Shift {
        Shift {
            id: id.into(),
            tenant_slug: "club-a".into(),
            team_id: None,
            name: "Bar shift".into(),
            location: None,
            starts_at: 1_000,
            ends_at: 2_000,
            volunteers: vec![],
            volunteers_needed: 1,
            updated_at: None,
        }
    }

    #[test]
    fn empty_model_fetches_nothing() {
        let gateway = MockGateway::new();
        let fetch = fetch_all(&gateway, &DeviceModel::new()).unwrap();
        assert_eq!(fetch.attempted, 0);
        assert!(fetch.shifts.is_empty());
        assert_eq!(gateway.call_count("fetch_shifts"), 0);
    }

    #[test]
    fn season_ended_tenants_are_skipped() {
        let mut model = enroll(&DeviceModel::new(), "club-a", "T1", "tok");
        model.tenants.get_mut("club-a").unwrap().season_ended = true;

        let gateway = MockGateway::new();
        let fetch = fetch_all(&gateway, &model).unwrap();
        assert_eq!(fetch.attempted, 0);
        assert_eq!(gateway.call_count("fetch_shifts"), 0);
    }

    #[test]
    fn partial_failure_is_still_success() {
        let model = enroll(&DeviceModel::new(), "club-a", "T1", "tok-ok");
        let model = enroll(&model, "club-b", "U1", "tok-bad");
        let model = enroll(&model, "club-c", "V1", "tok-500");

        let gateway = MockGateway::new();
        gateway.script_shifts("tok-ok", Ok(vec![shift("s1")]));
        gateway.script_shifts("tok-bad", Err(GatewayError::InvalidToken));
        gateway.script_shifts("tok-500", Err(GatewayError::Http(500)));

        let fetch = fetch_all(&gateway, &model).unwrap();
        assert_eq!(fetch.succeeded, 1);
        assert_eq!(fetch.shifts.len(), 1);
        assert_eq!(fetch.invalidations.len(), 1);
        assert!(matches!(
            fetch.invalidations[0],
            InvalidationEvent::Enrollment { ref tenant_slug, .. } if tenant_slug == "club-b"
        ));
    }

    #[test]
    fn all_transport_failures_is_total_failure() {
        let model = enroll(&DeviceModel::new(), "club-a", "T1", "tok-1");
        let model = enroll(&model, "club-b", "U1", "tok-2");

        let gateway = MockGateway::new();
        gateway.script_shifts("tok-1", Err(GatewayError::Http(500)));
        gateway.script_shifts("tok-2", Err(GatewayError::Http(502)));

        let err = fetch_all(&gateway, &model).unwrap_err();
        assert!(matches!(err, GatewayError::Http(_)));
    }

    #[test]
    fn all_token_failures_is_not_total_failure() {
        let model = enroll(&DeviceModel::new(), "club-a", "T1", "tok-1");

        let gateway = MockGateway::new();
        gateway.script_shifts("tok-1", Err(GatewayError::DeviceNotFound));

        let fetch = fetch_all(&gateway, &model).unwrap();
        assert_eq!(fetch.succeeded, 0);
        assert_eq!(fetch.invalidations.len(), 1);
    }

    #[test]
    fn token_revoked_becomes_tenant_event_not_enrollment_event() {
        let model = enroll(&DeviceModel::new(), "club-a", "T1", "tok-1");
        // Second enrollment for the same tenant, also revoked
        let model = enroll(&model, "club-a", "T2", "tok-2");

        let gateway = MockGateway::new();
        let revoked = Err(GatewayError::TokenRevoked {
            reason: "season ended".into(),
        });
        gateway.script_shifts("tok-1", revoked.clone());
        gateway.script_shifts("tok-2", revoked);

        let fetch = fetch_all(&gateway, &model).unwrap();
        // One event per tenant, not one per enrollment
        assert_eq!(fetch.invalidations.len(), 1);
        assert!(matches!(
            fetch.invalidations[0],
            InvalidationEvent::Tenant { ref tenant_slug, ref reason }
                if tenant_slug == "club-a" && reason == "season ended"
        ));
    }

    #[test]
    fn duplicate_shifts_across_enrollments_are_merged() {
        let model = enroll(&DeviceModel::new(), "club-a", "T1", "tok-1");
        let model = enroll(&model, "club-a", "T2", "tok-2");

        let gateway = MockGateway::new();
        let mut older = shift("s1");
        older.updated_at = Some(1);
        let mut newer = shift("s1");
        newer.updated_at = Some(2);
        newer.volunteers = vec!["Alice".into()];
        gateway.script_shifts("tok-1", Ok(vec![older]));
        gateway.script_shifts("tok-2", Ok(vec![newer.clone()]));

        let fetch = fetch_all(&gateway, &model).unwrap();
        assert_eq!(fetch.shifts, vec![newer]);
    }
}
