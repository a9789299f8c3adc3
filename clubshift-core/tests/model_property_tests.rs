// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Model Property Tests
//!
//! Property-based checks of the enrollment model invariants under
//! arbitrary grant and removal sequences, and of the shift ordering
//! contract.

use clubshift_core::{
    merge_shifts, order_for_display, DeviceModel, EnrollmentDelta, Role, Shift, TeamGrant,
    MAX_TOTAL_TEAMS,
};
use proptest::prelude::*;

fn team_grant_strategy() -> impl Strategy<Value = TeamGrant> {
    ("t[0-9]", prop::bool::ANY).prop_map(|(id, manager)| TeamGrant {
        id: id.clone(),
        code: None,
        name: id,
        role: if manager { Role::Manager } else { Role::Member },
    })
}

fn delta_strategy() -> impl Strategy<Value = EnrollmentDelta> {
    (
        "club-[abc]",
        prop::collection::vec(team_grant_strategy(), 1..4),
        "tok-[0-9]{4}",
    )
        .prop_map(|(slug, teams, token)| EnrollmentDelta {
            tenant_slug: slug.clone(),
            tenant_name: slug,
            club_logo_url: None,
            teams,
            signed_token: token,
            email: None,
        })
}

/// Applies deltas in order, skipping the ones the model rejects.
fn apply_all(deltas: &[EnrollmentDelta]) -> DeviceModel {
    deltas.iter().fold(DeviceModel::new(), |model, delta| {
        model.apply_delta(delta).unwrap_or(model)
    })
}

/// Structural invariants that must hold after any operation sequence.
fn assert_consistent(model: &DeviceModel) {
    assert!(model.team_count() <= MAX_TOTAL_TEAMS);
    for enrollment in model.enrollments.values() {
        assert!(!enrollment.teams.is_empty(), "no empty enrollments");
        let tenant = model
            .tenants
            .get(&enrollment.tenant_slug)
            .expect("enrollment tenant exists");
        assert!(
            tenant.enrollment_ids.contains(&enrollment.id),
            "enrollment reachable from its tenant"
        );
    }
    for tenant in model.tenants.values() {
        for id in &tenant.enrollment_ids {
            let enrollment = model.enrollments.get(id).expect("no dangling back-refs");
            assert_eq!(enrollment.tenant_slug, tenant.slug);
        }
        let mut team_ids: Vec<&str> = tenant.teams.iter().map(|t| t.id.as_str()).collect();
        team_ids.sort_unstable();
        let before = team_ids.len();
        team_ids.dedup();
        assert_eq!(before, team_ids.len(), "team ids unique within a tenant");
    }
}

proptest! {
    #[test]
    fn team_cap_holds_under_any_grant_sequence(
        deltas in prop::collection::vec(delta_strategy(), 0..12)
    ) {
        let model = apply_all(&deltas);
        assert_consistent(&model);
    }

    #[test]
    fn removals_never_leave_orphans(
        deltas in prop::collection::vec(delta_strategy(), 1..8),
        removals in prop::collection::vec(("club-[abc]", "t[0-9]"), 0..8)
    ) {
        let mut model = apply_all(&deltas);
        for (slug, team) in removals {
            if let Ok(next) = model.remove_team(&slug, &team) {
                model = next;
            }
            assert_consistent(&model);
        }
    }

    #[test]
    fn tenant_removal_always_leaves_a_consistent_model(
        deltas in prop::collection::vec(delta_strategy(), 1..8),
        victim in "club-[abc]"
    ) {
        let model = apply_all(&deltas);
        if let Ok(next) = model.remove_tenant(&victim) {
            assert!(!next.tenants.contains_key(&victim));
            assert_consistent(&next);
        }
    }

    #[test]
    fn merged_pools_hold_unique_shift_ids(
        pools in prop::collection::vec(
            prop::collection::vec(("s[0-9]", 0u64..10_000), 0..6),
            0..4
        )
    ) {
        let pools: Vec<Vec<Shift>> = pools
            .into_iter()
            .map(|pool| {
                pool.into_iter()
                    .map(|(id, starts_at)| Shift {
                        id,
                        tenant_slug: "club-a".to_string(),
                        team_id: None,
                        name: "Shift".to_string(),
                        location: None,
                        starts_at,
                        ends_at: starts_at + 100,
                        volunteers: Vec::new(),
                        volunteers_needed: 1,
                        updated_at: None,
                    })
                    .collect()
            })
            .collect();
        let total: usize = pools.iter().map(Vec::len).sum();

        let merged = merge_shifts(pools);
        let mut ids: Vec<&str> = merged.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        let before_dedup = ids.len();
        ids.dedup();
        prop_assert_eq!(before_dedup, ids.len());
        prop_assert!(merged.len() <= total);
    }

    #[test]
    fn display_order_partitions_and_preserves_every_shift(
        starts in prop::collection::vec(0u64..20_000, 0..12),
        now in 0u64..20_000
    ) {
        let shifts: Vec<Shift> = starts
            .iter()
            .enumerate()
            .map(|(i, &starts_at)| Shift {
                id: format!("s{}", i),
                tenant_slug: "club-a".to_string(),
                team_id: None,
                name: "Shift".to_string(),
                location: None,
                starts_at,
                ends_at: starts_at + 100,
                volunteers: Vec::new(),
                volunteers_needed: 1,
                updated_at: None,
            })
            .collect();

        let ordered = order_for_display(shifts.clone(), now);
        prop_assert_eq!(ordered.len(), shifts.len());

        // Upcoming block first, ascending; past block after, descending.
        let boundary = ordered.iter().take_while(|s| s.is_upcoming(now)).count();
        prop_assert!(ordered[boundary..].iter().all(|s| !s.is_upcoming(now)));
        for pair in ordered[..boundary].windows(2) {
            prop_assert!(pair[0].starts_at <= pair[1].starts_at);
        }
        for pair in ordered[boundary..].windows(2) {
            prop_assert!(pair[0].starts_at >= pair[1].starts_at);
        }
    }
}
