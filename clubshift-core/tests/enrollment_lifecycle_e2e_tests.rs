// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Enrollment Lifecycle Tests
//!
//! End-to-end journeys through the orchestrator, covering a full season:
//! enroll with two clubs, work shifts, lose one club to a season end,
//! dismiss the frozen summary, and re-enroll for the next season.

mod common;

use clubshift_core::{now_ms, GatewayError, ReconcileMismatch};
use common::{enroll, grant, manager_grant, member_grant, new_core, shift, team_info, tenant_info};

#[test]
fn two_club_season_with_a_mid_season_revocation() {
    let (gateway, mut core) = new_core();

    // A parent manages the U11 at one club and plays in another.
    enroll(
        &mut core,
        &gateway,
        "magic-svw",
        "svw",
        "tok-svw",
        vec![manager_grant("u11", Some("u11"), "U11")],
    );
    enroll(
        &mut core,
        &gateway,
        "magic-tsv",
        "tsv",
        "tok-tsv",
        vec![member_grant("h1", "Herren 1")],
    );
    assert_eq!(core.model().team_count(), 2);

    // Both clubs contribute to one merged, ordered pool.
    let now = now_ms();
    gateway.script_shifts("tok-svw", Ok(vec![shift("bar", "svw", now + 3_600_000)]));
    gateway.script_shifts("tok-tsv", Ok(vec![shift("grill", "tsv", now + 7_200_000)]));
    let pool = core.refresh_shifts().unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool[0].id, "bar");

    // Sign up for the bar shift at the managed club.
    let mut bar_taken = shift("bar", "svw", now + 3_600_000);
    bar_taken.volunteers = vec!["Kim".to_string()];
    gateway.script_volunteer(Ok(bar_taken));
    assert!(core.sign_up("svw", "u11", "bar", "Kim").unwrap().has_volunteer("Kim"));

    // Mid-season, the playing club's season ends.
    gateway.script_shifts(
        "tok-tsv",
        Err(GatewayError::TokenRevoked {
            reason: "season ended".to_string(),
        }),
    );
    let pool = core.refresh_shifts().unwrap();
    assert_eq!(pool.len(), 1, "managed club still serves data");
    let frozen = &core.model().tenants["tsv"];
    assert!(frozen.season_ended);
    assert!(frozen.has_team_id("h1"), "summary data preserved");

    // No credential works against the frozen club anymore.
    assert!(core.sign_up("tsv", "h1", "grill", "Kim").is_err());

    // Dismissing the summary drops the club for good.
    core.remove_tenant("tsv").unwrap();
    assert!(!core.model().tenants.contains_key("tsv"));
    assert!(core.is_enrolled(), "the managed club is untouched");

    // Next season: a fresh magic link re-enrolls the same club.
    enroll(
        &mut core,
        &gateway,
        "magic-tsv-2027",
        "tsv",
        "tok-tsv-2027",
        vec![member_grant("h1", "Herren 1")],
    );
    assert!(!core.model().tenants["tsv"].season_ended);
    assert_eq!(core.model().team_count(), 2);
}

#[test]
fn reconciliation_converges_a_stale_device_after_membership_changes() {
    let (gateway, mut core) = new_core();
    enroll(
        &mut core,
        &gateway,
        "magic-svw",
        "svw",
        "tok-svw",
        vec![
            manager_grant("u11", None, "U11"),
            manager_grant("u13", None, "U13"),
        ],
    );
    enroll(
        &mut core,
        &gateway,
        "magic-tsv",
        "tsv",
        "tok-tsv",
        vec![member_grant("h1", "Herren 1")],
    );
    let stale_enrollment = core
        .model()
        .enrollments
        .values()
        .find(|e| e.tenant_slug == "tsv")
        .map(|e| e.id.clone())
        .unwrap();

    // Backend truth: the U13 was handed to another parent, the club
    // renamed itself, and the tsv enrollment was invalidated after a
    // device transfer.
    let mut svw = tenant_info("svw", false, vec![team_info("u11", None, "U11 Rot")]);
    svw.name = "SV Windhausen 1921".to_string();
    gateway.script_tenant_info(Ok(vec![
        svw,
        tenant_info("tsv", false, vec![team_info("h1", None, "Herren 1")]),
    ]));
    gateway.script_reconcile(Ok(vec![ReconcileMismatch::Enrollment {
        enrollment_id: stale_enrollment,
        tenant_slug: "tsv".to_string(),
        reason: "device identity rotated".to_string(),
    }]));

    core.reconcile().unwrap();

    let model = core.model();
    assert_eq!(model.tenants["svw"].name, "SV Windhausen 1921");
    assert_eq!(model.tenants["svw"].teams[0].name, "U11 Rot");
    assert!(!model.tenants["svw"].has_team_id("u13"), "pruned");
    assert!(!model.tenants.contains_key("tsv"), "stale enrollment cascaded");
    assert_eq!(model.team_count(), 1);
}

#[test]
fn reconciliation_failure_leaves_the_model_untouched() {
    let (gateway, mut core) = new_core();
    enroll(
        &mut core,
        &gateway,
        "magic-svw",
        "svw",
        "tok-svw",
        vec![manager_grant("u11", None, "U11")],
    );
    gateway.script_tenant_info(Err(GatewayError::Network("captive portal".to_string())));

    let before = core.model().clone();
    core.reconcile().unwrap();

    assert_eq!(core.model(), &before);
}

#[test]
fn refresh_with_reconcile_enabled_runs_the_pass_first() {
    let gateway = std::sync::Arc::new(clubshift_core::MockGateway::new());
    let mut config = clubshift_core::CoreConfig::default();
    config.reconcile_on_refresh = true;
    let mut core = clubshift_core::ClubShift::new(
        gateway.clone(),
        clubshift_core::MemoryModelStore::new(),
        config,
    )
    .expect("core construction");

    enroll(
        &mut core,
        &gateway,
        "magic-svw",
        "svw",
        "tok-svw",
        vec![manager_grant("u11", None, "U11")],
    );
    gateway.script_tenant_info(Ok(vec![tenant_info(
        "svw",
        false,
        vec![team_info("u11", None, "U11")],
    )]));
    gateway.script_shifts("tok-svw", Ok(vec![shift("bar", "svw", now_ms() + 1_000)]));

    core.refresh_shifts().unwrap();

    assert_eq!(gateway.call_count("fetch_tenant_info"), 1);
    assert_eq!(gateway.call_count("fetch_shifts"), 1);
}

#[test]
fn enrollment_rejected_when_five_teams_are_already_followed_anywhere() {
    let (gateway, mut core) = new_core();
    // Three teams at one club, two at another.
    enroll(
        &mut core,
        &gateway,
        "magic-svw",
        "svw",
        "tok-svw",
        vec![
            manager_grant("t1", None, "U11"),
            manager_grant("t2", None, "U13"),
            manager_grant("t3", None, "U15"),
        ],
    );
    enroll(
        &mut core,
        &gateway,
        "magic-tsv",
        "tsv",
        "tok-tsv",
        vec![member_grant("h1", "Herren 1"), member_grant("h2", "Herren 2")],
    );

    gateway.script_register_device(
        "magic-third",
        Ok(grant("fcb", "tok-fcb", vec![member_grant("x1", "Damen 1")])),
    );
    assert!(core.enroll_with_token("magic-third").is_err());
    assert_eq!(core.model().team_count(), 5);
}
