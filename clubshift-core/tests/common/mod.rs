// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Shared fixtures and builders used across the integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use clubshift_core::{
    ClubShift, CoreConfig, MemoryModelStore, MockGateway, ModelStore, RegistrationGrant, Role,
    Shift, TeamGrant, TeamInfo, TenantInfo,
};

/// A manager-role team grant.
pub fn manager_grant(id: &str, code: Option<&str>, name: &str) -> TeamGrant {
    TeamGrant {
        id: id.to_string(),
        code: code.map(str::to_string),
        name: name.to_string(),
        role: Role::Manager,
    }
}

/// A member-role team grant.
pub fn member_grant(id: &str, name: &str) -> TeamGrant {
    TeamGrant {
        id: id.to_string(),
        code: None,
        name: name.to_string(),
        role: Role::Member,
    }
}

/// A registration grant for one tenant with the given teams.
pub fn grant(tenant_slug: &str, signed_token: &str, teams: Vec<TeamGrant>) -> RegistrationGrant {
    RegistrationGrant {
        tenant_slug: tenant_slug.to_string(),
        tenant_name: format!("{} e.V.", tenant_slug),
        club_logo_url: None,
        teams,
        signed_token: signed_token.to_string(),
        email: Some("manager@example.org".to_string()),
    }
}

/// A shift record with sensible defaults.
pub fn shift(id: &str, tenant_slug: &str, starts_at: u64) -> Shift {
    Shift {
        id: id.to_string(),
        tenant_slug: tenant_slug.to_string(),
        team_id: None,
        name: format!("Shift {}", id),
        location: Some("Clubhouse".to_string()),
        starts_at,
        ends_at: starts_at + 7_200_000,
        volunteers: Vec::new(),
        volunteers_needed: 2,
        updated_at: None,
    }
}

/// A backend-side team listing entry.
pub fn team_info(id: &str, code: Option<&str>, name: &str) -> TeamInfo {
    TeamInfo {
        id: id.to_string(),
        code: code.map(str::to_string),
        name: name.to_string(),
    }
}

/// An authoritative membership snapshot for one tenant.
pub fn tenant_info(slug: &str, season_ended: bool, teams: Vec<TeamInfo>) -> TenantInfo {
    TenantInfo {
        slug: slug.to_string(),
        name: format!("{} e.V.", slug),
        logo_url: None,
        season_ended,
        teams,
    }
}

/// A fresh core wired to a shared mock gateway and an in-memory store.
pub fn new_core() -> (
    Arc<MockGateway>,
    ClubShift<Arc<MockGateway>, MemoryModelStore>,
) {
    let gateway = Arc::new(MockGateway::new());
    let core = ClubShift::new(
        gateway.clone(),
        MemoryModelStore::new(),
        CoreConfig::default(),
    )
    .expect("core construction");
    (gateway, core)
}

/// Scripts and completes one enrollment, returning the tenant slug.
pub fn enroll<S: ModelStore>(
    core: &mut ClubShift<Arc<MockGateway>, S>,
    gateway: &MockGateway,
    enrollment_token: &str,
    tenant_slug: &str,
    signed_token: &str,
    teams: Vec<TeamGrant>,
) -> String {
    gateway.script_register_device(enrollment_token, Ok(grant(tenant_slug, signed_token, teams)));
    core.enroll_with_token(enrollment_token)
        .expect("enrollment")
}
