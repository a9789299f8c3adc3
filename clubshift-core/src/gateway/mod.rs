// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backend Gateway
//!
//! Abstract network collaborator the core depends on. The trait keeps a
//! synchronous interface for simplicity in the core library; platform
//! implementations may internally use async runtimes but expose blocking
//! calls here. `MockGateway` serves tests, `HttpGateway` (behind the
//! `http-gateway` feature) serves production.

pub mod error;
#[cfg(feature = "http-gateway")]
pub mod http;
pub mod mock;
pub mod types;

pub use error::{GatewayError, GatewayResult};
#[cfg(feature = "http-gateway")]
pub use http::{HttpGateway, HttpGatewayConfig};
pub use mock::MockGateway;
pub use types::{
    EnrollmentClaim, ReconcileMismatch, RegistrationGrant, TeamInfo, TenantInfo, TenantSummary,
};

use crate::shifts::Shift;

/// Backend operations the core depends on.
///
/// `Send + Sync` because the shift aggregator issues calls from scoped
/// worker threads against a shared reference.
pub trait BackendGateway: Send + Sync {
    /// Completes an enrollment started via an emailed magic link.
    fn register_device(
        &self,
        enrollment_token: &str,
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant>;

    /// Member self-enrollment (no email gate).
    fn register_member(
        &self,
        tenant_slug: &str,
        tenant_name: &str,
        team_ids: &[String],
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant>;

    /// Teams a manager email may enroll for within a tenant.
    fn fetch_allowed_teams(&self, email: &str, tenant_slug: &str) -> GatewayResult<Vec<TeamInfo>>;

    /// Team search within a tenant.
    fn search_teams(&self, tenant_slug: &str, query: &str) -> GatewayResult<Vec<TeamInfo>>;

    /// Tenant search.
    fn search_tenants(&self, query: &str) -> GatewayResult<Vec<TenantSummary>>;

    /// Shifts visible to the given credential, scoped to one tenant.
    fn fetch_shifts(&self, tenant_slug: &str, token: &str) -> GatewayResult<Vec<Shift>>;

    /// Signs `name` up for a shift. Returns the updated record.
    fn add_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift>;

    /// Takes `name` off a shift roster. Returns the updated record.
    fn remove_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift>;

    /// Authoritative membership snapshot for the device behind `token`.
    fn fetch_tenant_info(&self, token: &str) -> GatewayResult<Vec<TenantInfo>>;

    /// Unfollows teams backend-side.
    fn remove_teams(&self, team_ids: &[String], token: &str) -> GatewayResult<()>;

    /// Drops the device's enrollment with a tenant backend-side.
    fn remove_tenant(&self, tenant_slug: &str, token: &str) -> GatewayResult<()>;

    /// Drops every enrollment for this device backend-side.
    fn remove_all_enrollments(&self, token: &str) -> GatewayResult<()>;

    /// Registers or refreshes the device push identifier.
    fn update_push_token(&self, push_token: &str, token: &str) -> GatewayResult<()>;

    /// Cross-checks locally held enrollments against the backend's view.
    /// Returns the mismatches the backend found.
    fn reconcile_enrollments(
        &self,
        claims: &[EnrollmentClaim],
        hardware_id: &str,
        token: &str,
    ) -> GatewayResult<Vec<ReconcileMismatch>>;
}

// Lets callers hand the core a shared gateway while keeping a handle
// themselves, which tests use to script the mock mid-session.
impl<G: BackendGateway + ?Sized> BackendGateway for std::sync::Arc<G> {
    fn register_device(
        &self,
        enrollment_token: &str,
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        (**self).register_device(enrollment_token, push_token)
    }

    fn register_member(
        &self,
        tenant_slug: &str,
        tenant_name: &str,
        team_ids: &[String],
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        (**self).register_member(tenant_slug, tenant_name, team_ids, push_token)
    }

    fn fetch_allowed_teams(&self, email: &str, tenant_slug: &str) -> GatewayResult<Vec<TeamInfo>> {
        (**self).fetch_allowed_teams(email, tenant_slug)
    }

    fn search_teams(&self, tenant_slug: &str, query: &str) -> GatewayResult<Vec<TeamInfo>> {
        (**self).search_teams(tenant_slug, query)
    }

    fn search_tenants(&self, query: &str) -> GatewayResult<Vec<TenantSummary>> {
        (**self).search_tenants(query)
    }

    fn fetch_shifts(&self, tenant_slug: &str, token: &str) -> GatewayResult<Vec<Shift>> {
        (**self).fetch_shifts(tenant_slug, token)
    }

    fn add_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift> {
        (**self).add_volunteer(tenant_slug, shift_id, name, token)
    }

    fn remove_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift> {
        (**self).remove_volunteer(tenant_slug, shift_id, name, token)
    }

    fn fetch_tenant_info(&self, token: &str) -> GatewayResult<Vec<TenantInfo>> {
        (**self).fetch_tenant_info(token)
    }

    fn remove_teams(&self, team_ids: &[String], token: &str) -> GatewayResult<()> {
        (**self).remove_teams(team_ids, token)
    }

    fn remove_tenant(&self, tenant_slug: &str, token: &str) -> GatewayResult<()> {
        (**self).remove_tenant(tenant_slug, token)
    }

    fn remove_all_enrollments(&self, token: &str) -> GatewayResult<()> {
        (**self).remove_all_enrollments(token)
    }

    fn update_push_token(&self, push_token: &str, token: &str) -> GatewayResult<()> {
        (**self).update_push_token(push_token, token)
    }

    fn reconcile_enrollments(
        &self,
        claims: &[EnrollmentClaim],
        hardware_id: &str,
        token: &str,
    ) -> GatewayResult<Vec<ReconcileMismatch>> {
        (**self).reconcile_enrollments(claims, hardware_id, token)
    }
}
