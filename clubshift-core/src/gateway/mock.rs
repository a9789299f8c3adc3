//! Mock Gateway
//!
//! Scripted in-memory backend for tests. Responses are keyed by the
//! credential or argument they answer to; every call is recorded so tests
//! can assert on traffic.

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::{GatewayError, GatewayResult};
use super::types::{
    EnrollmentClaim, ReconcileMismatch, RegistrationGrant, TeamInfo, TenantInfo, TenantSummary,
};
use super::BackendGateway;
use crate::shifts::Shift;

/// Scripted backend gateway for tests.
#[derive(Default)]
pub struct MockGateway {
    register_device_responses: Mutex<HashMap<String, GatewayResult<RegistrationGrant>>>,
    register_member_responses: Mutex<Vec<GatewayResult<RegistrationGrant>>>,
    shift_responses: Mutex<HashMap<String, GatewayResult<Vec<Shift>>>>,
    tenant_info_response: Mutex<Option<GatewayResult<Vec<TenantInfo>>>>,
    reconcile_response: Mutex<Option<GatewayResult<Vec<ReconcileMismatch>>>>,
    volunteer_response: Mutex<Option<GatewayResult<Shift>>>,
    allowed_teams: Mutex<Vec<TeamInfo>>,
    removal_failure: Mutex<Option<GatewayError>>,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        MockGateway::default()
    }

    /// Scripts the response for `register_device` with this enrollment token.
    pub fn script_register_device(
        &self,
        enrollment_token: &str,
        response: GatewayResult<RegistrationGrant>,
    ) {
        self.register_device_responses
            .lock()
            .unwrap()
            .insert(enrollment_token.to_string(), response);
    }

    /// Queues the next `register_member` response.
    pub fn script_register_member(&self, response: GatewayResult<RegistrationGrant>) {
        self.register_member_responses.lock().unwrap().push(response);
    }

    /// Scripts the `fetch_shifts` response for a credential.
    pub fn script_shifts(&self, token: &str, response: GatewayResult<Vec<Shift>>) {
        self.shift_responses
            .lock()
            .unwrap()
            .insert(token.to_string(), response);
    }

    /// Scripts the authoritative membership snapshot.
    pub fn script_tenant_info(&self, response: GatewayResult<Vec<TenantInfo>>) {
        *self.tenant_info_response.lock().unwrap() = Some(response);
    }

    /// Scripts the reconciliation findings. Unscripted, the cross-check
    /// reports no mismatches.
    pub fn script_reconcile(&self, response: GatewayResult<Vec<ReconcileMismatch>>) {
        *self.reconcile_response.lock().unwrap() = Some(response);
    }

    /// Scripts the next volunteer add/remove response.
    pub fn script_volunteer(&self, response: GatewayResult<Shift>) {
        *self.volunteer_response.lock().unwrap() = Some(response);
    }

    /// Scripts the allowed-teams listing.
    pub fn script_allowed_teams(&self, teams: Vec<TeamInfo>) {
        *self.allowed_teams.lock().unwrap() = teams;
    }

    /// Makes removal calls fail with the given error.
    pub fn script_removal_failure(&self, error: GatewayError) {
        *self.removal_failure.lock().unwrap() = Some(error);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose name starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn removal_result(&self) -> GatewayResult<()> {
        match self.removal_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl BackendGateway for MockGateway {
    fn register_device(
        &self,
        enrollment_token: &str,
        _push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        self.record(format!("register_device:{}", enrollment_token));
        self.register_device_responses
            .lock()
            .unwrap()
            .get(enrollment_token)
            .cloned()
            .unwrap_or(Err(GatewayError::Network("no scripted response".into())))
    }

    fn register_member(
        &self,
        tenant_slug: &str,
        _tenant_name: &str,
        _team_ids: &[String],
        _push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        self.record(format!("register_member:{}", tenant_slug));
        let mut queue = self.register_member_responses.lock().unwrap();
        if queue.is_empty() {
            Err(GatewayError::Network("no scripted response".into()))
        } else {
            queue.remove(0)
        }
    }

    fn fetch_allowed_teams(&self, email: &str, tenant_slug: &str) -> GatewayResult<Vec<TeamInfo>> {
        self.record(format!("fetch_allowed_teams:{}:{}", tenant_slug, email));
        Ok(self.allowed_teams.lock().unwrap().clone())
    }

    fn search_teams(&self, tenant_slug: &str, query: &str) -> GatewayResult<Vec<TeamInfo>> {
        self.record(format!("search_teams:{}:{}", tenant_slug, query));
        Ok(self.allowed_teams.lock().unwrap().clone())
    }

    fn search_tenants(&self, query: &str) -> GatewayResult<Vec<TenantSummary>> {
        self.record(format!("search_tenants:{}", query));
        Ok(Vec::new())
    }

    fn fetch_shifts(&self, tenant_slug: &str, token: &str) -> GatewayResult<Vec<Shift>> {
        self.record(format!("fetch_shifts:{}:{}", tenant_slug, token));
        self.shift_responses
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or(Err(GatewayError::Network("no scripted response".into())))
    }

    fn add_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        _token: &str,
    ) -> GatewayResult<Shift> {
        self.record(format!("add_volunteer:{}:{}:{}", tenant_slug, shift_id, name));
        self.volunteer_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(GatewayError::Network("no scripted response".into())))
    }

    fn remove_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        _token: &str,
    ) -> GatewayResult<Shift> {
        self.record(format!(
            "remove_volunteer:{}:{}:{}",
            tenant_slug, shift_id, name
        ));
        self.volunteer_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(GatewayError::Network("no scripted response".into())))
    }

    fn fetch_tenant_info(&self, _token: &str) -> GatewayResult<Vec<TenantInfo>> {
        self.record("fetch_tenant_info".to_string());
        self.tenant_info_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(GatewayError::Network("no scripted response".into())))
    }

    fn remove_teams(&self, team_ids: &[String], _token: &str) -> GatewayResult<()> {
        self.record(format!("remove_teams:{}", team_ids.join(",")));
        self.removal_result()
    }

    fn remove_tenant(&self, tenant_slug: &str, _token: &str) -> GatewayResult<()> {
        self.record(format!("remove_tenant:{}", tenant_slug));
        self.removal_result()
    }

    fn remove_all_enrollments(&self, _token: &str) -> GatewayResult<()> {
        self.record("remove_all_enrollments".to_string());
        self.removal_result()
    }

    fn update_push_token(&self, push_token: &str, _token: &str) -> GatewayResult<()> {
        self.record(format!("update_push_token:{}", push_token));
        Ok(())
    }

    fn reconcile_enrollments(
        &self,
        claims: &[EnrollmentClaim],
        hardware_id: &str,
        _token: &str,
    ) -> GatewayResult<Vec<ReconcileMismatch>> {
        self.record(format!(
            "reconcile_enrollments:{}:{}",
            hardware_id,
            claims.len()
        ));
        self.reconcile_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
