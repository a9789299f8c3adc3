//! HTTP Gateway
//!
//! Blocking `reqwest` implementation of the backend gateway. Kept behind
//! the `http-gateway` feature so hosts that bring their own transport
//! don't pull in an HTTP client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::error::{GatewayError, GatewayResult};
use super::types::{
    EnrollmentClaim, ReconcileMismatch, RegistrationGrant, TeamInfo, TenantInfo, TenantSummary,
};
use super::BackendGateway;
use crate::shifts::Shift;

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        HttpGatewayConfig {
            base_url: String::new(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Structured error body the backend attaches to non-success statuses.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Backend gateway over HTTPS.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a gateway from config.
    pub fn new(config: &HttpGatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "ClubShift/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(HttpGateway {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .send()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // Token-level failures arrive as a structured body; anything else
        // stays an HTTP-status transport error.
        let code = status.as_u16();
        match response.json::<ApiErrorBody>() {
            Ok(body) => Err(match body.error.as_str() {
                "invalid_token" => GatewayError::InvalidToken,
                "device_not_found" => GatewayError::DeviceNotFound,
                "token_revoked" => GatewayError::TokenRevoked {
                    reason: body.reason.unwrap_or_else(|| "unknown".into()),
                },
                _ => GatewayError::Http(code),
            }),
            Err(_) => Err(GatewayError::Http(code)),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, response: Response) -> GatewayResult<T> {
        response
            .json()
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> GatewayResult<T> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let response = self.send(req)?;
        self.decode(response)
    }
}

impl BackendGateway for HttpGateway {
    fn register_device(
        &self,
        enrollment_token: &str,
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        let response = self.send(self.client.post(self.url("/devices/register")).json(&json!({
            "enrollment_token": enrollment_token,
            "push_token": push_token,
        })))?;
        self.decode(response)
    }

    fn register_member(
        &self,
        tenant_slug: &str,
        tenant_name: &str,
        team_ids: &[String],
        push_token: Option<&str>,
    ) -> GatewayResult<RegistrationGrant> {
        let response = self.send(self.client.post(self.url("/members/register")).json(&json!({
            "tenant_slug": tenant_slug,
            "tenant_name": tenant_name,
            "team_ids": team_ids,
            "push_token": push_token,
        })))?;
        self.decode(response)
    }

    fn fetch_allowed_teams(&self, email: &str, tenant_slug: &str) -> GatewayResult<Vec<TeamInfo>> {
        let response = self.send(
            self.client
                .get(self.url(&format!("/tenants/{}/allowed-teams", tenant_slug)))
                .query(&[("email", email)]),
        )?;
        self.decode(response)
    }

    fn search_teams(&self, tenant_slug: &str, query: &str) -> GatewayResult<Vec<TeamInfo>> {
        let response = self.send(
            self.client
                .get(self.url(&format!("/tenants/{}/teams", tenant_slug)))
                .query(&[("query", query)]),
        )?;
        self.decode(response)
    }

    fn search_tenants(&self, query: &str) -> GatewayResult<Vec<TenantSummary>> {
        let response = self.send(self.client.get(self.url("/tenants")).query(&[("query", query)]))?;
        self.decode(response)
    }

    fn fetch_shifts(&self, tenant_slug: &str, token: &str) -> GatewayResult<Vec<Shift>> {
        self.get_json(&format!("/tenants/{}/shifts", tenant_slug), Some(token))
    }

    fn add_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift> {
        let response = self.send(
            self.client
                .post(self.url(&format!(
                    "/tenants/{}/shifts/{}/volunteers",
                    tenant_slug, shift_id
                )))
                .bearer_auth(token)
                .json(&json!({ "name": name })),
        )?;
        self.decode(response)
    }

    fn remove_volunteer(
        &self,
        tenant_slug: &str,
        shift_id: &str,
        name: &str,
        token: &str,
    ) -> GatewayResult<Shift> {
        let response = self.send(
            self.client
                .delete(self.url(&format!(
                    "/tenants/{}/shifts/{}/volunteers",
                    tenant_slug, shift_id
                )))
                .bearer_auth(token)
                .json(&json!({ "name": name })),
        )?;
        self.decode(response)
    }

    fn fetch_tenant_info(&self, token: &str) -> GatewayResult<Vec<TenantInfo>> {
        self.get_json("/device/tenants", Some(token))
    }

    fn remove_teams(&self, team_ids: &[String], token: &str) -> GatewayResult<()> {
        self.send(
            self.client
                .post(self.url("/device/teams/remove"))
                .bearer_auth(token)
                .json(&json!({ "team_ids": team_ids })),
        )?;
        Ok(())
    }

    fn remove_tenant(&self, tenant_slug: &str, token: &str) -> GatewayResult<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/tenants/{}/enrollment", tenant_slug)))
                .bearer_auth(token),
        )?;
        Ok(())
    }

    fn remove_all_enrollments(&self, token: &str) -> GatewayResult<()> {
        self.send(
            self.client
                .delete(self.url("/device/enrollments"))
                .bearer_auth(token),
        )?;
        Ok(())
    }

    fn update_push_token(&self, push_token: &str, token: &str) -> GatewayResult<()> {
        self.send(
            self.client
                .put(self.url("/device/push-token"))
                .bearer_auth(token)
                .json(&json!({ "push_token": push_token })),
        )?;
        Ok(())
    }

    fn reconcile_enrollments(
        &self,
        claims: &[EnrollmentClaim],
        hardware_id: &str,
        token: &str,
    ) -> GatewayResult<Vec<ReconcileMismatch>> {
        let response = self.send(
            self.client
                .post(self.url("/device/reconcile"))
                .bearer_auth(token)
                .json(&json!({
                    "hardware_id": hardware_id,
                    "enrollments": claims,
                })),
        )?;
        self.decode(response)
    }
}
