//! ClubShift Orchestrator
//!
//! Main entry point wiring the enrollment model, persistence, backend
//! gateway, and event dispatch together. All model mutations funnel
//! through here: a mutation produces a new model value, the commit is a
//! single assignment, and the result is persisted before events go out.

use std::sync::Arc;

use crate::gateway::{BackendGateway, TeamInfo, TenantSummary};
use crate::model::{now_ms, DeviceModel, EnrollmentDelta};
use crate::reconcile::{self, InvalidationEvent, ReconcileOutcome};
use crate::shifts::{self, order_for_display, Shift};
use crate::store::{load_model, save_model, ModelStore};
use crate::token;

use super::config::CoreConfig;
use super::error::{ClubShiftError, ClubShiftResult};
use super::events::{ClubShiftEvent, EventDispatcher, EventHandler};
use super::gate::RefreshGate;
use super::guard::{GuardDecision, OperationGuard};

/// The ClubShift core orchestrator.
///
/// Owns the device model; the host drives it from one logical task.
pub struct ClubShift<G: BackendGateway, S: ModelStore> {
    gateway: G,
    store: S,
    config: CoreConfig,
    model: DeviceModel,
    events: EventDispatcher,
    guard: OperationGuard,
    gate: Arc<RefreshGate>,
}

impl<G: BackendGateway, S: ModelStore> ClubShift<G, S> {
    /// Loads the persisted model (or starts empty) and wires the core.
    pub fn new(gateway: G, store: S, config: CoreConfig) -> ClubShiftResult<Self> {
        let model = load_model(&store)?;
        // Persist immediately so a fresh device id survives the session.
        save_model(&store, &model)?;
        Ok(ClubShift {
            gateway,
            store,
            config,
            model,
            events: EventDispatcher::new(),
            guard: OperationGuard::new(),
            gate: Arc::new(RefreshGate::new()),
        })
    }

    /// Registers an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.events.add_handler(handler);
    }

    /// The gate push-driven navigation waits on.
    pub fn refresh_gate(&self) -> Arc<RefreshGate> {
        self.gate.clone()
    }

    /// Read access to the current model.
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// True while the device holds at least one tenant.
    pub fn is_enrolled(&self) -> bool {
        self.model.is_enrolled()
    }

    fn commit(&mut self, model: DeviceModel) -> ClubShiftResult<()> {
        self.model = model;
        save_model(&self.store, &self.model)?;
        Ok(())
    }

    // ============================================================
    // Enrollment
    // ============================================================

    /// Completes an enrollment started via an emailed magic link.
    /// Returns the slug of the tenant enrolled with.
    pub fn enroll_with_token(&mut self, enrollment_token: &str) -> ClubShiftResult<String> {
        let key = format!("device:{}", enrollment_token);
        self.enroll(&key, |core| {
            core.gateway
                .register_device(enrollment_token, core.model.push_token.as_deref())
        })
    }

    /// Member self-enrollment for a set of teams within a tenant.
    /// Returns the slug of the tenant enrolled with.
    pub fn enroll_member(
        &mut self,
        tenant_slug: &str,
        tenant_name: &str,
        team_ids: &[String],
    ) -> ClubShiftResult<String> {
        let mut sorted = team_ids.to_vec();
        sorted.sort();
        let key = format!("member:{}:{}", tenant_slug, sorted.join("+"));
        self.enroll(&key, |core| {
            core.gateway.register_member(
                tenant_slug,
                tenant_name,
                team_ids,
                core.model.push_token.as_deref(),
            )
        })
    }

    fn enroll<F>(&mut self, guard_key: &str, register: F) -> ClubShiftResult<String>
    where
        F: FnOnce(&Self) -> crate::gateway::GatewayResult<crate::gateway::RegistrationGrant>,
    {
        match self.guard.begin(guard_key) {
            GuardDecision::InFlight => return Err(ClubShiftError::EnrollmentInProgress),
            GuardDecision::Consumed => return Err(ClubShiftError::EnrollmentAlreadyUsed),
            GuardDecision::Admitted => {}
        }

        // The cap is checked locally before any network call.
        if self.model.remaining_capacity() == 0 {
            self.guard.release(guard_key);
            return Err(ClubShiftError::TeamLimitReached);
        }

        let grant = match register(self) {
            Ok(grant) => grant,
            Err(e) => {
                self.guard.release(guard_key);
                return Err(e.into());
            }
        };
        // The backend consumed the request; a retry with the same key
        // would fail server-side, so the key is spent either way.
        self.guard.complete(guard_key);

        let delta: EnrollmentDelta = grant.into();
        let next = self.model.apply_delta(&delta)?;
        let enrollment_id = next
            .enrollments
            .keys()
            .find(|id| !self.model.enrollments.contains_key(*id))
            .cloned()
            .unwrap_or_default();
        self.commit(next)?;
        self.events.dispatch(ClubShiftEvent::EnrollmentAdded {
            tenant_slug: delta.tenant_slug.clone(),
            enrollment_id,
        });
        Ok(delta.tenant_slug)
    }

    // ============================================================
    // Push registration
    // ============================================================

    /// Stores the OS push identifier and best-effort registers it with
    /// the backend using the device-wide credential. Without one, the
    /// identifier rides along on the next registration call.
    pub fn set_push_token(&mut self, push_token: &str) -> ClubShiftResult<()> {
        let mut next = self.model.clone();
        next.push_token = Some(push_token.to_string());
        next.updated_at = now_ms();
        self.commit(next)?;

        if let Some(credential) = token::primary_token(&self.model).map(str::to_string) {
            if let Err(e) = self.gateway.update_push_token(push_token, &credential) {
                tracing::warn!(error = %e, "push token registration failed, will retry later");
            }
        }
        Ok(())
    }

    // ============================================================
    // Shift data
    // ============================================================

    /// Fetches and merges shift data across all enrollments.
    ///
    /// Token-level failures revoke the affected scope and are not errors;
    /// the call errs only on total failure. The refreshed pool is
    /// published to the navigation gate before returning.
    pub fn refresh_shifts(&mut self) -> ClubShiftResult<Vec<Shift>> {
        if self.config.reconcile_on_refresh {
            self.reconcile()?;
        }

        let fetch = shifts::fetch_all(&self.gateway, &self.model)?;
        let invalidated = fetch.invalidations.len();
        self.apply_invalidations(&fetch.invalidations)?;

        let ordered = order_for_display(fetch.shifts, now_ms());
        self.gate.publish(ordered.clone());
        self.events.dispatch(ClubShiftEvent::ShiftsRefreshed {
            count: ordered.len(),
            invalidated,
        });
        Ok(ordered)
    }

    /// Bounded wait for the next refresh; returns resident data on
    /// timeout. Used by push-driven navigation.
    pub fn wait_for_shifts(&self) -> Option<Vec<Shift>> {
        self.gate.wait_for_refresh(self.config.navigation_wait)
    }

    /// Signs `name` up for a shift, authenticating with the credential
    /// resolved for the shift's team.
    pub fn sign_up(
        &mut self,
        tenant_slug: &str,
        team_ref: &str,
        shift_id: &str,
        name: &str,
    ) -> ClubShiftResult<Shift> {
        let credential = self.require_credential(tenant_slug, team_ref)?;
        Ok(self
            .gateway
            .add_volunteer(tenant_slug, shift_id, name, &credential)?)
    }

    /// Takes `name` off a shift roster.
    pub fn cancel_sign_up(
        &mut self,
        tenant_slug: &str,
        team_ref: &str,
        shift_id: &str,
        name: &str,
    ) -> ClubShiftResult<Shift> {
        let credential = self.require_credential(tenant_slug, team_ref)?;
        Ok(self
            .gateway
            .remove_volunteer(tenant_slug, shift_id, name, &credential)?)
    }

    fn require_credential(&self, tenant_slug: &str, team_ref: &str) -> ClubShiftResult<String> {
        token::resolve(&self.model, team_ref, tenant_slug)
            .map(str::to_string)
            .ok_or_else(|| ClubShiftError::NoCredential {
                team: team_ref.to_string(),
                tenant: tenant_slug.to_string(),
            })
    }

    // ============================================================
    // Reconciliation & revocation
    // ============================================================

    /// Runs one reconciliation pass. A skip is silent: the model stays
    /// untouched and the next trigger retries.
    pub fn reconcile(&mut self) -> ClubShiftResult<()> {
        match reconcile::run(&self.gateway, &self.model) {
            ReconcileOutcome::Skipped(reason) => {
                tracing::debug!(?reason, "reconciliation pass skipped");
                Ok(())
            }
            ReconcileOutcome::Completed {
                model,
                invalidations,
            } => {
                self.commit(model)?;
                self.apply_invalidations(&invalidations)
            }
        }
    }

    fn apply_invalidations(&mut self, events: &[InvalidationEvent]) -> ClubShiftResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let was_enrolled = self.model.is_enrolled();
        let next = reconcile::apply_events(&self.model, events);
        self.commit(next)?;

        for event in events {
            match event {
                InvalidationEvent::Enrollment {
                    enrollment_id,
                    tenant_slug,
                    reason,
                } => self.events.dispatch(ClubShiftEvent::EnrollmentInvalidated {
                    enrollment_id: enrollment_id.clone(),
                    tenant_slug: tenant_slug.clone(),
                    reason: reason.clone(),
                }),
                InvalidationEvent::Tenant { tenant_slug, reason } => {
                    self.events.dispatch(ClubShiftEvent::TenantRevoked {
                        tenant_slug: tenant_slug.clone(),
                        reason: reason.clone(),
                    })
                }
            }
        }
        if was_enrolled && !self.model.is_enrolled() {
            self.events.dispatch(ClubShiftEvent::Unenrolled);
        }
        Ok(())
    }

    // ============================================================
    // Removal
    // ============================================================

    /// Unfollows a team. The backend is notified best-effort; a transport
    /// failure does not block the local removal, the next reconciliation
    /// converges.
    pub fn remove_team(&mut self, tenant_slug: &str, team_ref: &str) -> ClubShiftResult<()> {
        let team_id = self
            .model
            .tenants
            .get(tenant_slug)
            .and_then(|t| t.find_team(team_ref))
            .map(|t| t.id.clone());
        if let (Some(team_id), Some(credential)) = (
            team_id,
            token::resolve(&self.model, team_ref, tenant_slug).map(str::to_string),
        ) {
            if let Err(e) = self.gateway.remove_teams(&[team_id], &credential) {
                tracing::warn!(error = %e, "backend team removal failed, removing locally");
            }
        }

        let was_enrolled = self.model.is_enrolled();
        let next = self.model.remove_team(tenant_slug, team_ref)?;
        self.commit(next)?;
        self.events.dispatch(ClubShiftEvent::TeamRemoved {
            tenant_slug: tenant_slug.to_string(),
            team_id: team_ref.to_string(),
        });
        if was_enrolled && !self.model.is_enrolled() {
            self.events.dispatch(ClubShiftEvent::Unenrolled);
        }
        Ok(())
    }

    /// Removes a tenant and all its enrollments. Also the dismissal path
    /// for season-ended tenants, which no longer hold a credential and
    /// skip the backend call.
    pub fn remove_tenant(&mut self, tenant_slug: &str) -> ClubShiftResult<()> {
        let credential = self
            .model
            .enrollments
            .values()
            .find(|e| e.tenant_slug == tenant_slug && e.has_token())
            .map(|e| e.signed_token.clone())
            .or_else(|| {
                self.model
                    .tenants
                    .get(tenant_slug)
                    .and_then(|t| t.primary_token.clone())
            });
        if let Some(credential) = credential {
            if self
                .model
                .tenants
                .get(tenant_slug)
                .is_some_and(|t| !t.season_ended)
            {
                if let Err(e) = self.gateway.remove_tenant(tenant_slug, &credential) {
                    tracing::warn!(error = %e, "backend tenant removal failed, removing locally");
                }
            }
        }

        let was_enrolled = self.model.is_enrolled();
        let next = self.model.remove_tenant(tenant_slug)?;
        self.commit(next)?;
        self.events.dispatch(ClubShiftEvent::TenantRemoved {
            tenant_slug: tenant_slug.to_string(),
        });
        if was_enrolled && !self.model.is_enrolled() {
            self.events.dispatch(ClubShiftEvent::Unenrolled);
        }
        Ok(())
    }

    /// Clears every enrollment, locally and best-effort backend-side.
    /// The device id survives; the installation stays the same.
    pub fn remove_all(&mut self) -> ClubShiftResult<()> {
        if let Some(credential) = token::primary_token(&self.model).map(str::to_string) {
            if let Err(e) = self.gateway.remove_all_enrollments(&credential) {
                tracing::warn!(error = %e, "backend bulk removal failed, removing locally");
            }
        }

        let mut next = self.model.clone();
        next.tenants.clear();
        next.enrollments.clear();
        next.updated_at = now_ms();
        self.commit(next)?;
        self.events.dispatch(ClubShiftEvent::Unenrolled);
        Ok(())
    }

    // ============================================================
    // Discovery passthroughs
    // ============================================================

    /// Teams a manager email may enroll for within a tenant.
    pub fn allowed_teams(&self, email: &str, tenant_slug: &str) -> ClubShiftResult<Vec<TeamInfo>> {
        Ok(self.gateway.fetch_allowed_teams(email, tenant_slug)?)
    }

    /// Team search within a tenant.
    pub fn search_teams(&self, tenant_slug: &str, query: &str) -> ClubShiftResult<Vec<TeamInfo>> {
        Ok(self.gateway.search_teams(tenant_slug, query)?)
    }

    /// Tenant search.
    pub fn search_tenants(&self, query: &str) -> ClubShiftResult<Vec<TenantSummary>> {
        Ok(self.gateway.search_tenants(query)?)
    }
}
