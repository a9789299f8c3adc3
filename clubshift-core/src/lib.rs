//! ClubShift Core Library
//!
//! Multi-tenant volunteer-shift enrollment core for sports clubs.
//! Holds the device-local enrollment model, resolves per-team
//! credentials, aggregates shift data across enrollments, and
//! reconciles local state against the backend.

pub mod api;
pub mod gateway;
pub mod model;
pub mod reconcile;
pub mod shifts;
pub mod store;
pub mod token;

pub use api::{
    CallbackHandler, ClubShift, ClubShiftError, ClubShiftEvent, ClubShiftResult, CoreConfig,
    EventHandler, RefreshGate,
};
pub use gateway::{
    BackendGateway, EnrollmentClaim, GatewayError, GatewayResult, MockGateway, ReconcileMismatch,
    RegistrationGrant, TeamInfo, TenantInfo, TenantSummary,
};
#[cfg(feature = "http-gateway")]
pub use gateway::{HttpGateway, HttpGatewayConfig};
pub use model::{
    now_ms, DeviceModel, Enrollment, EnrollmentDelta, ModelError, Role, Team, TeamGrant, Tenant,
    MAX_TOTAL_TEAMS,
};
pub use reconcile::{InvalidationEvent, ReconcileOutcome, SkipReason};
pub use shifts::{merge_shifts, order_for_display, Shift};
pub use store::{FileModelStore, MemoryModelStore, ModelStore, StoreError};
