// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Error Types
//!
//! Structured error taxonomy for backend calls. Token-level failures are
//! scoped (per enrollment or per tenant) and drive revocation; everything
//! else is transport and is retried by the next natural trigger.

use thiserror::Error;

/// Errors surfaced by the backend gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The presented token is not valid. Scoped to one enrollment.
    #[error("invalid token")]
    InvalidToken,

    /// The backend no longer knows this device identifier. Scoped to one
    /// enrollment.
    #[error("device not found")]
    DeviceNotFound,

    /// The token was revoked backend-side. Scoped to the whole tenant
    /// (season end).
    #[error("token revoked: {reason}")]
    TokenRevoked {
        /// Backend-supplied reason, e.g. "season ended".
        reason: String,
    },

    /// Server answered with a non-success status.
    #[error("server returned status {0}")]
    Http(u16),

    /// Network unreachable or request failed before a response landed.
    #[error("network error: {0}")]
    Network(String),

    /// Response arrived but could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// True for failures scoped to a single enrollment's credential.
    pub fn is_enrollment_invalid(&self) -> bool {
        matches!(self, GatewayError::InvalidToken | GatewayError::DeviceNotFound)
    }

    /// True for failures that revoke the whole tenant.
    pub fn is_tenant_revoked(&self) -> bool {
        matches!(self, GatewayError::TokenRevoked { .. })
    }

    /// True for any token-level failure (either scope).
    pub fn is_token_error(&self) -> bool {
        self.is_enrollment_invalid() || self.is_tenant_revoked()
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
