// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the ClubShift API layer.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::model::ModelError;
use crate::store::StoreError;

/// Unified error type for ClubShift operations.
#[derive(Error, Debug)]
pub enum ClubShiftError {
    /// Model mutation failed.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Backend call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The device-wide team cap leaves no room. Rejected locally, before
    /// any network call; a user-facing limit message, not a backend error.
    #[error("team limit reached")]
    TeamLimitReached,

    /// The same enrollment request is already in flight.
    #[error("enrollment already in progress")]
    EnrollmentInProgress,

    /// This enrollment token was already consumed in this session.
    #[error("enrollment already completed")]
    EnrollmentAlreadyUsed,

    /// No credential authorizes the requested operation. Not retryable;
    /// the affected scope renders as logged out.
    #[error("no authorized credential for team {team} in {tenant}")]
    NoCredential {
        /// Requested team ref.
        team: String,
        /// Requested tenant.
        tenant: String,
    },
}

/// Result type for ClubShift operations.
pub type ClubShiftResult<T> = Result<T, ClubShiftError>;
