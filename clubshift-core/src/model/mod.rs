// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Enrollment Model
//!
//! The multi-tenant, multi-team, multi-token device state and its pure
//! mutation contract. No I/O lives here: mutations take a model and return
//! a new one, and the single owner commits the result.

pub mod device;
pub mod enrollment;
pub mod tenant;

pub use device::{DeviceModel, ModelError, MAX_TOTAL_TEAMS};
pub use enrollment::{Enrollment, EnrollmentDelta, Role, TeamGrant};
pub use tenant::{Team, Tenant};

/// Returns the current Unix timestamp in milliseconds.
/// Falls back to 0 if the system clock is before UNIX_EPOCH (should never happen).
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
