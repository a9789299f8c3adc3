// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation
//!
//! Periodic cross-check of locally held enrollments against the backend's
//! view of truth. The engine reasons and emits invalidation events; the
//! revocation handler is the single consumer that applies them.

pub mod engine;
pub mod events;
pub mod revocation;

pub use engine::{run, ReconcileOutcome, SkipReason};
pub use events::InvalidationEvent;
pub use revocation::{apply_event, apply_events};
