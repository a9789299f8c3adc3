// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public API
//!
//! The ClubShift orchestrator and its supporting surface: configuration,
//! error type, event dispatch, the duplicate-operation guard, and the
//! refresh gate.

mod clubshift;
mod config;
mod error;
mod events;
mod gate;
mod guard;

pub use clubshift::ClubShift;
pub use config::CoreConfig;
pub use error::{ClubShiftError, ClubShiftResult};
pub use events::{CallbackHandler, ClubShiftEvent, EventDispatcher, EventHandler};
pub use gate::RefreshGate;
pub use guard::{GuardDecision, OperationGuard};
