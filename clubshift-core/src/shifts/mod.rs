// SPDX-FileCopyrightText: 2026 ClubShift Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shift Data
//!
//! Shift records plus the per-enrollment fan-out/fan-in aggregation that
//! merges them into one display pool while tolerating partial failures.

pub mod aggregator;
pub mod types;

pub use aggregator::{fetch_all, ShiftFetch};
pub use types::{merge_shifts, order_for_display, Shift};
