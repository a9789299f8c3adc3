//! Shift Records
//!
//! A shift is a schedulable volunteer slot with a time range, location,
//! and roster of signed-up names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One volunteer slot, as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Backend shift identifier.
    pub id: String,
    /// Tenant the shift belongs to.
    pub tenant_slug: String,
    /// Team the shift is scheduled for, when scoped.
    pub team_id: Option<String>,
    /// Display name, e.g. "Bar shift".
    pub name: String,
    /// Location, when the backend provides one.
    pub location: Option<String>,
    /// Unix epoch milliseconds.
    pub starts_at: u64,
    /// Unix epoch milliseconds.
    pub ends_at: u64,
    /// Names currently signed up.
    pub volunteers: Vec<String>,
    /// Roster size the shift asks for.
    pub volunteers_needed: u32,
    /// Backend modification timestamp, when tracked.
    pub updated_at: Option<u64>,
}

impl Shift {
    /// True if the shift starts at or after `now_ms`.
    pub fn is_upcoming(&self, now_ms: u64) -> bool {
        self.starts_at >= now_ms
    }

    /// True if `name` is on the roster.
    pub fn has_volunteer(&self, name: &str) -> bool {
        self.volunteers.iter().any(|v| v == name)
    }

    /// Tie-break between two records sharing an id: the one with the more
    /// recent `updated_at` wins; a record with an `updated_at` beats one
    /// without; otherwise the later start time wins.
    fn beats(&self, other: &Shift) -> bool {
        match (self.updated_at, other.updated_at) {
            (Some(a), Some(b)) if a != b => a > b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            _ => self.starts_at > other.starts_at,
        }
    }
}

/// Merges per-enrollment fetch results into one deduplicated pool.
///
/// Records are grouped by shift id; collisions resolve via the
/// `updated_at` tie-break.
pub fn merge_shifts(pools: Vec<Vec<Shift>>) -> Vec<Shift> {
    let mut by_id: BTreeMap<String, Shift> = BTreeMap::new();
    for shift in pools.into_iter().flatten() {
        match by_id.get(&shift.id) {
            Some(existing) if !shift.beats(existing) => {}
            _ => {
                by_id.insert(shift.id.clone(), shift);
            }
        }
    }
    by_id.into_values().collect()
}

/// Orders shifts for display: upcoming ones ascending by start time,
/// followed by past ones descending (most-recently-past first).
pub fn order_for_display(mut shifts: Vec<Shift>, now_ms: u64) -> Vec<Shift> {
    shifts.sort_by(|a, b| match (a.is_upcoming(now_ms), b.is_upcoming(now_ms)) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (true, true) => a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)),
        (false, false) => b.starts_at.cmp(&a.starts_at).then_with(|| a.id.cmp(&b.id)),
    });
    shifts
}
