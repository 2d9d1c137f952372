//! Absence detection.
//!
//! Counts, per column and per tier, how many spins have passed since that
//! value last came up.

use serde::Serialize;
use tracing::debug;

use super::classify::slot_on;
use crate::types::{Axis, Draw, Slot, HISTORY_CAP};

/// Spins since last occurrence, indexed by `Slot::index()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Absences {
    pub columns: [usize; 3],
    pub tiers: [usize; 3],
}

impl Absences {
    pub fn axis(&self, axis: Axis) -> &[usize; 3] {
        match axis {
            Axis::Column => &self.columns,
            Axis::Tier => &self.tiers,
        }
    }

    pub fn get(&self, axis: Axis, slot: Slot) -> usize {
        self.axis(axis)[slot.index()]
    }
}

/// Compute absence counts over a most-recent-first history.
///
/// Only the 30 most recent draws are scanned. A value never seen there is
/// reported as `min(len, 30)`, so an empty history yields all zeros.
pub fn absences(history: &[Draw]) -> Absences {
    let never_seen = history.len().min(HISTORY_CAP);
    let count = |axis: Axis, slot: Slot| {
        history
            .iter()
            .take(HISTORY_CAP)
            .position(|&draw| slot_on(draw, axis) == Some(slot))
            .unwrap_or(never_seen)
    };

    let mut out = Absences::default();
    for slot in Slot::ALL {
        out.columns[slot.index()] = count(Axis::Column, slot);
        out.tiers[slot.index()] = count(Axis::Tier, slot);
    }

    debug!(columns = ?out.columns, tiers = ?out.tiers, "Absences computed");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
