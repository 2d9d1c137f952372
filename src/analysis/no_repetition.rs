//! No-repetition detection.
//!
//! Two related measures over the column/tier sequence of a history:
//!
//! - [`no_repetition`]: whether the most recent window strictly alternates
//!   (no two adjacent draws share a value). A zero breaks the window.
//! - [`no_repetition_counts`]: how many alternations have happened since
//!   the last repeated pair, used to size no-repetition stakes. Zeros are
//!   dropped from the sequence before counting.
//!
//! The two zero rules differ on purpose and are kept explicit through
//! [`ZeroRule`].

use serde::Serialize;
use tracing::debug;

use super::classify::{classify, slot_on};
use crate::types::{Axis, Draw, Slot, HISTORY_CAP};

/// Default alternation window.
pub const DEFAULT_WINDOW: usize = 5;

/// How a zero (no column, no tier) is treated when building an axis sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroRule {
    /// Zeros stay in place as `None` and interrupt any run.
    Breaks,
    /// Zeros are removed; their neighbours become adjacent.
    Skipped,
}

/// The axis values of the (capped) history, most recent first.
pub fn axis_sequence(history: &[Draw], axis: Axis, rule: ZeroRule) -> Vec<Option<Slot>> {
    let values = history.iter().take(HISTORY_CAP).map(|&d| slot_on(d, axis));
    match rule {
        ZeroRule::Breaks => values.collect(),
        ZeroRule::Skipped => values.filter(Option::is_some).collect(),
    }
}

// ---------------------------------------------------------------------------
// Alternation flags
// ---------------------------------------------------------------------------

/// One boolean per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisFlags {
    pub columns: bool,
    pub tiers: bool,
}

impl AxisFlags {
    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::Column => self.columns,
            Axis::Tier => self.tiers,
        }
    }
}

/// Detect an uninterrupted alternation over the last `min_length` draws.
///
/// Needs at least `min_length + 1` draws. The draw just past the window is
/// also checked: if it repeats the oldest draw of the window the pattern
/// has already settled and the flag is suppressed.
pub fn no_repetition(history: &[Draw], min_length: usize) -> AxisFlags {
    let min_length = min_length.max(1);
    if history.len() < min_length + 1 {
        return AxisFlags::default();
    }

    let flags = AxisFlags {
        columns: alternates(history, Axis::Column, min_length),
        tiers: alternates(history, Axis::Tier, min_length),
    };
    debug!(columns = flags.columns, tiers = flags.tiers, min_length, "No-repetition flags");
    flags
}

fn alternates(history: &[Draw], axis: Axis, min_length: usize) -> bool {
    let seq = axis_sequence(history, axis, ZeroRule::Breaks);
    if seq.len() <= min_length {
        return false;
    }

    for i in 1..min_length {
        match (seq[i - 1], seq[i]) {
            (Some(prev), Some(cur)) if prev != cur => {}
            _ => return false,
        }
    }

    // Stabilized just past the window.
    seq[min_length] != seq[min_length - 1]
}

// ---------------------------------------------------------------------------
// Run-length counters
// ---------------------------------------------------------------------------

/// Run lengths since the last repeated pair, plus the current candidates.
///
/// The run length is per axis; it is copied into all three slots of that
/// axis so display code can index it like the absence table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoRepetitionCounts {
    pub columns: [usize; 3],
    pub tiers: [usize; 3],
    pub column_candidate: Option<Slot>,
    pub tier_candidate: Option<Slot>,
}

impl NoRepetitionCounts {
    pub fn run_length(&self, axis: Axis) -> usize {
        match axis {
            Axis::Column => self.columns[0],
            Axis::Tier => self.tiers[0],
        }
    }

    pub fn candidate(&self, axis: Axis) -> Option<Slot> {
        match axis {
            Axis::Column => self.column_candidate,
            Axis::Tier => self.tier_candidate,
        }
    }
}

/// Compute no-repetition run lengths and candidates.
///
/// The candidate is the axis value of the most recent draw (none if it was
/// zero). The run length is the index of the first adjacent equal pair in
/// the zero-free axis sequence, or 0 when the sequence never repeats.
pub fn no_repetition_counts(history: &[Draw]) -> NoRepetitionCounts {
    let latest = history.first().map(|&d| classify(d));
    let column_run = run_length(history, Axis::Column);
    let tier_run = run_length(history, Axis::Tier);

    let counts = NoRepetitionCounts {
        columns: [column_run; 3],
        tiers: [tier_run; 3],
        column_candidate: latest.and_then(|c| c.column),
        tier_candidate: latest.and_then(|c| c.tier),
    };
    debug!(
        column_run,
        tier_run,
        column_candidate = ?counts.column_candidate,
        tier_candidate = ?counts.tier_candidate,
        "No-repetition counts"
    );
    counts
}

fn run_length(history: &[Draw], axis: Axis) -> usize {
    let seq: Vec<Slot> = axis_sequence(history, axis, ZeroRule::Skipped)
        .into_iter()
        .flatten()
        .collect();
    seq.windows(2).position(|w| w[0] == w[1]).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
