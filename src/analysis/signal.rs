//! Signal selection.
//!
//! Turns raw absence and no-repetition measurements into at most one
//! target per axis per heuristic.

use serde::Serialize;
use tracing::debug;

use super::absence::Absences;
use super::no_repetition::NoRepetitionCounts;
use crate::types::{Axis, Heuristic, Slot};

/// Default minimum absence before a value becomes a signal.
pub const DEFAULT_MIN_ABSENCE: usize = 5;

/// An (axis, heuristic) pair. Each lane carries at most one signal per call
/// and owns its own progression history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Lane {
    pub axis: Axis,
    pub heuristic: Heuristic,
}

impl Lane {
    pub const ALL: [Lane; 4] = [
        Lane { axis: Axis::Column, heuristic: Heuristic::Absence },
        Lane { axis: Axis::Tier, heuristic: Heuristic::Absence },
        Lane { axis: Axis::Column, heuristic: Heuristic::NoRepetition },
        Lane { axis: Axis::Tier, heuristic: Heuristic::NoRepetition },
    ];

    pub fn new(axis: Axis, heuristic: Heuristic) -> Self {
        Self { axis, heuristic }
    }
}

/// A recommendation trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub axis: Axis,
    pub heuristic: Heuristic,
    pub target: Slot,
    /// Absence count for absence signals, run length for no-repetition.
    pub strength: usize,
}

impl Signal {
    pub fn lane(&self) -> Lane {
        Lane::new(self.axis, self.heuristic)
    }
}

/// The signals selected for one analysis call, one optional slot per lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSet {
    pub column_absence: Option<Signal>,
    pub tier_absence: Option<Signal>,
    pub column_no_repetition: Option<Signal>,
    pub tier_no_repetition: Option<Signal>,
}

impl SignalSet {
    pub fn get(&self, lane: Lane) -> Option<&Signal> {
        match (lane.axis, lane.heuristic) {
            (Axis::Column, Heuristic::Absence) => self.column_absence.as_ref(),
            (Axis::Tier, Heuristic::Absence) => self.tier_absence.as_ref(),
            (Axis::Column, Heuristic::NoRepetition) => self.column_no_repetition.as_ref(),
            (Axis::Tier, Heuristic::NoRepetition) => self.tier_no_repetition.as_ref(),
        }
    }

    /// All lanes with their (optional) signal, in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Lane, Option<&Signal>)> + '_ {
        Lane::ALL.into_iter().map(move |lane| (lane, self.get(lane)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, s)| s.is_none())
    }
}

/// Pick the most absent value on an axis, if any reaches `min_absence`.
///
/// Scans 1 → 3 with a strictly-greater comparison, so the lowest value
/// wins a tie.
pub fn select_absence(absences: &Absences, axis: Axis, min_absence: usize) -> Option<Signal> {
    let mut best: Option<Signal> = None;
    for slot in Slot::ALL {
        let absence = absences.get(axis, slot);
        if absence >= min_absence && best.map_or(true, |b| absence > b.strength) {
            best = Some(Signal {
                axis,
                heuristic: Heuristic::Absence,
                target: slot,
                strength: absence,
            });
        }
    }
    best
}

/// The no-repetition target is the latest draw's value on the axis.
///
/// There is no threshold here: a short run simply maps to the smallest
/// stake later on.
pub fn select_no_repetition(counts: &NoRepetitionCounts, axis: Axis) -> Option<Signal> {
    counts.candidate(axis).map(|target| Signal {
        axis,
        heuristic: Heuristic::NoRepetition,
        target,
        strength: counts.run_length(axis),
    })
}

/// Run both selectors on both axes.
pub fn select_signals(
    absences: &Absences,
    counts: &NoRepetitionCounts,
    min_absence: usize,
) -> SignalSet {
    let set = SignalSet {
        column_absence: select_absence(absences, Axis::Column, min_absence),
        tier_absence: select_absence(absences, Axis::Tier, min_absence),
        column_no_repetition: select_no_repetition(counts, Axis::Column),
        tier_no_repetition: select_no_repetition(counts, Axis::Tier),
    };
    for (lane, signal) in set.iter() {
        if let Some(s) = signal {
            debug!(
                axis = %lane.axis,
                heuristic = %lane.heuristic,
                target = %s.target,
                strength = s.strength,
                "Signal selected"
            );
        }
    }
    set
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
