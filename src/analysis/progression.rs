//! Stake progression.
//!
//! Each (axis, heuristic, target) keeps an index into a fixed bet series
//! and a hit flag. After a miss on a target that is still being pursued
//! the index moves one step up the series; a win or a fresh target sends
//! it back to the start.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::classify::slot_on;
use super::signal::{Lane, Signal, SignalSet};
use crate::types::{Axis, Draw, Heuristic, Slot, WheelError};

/// Full stake ladder before filtering by the table maximum.
pub const DEFAULT_BET_SERIES: [u32; 13] = [1, 1, 1, 2, 3, 5, 8, 12, 18, 27, 41, 60, 100];

/// Run length at which no-repetition stakes start climbing the series.
pub const NO_REPETITION_RAMP_START: usize = 5;

// ---------------------------------------------------------------------------
// Bet series
// ---------------------------------------------------------------------------

/// The bet series filtered to values at or below the maximum stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetSeries {
    values: Vec<u32>,
    max_stake: u32,
}

impl BetSeries {
    pub fn new(max_stake: u32) -> Result<Self, WheelError> {
        if max_stake < 1 {
            return Err(WheelError::InvalidMaxStake(max_stake));
        }
        let values = DEFAULT_BET_SERIES
            .iter()
            .copied()
            .filter(|&bet| bet <= max_stake)
            .collect();
        Ok(Self { values, max_stake })
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn max_stake(&self) -> u32 {
        self.max_stake
    }

    pub fn last_index(&self) -> usize {
        self.values.len() - 1
    }

    /// Stake at `index`, clamped to the end of the series.
    pub fn stake_at(&self, index: usize) -> u32 {
        self.values[index.min(self.last_index())]
    }

    /// Stake for a no-repetition signal with the given run length.
    pub fn run_length_stake(&self, run_length: usize) -> u32 {
        if run_length < NO_REPETITION_RAMP_START {
            return 1;
        }
        self.stake_at(run_length - NO_REPETITION_RAMP_START).min(self.max_stake)
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Progression memory for one (axis, heuristic, target).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    pub series_index: usize,
    pub hit: bool,
    /// Whether this target was its lane's signal on the last evaluated call.
    pub active: bool,
}

/// Which branch of the state machine a call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// The latest draw landed on the target.
    Win,
    /// Missed while already pursuing this target.
    Loss,
    /// Newly selected, or selected again after a win.
    Reset,
}

/// Classify the latest draw against a signal and its stored state.
pub fn transition(state: &ProgressionState, signal: &Signal, latest: Draw) -> Transition {
    if slot_on(latest, signal.axis) == Some(signal.target) {
        Transition::Win
    } else if state.active && !state.hit {
        Transition::Loss
    } else {
        Transition::Reset
    }
}

/// Advance one target's state for the latest draw.
///
/// The result is always active and its index is always inside `series`.
/// An index that lands on the maximum stake is sent back to 0, so the
/// ceiling is never staked twice without a win in between.
pub fn advance(
    state: ProgressionState,
    signal: &Signal,
    latest: Draw,
    series: &BetSeries,
) -> ProgressionState {
    let (mut series_index, hit) = match transition(&state, signal, latest) {
        Transition::Win => (0, true),
        Transition::Loss => ((state.series_index + 1).min(series.last_index()), false),
        Transition::Reset => (0, false),
    };

    if series.stake_at(series_index) == series.max_stake() {
        series_index = 0;
    }

    ProgressionState {
        series_index,
        hit,
        active: true,
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Result of applying one lane's signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: Slot,
    pub transition: Transition,
    pub state: ProgressionState,
}

/// Serializable view of one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionEntry {
    pub axis: Axis,
    pub heuristic: Heuristic,
    pub target: Slot,
    #[serde(flatten)]
    pub state: ProgressionState,
}

/// All progression state of one engine instance.
#[derive(Debug, Clone, Default)]
pub struct ProgressionTable {
    states: HashMap<(Lane, Slot), ProgressionState>,
}

impl ProgressionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored state for a target (default if never touched).
    pub fn get(&self, axis: Axis, heuristic: Heuristic, target: Slot) -> ProgressionState {
        self.states
            .get(&(Lane::new(axis, heuristic), target))
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite a target's state.
    #[cfg(test)]
    pub(crate) fn set(&mut self, axis: Axis, heuristic: Heuristic, target: Slot, state: ProgressionState) {
        self.states.insert((Lane::new(axis, heuristic), target), state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forget everything (start of a new session).
    pub fn reset(&mut self) {
        let cleared = self.len();
        self.states.clear();
        info!(cleared, "Progression table reset");
    }

    /// Apply one analysis call's signals against the latest draw.
    ///
    /// Every lane is visited. A target that was active but is no longer
    /// selected is deactivated, and if the latest draw landed on it the win
    /// is recorded. The selected target, if any, is then advanced.
    pub fn apply(&mut self, signals: &SignalSet, latest: Draw, series: &BetSeries) -> HashMap<Lane, Step> {
        self.refit(series);
        let mut steps = HashMap::new();

        for (lane, signal) in signals.iter() {
            let selected = signal.map(|s| s.target);
            let landed = slot_on(latest, lane.axis);

            for (&(l, target), state) in self.states.iter_mut() {
                if l != lane || !state.active || Some(target) == selected {
                    continue;
                }
                state.active = false;
                if landed == Some(target) {
                    state.series_index = 0;
                    state.hit = true;
                    debug!(
                        axis = %lane.axis,
                        heuristic = %lane.heuristic,
                        target = %target,
                        "Dropped target won on the latest draw"
                    );
                }
            }

            let Some(signal) = signal else { continue };
            let key = (lane, signal.target);
            let before = self.states.get(&key).copied().unwrap_or_default();
            let transition = transition(&before, signal, latest);
            let after = advance(before, signal, latest, series);
            self.states.insert(key, after);

            debug!(
                axis = %lane.axis,
                heuristic = %lane.heuristic,
                target = %signal.target,
                ?transition,
                from = before.series_index,
                to = after.series_index,
                "Progression advanced"
            );

            steps.insert(
                lane,
                Step {
                    target: signal.target,
                    transition,
                    state: after,
                },
            );
        }

        steps
    }

    /// Bring every stored index inside `series`, which is shorter than the
    /// one it was computed with when the max stake was lowered since.
    pub fn refit(&mut self, series: &BetSeries) {
        for (&(lane, target), state) in self.states.iter_mut() {
            let mut index = state.series_index.min(series.last_index());
            if series.stake_at(index) == series.max_stake() {
                index = 0;
            }
            if index != state.series_index {
                debug!(
                    axis = %lane.axis,
                    heuristic = %lane.heuristic,
                    target = %target,
                    from = state.series_index,
                    to = index,
                    "Progression index refitted to bet series"
                );
                state.series_index = index;
            }
        }
    }

    /// Sorted snapshot of every touched entry.
    pub fn snapshot(&self) -> Vec<ProgressionEntry> {
        let mut entries: Vec<ProgressionEntry> = self
            .states
            .iter()
            .map(|(&(lane, target), &state)| ProgressionEntry {
                axis: lane.axis,
                heuristic: lane.heuristic,
                target,
                state,
            })
            .collect();
        entries.sort_by_key(|e| (e.axis, e.heuristic, e.target));
        entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
