//! Result assembly.
//!
//! Packs signals, stakes and raw counters into the object handed to the
//! presentation layer. Field names are camelCase on the wire.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::absence::Absences;
use super::no_repetition::{AxisFlags, NoRepetitionCounts};
use super::progression::{BetSeries, Step, Transition};
use super::signal::{Lane, SignalSet};
use crate::types::{Axis, Heuristic, Slot};

// ---------------------------------------------------------------------------
// Signal type
// ---------------------------------------------------------------------------

/// What kind of recommendation a lane produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    /// No bet this round.
    #[serde(rename = "AUCUN")]
    None,
    Column,
    Tier,
    NoRepetitionColumn,
    NoRepetitionTier,
}

impl SignalType {
    pub fn for_lane(lane: Lane) -> Self {
        match (lane.heuristic, lane.axis) {
            (Heuristic::Absence, Axis::Column) => SignalType::Column,
            (Heuristic::Absence, Axis::Tier) => SignalType::Tier,
            (Heuristic::NoRepetition, Axis::Column) => SignalType::NoRepetitionColumn,
            (Heuristic::NoRepetition, Axis::Tier) => SignalType::NoRepetitionTier,
        }
    }

    pub fn is_none(self) -> bool {
        self == SignalType::None
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalType::None => "AUCUN",
            SignalType::Column => "COLUMN",
            SignalType::Tier => "TIER",
            SignalType::NoRepetitionColumn => "NO_REPETITION_COLUMN",
            SignalType::NoRepetitionTier => "NO_REPETITION_TIER",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Stake line
// ---------------------------------------------------------------------------

/// Stake on one column or tier, possibly from both heuristics at once.
///
/// Serialized as its display string: `-`, `3` or `3 + 1 = 4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StakeLine {
    #[default]
    NoBet,
    Single(u32),
    Combined { absence: u32, no_repetition: u32 },
}

impl StakeLine {
    pub fn total(&self) -> u32 {
        match *self {
            StakeLine::NoBet => 0,
            StakeLine::Single(stake) => stake,
            StakeLine::Combined { absence, no_repetition } => absence + no_repetition,
        }
    }

    fn from_parts(absence: Option<u32>, no_repetition: Option<u32>) -> Self {
        match (absence, no_repetition) {
            (Some(absence), Some(no_repetition)) => StakeLine::Combined { absence, no_repetition },
            (Some(stake), None) | (None, Some(stake)) => StakeLine::Single(stake),
            (None, None) => StakeLine::NoBet,
        }
    }
}

impl fmt::Display for StakeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StakeLine::NoBet => write!(f, "-"),
            StakeLine::Single(stake) => write!(f, "{stake}"),
            StakeLine::Combined { absence, no_repetition } => {
                write!(f, "{absence} + {no_repetition} = {}", absence + no_repetition)
            }
        }
    }
}

impl Serialize for StakeLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Per-lane results
// ---------------------------------------------------------------------------

/// Absence recommendation for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceResult {
    pub signal_type: SignalType,
    pub target: Option<Slot>,
    pub absence: usize,
    pub bet_series: Vec<u32>,
    pub next_bet: u32,
    pub transition: Option<Transition>,
    pub hit: bool,
}

impl AbsenceResult {
    pub fn none() -> Self {
        Self {
            signal_type: SignalType::None,
            target: None,
            absence: 0,
            bet_series: Vec::new(),
            next_bet: 0,
            transition: None,
            hit: false,
        }
    }
}

/// No-repetition recommendation for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoRepetitionResult {
    pub signal_type: SignalType,
    pub target: Option<Slot>,
    pub no_rep_value: usize,
    pub bet_series: Vec<u32>,
    pub next_bet: u32,
    pub transition: Option<Transition>,
    pub hit: bool,
}

impl NoRepetitionResult {
    pub fn none() -> Self {
        Self {
            signal_type: SignalType::None,
            target: None,
            no_rep_value: 0,
            bet_series: Vec::new(),
            next_bet: 0,
            transition: None,
            hit: false,
        }
    }
}

/// Everything recommended on one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisReport {
    pub absence: AbsenceResult,
    pub no_repetition: NoRepetitionResult,
    /// Stake per value 1..3 of the axis.
    pub stakes: [StakeLine; 3],
}

impl AxisReport {
    fn none() -> Self {
        Self {
            absence: AbsenceResult::none(),
            no_repetition: NoRepetitionResult::none(),
            stakes: [StakeLine::NoBet; 3],
        }
    }

    pub fn stake_for(&self, slot: Slot) -> StakeLine {
        self.stakes[slot.index()]
    }

    pub fn has_signal(&self) -> bool {
        !self.absence.signal_type.is_none() || !self.no_repetition.signal_type.is_none()
    }

    fn build(axis: Axis, signals: &SignalSet, steps: &HashMap<Lane, Step>, series: &BetSeries) -> Self {
        let absence_lane = Lane::new(axis, Heuristic::Absence);
        let norep_lane = Lane::new(axis, Heuristic::NoRepetition);

        let absence = match (signals.get(absence_lane), steps.get(&absence_lane)) {
            (Some(signal), Some(step)) => AbsenceResult {
                signal_type: SignalType::for_lane(absence_lane),
                target: Some(step.target),
                absence: signal.strength,
                bet_series: series.values().to_vec(),
                next_bet: series.stake_at(step.state.series_index),
                transition: Some(step.transition),
                hit: step.state.hit,
            },
            _ => AbsenceResult::none(),
        };

        let no_repetition = match (signals.get(norep_lane), steps.get(&norep_lane)) {
            (Some(signal), Some(step)) => NoRepetitionResult {
                signal_type: SignalType::for_lane(norep_lane),
                target: Some(step.target),
                no_rep_value: signal.strength,
                bet_series: series.values().to_vec(),
                next_bet: series.run_length_stake(signal.strength),
                transition: Some(step.transition),
                hit: step.state.hit,
            },
            _ => NoRepetitionResult::none(),
        };

        let mut stakes = [StakeLine::NoBet; 3];
        for slot in Slot::ALL {
            let a = (absence.target == Some(slot)).then_some(absence.next_bet);
            let n = (no_repetition.target == Some(slot)).then_some(no_repetition.next_bet);
            stakes[slot.index()] = StakeLine::from_parts(a, n);
        }

        Self {
            absence,
            no_repetition,
            stakes,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// The caller-facing recommendation for one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub column: AxisReport,
    pub tier: AxisReport,
    pub absences: Absences,
    pub no_repetition_counts: NoRepetitionCounts,
    pub alternating: AxisFlags,
    pub history_len: usize,
    pub max_stake: u32,
}

impl AnalysisResult {
    /// All-AUCUN result that still carries the raw counters.
    pub fn no_signal(
        absences: Absences,
        no_repetition_counts: NoRepetitionCounts,
        alternating: AxisFlags,
        history_len: usize,
        max_stake: u32,
    ) -> Self {
        Self {
            column: AxisReport::none(),
            tier: AxisReport::none(),
            absences,
            no_repetition_counts,
            alternating,
            history_len,
            max_stake,
        }
    }

    /// Assemble a full result from the selected signals and their steps.
    pub fn assemble(
        absences: Absences,
        no_repetition_counts: NoRepetitionCounts,
        alternating: AxisFlags,
        signals: &SignalSet,
        steps: &HashMap<Lane, Step>,
        series: &BetSeries,
        history_len: usize,
    ) -> Self {
        Self {
            column: AxisReport::build(Axis::Column, signals, steps, series),
            tier: AxisReport::build(Axis::Tier, signals, steps, series),
            absences,
            no_repetition_counts,
            alternating,
            history_len,
            max_stake: series.max_stake(),
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisReport {
        match axis {
            Axis::Column => &self.column,
            Axis::Tier => &self.tier,
        }
    }

    pub fn has_signal(&self) -> bool {
        self.column.has_signal() || self.tier.has_signal()
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "history={} max_stake={}", self.history_len, self.max_stake)?;
        for axis in Axis::ALL {
            let report = self.axis(axis);
            let a = &report.absence;
            let n = &report.no_repetition;

            write!(f, "{axis} absence: ")?;
            match a.target {
                Some(t) => write!(f, "{} {t} ({} spins) -> {}", a.signal_type, a.absence, a.next_bet)?,
                None => write!(f, "{}", a.signal_type)?,
            }
            write!(f, " | no-repetition: ")?;
            match n.target {
                Some(t) => write!(f, "{axis} {t} (run {}) -> {}", n.no_rep_value, n.next_bet)?,
                None => write!(f, "{}", n.signal_type)?,
            }
            writeln!(f)?;

            let tracked = match axis {
                Axis::Column => &self.absences.columns,
                Axis::Tier => &self.absences.tiers,
            };
            write!(f, "       ")?;
            for slot in Slot::ALL {
                write!(
                    f,
                    "[{slot}: absent {} stake {}] ",
                    tracked[slot.index()],
                    report.stake_for(slot)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::progression::ProgressionState;
    use crate::analysis::signal::Signal;

    fn signal(axis: Axis, heuristic: Heuristic, target: Slot, strength: usize) -> Signal {
        Signal { axis, heuristic, target, strength }
    }

    fn step(target: Slot, series_index: usize) -> Step {
        Step {
            target,
            transition: Transition::Loss,
            state: ProgressionState { series_index, hit: false, active: true },
        }
    }

    #[test]
    fn test_stake_line_display() {
        assert_eq!(StakeLine::NoBet.to_string(), "-");
        assert_eq!(StakeLine::Single(5).to_string(), "5");
        assert_eq!(
            StakeLine::Combined { absence: 3, no_repetition: 1 }.to_string(),
            "3 + 1 = 4"
        );
        assert_eq!(StakeLine::Combined { absence: 3, no_repetition: 1 }.total(), 4);
        assert_eq!(serde_json::to_string(&StakeLine::Single(2)).unwrap(), "\"2\"");
    }

    #[test]
    fn test_signal_type_wire_names() {
        assert_eq!(serde_json::to_string(&SignalType::None).unwrap(), "\"AUCUN\"");
        assert_eq!(
            serde_json::to_string(&SignalType::NoRepetitionTier).unwrap(),
            "\"NO_REPETITION_TIER\""
        );
        assert_eq!(SignalType::Column.to_string(), "COLUMN");
    }

    #[test]
    fn test_same_target_combines_stakes() {
        let series = BetSeries::new(100).unwrap();
        let signals = SignalSet {
            column_absence: Some(signal(Axis::Column, Heuristic::Absence, Slot::Two, 7)),
            column_no_repetition: Some(signal(Axis::Column, Heuristic::NoRepetition, Slot::Two, 1)),
            ..SignalSet::default()
        };
        let mut steps = HashMap::new();
        steps.insert(Lane::new(Axis::Column, Heuristic::Absence), step(Slot::Two, 4));
        steps.insert(Lane::new(Axis::Column, Heuristic::NoRepetition), step(Slot::Two, 0));

        let result = AnalysisResult::assemble(
            Absences::default(),
            NoRepetitionCounts::default(),
            AxisFlags::default(),
            &signals,
            &steps,
            &series,
            10,
        );

        assert_eq!(result.column.absence.signal_type, SignalType::Column);
        assert_eq!(result.column.absence.next_bet, 3);
        assert_eq!(result.column.no_repetition.next_bet, 1);
        assert_eq!(
            result.column.stake_for(Slot::Two),
            StakeLine::Combined { absence: 3, no_repetition: 1 }
        );
        assert_eq!(result.column.stake_for(Slot::One), StakeLine::NoBet);
        assert!(!result.tier.has_signal());
        assert_eq!(result.tier.absence.signal_type, SignalType::None);
    }

    #[test]
    fn test_different_targets_stay_separate() {
        let series = BetSeries::new(8).unwrap();
        let signals = SignalSet {
            tier_absence: Some(signal(Axis::Tier, Heuristic::Absence, Slot::One, 6)),
            tier_no_repetition: Some(signal(Axis::Tier, Heuristic::NoRepetition, Slot::Three, 9)),
            ..SignalSet::default()
        };
        let mut steps = HashMap::new();
        steps.insert(Lane::new(Axis::Tier, Heuristic::Absence), step(Slot::One, 0));
        steps.insert(Lane::new(Axis::Tier, Heuristic::NoRepetition), step(Slot::Three, 0));

        let result = AnalysisResult::assemble(
            Absences::default(),
            NoRepetitionCounts::default(),
            AxisFlags::default(),
            &signals,
            &steps,
            &series,
            12,
        );
        assert_eq!(result.tier.stake_for(Slot::One), StakeLine::Single(1));
        assert_eq!(result.tier.stake_for(Slot::Two), StakeLine::NoBet);
        // run 9 → series index 4 → 3
        assert_eq!(result.tier.stake_for(Slot::Three), StakeLine::Single(3));
        assert_eq!(result.tier.no_repetition.signal_type, SignalType::NoRepetitionTier);
        assert_eq!(result.max_stake, 8);
    }

    #[test]
    fn test_no_signal_keeps_counters() {
        let absences = Absences { columns: [1, 0, 2], tiers: [0, 2, 1] };
        let result = AnalysisResult::no_signal(
            absences,
            NoRepetitionCounts::default(),
            AxisFlags::default(),
            3,
            8,
        );
        assert!(!result.has_signal());
        assert_eq!(result.absences, absences);
        assert!(result.column.absence.bet_series.is_empty());
        assert_eq!(result.column.absence.next_bet, 0);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = AnalysisResult::no_signal(
            Absences::default(),
            NoRepetitionCounts::default(),
            AxisFlags::default(),
            0,
            8,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["column"]["absence"]["signalType"], "AUCUN");
        assert_eq!(json["column"]["noRepetition"]["noRepValue"], 0);
        assert_eq!(json["tier"]["stakes"][0], "-");
        assert!(json["noRepetitionCounts"]["columnCandidate"].is_null());
        assert_eq!(json["maxStake"], 8);
    }

    #[test]
    fn test_display_mentions_both_axes() {
        let result = AnalysisResult::no_signal(
            Absences::default(),
            NoRepetitionCounts::default(),
            AxisFlags::default(),
            2,
            8,
        );
        let text = result.to_string();
        assert!(text.contains("COLUMN"));
        assert!(text.contains("TIER"));
        assert!(text.contains("AUCUN"));
    }
}
