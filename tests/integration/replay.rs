//! Session replays.
//!
//! Feeds spins one at a time through `Session` the way a player at the
//! table would, and checks what the engine recommends after each one.

use wheelwatch::analysis::progression::Transition;
use wheelwatch::analysis::report::{SignalType, StakeLine};
use wheelwatch::config::EngineConfig;
use wheelwatch::session::Session;
use wheelwatch::types::{Axis, Heuristic, Slot, WheelError};

fn session_with(max_stake: u32) -> Session {
    let mut session = Session::new(&EngineConfig::default());
    session.set_max_stake(max_stake).unwrap();
    session
}

/// Column-2 numbers in spin order.
const COLUMN_TWO: [i64; 12] = [2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35];

#[test]
fn test_no_signal_until_fifth_draw() {
    let mut session = session_with(8);
    for (i, &n) in COLUMN_TWO.iter().take(5).enumerate() {
        let result = session.add_draw(n).unwrap();
        if i < 4 {
            assert!(!result.has_signal(), "draw {i} must not signal");
            assert!(session.progression().is_empty());
        } else {
            assert!(result.has_signal());
        }
    }
}

#[test]
fn test_absence_progression_respects_ceiling() {
    // Column 1 never lands: the stake climbs the series and drops back to
    // the base stake instead of playing the ceiling of 8.
    let mut session = session_with(8);
    let mut bets = Vec::new();
    for &n in COLUMN_TWO.iter() {
        let result = session.add_draw(n).unwrap();
        if result.column.absence.signal_type == SignalType::Column {
            assert_eq!(result.column.absence.target, Some(Slot::One));
            bets.push(result.column.absence.next_bet);
        }
    }
    assert_eq!(bets, vec![1, 1, 1, 2, 3, 5, 1, 1]);
    assert!(bets.iter().all(|&b| b < 8));
}

#[test]
fn test_win_resets_progression() {
    let mut session = session_with(100);
    for &n in COLUMN_TWO.iter().take(9) {
        session.add_draw(n).unwrap();
    }
    let before = session
        .progression()
        .into_iter()
        .find(|e| e.axis == Axis::Column && e.heuristic == Heuristic::Absence && e.target == Slot::One)
        .unwrap();
    assert_eq!(before.state.series_index, 4);

    // 10 sits in column 1.
    let result = session.add_draw(10).unwrap();
    let after = session
        .progression()
        .into_iter()
        .find(|e| e.axis == Axis::Column && e.heuristic == Heuristic::Absence && e.target == Slot::One)
        .unwrap();
    assert_eq!(after.state.series_index, 0);
    assert!(after.state.hit);
    assert_ne!(result.column.absence.target, Some(Slot::One));
}

#[test]
fn test_lowered_max_stake_keeps_indices_in_series() {
    let mut session = session_with(100);
    for &n in COLUMN_TWO.iter().chain(&[2]) {
        session.add_draw(n).unwrap();
    }
    session.set_max_stake(8).unwrap();
    let result = session.replace_history(&[2, 5, 8, 11, 14, 1, 3]).unwrap();
    assert_eq!(result.column.absence.target, Some(Slot::Three));

    let last_index = result.column.absence.bet_series.len() - 1;
    for entry in session.progression() {
        assert!(
            entry.state.series_index <= last_index,
            "{:?} {:?} {:?} index {}",
            entry.axis,
            entry.heuristic,
            entry.target,
            entry.state.series_index
        );
    }
}

#[test]
fn test_alternating_columns_history() {
    let mut session = session_with(8);
    let result = session
        .replace_history(&[5, 24, 24, 28, 33, 27, 17, 25, 14, 20])
        .unwrap();
    assert_eq!(result.no_repetition_counts.column_candidate, Some(Slot::Two));
    assert_eq!(result.no_repetition_counts.columns, [1, 1, 1]);
    assert_eq!(result.column.no_repetition.signal_type, SignalType::NoRepetitionColumn);
    assert_eq!(result.column.no_repetition.next_bet, 1);
}

#[test]
fn test_tier_run_length() {
    let mut session = session_with(8);
    let result = session
        .replace_history(&[7, 20, 34, 25, 1, 2, 34, 30, 12, 12])
        .unwrap();
    // Tiers 1,2,3,3,...: the first repeated pair sits at index 2.
    assert_eq!(result.no_repetition_counts.tier_candidate, Some(Slot::One));
    assert_eq!(result.no_repetition_counts.tiers, [2, 2, 2]);
    assert_eq!(result.tier.no_repetition.target, Some(Slot::One));
}

#[test]
fn test_zero_has_no_column_or_tier() {
    let mut session = session_with(8);
    let result = session.replace_history(&[0, 0, 0, 0, 0, 0]).unwrap();
    assert_eq!(result.absences.columns, [6, 6, 6]);
    assert_eq!(result.absences.tiers, [6, 6, 6]);
    // No classified draw means no no-repetition candidate.
    assert_eq!(result.column.no_repetition.signal_type, SignalType::None);
    assert_eq!(result.column.absence.target, Some(Slot::One));
}

#[test]
fn test_stake_lines_cover_each_slot() {
    let mut session = session_with(8);
    let result = session.replace_history(&COLUMN_TWO[..6]).unwrap();
    let lines: Vec<String> = Slot::ALL
        .iter()
        .map(|&s| result.column.stake_for(s).to_string())
        .collect();
    assert_eq!(lines, vec!["1", "1", "-"]);
    assert_eq!(result.column.stake_for(Slot::Three), StakeLine::NoBet);
}

#[test]
fn test_rejected_draw_leaves_session_untouched() {
    let mut session = session_with(8);
    session.replace_history(&COLUMN_TWO[..6]).unwrap();
    let progression = session.progression();
    assert_eq!(session.add_draw(42), Err(WheelError::InvalidDraw(42)));
    assert_eq!(session.history().len(), 6);
    assert_eq!(session.progression(), progression);
}

#[test]
fn test_clear_starts_a_fresh_session() {
    let mut session = session_with(8);
    for &n in COLUMN_TWO.iter().take(8) {
        session.add_draw(n).unwrap();
    }
    session.clear();
    for &n in COLUMN_TWO.iter().take(6) {
        session.add_draw(n).unwrap();
    }
    let result = session.analyze().unwrap();
    // Fresh table: the third call on this target is still on the base stake.
    assert_eq!(result.column.absence.transition, Some(Transition::Loss));
    assert_eq!(result.column.absence.next_bet, 1);
}
