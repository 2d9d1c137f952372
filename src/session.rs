//! Play session — the history source in front of the analysis engine.
//!
//! Keeps the rolling history (most recent first, capped at 30), validates
//! every incoming number, and re-runs the analysis after each change.
//! One session owns one `Analyzer`, so its progression memory lives
//! exactly as long as the session does.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::analysis::progression::{BetSeries, ProgressionEntry};
use crate::analysis::report::AnalysisResult;
use crate::analysis::Analyzer;
use crate::config::EngineConfig;
use crate::types::{validate_draws, Draw, WheelError, HISTORY_CAP, MAX_NUMBER, MIN_DRAWS};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running session: history, stake ceiling and engine.
#[derive(Debug, Clone)]
pub struct Session {
    history: Vec<Draw>,
    analyzer: Analyzer,
    max_stake: u32,
    random_count: usize,
    updated_at: DateTime<Utc>,
}

/// Serializable view of the session history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub draws: Vec<Draw>,
    pub len: usize,
    pub ready: bool,
    pub max_stake: u32,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            history: Vec::with_capacity(HISTORY_CAP),
            analyzer: Analyzer::new(config.analyzer_config()),
            max_stake: config.max_stake,
            random_count: config.random_count,
            updated_at: Utc::now(),
        }
    }

    /// Most recent first.
    pub fn history(&self) -> &[Draw] {
        &self.history
    }

    pub fn max_stake(&self) -> u32 {
        self.max_stake
    }

    pub fn progression(&self) -> Vec<ProgressionEntry> {
        self.analyzer.progression().snapshot()
    }

    /// Whether the history is long enough to produce signals.
    pub fn readiness(&self) -> Result<(), WheelError> {
        if self.history.len() < MIN_DRAWS {
            return Err(WheelError::InsufficientHistory {
                needed: MIN_DRAWS,
                got: self.history.len(),
            });
        }
        Ok(())
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            draws: self.history.clone(),
            len: self.history.len(),
            ready: self.readiness().is_ok(),
            max_stake: self.max_stake,
            updated_at: self.updated_at,
        }
    }

    /// Change the stake ceiling used by subsequent analyses.
    pub fn set_max_stake(&mut self, max_stake: u32) -> Result<(), WheelError> {
        let series = BetSeries::new(max_stake)?;
        self.analyzer.refit(&series);
        info!(from = self.max_stake, to = max_stake, "Max stake changed");
        self.max_stake = max_stake;
        Ok(())
    }

    /// Recommendation for the current history without stepping the
    /// progression.
    pub fn preview(&self) -> Result<AnalysisResult, WheelError> {
        self.analyzer.preview(&self.history, self.max_stake)
    }

    /// Run the engine on the current history.
    pub fn analyze(&mut self) -> Result<AnalysisResult, WheelError> {
        self.analyzer.analyze(&self.history, self.max_stake)
    }

    /// Record a new spin at the front of the history and re-analyze.
    pub fn add_draw(&mut self, value: i64) -> Result<AnalysisResult, WheelError> {
        let draw = Draw::new(value).map_err(|e| {
            warn!(value, "Rejected draw");
            e
        })?;
        self.history.insert(0, draw);
        self.history.truncate(HISTORY_CAP);
        self.touch();
        info!(draw = %draw, len = self.history.len(), "Draw recorded");
        self.analyze()
    }

    /// Replace the whole history (most recent first). Nothing changes if
    /// any value is invalid.
    pub fn replace_history(&mut self, values: &[i64]) -> Result<AnalysisResult, WheelError> {
        let mut draws = validate_draws(values).map_err(|e| {
            warn!(error = %e, "Rejected history");
            e
        })?;
        draws.truncate(HISTORY_CAP);
        self.history = draws;
        self.touch();
        info!(len = self.history.len(), "History replaced");
        self.analyze()
    }

    /// Replace the history with uniformly random spins.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: Option<usize>,
    ) -> Result<AnalysisResult, WheelError> {
        let count = count.unwrap_or(self.random_count);
        if count == 0 {
            return Err(WheelError::InvalidCount(count));
        }
        let count = count.min(HISTORY_CAP);
        self.history = (0..count)
            .map(|_| Draw::new(rng.gen_range(0..=MAX_NUMBER as i64)))
            .collect::<Result<_, _>>()?;
        self.touch();
        info!(count, "Random history generated");
        self.analyze()
    }

    /// Forget the progression memory but keep the history.
    pub fn reset_progression(&mut self) {
        self.analyzer.reset();
    }

    /// Start over: empty history and fresh progression.
    pub fn clear(&mut self) {
        self.history.clear();
        self.analyzer.reset();
        self.touch();
        info!("Session cleared");
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let draws: Vec<String> = self.history.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "[{}] ({} draws, max stake {})",
            draws.join(" "),
            self.history.len(),
            self.max_stake
        )
    }
}

// ---------------------------------------------------------------------------
// Line commands
// ---------------------------------------------------------------------------

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Draw(i64),
    Random,
    Reset,
    Clear,
    History,
    MaxStake(u32),
    Quit,
}

impl std::str::FromStr for SessionCommand {
    type Err = WheelError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or_default().to_ascii_lowercase();
        match head.as_str() {
            "random" => Ok(SessionCommand::Random),
            "reset" => Ok(SessionCommand::Reset),
            "clear" => Ok(SessionCommand::Clear),
            "history" => Ok(SessionCommand::History),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            "max" => {
                let arg = parts.next().unwrap_or_default();
                arg.parse()
                    .map(SessionCommand::MaxStake)
                    .map_err(|_| WheelError::Unparsable(arg.to_string()))
            }
            _ => line
                .parse::<i64>()
                .map(SessionCommand::Draw)
                .map_err(|_| WheelError::Unparsable(line.to_string())),
        }
    }
}

/// Parse draws given as whitespace- or comma-separated tokens.
///
/// Only syntax is checked here; range validation happens when the
/// values reach the session.
pub fn parse_draw_list<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<i64>, WheelError> {
    tokens
        .iter()
        .flat_map(|t| t.as_ref().split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|t| !t.is_empty())
        .map(|t| t.parse().map_err(|_| WheelError::Unparsable(t.to_string())))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::SignalType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        Session::new(&EngineConfig::default())
    }

    #[test]
    fn test_add_draw_prepends() {
        let mut s = session();
        s.add_draw(5).unwrap();
        s.add_draw(17).unwrap();
        let numbers: Vec<u8> = s.history().iter().map(|d| d.number()).collect();
        assert_eq!(numbers, vec![17, 5]);
    }

    #[test]
    fn test_add_draw_rejects_out_of_range() {
        let mut s = session();
        assert_eq!(s.add_draw(37), Err(WheelError::InvalidDraw(37)));
        assert_eq!(s.add_draw(-1), Err(WheelError::InvalidDraw(-1)));
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_history_capped_at_thirty() {
        let mut s = session();
        for i in 0..40 {
            s.add_draw(i % 37).unwrap();
        }
        assert_eq!(s.history().len(), HISTORY_CAP);
        assert_eq!(s.history()[0].number(), 39 % 37);
    }

    #[test]
    fn test_replace_history_is_atomic() {
        let mut s = session();
        s.replace_history(&[1, 2, 3]).unwrap();
        assert_eq!(s.replace_history(&[4, 99]), Err(WheelError::InvalidDraw(99)));
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn test_readiness() {
        let mut s = session();
        s.replace_history(&[1, 2, 3]).unwrap();
        assert_eq!(
            s.readiness(),
            Err(WheelError::InsufficientHistory { needed: 5, got: 3 })
        );
        s.replace_history(&[1, 2, 3, 4, 5]).unwrap();
        assert!(s.readiness().is_ok());
        assert!(s.snapshot().ready);
    }

    #[test]
    fn test_random_history_is_seeded_and_in_range() {
        let mut a = session();
        let mut b = session();
        a.randomize(&mut StdRng::seed_from_u64(42), None).unwrap();
        b.randomize(&mut StdRng::seed_from_u64(42), None).unwrap();
        assert_eq!(a.history().len(), 10);
        assert_eq!(a.history(), b.history());
        assert!(a.history().iter().all(|d| d.number() <= 36));

        a.randomize(&mut StdRng::seed_from_u64(7), Some(100)).unwrap();
        assert_eq!(a.history().len(), HISTORY_CAP);
    }

    #[test]
    fn test_random_rejects_zero_count() {
        let mut s = session();
        s.replace_history(&[1, 2, 3]).unwrap();
        assert_eq!(
            s.randomize(&mut StdRng::seed_from_u64(1), Some(0)),
            Err(WheelError::InvalidCount(0))
        );
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn test_lowering_max_stake_refits_progression() {
        let mut s = session();
        s.set_max_stake(100).unwrap();
        for n in [2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35, 2] {
            s.add_draw(n).unwrap();
        }
        assert!(s.progression().iter().any(|e| e.state.series_index == 8));

        s.set_max_stake(8).unwrap();
        assert!(s.progression().iter().all(|e| e.state.series_index <= 6));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut s = session();
        s.replace_history(&[2, 5, 8, 11, 14, 17]).unwrap();
        assert!(!s.progression().is_empty());
        s.clear();
        assert!(s.history().is_empty());
        assert!(s.progression().is_empty());
    }

    #[test]
    fn test_reset_progression_keeps_history() {
        let mut s = session();
        s.replace_history(&[2, 5, 8, 11, 14, 17]).unwrap();
        s.reset_progression();
        assert_eq!(s.history().len(), 6);
        assert!(s.progression().is_empty());
    }

    #[test]
    fn test_max_stake_validation() {
        let mut s = session();
        assert_eq!(s.set_max_stake(0), Err(WheelError::InvalidMaxStake(0)));
        s.set_max_stake(27).unwrap();
        let result = s.replace_history(&[2, 5, 8, 11, 14, 17]).unwrap();
        assert_eq!(result.max_stake, 27);
        assert_eq!(*result.column.absence.bet_series.last().unwrap(), 27);
    }

    #[test]
    fn test_short_session_has_no_signal() {
        let mut s = session();
        for n in [2, 5, 8, 11] {
            let result = s.add_draw(n).unwrap();
            assert_eq!(result.column.absence.signal_type, SignalType::None);
        }
        assert!(s.progression().is_empty());
    }

    #[test]
    fn test_display() {
        let mut s = session();
        s.replace_history(&[3, 0]).unwrap();
        assert_eq!(s.to_string(), "[3 0] (2 draws, max stake 8)");
    }

    #[test]
    fn test_parse_draw_list() {
        assert_eq!(parse_draw_list(&["7,20", "34", " 0 "]).unwrap(), vec![7, 20, 34, 0]);
        assert_eq!(parse_draw_list(&["1 2,,3"]).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_draw_list(&["40"]).unwrap(), vec![40]);
        assert_eq!(
            parse_draw_list(&["5", "x"]),
            Err(WheelError::Unparsable("x".to_string()))
        );
        assert!(parse_draw_list::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("17".parse::<SessionCommand>().unwrap(), SessionCommand::Draw(17));
        assert_eq!(" 99 ".parse::<SessionCommand>().unwrap(), SessionCommand::Draw(99));
        assert_eq!("RESET".parse::<SessionCommand>().unwrap(), SessionCommand::Reset);
        assert_eq!("max 12".parse::<SessionCommand>().unwrap(), SessionCommand::MaxStake(12));
        assert_eq!("q".parse::<SessionCommand>().unwrap(), SessionCommand::Quit);
        assert!("max".parse::<SessionCommand>().is_err());
        assert!("seventeen".parse::<SessionCommand>().is_err());
    }
}
