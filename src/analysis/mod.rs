//! Analysis engine — classification, pattern detection, signal selection
//! and stake progression.

pub mod absence;
pub mod classify;
pub mod no_repetition;
pub mod progression;
pub mod report;
pub mod signal;

use tracing::{debug, info};

use crate::types::{Draw, WheelError, HISTORY_CAP, MIN_DRAWS};
use absence::absences;
use no_repetition::{no_repetition, no_repetition_counts};
use progression::{BetSeries, ProgressionTable};
use report::AnalysisResult;
use signal::select_signals;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Detector thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Absence (in spins) from which a value becomes an absence signal.
    pub min_absence: usize,
    /// Window length of the alternation flag.
    pub no_repetition_window: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_absence: signal::DEFAULT_MIN_ABSENCE,
            no_repetition_window: no_repetition::DEFAULT_WINDOW,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Pipelines detection → signal selection → progression → result.
///
/// One instance owns one progression table. `analyze` takes `&mut self`,
/// so calls on the same instance are serialized by construction.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
    table: ProgressionTable,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            table: ProgressionTable::new(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Read access to the progression memory.
    pub fn progression(&self) -> &ProgressionTable {
        &self.table
    }

    /// Fit stored progression indices to a new bet series.
    pub fn refit(&mut self, series: &BetSeries) {
        self.table.refit(series);
    }

    /// Clear all progression state.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// What `analyze` would return now, without advancing the progression.
    pub fn preview(&self, history: &[Draw], max_stake: u32) -> Result<AnalysisResult, WheelError> {
        self.clone().analyze(history, max_stake)
    }

    /// Analyze a most-recent-first history.
    ///
    /// Works on a copy truncated to the 30 most recent draws. With fewer
    /// than 5 draws the result carries no signal and the progression
    /// table is left untouched. The only error is a max stake below 1.
    pub fn analyze(&mut self, history: &[Draw], max_stake: u32) -> Result<AnalysisResult, WheelError> {
        let series = BetSeries::new(max_stake)?;
        let history: Vec<Draw> = history.iter().take(HISTORY_CAP).copied().collect();

        let absences = absences(&history);
        let counts = no_repetition_counts(&history);
        let flags = no_repetition(&history, self.config.no_repetition_window);

        let latest = match history.first() {
            Some(&latest) if history.len() >= MIN_DRAWS => latest,
            _ => {
                debug!(
                    draws = history.len(),
                    needed = MIN_DRAWS,
                    "History too short, no signal"
                );
                return Ok(AnalysisResult::no_signal(
                    absences,
                    counts,
                    flags,
                    history.len(),
                    max_stake,
                ));
            }
        };

        let signals = select_signals(&absences, &counts, self.config.min_absence);
        if signals.is_empty() {
            debug!(latest = %latest, "No lane produced a signal");
        }
        let steps = self.table.apply(&signals, latest, &series);
        let result = AnalysisResult::assemble(absences, counts, flags, &signals, &steps, &series, history.len());

        info!(
            draws = history.len(),
            latest = %latest,
            max_stake,
            tracked = self.table.len(),
            column_absence = %result.column.absence.signal_type,
            tier_absence = %result.tier.absence.signal_type,
            column_no_repetition = %result.column.no_repetition.signal_type,
            tier_no_repetition = %result.tier.no_repetition.signal_type,
            "Analysis complete"
        );

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
