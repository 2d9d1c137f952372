//! Shared types for the WHEELWATCH engine.
//!
//! These types form the data model used across all modules. Draw
//! validation happens here, once, so that everything downstream of a
//! `Draw` can assume a number in 0..=36.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of draws kept in a history (oldest dropped beyond this).
pub const HISTORY_CAP: usize = 30;

/// Minimum number of draws before any signal is produced.
pub const MIN_DRAWS: usize = 5;

/// Highest number on a single-zero wheel.
pub const MAX_NUMBER: u8 = 36;

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

/// A single spin outcome, guaranteed to be in 0..=36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Draw(u8);

impl Draw {
    /// Validate a raw integer as a roulette number.
    pub fn new(value: i64) -> Result<Self, WheelError> {
        if (0..=MAX_NUMBER as i64).contains(&value) {
            Ok(Draw(value as u8))
        } else {
            Err(WheelError::InvalidDraw(value))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for Draw {
    type Error = WheelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Draw::new(value)
    }
}

impl From<Draw> for u8 {
    fn from(draw: Draw) -> u8 {
        draw.0
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Draw {
    type Err = WheelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| WheelError::Unparsable(s.trim().to_string()))?;
        Draw::new(value)
    }
}

/// Validate a batch of raw integers, failing on the first bad value.
pub fn validate_draws(values: &[i64]) -> Result<Vec<Draw>, WheelError> {
    values.iter().map(|&v| Draw::new(v)).collect()
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// One of the three values of an axis (column 1..3 or tier 1..3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
    Three,
}

impl Slot {
    /// All slots in scan order (1 → 3).
    pub const ALL: [Slot; 3] = [Slot::One, Slot::Two, Slot::Three];

    /// Zero-based position, for indexing `[T; 3]` tables.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
            Slot::Three => 2,
        }
    }

    /// The 1-based number shown on the layout.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_index(index: usize) -> Option<Slot> {
        Slot::ALL.get(index).copied()
    }
}

impl TryFrom<u8> for Slot {
    type Error = WheelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            3 => Ok(Slot::Three),
            other => Err(WheelError::Unparsable(format!("slot {other}"))),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.number()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Classification axis of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Column,
    Tier,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Column, Axis::Tier];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => write!(f, "COLUMN"),
            Axis::Tier => write!(f, "TIER"),
        }
    }
}

/// Pattern heuristic that produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    Absence,
    NoRepetition,
}

impl Heuristic {
    pub const ALL: [Heuristic; 2] = [Heuristic::Absence, Heuristic::NoRepetition];
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Absence => write!(f, "absence"),
            Heuristic::NoRepetition => write!(f, "no-repetition"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for WHEELWATCH.
///
/// "No signal" is deliberately absent: it is a valid outcome carried in
/// the analysis result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WheelError {
    #[error("Invalid draw {0}: numbers must be between 0 and 36")]
    InvalidDraw(i64),

    #[error("Not a number: {0:?}")]
    Unparsable(String),

    #[error("Invalid max stake {0}: must be at least 1")]
    InvalidMaxStake(u32),

    #[error("Invalid draw count {0}: must be at least 1")]
    InvalidCount(usize),

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Not enough draws: need at least {needed}, have {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
