//! Column and tier classification of a draw.
//!
//! Both axes are derived arithmetically from the number, so there are no
//! membership tables to keep in sync. Zero belongs to neither axis.

use serde::Serialize;

use crate::types::{Axis, Draw, Slot};

/// Where a draw landed on the layout. `None` on an axis means zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub column: Option<Slot>,
    pub tier: Option<Slot>,
}

impl Classification {
    /// The value on the requested axis.
    pub fn on(&self, axis: Axis) -> Option<Slot> {
        match axis {
            Axis::Column => self.column,
            Axis::Tier => self.tier,
        }
    }
}

/// Classify a draw into its column and tier.
pub fn classify(draw: Draw) -> Classification {
    if draw.is_zero() {
        return Classification { column: None, tier: None };
    }
    let n = draw.number() as usize;
    Classification {
        column: Slot::from_index((n - 1) % 3),
        tier: Slot::from_index((n - 1) / 12),
    }
}

/// Shorthand for `classify(draw).on(axis)`.
pub fn slot_on(draw: Draw, axis: Axis) -> Option<Slot> {
    classify(draw).on(axis)
}

/// The twelve numbers belonging to a column or tier, ascending.
pub fn members(axis: Axis, slot: Slot) -> Vec<u8> {
    let k = slot.number();
    match axis {
        Axis::Column => (0..12).map(|i| k + 3 * i).collect(),
        Axis::Tier => {
            let first = (k - 1) * 12 + 1;
            (first..first + 12).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
