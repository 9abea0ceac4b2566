//! Lattice geometry
//!
//! Lateral positions are measured in half-steps from the center column. A
//! drop moves one half-step per row, so row `r` spans `[-r, +r]` half-steps
//! (the `[-r/2, +r/2]` band in whole peg spacings).

use super::risk::RiskProfile;
use crate::consts::*;
use crate::error::PlinkoError;

/// Inclusive lateral-offset range reachable at `row` from the center column
#[inline]
pub fn bounds_at_row(row: u32) -> (i32, i32) {
    let r = row.min(i32::MAX as u32) as i32;
    (-r, r)
}

/// Number of pegs on a lattice row
#[inline]
pub fn columns_at_row(row: u32) -> u32 {
    row + 1
}

/// Board shape: how many rows a drop falls through and how many slots catch it.
///
/// Only built through the validating constructors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSpec {
    row_count: u32,
    slot_count: usize,
    /// Lateral distance of one half-step (board units)
    half_step_width: f64,
    /// Distance between neighbouring slot centers (board units)
    slot_spacing: f64,
}

impl Default for LatticeSpec {
    fn default() -> Self {
        Self {
            row_count: DEFAULT_ROWS,
            slot_count: DEFAULT_SLOTS,
            half_step_width: HALF_STEP_WIDTH,
            slot_spacing: SLOT_SPACING,
        }
    }
}

impl LatticeSpec {
    pub fn new(row_count: u32, slot_count: usize) -> Result<Self, PlinkoError> {
        if row_count == 0 {
            return Err(PlinkoError::InvalidLattice(
                "row count must be at least 1".into(),
            ));
        }
        if slot_count % 2 == 0 {
            return Err(PlinkoError::InvalidLattice(format!(
                "slot count must be odd, got {slot_count}"
            )));
        }
        Ok(Self {
            row_count,
            slot_count,
            ..Self::default()
        })
    }

    /// Lattice whose slots line up with a payout table
    pub fn for_profile(row_count: u32, profile: &RiskProfile) -> Result<Self, PlinkoError> {
        Self::new(row_count, profile.slot_count())
    }

    /// Override the board pitches used for the offset → slot mapping
    pub fn with_pitch(mut self, half_step_width: f64, slot_spacing: f64) -> Result<Self, PlinkoError> {
        if !(half_step_width > 0.0 && slot_spacing > 0.0) {
            return Err(PlinkoError::InvalidLattice(format!(
                "pitches must be positive, got {half_step_width}/{slot_spacing}"
            )));
        }
        self.half_step_width = half_step_width;
        self.slot_spacing = slot_spacing;
        Ok(self)
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Largest lateral offset a drop can reach at the final row
    pub fn max_excursion(&self) -> i32 {
        bounds_at_row(self.row_count).1
    }

    /// Map a final lateral offset to the slot beneath it.
    ///
    /// Rounds half up and clamps into `[0, slot_count - 1]`.
    pub fn slot_index_from_offset(&self, offset: i32) -> usize {
        let center = (self.slot_count.saturating_sub(1) / 2) as f64;
        let pos = offset as f64 * self.half_step_width / self.slot_spacing + center;
        let rounded = (pos + 0.5).floor();
        let last = self.slot_count.saturating_sub(1);
        if rounded <= 0.0 {
            0
        } else {
            (rounded as usize).min(last)
        }
    }
}

/// Slot mapping on the default board pitches
pub fn slot_index_from_offset(offset: i32, slot_count: usize) -> usize {
    LatticeSpec {
        slot_count,
        ..LatticeSpec::default()
    }
    .slot_index_from_offset(offset)
}
