//! Drop path generation
//!
//! A constrained random walk: one coin flip per row, one half-step per flip,
//! clipped to the row bounds. The walk is computed up front; presentation only
//! replays the finished path.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::lattice::{LatticeSpec, bounds_at_row};

/// Lateral direction of one bounce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn delta(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Source of left/right decisions for the walk
pub trait Coin {
    fn flip(&mut self) -> Direction;
}

impl Coin for Pcg32 {
    fn flip(&mut self) -> Direction {
        if self.random_bool(0.5) {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// Replays a fixed sequence of directions, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedCoin {
    script: Vec<Direction>,
    cursor: usize,
}

impl ScriptedCoin {
    pub fn new(script: Vec<Direction>) -> Self {
        Self { script, cursor: 0 }
    }

    /// `lefts` flips to the left followed by `rights` flips to the right
    pub fn lefts_then_rights(lefts: usize, rights: usize) -> Self {
        let mut script = vec![Direction::Left; lefts];
        script.extend(std::iter::repeat_n(Direction::Right, rights));
        Self::new(script)
    }
}

impl Coin for ScriptedCoin {
    fn flip(&mut self) -> Direction {
        if self.script.is_empty() {
            return Direction::Left;
        }
        let dir = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        dir
    }
}

/// The rows visited by one drop and the slot it lands in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPath {
    offsets: Vec<i32>,
    slot_index: usize,
}

impl DropPath {
    /// Path served by a remote authority (not generated locally)
    pub(crate) fn served(offsets: Vec<i32>, slot_index: usize) -> Self {
        Self {
            offsets,
            slot_index,
        }
    }

    /// Lateral offset at every row, top to bottom
    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn final_offset(&self) -> i32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Terminal slot the drop resolves to
    pub fn slot_index(&self) -> usize {
        self.slot_index
    }
}

/// Generate a drop path through `lattice` using `coin` for each bounce
pub fn generate_path<C: Coin + ?Sized>(lattice: &LatticeSpec, coin: &mut C) -> DropPath {
    let rows = lattice.row_count();
    let mut offsets = Vec::with_capacity(rows as usize);
    let mut offset = 0i32;

    for row in 1..=rows {
        let (min, max) = bounds_at_row(row);
        // Excursions past the row bound snap to the bound
        offset = (offset + coin.flip().delta()).clamp(min, max);
        offsets.push(offset);
    }

    let slot_index = lattice.slot_index_from_offset(offset);
    log::debug!("Generated path over {rows} rows: final offset {offset} -> slot {slot_index}");

    DropPath {
        offsets,
        slot_index,
    }
}
