//! Presentation hooks
//!
//! Renderers and audio replay a finished path row by row. They are
//! collaborators only: a failing hook is logged and skipped, and never
//! stops a drop from settling.

use crate::error::PresentationError;
use crate::sim::Payout;

/// Sound cues a drop produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Chip bounces off an interior peg
    Ping,
    /// Chip lands in a slot
    Landing,
}

/// Cue for a row (1-based); the first and last rows are silent
pub fn cue_for_row(row: u32, row_count: u32) -> Option<SoundCue> {
    if row > 1 && row < row_count {
        Some(SoundCue::Ping)
    } else {
        None
    }
}

/// Observer of a drop as it is replayed
pub trait DropObserver {
    /// Called once before the first row
    fn on_start(&mut self, _ball: u32, _row_count: u32) -> Result<(), PresentationError> {
        Ok(())
    }

    /// Called for every row, top to bottom, never overlapping
    fn on_row(&mut self, ball: u32, row: u32, offset: i32) -> Result<(), PresentationError>;

    /// Called after the payout has been credited
    fn on_landing(&mut self, _ball: u32, _payout: &Payout) -> Result<(), PresentationError> {
        Ok(())
    }
}

/// Headless replay
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DropObserver for NoopObserver {
    fn on_row(&mut self, _ball: u32, _row: u32, _offset: i32) -> Result<(), PresentationError> {
        Ok(())
    }
}

/// Writes the replay to the log
#[derive(Debug, Default)]
pub struct LogObserver {
    row_count: u32,
}

impl DropObserver for LogObserver {
    fn on_start(&mut self, ball: u32, row_count: u32) -> Result<(), PresentationError> {
        self.row_count = row_count;
        log::debug!("Ball {ball}: dropping through {row_count} rows");
        Ok(())
    }

    fn on_row(&mut self, ball: u32, row: u32, offset: i32) -> Result<(), PresentationError> {
        match cue_for_row(row, self.row_count) {
            Some(cue) => log::debug!("Ball {ball} row {row}: offset {offset} ({cue:?})"),
            None => log::debug!("Ball {ball} row {row}: offset {offset}"),
        }
        Ok(())
    }

    fn on_landing(&mut self, ball: u32, payout: &Payout) -> Result<(), PresentationError> {
        log::info!(
            "Ball {ball} landed in slot {}: You won {}x! ({})",
            payout.slot_index,
            payout.multiplier,
            payout.winnings.round_dp(2)
        );
        Ok(())
    }
}
