//! Plinko Drop - drop simulation, payout resolution and balance reconciliation
//!
//! Core modules:
//! - `sim`: Deterministic lattice geometry, random walk and payout tables
//! - `ledger`: Local balance shared by concurrent drops
//! - `sync`: Reconciliation with the remote balance authority
//! - `authority`: Local or remote locus of drop generation
//! - `session`: Wager flow tying it all together
//! - `presentation`: Hooks for renderers and audio

pub mod authority;
pub mod error;
pub mod ledger;
pub mod presentation;
pub mod session;
pub mod settings;
pub mod sim;
pub mod sync;

pub use authority::DropAuthority;
pub use error::{PlinkoError, PresentationError, SyncError};
pub use ledger::{Ledger, Wager};
pub use session::{CancelToken, DropOutcome, PendingDrop, Session, WagerReport};
pub use settings::Settings;

/// Board configuration constants
pub mod consts {
    /// Rows of pegs on the standard board
    pub const DEFAULT_ROWS: u32 = 12;
    /// Payout slots on the standard board
    pub const DEFAULT_SLOTS: usize = 11;

    /// Lateral distance of one half-step (board units)
    pub const HALF_STEP_WIDTH: f64 = 20.0;
    /// Distance between slot centers (board units)
    pub const SLOT_SPACING: f64 = 50.0;

    /// Most balls a single wager may drop
    pub const MAX_BALLS: u32 = 10_000;

    /// Column a remote drop starts from
    pub const DEFAULT_START_SLOT: usize = 4;
}
