//! Deterministic drop simulation
//!
//! Everything here is pure and synchronous:
//! - Seeded or scripted randomness only
//! - No I/O, no balance access
//! - No rendering or platform dependencies

pub mod lattice;
pub mod path;
pub mod payout;
pub mod risk;

pub use lattice::{LatticeSpec, bounds_at_row, columns_at_row, slot_index_from_offset};
pub use path::{Coin, Direction, DropPath, ScriptedCoin, generate_path};
pub use payout::{Payout, resolve_payout, resolve_slot};
pub use risk::{RiskLevel, RiskProfile};
