//! Payout resolution

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::path::DropPath;
use super::risk::RiskProfile;
use crate::error::PlinkoError;

/// Result of settling one drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub slot_index: usize,
    pub multiplier: Decimal,
    pub winnings: Decimal,
}

/// Resolve the payout for a finished path.
///
/// Only the terminal slot matters; the intermediate rows are display data.
pub fn resolve_payout(
    path: &DropPath,
    profile: &RiskProfile,
    amount: Decimal,
) -> Result<Payout, PlinkoError> {
    resolve_slot(path.slot_index(), profile, amount)
}

/// Resolve the payout for a terminal slot
pub fn resolve_slot(
    slot_index: usize,
    profile: &RiskProfile,
    amount: Decimal,
) -> Result<Payout, PlinkoError> {
    let multiplier = profile
        .multiplier(slot_index)
        .ok_or(PlinkoError::OutOfRangeSlot {
            slot: slot_index,
            len: profile.slot_count(),
        })?;
    Ok(Payout {
        slot_index,
        multiplier,
        winnings: amount.saturating_mul(multiplier),
    })
}
