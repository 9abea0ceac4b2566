//! JSON payloads exchanged with the balance / drop authority
//!
//! Amounts travel as JSON numbers and are converted to `Decimal` at this
//! boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::sim::DropPath;

/// Query endpoint for the authoritative balance
pub const GET_BALANCE_PATH: &str = "/get_balance";
/// Command endpoint accepting the local balance
pub const SYNC_BALANCE_PATH: &str = "/sync_balance";
/// Remote drop endpoint prefix (`/drop/<start_slot>`)
pub const DROP_PATH: &str = "/drop";

/// Remote drop endpoint for a start column
pub fn drop_endpoint(start_slot: usize) -> String {
    format!("{DROP_PATH}/{start_slot}")
}

/// `{"balance": number}` body used in both directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancePayload {
    pub balance: f64,
}

#[derive(Deserialize)]
struct LenientBalance {
    #[serde(default)]
    balance: Option<f64>,
}

fn to_decimal(value: f64, field: &str) -> Result<Decimal, SyncError> {
    Decimal::from_f64(value).ok_or_else(|| SyncError::Malformed(format!("{field} {value} out of range")))
}

impl BalancePayload {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: balance.to_f64().unwrap_or_default(),
        }
    }

    pub fn balance(&self) -> Result<Decimal, SyncError> {
        to_decimal(self.balance, "balance")
    }

    pub fn to_json(&self) -> String {
        // A struct with a single f64 field always serializes
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"balance\":{}}}", self.balance))
    }
}

/// Decode a balance query response.
///
/// Non-2xx statuses are errors; a missing or null `balance` reads as zero.
pub fn parse_balance_response(status: u16, body: &str) -> Result<Decimal, SyncError> {
    if !(200..300).contains(&status) {
        return Err(SyncError::Status(status));
    }
    let payload: LenientBalance =
        serde_json::from_str(body).map_err(|e| SyncError::Malformed(e.to_string()))?;
    match payload.balance {
        Some(balance) => to_decimal(balance, "balance"),
        None => Ok(Decimal::ZERO),
    }
}

/// Server-computed drop: visited `(column, row)` cells, payout and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropResponse {
    pub path: Vec<(i32, u32)>,
    pub multiplier: f64,
    pub slot: usize,
}

impl DropResponse {
    pub fn from_json(body: &str) -> Result<Self, SyncError> {
        serde_json::from_str(body).map_err(|e| SyncError::Malformed(e.to_string()))
    }

    /// The served multiplier as an exact decimal
    pub fn payout_multiplier(&self) -> Result<Decimal, SyncError> {
        let multiplier = to_decimal(self.multiplier, "multiplier")?;
        if multiplier < Decimal::ZERO {
            return Err(SyncError::Malformed(format!("negative multiplier {multiplier}")));
        }
        Ok(multiplier)
    }

    /// Convert the served cells into a path relative to the start column.
    ///
    /// The row-0 start cell is dropped so the path has one entry per row.
    pub fn to_path(&self) -> Result<DropPath, SyncError> {
        let Some(&(start_col, _)) = self.path.first() else {
            return Err(SyncError::Malformed("empty drop path".into()));
        };
        let offsets = self
            .path
            .iter()
            .filter(|(_, row)| *row > 0)
            .map(|(col, _)| col - start_col)
            .collect();
        Ok(DropPath::served(offsets, self.slot))
    }
}
