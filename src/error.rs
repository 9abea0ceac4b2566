//! Error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures talking to the remote balance / drop authority
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("authority unreachable")]
    Offline,

    #[error("authority responded with status {0}")]
    Status(u16),

    #[error("malformed authority payload: {0}")]
    Malformed(String),
}

/// Engine errors
#[derive(Debug, Error)]
pub enum PlinkoError {
    #[error("invalid bet: {ball_count} x {amount} against balance {balance}")]
    InvalidWager {
        amount: Decimal,
        ball_count: u32,
        balance: Decimal,
    },

    /// Terminal slot outside the payout table: a lattice/profile mismatch
    #[error("slot {slot} outside payout table of {len} slots")]
    OutOfRangeSlot { slot: usize, len: usize },

    #[error("network unavailable: {0}")]
    NetworkUnavailable(#[from] SyncError),

    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("risk level cannot change while a drop is in flight")]
    DropInFlight,

    #[error("unknown risk level {0:?}")]
    UnknownRiskLevel(String),

    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A presentation collaborator (renderer, audio) failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("presentation unavailable: {0}")]
pub struct PresentationError(pub String);
