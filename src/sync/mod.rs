//! Balance reconciliation with a remote authority
//!
//! The local ledger is the interactive source of truth. The authority is
//! hydrated from once per session and pushed to after every mutation; push
//! failures are logged and recovered by the next successful push.

pub mod reconcile;
pub mod wire;

pub use reconcile::{Reconciler, SyncRecord};
pub use wire::{BalancePayload, DropResponse, parse_balance_response};

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::SyncError;

/// The authoritative balance store
pub trait BalanceAuthority: Send + Sync {
    /// Query the authoritative balance (`GET /get_balance`)
    fn fetch_balance(&self) -> Result<Decimal, SyncError>;

    /// Push the local balance (`POST /sync_balance`)
    fn push_balance(&self, balance: Decimal) -> Result<(), SyncError>;
}

/// Server-side drop generation (`GET /drop/<start_slot>`)
pub trait DropClient: Send + Sync {
    fn request_drop(&self, start_slot: usize) -> Result<DropResponse, SyncError>;
}

#[derive(Debug, Default)]
struct AuthorityState {
    balance: Option<Decimal>,
    offline: bool,
    pushes: Vec<Decimal>,
}

/// In-process authority for tests and the demo binary.
///
/// Can be switched offline to simulate network failures.
#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    state: Mutex<AuthorityState>,
}

impl InMemoryAuthority {
    pub fn new(balance: Decimal) -> Self {
        Self {
            state: Mutex::new(AuthorityState {
                balance: Some(balance),
                ..Default::default()
            }),
        }
    }

    /// Authority with no balance on record; fetches fail with 404
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Balance currently on record
    pub fn stored_balance(&self) -> Option<Decimal> {
        self.state.lock().balance
    }

    /// Every successfully received push, oldest first
    pub fn pushes(&self) -> Vec<Decimal> {
        self.state.lock().pushes.clone()
    }
}

impl BalanceAuthority for InMemoryAuthority {
    fn fetch_balance(&self) -> Result<Decimal, SyncError> {
        let state = self.state.lock();
        if state.offline {
            return Err(SyncError::Offline);
        }
        state.balance.ok_or(SyncError::Status(404))
    }

    fn push_balance(&self, balance: Decimal) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        if state.offline {
            return Err(SyncError::Offline);
        }
        state.balance = Some(balance);
        state.pushes.push(balance);
        Ok(())
    }
}
