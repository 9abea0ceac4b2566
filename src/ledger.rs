//! Balance ledger
//!
//! The local, optimistic copy of the player's balance. Shared between
//! concurrent drops behind a lock; every mutation is a single critical
//! section so concurrent deltas are never lost. Amounts are exact decimals.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_BALLS;
use crate::error::PlinkoError;

/// A bet: `amount` per ball, `ball_count` balls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub amount: Decimal,
    pub ball_count: u32,
}

impl Wager {
    pub fn new(amount: Decimal, ball_count: u32) -> Self {
        Self { amount, ball_count }
    }

    /// Single-ball wager
    pub fn single(amount: Decimal) -> Self {
        Self::new(amount, 1)
    }

    /// Total stake across all balls (`None` on overflow)
    pub fn total(&self) -> Option<Decimal> {
        self.amount.checked_mul(Decimal::from(self.ball_count))
    }

    fn fits(&self, balance: Decimal) -> bool {
        self.amount > Decimal::ZERO
            && (1..=MAX_BALLS).contains(&self.ball_count)
            && self.total().is_some_and(|total| total <= balance)
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    balance: Mutex<Decimal>,
}

impl Ledger {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: Mutex::new(balance),
        }
    }

    pub fn balance(&self) -> Decimal {
        *self.balance.lock()
    }

    /// Check a wager against the current balance. Never mutates.
    pub fn validate(&self, wager: &Wager) -> bool {
        let balance = self.balance();
        let valid = wager.fits(balance);
        log::debug!(
            "Validating bet: {} * {} <= {} -> {}",
            wager.amount,
            wager.ball_count,
            balance,
            valid
        );
        valid
    }

    /// Add a signed delta; returns the balance after the change
    pub fn apply_delta(&self, amount: Decimal) -> Decimal {
        let mut balance = self.balance.lock();
        *balance = balance.saturating_add(amount);
        log::debug!("Applied {amount}: balance now {}", *balance);
        *balance
    }

    /// Validate and debit the full stake in one step.
    ///
    /// Returns the balance after the debit, or `InvalidWager` with no change.
    pub fn try_debit(&self, wager: &Wager) -> Result<Decimal, PlinkoError> {
        let mut balance = self.balance.lock();
        let total = match wager.total() {
            Some(total) if wager.fits(*balance) => total,
            _ => {
                return Err(PlinkoError::InvalidWager {
                    amount: wager.amount,
                    ball_count: wager.ball_count,
                    balance: *balance,
                });
            }
        };
        *balance -= total;
        Ok(*balance)
    }

    /// Overwrite the balance with the authority's value
    pub fn hydrate(&self, remote: Decimal) {
        *self.balance.lock() = remote;
        log::info!("Balance hydrated: {}", remote.round_dp(2));
    }
}
