//! Optimistic ledger updates with fire-and-forget pushes
//!
//! Every local mutation and the push that follows it happen under one commit
//! lock, so the authority sees balances in the order they were produced.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BalanceAuthority;
use crate::error::PlinkoError;
use crate::ledger::{Ledger, Wager};

/// A balance the authority acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub balance: Decimal,
    /// Exchange counter at the time of the acknowledgement
    pub sequence: u64,
}

#[derive(Debug, Default)]
struct SyncStatus {
    sequence: u64,
    last_success: Option<SyncRecord>,
    failed_pushes: u64,
}

/// Drives the ledger and keeps the authority informed
pub struct Reconciler {
    ledger: Arc<Ledger>,
    authority: Arc<dyn BalanceAuthority>,
    commit: Mutex<()>,
    status: Mutex<SyncStatus>,
}

impl Reconciler {
    pub fn new(ledger: Arc<Ledger>, authority: Arc<dyn BalanceAuthority>) -> Self {
        Self {
            ledger,
            authority,
            commit: Mutex::new(()),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Initialize the ledger from the authority.
    ///
    /// Any failure, or a negative balance, means "balance unknown" and
    /// hydrates to zero.
    pub fn hydrate(&self) -> Decimal {
        let _commit = self.commit.lock();
        match self.authority.fetch_balance() {
            Ok(balance) if balance >= Decimal::ZERO => {
                self.ledger.hydrate(balance);
                self.record_success(balance);
                balance
            }
            Ok(balance) => {
                log::warn!("Authority reported negative balance {balance}, defaulting to 0");
                self.ledger.hydrate(Decimal::ZERO);
                Decimal::ZERO
            }
            Err(e) => {
                log::warn!("Error fetching balance ({e}), defaulting to 0");
                self.ledger.hydrate(Decimal::ZERO);
                Decimal::ZERO
            }
        }
    }

    /// Apply a delta locally, then push the resulting balance once
    pub fn apply(&self, delta: Decimal) -> Decimal {
        let _commit = self.commit.lock();
        let balance = self.ledger.apply_delta(delta);
        self.push(balance);
        balance
    }

    /// Validate and debit a wager, then push the resulting balance once
    pub fn debit(&self, wager: &Wager) -> Result<Decimal, PlinkoError> {
        let _commit = self.commit.lock();
        let balance = self.ledger.try_debit(wager)?;
        self.push(balance);
        Ok(balance)
    }

    /// Push the current local balance (retry after a failed push)
    pub fn resync(&self) -> bool {
        let _commit = self.commit.lock();
        self.push(self.ledger.balance())
    }

    // Caller holds the commit lock
    fn push(&self, balance: Decimal) -> bool {
        match self.authority.push_balance(balance) {
            Ok(()) => {
                log::info!("Balance synced: {}", balance.round_dp(2));
                self.record_success(balance);
                true
            }
            Err(e) => {
                log::error!("Error syncing balance {}: {e}", balance.round_dp(2));
                let mut status = self.status.lock();
                status.sequence += 1;
                status.failed_pushes += 1;
                false
            }
        }
    }

    fn record_success(&self, balance: Decimal) {
        let mut status = self.status.lock();
        status.sequence += 1;
        status.last_success = Some(SyncRecord {
            balance,
            sequence: status.sequence,
        });
    }

    /// Last balance the authority acknowledged
    pub fn last_successful_sync(&self) -> Option<SyncRecord> {
        self.status.lock().last_success
    }

    pub fn failed_pushes(&self) -> u64 {
        self.status.lock().failed_pushes
    }

    /// Local balance differs from the last acknowledged one
    pub fn is_stale(&self) -> bool {
        match self.last_successful_sync() {
            Some(record) => record.balance != self.ledger.balance(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::sync::InMemoryAuthority;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn setup(remote: Decimal) -> (Arc<InMemoryAuthority>, Reconciler) {
        let authority = Arc::new(InMemoryAuthority::new(remote));
        let reconciler = Reconciler::new(Arc::new(Ledger::default()), authority.clone());
        (authority, reconciler)
    }

    /// Holds the first push until a later push lands (or a timeout passes)
    struct GatedAuthority {
        stored: Mutex<Option<Decimal>>,
        first_entered: Mutex<Option<Sender<()>>>,
        release: Mutex<Option<Receiver<()>>>,
        release_tx: Mutex<Option<Sender<()>>>,
    }

    impl GatedAuthority {
        fn new(first_entered: Sender<()>) -> Self {
            let (release_tx, release_rx) = mpsc::channel();
            Self {
                stored: Mutex::new(None),
                first_entered: Mutex::new(Some(first_entered)),
                release: Mutex::new(Some(release_rx)),
                release_tx: Mutex::new(Some(release_tx)),
            }
        }
    }

    impl BalanceAuthority for GatedAuthority {
        fn fetch_balance(&self) -> Result<Decimal, SyncError> {
            self.stored.lock().ok_or(SyncError::Status(404))
        }

        fn push_balance(&self, balance: Decimal) -> Result<(), SyncError> {
            let first = self.first_entered.lock().take();
            if let Some(entered) = first {
                let _ = entered.send(());
                let release = self.release.lock().take();
                if let Some(release) = release {
                    let _ = release.recv_timeout(Duration::from_millis(300));
                }
                *self.stored.lock() = Some(balance);
            } else {
                *self.stored.lock() = Some(balance);
                let release = self.release_tx.lock().take();
                if let Some(release) = release {
                    let _ = release.send(());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_hydrate_round_trip() {
        let (authority, reconciler) = setup(Decimal::new(32125, 2));
        let fetched = authority.fetch_balance().unwrap();
        reconciler.ledger().hydrate(fetched);
        assert_eq!(reconciler.ledger().balance(), fetched);

        assert_eq!(reconciler.hydrate(), Decimal::new(32125, 2));
        assert_eq!(reconciler.ledger().balance(), Decimal::new(32125, 2));
        assert!(!reconciler.is_stale());
    }

    #[test]
    fn test_hydrate_defaults_to_zero_when_unknown() {
        let authority = Arc::new(InMemoryAuthority::empty());
        let reconciler = Reconciler::new(Arc::new(Ledger::new(dec(55))), authority);
        assert_eq!(reconciler.hydrate(), Decimal::ZERO);
        assert_eq!(reconciler.ledger().balance(), Decimal::ZERO);

        let (authority, reconciler) = setup(dec(80));
        authority.set_offline(true);
        assert_eq!(reconciler.hydrate(), Decimal::ZERO);
        assert!(reconciler.last_successful_sync().is_none());
    }

    #[test]
    fn test_negative_remote_balance_reads_as_unknown() {
        let (_authority, reconciler) = setup(dec(-25));
        reconciler.ledger().hydrate(dec(40));
        assert_eq!(reconciler.hydrate(), Decimal::ZERO);
        assert_eq!(reconciler.ledger().balance(), Decimal::ZERO);
        assert!(reconciler.last_successful_sync().is_none());
    }

    #[test]
    fn test_apply_pushes_once() {
        let (authority, reconciler) = setup(dec(100));
        reconciler.hydrate();
        assert_eq!(reconciler.apply(dec(-10)), dec(90));
        assert_eq!(authority.pushes(), vec![dec(90)]);
        assert_eq!(authority.stored_balance(), Some(dec(90)));
    }

    #[test]
    fn test_debit_pushes_once_and_rejects_silently() {
        let (authority, reconciler) = setup(dec(100));
        reconciler.hydrate();
        assert!(reconciler.debit(&Wager::new(dec(60), 2)).is_err());
        assert!(authority.pushes().is_empty());
        assert_eq!(reconciler.debit(&Wager::new(dec(10), 2)).unwrap(), dec(80));
        assert_eq!(authority.pushes(), vec![dec(80)]);
    }

    #[test]
    fn test_failed_push_keeps_local_balance() {
        let (authority, reconciler) = setup(dec(100));
        reconciler.hydrate();
        authority.set_offline(true);

        assert_eq!(reconciler.apply(dec(15)), dec(115));
        assert_eq!(reconciler.ledger().balance(), dec(115));
        assert_eq!(reconciler.failed_pushes(), 1);
        assert!(reconciler.is_stale());
        assert_eq!(reconciler.last_successful_sync().map(|r| r.balance), Some(dec(100)));

        // Next successful push closes the gap
        authority.set_offline(false);
        assert!(reconciler.resync());
        assert!(!reconciler.is_stale());
        assert_eq!(authority.stored_balance(), Some(dec(115)));
    }

    #[test]
    fn test_sequence_advances() {
        let (_authority, reconciler) = setup(dec(10));
        reconciler.hydrate();
        reconciler.apply(Decimal::ONE);
        let record = reconciler.last_successful_sync().unwrap();
        assert_eq!(record.sequence, 2);
        assert_eq!(record.balance, dec(11));
    }

    #[test]
    fn test_slow_push_cannot_be_overtaken() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let authority = Arc::new(GatedAuthority::new(entered_tx));
        let reconciler = Reconciler::new(Arc::new(Ledger::default()), authority.clone());

        std::thread::scope(|s| {
            s.spawn(|| reconciler.apply(dec(10)));
            // First push is now parked inside the authority
            entered_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("first push never reached the authority");
            s.spawn(|| reconciler.apply(dec(20)));
        });

        assert_eq!(reconciler.ledger().balance(), dec(30));
        assert_eq!(*authority.stored.lock(), Some(dec(30)));
        assert_eq!(reconciler.last_successful_sync().map(|r| r.balance), Some(dec(30)));
        assert!(!reconciler.is_stale());
    }

    #[test]
    fn test_concurrent_applies_leave_authority_current() {
        let (authority, reconciler) = setup(Decimal::ZERO);
        reconciler.hydrate();
        std::thread::scope(|s| {
            for n in 1..=8 {
                let reconciler = &reconciler;
                s.spawn(move || reconciler.apply(dec(n)));
            }
        });
        assert_eq!(reconciler.ledger().balance(), dec(36));
        assert_eq!(authority.stored_balance(), Some(dec(36)));
        assert!(!reconciler.is_stale());
        // Pushed balances only ever grow when every delta is a credit
        let pushes = authority.pushes();
        assert!(pushes.windows(2).all(|w| w[0] < w[1]));
    }
}
