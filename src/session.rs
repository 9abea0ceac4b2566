//! Wager flow
//!
//! A session owns the active risk profile, the drop authority and the
//! reconciler. Placing a wager debits the full stake and hands back one
//! `PendingDrop` per ball; each pending drop is replayed independently and
//! credits its own winnings when (and only when) it runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rust_decimal::Decimal;

use crate::authority::{DropAuthority, Settlement};
use crate::error::PlinkoError;
use crate::ledger::{Ledger, Wager};
use crate::presentation::DropObserver;
use crate::settings::Settings;
use crate::sim::{DropPath, LatticeSpec, Payout, RiskLevel, RiskProfile, resolve_payout};
use crate::sync::{BalanceAuthority, Reconciler};

/// Cooperative cancellation flag, checked before every row
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counts a drop as in flight until dropped
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How a single drop ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Ran to completion; winnings credited
    Paid { payout: Payout, balance: Decimal },
    /// Abandoned before settling; nothing credited
    Cancelled { rows_completed: usize },
    /// Terminal slot had no multiplier; nothing credited
    Rejected { slot: usize },
}

impl DropOutcome {
    pub fn winnings(&self) -> Decimal {
        match self {
            DropOutcome::Paid { payout, .. } => payout.winnings,
            _ => Decimal::ZERO,
        }
    }
}

/// A drawn, debited, not yet settled drop
pub struct PendingDrop {
    ball: u32,
    amount: Decimal,
    path: DropPath,
    settlement: Settlement,
    sync: Arc<Reconciler>,
    _in_flight: InFlightGuard,
}

impl std::fmt::Debug for PendingDrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingDrop")
            .field("ball", &self.ball)
            .field("amount", &self.amount)
            .field("path", &self.path)
            .field("settlement", &self.settlement)
            .finish()
    }
}

impl PendingDrop {
    pub fn ball(&self) -> u32 {
        self.ball
    }

    pub fn path(&self) -> &DropPath {
        &self.path
    }

    /// Replay the path through `observer`, then settle.
    ///
    /// Observer failures are logged and disable further presentation for
    /// this drop; they never block the payout.
    pub fn run(self, observer: &mut dyn DropObserver, cancel: &CancelToken) -> DropOutcome {
        let ball = self.ball;
        let mut presenting = true;
        let rows = self.path.len() as u32;

        if let Err(e) = observer.on_start(ball, rows) {
            log::warn!("Ball {ball}: {e}");
            presenting = false;
        }

        for (i, &offset) in self.path.offsets().iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("Ball {ball} abandoned at row {}", i + 1);
                return DropOutcome::Cancelled { rows_completed: i };
            }
            if presenting {
                if let Err(e) = observer.on_row(ball, i as u32 + 1, offset) {
                    log::warn!("Ball {ball}: {e}");
                    presenting = false;
                }
            }
        }

        if cancel.is_cancelled() {
            log::info!("Ball {ball} abandoned before settling");
            return DropOutcome::Cancelled {
                rows_completed: self.path.len(),
            };
        }

        let payout = match self.settlement {
            Settlement::Resolve(profile) => resolve_payout(&self.path, &profile, self.amount),
            Settlement::Served { multiplier } => Ok(Payout {
                slot_index: self.path.slot_index(),
                multiplier,
                winnings: self.amount.saturating_mul(multiplier),
            }),
        };
        let payout = match payout {
            Ok(payout) => payout,
            Err(e) => {
                log::error!("Ball {ball}: rejecting drop result: {e}");
                return DropOutcome::Rejected {
                    slot: self.path.slot_index(),
                };
            }
        };

        let balance = self.sync.apply(payout.winnings);
        if presenting {
            if let Err(e) = observer.on_landing(ball, &payout) {
                log::warn!("Ball {ball}: {e}");
            }
        }

        DropOutcome::Paid { payout, balance }
    }

    /// Give up on the drop without settling it
    pub fn abandon(self) -> DropOutcome {
        log::info!("Ball {} abandoned", self.ball);
        DropOutcome::Cancelled { rows_completed: 0 }
    }
}

/// Result of a whole wager
#[derive(Debug, Clone, PartialEq)]
pub struct WagerReport {
    pub wager: Wager,
    pub outcomes: Vec<DropOutcome>,
    pub balance: Decimal,
}

impl WagerReport {
    pub fn total_winnings(&self) -> Decimal {
        self.outcomes.iter().map(DropOutcome::winnings).sum()
    }
}

/// One player's session
pub struct Session {
    rows: u32,
    profile: RiskProfile,
    lattice: LatticeSpec,
    authority: DropAuthority,
    sync: Arc<Reconciler>,
    in_flight: Arc<AtomicUsize>,
    next_ball: u32,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("rows", &self.rows)
            .field("profile", &self.profile)
            .field("lattice", &self.lattice)
            .field("authority", &self.authority)
            .field("in_flight", &self.in_flight)
            .field("next_ball", &self.next_ball)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session and hydrate its ledger from the balance authority
    pub fn start(
        settings: &Settings,
        balances: Arc<dyn BalanceAuthority>,
        authority: DropAuthority,
    ) -> Result<Self, PlinkoError> {
        let profile = settings.risk.profile();
        let lattice = LatticeSpec::for_profile(settings.rows, &profile)?;
        let sync = Arc::new(Reconciler::new(Arc::new(Ledger::default()), balances));
        let balance = sync.hydrate();
        log::info!(
            "Session started: {} rows, {} risk, {:?} drops, balance {}",
            settings.rows,
            profile.level().as_str(),
            authority,
            balance.round_dp(2)
        );

        Ok(Self {
            rows: settings.rows,
            profile,
            lattice,
            authority,
            sync,
            in_flight: Arc::new(AtomicUsize::new(0)),
            next_ball: 1,
        })
    }

    /// Session with a local seeded walk
    pub fn start_local(settings: &Settings, balances: Arc<dyn BalanceAuthority>) -> Result<Self, PlinkoError> {
        let seed = settings.resolved_seed();
        log::info!("Drop seed: {seed}");
        Self::start(settings, balances, DropAuthority::seeded(seed))
    }

    pub fn balance(&self) -> Decimal {
        self.sync.ledger().balance()
    }

    pub fn profile(&self) -> RiskProfile {
        self.profile
    }

    pub fn lattice(&self) -> &LatticeSpec {
        &self.lattice
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.sync
    }

    /// Drops placed but not yet run or abandoned
    pub fn drops_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether the risk selector may be used right now
    pub fn can_select_risk(&self) -> bool {
        self.drops_in_flight() == 0
    }

    /// Swap the active risk profile between drops
    pub fn select_risk(&mut self, level: RiskLevel) -> Result<(), PlinkoError> {
        if !self.can_select_risk() {
            return Err(PlinkoError::DropInFlight);
        }
        let profile = level.profile();
        self.lattice = LatticeSpec::for_profile(self.rows, &profile)?;
        self.profile = profile;
        log::info!(
            "Risk level set to {}, multipliers updated: {:?}",
            level.as_str(),
            profile.multipliers()
        );
        Ok(())
    }

    /// Validate and debit a wager, drawing one pending drop per ball
    pub fn place_wager(&mut self, wager: Wager) -> Result<Vec<PendingDrop>, PlinkoError> {
        let ledger = self.sync.ledger().clone();
        if !ledger.validate(&wager) {
            log::warn!("Invalid bet amount or insufficient balance");
            return Err(PlinkoError::InvalidWager {
                amount: wager.amount,
                ball_count: wager.ball_count,
                balance: ledger.balance(),
            });
        }

        let mut drawn = Vec::with_capacity(wager.ball_count as usize);
        for _ in 0..wager.ball_count {
            drawn.push(self.authority.draw(&self.lattice, &self.profile)?);
        }

        let balance = self.sync.debit(&wager)?;
        log::info!(
            "Bet placed: {} x {}, balance {}",
            wager.ball_count,
            wager.amount.round_dp(2),
            balance.round_dp(2)
        );

        let drops = drawn
            .into_iter()
            .map(|(path, settlement)| {
                let ball = self.next_ball;
                self.next_ball += 1;
                PendingDrop {
                    ball,
                    amount: wager.amount,
                    path,
                    settlement,
                    sync: self.sync.clone(),
                    _in_flight: InFlightGuard::new(&self.in_flight),
                }
            })
            .collect();
        Ok(drops)
    }

    /// Place a wager and replay every ball in order
    pub fn play(
        &mut self,
        wager: Wager,
        observer: &mut dyn DropObserver,
        cancel: &CancelToken,
    ) -> Result<WagerReport, PlinkoError> {
        let drops = self.place_wager(wager)?;
        let outcomes = drops
            .into_iter()
            .map(|pending| pending.run(&mut *observer, cancel))
            .collect();
        Ok(WagerReport {
            wager,
            outcomes,
            balance: self.balance(),
        })
    }
}
