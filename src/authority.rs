//! Where drop paths come from
//!
//! A session picks one locus when it is built and keeps it: either a local
//! random walk settled through the payout resolver, or a remote authority
//! that serves the path together with its multiplier.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use rust_decimal::Decimal;

use crate::error::PlinkoError;
use crate::sim::{Coin, DropPath, LatticeSpec, RiskProfile, generate_path};
use crate::sync::DropClient;

/// How a drawn path is settled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settlement {
    /// Look the terminal slot up in this profile snapshot
    Resolve(RiskProfile),
    /// Pay the multiplier the authority served
    Served { multiplier: Decimal },
}

/// Source of drop paths for a session
pub enum DropAuthority {
    Local(Box<dyn Coin + Send>),
    Remote {
        client: Arc<dyn DropClient>,
        start_slot: usize,
    },
}

impl std::fmt::Debug for DropAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropAuthority::Local(_) => f.write_str("Local"),
            DropAuthority::Remote { start_slot, .. } => {
                write!(f, "Remote {{ start_slot: {start_slot} }}")
            }
        }
    }
}

impl DropAuthority {
    /// Local walk driven by a seeded PCG
    pub fn seeded(seed: u64) -> Self {
        DropAuthority::Local(Box::new(Pcg32::seed_from_u64(seed)))
    }

    /// Local walk driven by any coin (e.g. a scripted replay)
    pub fn with_coin<C: Coin + Send + 'static>(coin: C) -> Self {
        DropAuthority::Local(Box::new(coin))
    }

    pub fn remote(client: Arc<dyn DropClient>, start_slot: usize) -> Self {
        DropAuthority::Remote { client, start_slot }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, DropAuthority::Local(_))
    }

    /// Draw one path and how it must be settled
    pub fn draw(
        &mut self,
        lattice: &LatticeSpec,
        profile: &RiskProfile,
    ) -> Result<(DropPath, Settlement), PlinkoError> {
        match self {
            DropAuthority::Local(coin) => {
                let path = generate_path(lattice, coin.as_mut());
                Ok((path, Settlement::Resolve(*profile)))
            }
            DropAuthority::Remote { client, start_slot } => {
                let response = client.request_drop(*start_slot)?;
                let path = response.to_path()?;
                let multiplier = response.payout_multiplier()?;
                log::debug!(
                    "Served drop from slot {start_slot}: slot {} at {multiplier}x",
                    path.slot_index()
                );
                Ok((path, Settlement::Served { multiplier }))
            }
        }
    }
}
