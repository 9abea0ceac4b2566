//! Session settings
//!
//! Loaded from a JSON file; a missing or unreadable file falls back to
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PlinkoError;
use crate::sim::{LatticeSpec, RiskLevel};

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows of pegs a drop falls through
    pub rows: u32,
    /// Risk profile selected at session start
    pub risk: RiskLevel,
    /// Walk seed; a random one is drawn when absent
    pub seed: Option<u64>,
    /// Start column requested from a remote drop authority
    pub start_slot: usize,
    /// Remote authority base URL (informational for the demo binary)
    pub authority_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            risk: RiskLevel::Low,
            seed: None,
            start_slot: DEFAULT_START_SLOT,
            authority_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, PlinkoError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PlinkoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lattice for these settings under the selected risk table
    pub fn lattice(&self) -> Result<LatticeSpec, PlinkoError> {
        LatticeSpec::for_profile(self.rows, &self.risk.profile())
    }

    /// Seed to use for the walk
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring settings in {}: {e}", path.display()),
            },
            Err(e) => log::info!("No settings at {} ({e})", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PlinkoError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
