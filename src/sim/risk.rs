//! Risk profiles: named payout tables
//!
//! Every table is odd-length and symmetric around the center slot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlinkoError;

// Multipliers in tenths
const LOW_TENTHS: [i64; 11] = [1000, 500, 100, 10, 8, 5, 8, 10, 100, 500, 1000];
const MEDIUM_TENTHS: [i64; 11] = [2000, 1500, 250, 10, 5, 3, 5, 10, 250, 1500, 2000];
const HIGH_TENTHS: [i64; 11] = [10000, 2000, 100, 5, 3, 1, 3, 5, 100, 2000, 10000];

/// Risk level tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" | "med" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    /// Parse a tag, failing with `UnknownRiskLevel`
    pub fn parse(s: &str) -> Result<Self, PlinkoError> {
        Self::from_str(s).ok_or_else(|| PlinkoError::UnknownRiskLevel(s.to_string()))
    }

    /// The built-in profile for this level
    pub fn profile(self) -> RiskProfile {
        let tenths: &'static [i64] = match self {
            RiskLevel::Low => &LOW_TENTHS,
            RiskLevel::Medium => &MEDIUM_TENTHS,
            RiskLevel::High => &HIGH_TENTHS,
        };
        RiskProfile {
            level: self,
            tenths,
        }
    }
}

/// An immutable payout table.
///
/// Profiles are `Copy`; switching risk replaces the whole value, so a drop
/// holding a snapshot is never affected by a later selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    level: RiskLevel,
    tenths: &'static [i64],
}

impl RiskProfile {
    pub fn level(&self) -> RiskLevel {
        self.level
    }

    pub fn multipliers(&self) -> Vec<Decimal> {
        self.tenths.iter().map(|&t| tenths_to_decimal(t)).collect()
    }

    /// Number of slots this table pays out on
    pub fn slot_count(&self) -> usize {
        self.tenths.len()
    }

    /// Multiplier for a slot, if the slot exists
    pub fn multiplier(&self, slot: usize) -> Option<Decimal> {
        self.tenths.get(slot).map(|&t| tenths_to_decimal(t))
    }

    /// Odd length and mirrored around the middle slot
    pub fn is_symmetric(&self) -> bool {
        let m = self.tenths;
        m.len() % 2 == 1 && m.iter().eq(m.iter().rev())
    }

    /// Display-only labels derived from the multipliers ("100x", "0.8x")
    pub fn display_labels(&self) -> Vec<String> {
        self.multipliers().iter().map(|m| format!("{m}x")).collect()
    }
}

fn tenths_to_decimal(tenths: i64) -> Decimal {
    Decimal::new(tenths, 1).normalize()
}

impl Default for RiskProfile {
    fn default() -> Self {
        RiskLevel::default().profile()
    }
}
