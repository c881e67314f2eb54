//! Sample-size reliability tiers. Rates computed over a handful of leads
//! are the main way this system can mislead, so every grouped or filtered
//! result carries its tier.

use serde::{Deserialize, Serialize};

/// Largest sample still considered too small to trust at all.
pub const CRITICAL_MAX: u64 = 10;
/// Largest sample still flagged for caution.
pub const CAUTION_MAX: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleTier {
    Critical,
    Caution,
    Reliable,
}

impl SampleTier {
    /// Anything below `Reliable` should be surfaced next to displayed rates.
    pub fn is_warning(&self) -> bool {
        !matches!(self, SampleTier::Reliable)
    }
}

/// Classify a lead count into a reliability tier.
pub fn classify_sample(n: u64) -> SampleTier {
    if n <= CRITICAL_MAX {
        SampleTier::Critical
    } else if n <= CAUTION_MAX {
        SampleTier::Caution
    } else {
        SampleTier::Reliable
    }
}
