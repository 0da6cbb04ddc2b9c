//! Risk tier classification
//!
//! The tier is derived from the final score and the high-severity issue
//! count. It is recomputed on demand and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative risk classification of an audited artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Classify from the final score (0..=100) and the number of
    /// high-severity issues.
    ///
    /// The bands are checked in order: a clean high score is `Low`, a strong
    /// score with at most one high finding is `Medium`, a passable score or
    /// a contained finding count is `High`, everything else is `Critical`.
    pub fn classify(score: u8, high_count: usize) -> RiskTier {
        if score >= 90 && high_count == 0 {
            RiskTier::Low
        } else if score >= 75 && high_count <= 1 {
            RiskTier::Medium
        } else if score >= 50 || high_count <= 3 {
            RiskTier::High
        } else {
            RiskTier::Critical
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Medium => write!(f, "MEDIUM"),
            RiskTier::High => write!(f, "HIGH"),
            RiskTier::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_requires_clean_high_score() {
        assert_eq!(RiskTier::classify(95, 0), RiskTier::Low);
        assert_eq!(RiskTier::classify(90, 0), RiskTier::Low);
        // Same score with one high finding drops a band
        assert_eq!(RiskTier::classify(95, 1), RiskTier::Medium);
    }

    #[test]
    fn test_medium_band() {
        assert_eq!(RiskTier::classify(80, 1), RiskTier::Medium);
        assert_eq!(RiskTier::classify(75, 0), RiskTier::Medium);
        assert_eq!(RiskTier::classify(75, 2), RiskTier::High);
    }

    #[test]
    fn test_high_band() {
        // Score below 75 is HIGH even with zero findings
        assert_eq!(RiskTier::classify(69, 0), RiskTier::High);
        assert_eq!(RiskTier::classify(50, 10), RiskTier::High);
        // Low score but contained finding count stays HIGH
        assert_eq!(RiskTier::classify(10, 3), RiskTier::High);
    }

    #[test]
    fn test_critical_band() {
        assert_eq!(RiskTier::classify(49, 4), RiskTier::Critical);
        assert_eq!(RiskTier::classify(0, 20), RiskTier::Critical);
    }
}
