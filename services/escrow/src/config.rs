//! Engine configuration
//!
//! An explicit immutable snapshot passed into components at construction.
//! The only sanctioned mutation path is the coordinator's audited
//! `update_config`, which validates and swaps the whole snapshot.

use serde::{Deserialize, Serialize};
use types::amount::TokenAmount;
use types::ids::Identity;

/// Configuration for the bounty factory and escrow lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Whether high-risk audit completions spawn bounties automatically
    pub auto_bounty_enabled: bool,
    /// Minimum final score that marks an audit high-risk
    pub high_risk_threshold: u8,
    /// Reward per issue when no override is supplied
    pub default_reward: TokenAmount,
    /// Cap on bounties minted per audit
    pub max_bounties_per_audit: usize,
    /// Bounty lifetime in seconds
    pub default_duration_secs: i64,
    /// Platform fee taken on resolution, in basis points of the reward
    pub platform_fee_bps: u32,
    /// Identity receiving the platform fee; also acts as the escrow spender
    pub platform_recipient: Identity,
    /// Token in which rewards are denominated
    pub reward_token: String,
    /// Identity allowed to update configuration and force-close bounties
    pub admin: Identity,
}

impl EscrowConfig {
    /// Validate value ranges. Called on construction and on every update.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_risk_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.high_risk_threshold,
            });
        }
        if self.platform_fee_bps > 10_000 {
            return Err(ConfigError::FeeOutOfRange {
                bps: self.platform_fee_bps,
            });
        }
        if self.default_duration_secs <= 0 {
            return Err(ConfigError::NonPositiveDuration {
                secs: self.default_duration_secs,
            });
        }
        if self.max_bounties_per_audit == 0 {
            return Err(ConfigError::ZeroBountyCap);
        }
        Ok(())
    }
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            auto_bounty_enabled: true,
            high_risk_threshold: 60,
            default_reward: TokenAmount::new(1_000),
            max_bounties_per_audit: 10,
            default_duration_secs: 7 * 24 * 3600,
            platform_fee_bps: 100,
            platform_recipient: Identity::new("platform"),
            reward_token: "AUDIT".to_string(),
            admin: Identity::new("admin"),
        }
    }
}

/// Configuration validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("High-risk threshold {threshold} is outside 0..=100")]
    ThresholdOutOfRange { threshold: u8 },

    #[error("Platform fee {bps} exceeds 10000 basis points")]
    FeeOutOfRange { bps: u32 },

    #[error("Bounty duration must be positive, got {secs}")]
    NonPositiveDuration { secs: i64 },

    #[error("Bounty cap per audit must be at least 1")]
    ZeroBountyCap,
}
