//! Bounty factory — risk-triggered batch creation
//!
//! Invoked after an audit completes. When the score crosses the high-risk
//! threshold, one bounty is minted per reported issue (up to the configured
//! cap). The whole batch is funded through a single escrow lock, so either
//! every bounty is created with the full sum locked, or none is.

use std::collections::HashMap;
use tracing::{info, warn};
use types::amount::TokenAmount;
use types::bounty::Bounty;
use types::ids::{AuditId, BountyId, Identity, IssueId};

use crate::book::BountyBook;
use crate::config::EscrowConfig;
use crate::errors::FactoryError;
use crate::vault::TokenVault;

/// Whether a completed audit should spawn bounties.
pub fn should_trigger(config: &EscrowConfig, score: u8, issue_count: usize) -> bool {
    config.auto_bounty_enabled && score >= config.high_risk_threshold && issue_count > 0
}

/// Create one bounty per issue, all-or-nothing.
///
/// Rewards come from `overrides` where present, otherwise the configured
/// default. The batch sum is locked in escrow before any bounty exists; a
/// shortfall fails the whole batch with zero bounties created.
pub fn create_for_audit(
    config: &EscrowConfig,
    audit_id: AuditId,
    poster: &Identity,
    issue_ids: &[IssueId],
    overrides: &HashMap<IssueId, TokenAmount>,
    vault: &TokenVault,
    book: &BountyBook,
    now: i64,
) -> Result<Vec<BountyId>, FactoryError> {
    let capped = &issue_ids[..issue_ids.len().min(config.max_bounties_per_audit)];
    if capped.len() < issue_ids.len() {
        warn!(
            %audit_id,
            dropped = issue_ids.len() - capped.len(),
            cap = config.max_bounties_per_audit,
            "issue count exceeds bounty cap, excess issues get no bounty"
        );
    }

    let rewards: Vec<TokenAmount> = capped
        .iter()
        .map(|id| overrides.get(id).copied().unwrap_or(config.default_reward))
        .collect();
    let total =
        TokenAmount::checked_sum(rewards.iter().copied()).ok_or(FactoryError::RewardOverflow)?;

    // One atomic lock funds the whole batch; bounty inserts cannot fail
    vault.lock_escrow(
        poster,
        &config.platform_recipient,
        &config.reward_token,
        total,
    )?;

    let deadline = now + config.default_duration_secs;
    let bounty_ids: Vec<BountyId> = capped
        .iter()
        .zip(rewards)
        .map(|(&issue_id, reward)| {
            book.open(Bounty::new(
                audit_id,
                issue_id,
                poster.clone(),
                reward,
                config.reward_token.clone(),
                deadline,
                now,
            ))
        })
        .collect();

    info!(
        %audit_id,
        count = bounty_ids.len(),
        %total,
        "bounty batch created"
    );
    Ok(bounty_ids)
}
