//! Bounty lifecycle events
//!
//! Immutable records emitted by bounty operations, append-only per store.

use serde::{Deserialize, Serialize};
use types::amount::TokenAmount;
use types::ids::{AuditId, BountyId, CredentialId, Identity, IssueId, SubmissionId};

/// A bounty was opened with its reward locked in escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyOpened {
    pub bounty_id: BountyId,
    pub audit_id: AuditId,
    pub issue_id: IssueId,
    pub poster: Identity,
    pub reward: TokenAmount,
    pub deadline: i64,
}

/// A hunter submitted a solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSubmitted {
    pub bounty_id: BountyId,
    pub submission_id: SubmissionId,
    pub hunter: Identity,
    pub submitted_at: i64,
}

/// A bounty was resolved: the winner was paid and the fee collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyResolved {
    pub bounty_id: BountyId,
    pub winner: Identity,
    pub payout: TokenAmount,
    pub fee: TokenAmount,
    pub resolved_at: i64,
}

/// A bounty was closed and its reward refunded to the poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyClosed {
    pub bounty_id: BountyId,
    pub refund: TokenAmount,
    pub closed_at: i64,
}

/// A specific submission was rejected. The bounty status is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRejected {
    pub bounty_id: BountyId,
    pub submission_id: SubmissionId,
}

/// A non-transferable achievement credential was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialIssued {
    pub credential_id: CredentialId,
    pub recipient: Identity,
    pub bounty_id: BountyId,
    pub issued_at: i64,
}

/// Enum wrapper for all bounty events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BountyEvent {
    BountyOpened(BountyOpened),
    SolutionSubmitted(SolutionSubmitted),
    BountyResolved(BountyResolved),
    BountyClosed(BountyClosed),
    SubmissionRejected(SubmissionRejected),
    CredentialIssued(CredentialIssued),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounty_opened_serialization() {
        let event = BountyOpened {
            bounty_id: BountyId::new(),
            audit_id: AuditId::new(),
            issue_id: IssueId::new(),
            poster: Identity::new("poster"),
            reward: TokenAmount::new(1_000),
            deadline: 2_000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: BountyOpened = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_event_enum_variant() {
        let event = BountyEvent::BountyResolved(BountyResolved {
            bounty_id: BountyId::new(),
            winner: Identity::new("hunter"),
            payout: TokenAmount::new(990),
            fee: TokenAmount::new(10),
            resolved_at: 3_000,
        });
        assert!(matches!(event, BountyEvent::BountyResolved(_)));
    }
}
