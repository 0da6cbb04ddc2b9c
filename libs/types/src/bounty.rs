//! Bounty and submission records
//!
//! A bounty escrows a reward for fixing one identified issue. Submissions are
//! owned by their bounty and hold a back-reference only.

use crate::amount::TokenAmount;
use crate::ids::{AuditId, BountyId, ContentId, Identity, IssueId, SubmissionId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a bounty. `Resolved` and `Closed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BountyStatus {
    Open,
    Resolved,
    Closed,
}

impl BountyStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BountyStatus::Open)
    }
}

/// Review decision on a submission.
///
/// Resolution approves exactly one submission; the rest stay `Pending` until
/// the poster rejects them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

/// A hunter's solution submission on a bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub bounty_id: BountyId,
    pub hunter: Identity,
    pub solution_ref: ContentId,
    pub submitted_at: i64,
    pub decision: Decision,
}

impl Submission {
    pub fn new(
        bounty_id: BountyId,
        hunter: Identity,
        solution_ref: ContentId,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            bounty_id,
            hunter,
            solution_ref,
            submitted_at,
            decision: Decision::Pending,
        }
    }
}

/// An escrowed reward for fixing one identified issue.
///
/// The reward is held in escrow for the whole `Open` period; resolution pays
/// it out (minus the platform fee) and closure refunds it to the poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    pub id: BountyId,
    pub audit_id: AuditId,
    pub issue_id: IssueId,
    pub poster: Identity,
    pub reward: TokenAmount,
    pub token: String,
    pub deadline: i64,
    pub status: BountyStatus,
    pub winner: Option<Identity>,
    pub submissions: Vec<Submission>,
    pub created_at: i64,
}

impl Bounty {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        audit_id: AuditId,
        issue_id: IssueId,
        poster: Identity,
        reward: TokenAmount,
        token: impl Into<String>,
        deadline: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: BountyId::new(),
            audit_id,
            issue_id,
            poster,
            reward,
            token: token.into(),
            deadline,
            status: BountyStatus::Open,
            winner: None,
            submissions: Vec::new(),
            created_at,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, BountyStatus::Open)
    }

    /// Whether the deadline has passed at `now`. Expiry is evaluated lazily
    /// at each call — there is no background timer.
    pub fn is_past_deadline(&self, now: i64) -> bool {
        now > self.deadline
    }

    /// The hunter's pending submission, if any.
    pub fn pending_submission_of(&self, hunter: &Identity) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|s| s.hunter == *hunter && s.decision == Decision::Pending)
    }

    pub fn submission_mut(&mut self, submission_id: SubmissionId) -> Option<&mut Submission> {
        self.submissions.iter_mut().find(|s| s.id == submission_id)
    }
}
