//! Bounty book — escrowed bounty lifecycle
//!
//! Owns every bounty record and drives `Open → {Resolved | Closed}`.
//! Operations on one bounty serialize on its map entry; unrelated bounties
//! never block each other. Every mutating call takes the caller identity
//! and an explicit `now` — deadlines are lazy checks, not timers.

use dashmap::DashMap;
use std::sync::Mutex;
use tracing::info;
use types::bounty::{Bounty, BountyStatus, Decision, Submission};
use types::ids::{BountyId, ContentId, CredentialId, Identity, SubmissionId};

use crate::credential::CredentialLog;
use crate::errors::BountyError;
use crate::events::{
    BountyClosed, BountyEvent, BountyOpened, BountyResolved, SolutionSubmitted, SubmissionRejected,
};
use crate::vault::TokenVault;

/// Bounty store and lifecycle executor.
#[derive(Debug)]
pub struct BountyBook {
    bounties: DashMap<BountyId, Bounty>,
    /// Identity allowed to close bounties on behalf of posters
    admin: Identity,
    /// Emitted events (append-only)
    events: Mutex<Vec<BountyEvent>>,
}

impl BountyBook {
    pub fn new(admin: Identity) -> Self {
        Self {
            bounties: DashMap::new(),
            admin,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Record an opened bounty. The caller (the factory) has already locked
    /// the reward in escrow.
    pub fn open(&self, bounty: Bounty) -> BountyId {
        let bounty_id = bounty.id;
        self.push_event(BountyEvent::BountyOpened(BountyOpened {
            bounty_id,
            audit_id: bounty.audit_id,
            issue_id: bounty.issue_id,
            poster: bounty.poster.clone(),
            reward: bounty.reward,
            deadline: bounty.deadline,
        }));
        self.bounties.insert(bounty_id, bounty);
        bounty_id
    }

    /// Append a hunter's solution submission.
    pub fn submit_solution(
        &self,
        bounty_id: BountyId,
        hunter: Identity,
        solution_ref: ContentId,
        now: i64,
    ) -> Result<SubmissionId, BountyError> {
        let mut bounty = self.get_mut(bounty_id)?;

        if !bounty.is_open() {
            return Err(BountyError::BountyNotOpen {
                status: format!("{:?}", bounty.status),
            });
        }
        if bounty.pending_submission_of(&hunter).is_some() {
            return Err(BountyError::DuplicateSubmission);
        }
        if bounty.is_past_deadline(now) {
            return Err(BountyError::PastDeadline {
                deadline: bounty.deadline,
            });
        }

        let submission = Submission::new(bounty_id, hunter.clone(), solution_ref, now);
        let submission_id = submission.id;
        bounty.submissions.push(submission);
        drop(bounty);

        self.push_event(BountyEvent::SolutionSubmitted(SolutionSubmitted {
            bounty_id,
            submission_id,
            hunter,
            submitted_at: now,
        }));
        Ok(submission_id)
    }

    /// Resolve a bounty in favor of `winner`.
    ///
    /// Poster-only. The winner must hold a pending submission. Pays
    /// `reward - fee` to the winner and the floor-divided fee to the
    /// platform recipient, approves the winning submission, leaves every
    /// other pending submission pending, and issues an achievement
    /// credential.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &self,
        bounty_id: BountyId,
        caller: &Identity,
        winner: &Identity,
        evidence_ref: ContentId,
        fee_bps: u32,
        fee_recipient: &Identity,
        quality_score: u8,
        vault: &TokenVault,
        credentials: &CredentialLog,
        now: i64,
    ) -> Result<CredentialId, BountyError> {
        let mut bounty = self.get_mut(bounty_id)?;

        if bounty.poster != *caller {
            return Err(BountyError::NotPoster);
        }
        if !bounty.is_open() {
            return Err(BountyError::BountyNotOpen {
                status: format!("{:?}", bounty.status),
            });
        }
        if bounty.pending_submission_of(winner).is_none() {
            return Err(BountyError::InvalidWinner);
        }

        // Money first: a settlement failure leaves the bounty untouched
        let token = bounty.token.clone();
        let (payout, fee) = vault.settle_escrow(
            &bounty.poster,
            &token,
            bounty.reward,
            winner,
            fee_recipient,
            fee_bps,
        )?;

        if let Some(submission) = bounty
            .submissions
            .iter_mut()
            .find(|s| s.hunter == *winner && s.decision == Decision::Pending)
        {
            submission.decision = Decision::Approved;
        }
        bounty.winner = Some(winner.clone());
        bounty.status = BountyStatus::Resolved;
        let audit_id = bounty.audit_id;
        drop(bounty);

        let credential_id = credentials.issue(
            winner.clone(),
            audit_id,
            bounty_id,
            quality_score,
            evidence_ref,
            now,
        );

        self.push_event(BountyEvent::BountyResolved(BountyResolved {
            bounty_id,
            winner: winner.clone(),
            payout,
            fee,
            resolved_at: now,
        }));
        self.push_event(BountyEvent::CredentialIssued(
            crate::events::CredentialIssued {
                credential_id,
                recipient: winner.clone(),
                bounty_id,
                issued_at: now,
            },
        ));

        info!(%bounty_id, %winner, %payout, %fee, "bounty resolved");
        Ok(credential_id)
    }

    /// Close an open bounty, refunding the full reward to the poster.
    ///
    /// Allowed for the poster or the designated admin.
    pub fn close(
        &self,
        bounty_id: BountyId,
        caller: &Identity,
        vault: &TokenVault,
        now: i64,
    ) -> Result<(), BountyError> {
        let mut bounty = self.get_mut(bounty_id)?;

        if bounty.poster != *caller && self.admin != *caller {
            return Err(BountyError::NotPoster);
        }
        if !bounty.is_open() {
            return Err(BountyError::AlreadyTerminal {
                status: format!("{:?}", bounty.status),
            });
        }

        vault.release_escrow(&bounty.poster, &bounty.token, bounty.reward)?;
        bounty.status = BountyStatus::Closed;
        let refund = bounty.reward;
        drop(bounty);

        self.push_event(BountyEvent::BountyClosed(BountyClosed {
            bounty_id,
            refund,
            closed_at: now,
        }));

        info!(%bounty_id, %refund, "bounty closed");
        Ok(())
    }

    /// Reject one submission. Poster-only; the bounty status is unchanged,
    /// so an open bounty keeps accepting other hunters' work, and pending
    /// submissions left over after a resolution can be cleared explicitly.
    pub fn reject(
        &self,
        bounty_id: BountyId,
        caller: &Identity,
        submission_id: SubmissionId,
    ) -> Result<(), BountyError> {
        let mut bounty = self.get_mut(bounty_id)?;

        if bounty.poster != *caller {
            return Err(BountyError::NotPoster);
        }

        let submission = bounty
            .submission_mut(submission_id)
            .ok_or(BountyError::SubmissionNotFound {
                submission_id: submission_id.to_string(),
            })?;

        if submission.decision != Decision::Pending {
            return Err(BountyError::SubmissionAlreadyDecided {
                decision: format!("{:?}", submission.decision),
            });
        }

        submission.decision = Decision::Rejected;
        drop(bounty);

        self.push_event(BountyEvent::SubmissionRejected(SubmissionRejected {
            bounty_id,
            submission_id,
        }));
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Snapshot of one bounty.
    pub fn get(&self, bounty_id: BountyId) -> Option<Bounty> {
        self.bounties.get(&bounty_id).map(|b| b.clone())
    }

    /// All bounties, optionally filtered by status, in creation order
    /// (UUID v7 ids sort chronologically).
    pub fn list(&self, status: Option<BountyStatus>) -> Vec<Bounty> {
        let mut bounties: Vec<Bounty> = self
            .bounties
            .iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .map(|b| b.clone())
            .collect();
        bounties.sort_by_key(|b| b.id);
        bounties
    }

    /// Submissions on one bounty.
    pub fn submissions(&self, bounty_id: BountyId) -> Result<Vec<Submission>, BountyError> {
        self.bounties
            .get(&bounty_id)
            .map(|b| b.submissions.clone())
            .ok_or(BountyError::NotFound {
                bounty_id: bounty_id.to_string(),
            })
    }

    /// All emitted events.
    pub fn events(&self) -> Vec<BountyEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain emitted events (consume and clear).
    pub fn drain_events(&self) -> Vec<BountyEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    fn get_mut(
        &self,
        bounty_id: BountyId,
    ) -> Result<dashmap::mapref::one::RefMut<'_, BountyId, Bounty>, BountyError> {
        self.bounties
            .get_mut(&bounty_id)
            .ok_or(BountyError::NotFound {
                bounty_id: bounty_id.to_string(),
            })
    }

    fn push_event(&self, event: BountyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::amount::TokenAmount;
    use types::ids::{AuditId, IssueId};

    const TOKEN: &str = "AUDIT";

    fn poster() -> Identity {
        Identity::new("poster")
    }

    fn admin() -> Identity {
        Identity::new("admin")
    }

    fn platform() -> Identity {
        Identity::new("platform")
    }

    /// Vault with the poster funded and the reward already escrowed,
    /// plus a book holding one open bounty.
    fn setup(reward: u128, deadline: i64) -> (BountyBook, TokenVault, BountyId) {
        let vault = TokenVault::new();
        vault
            .credit(&poster(), TOKEN, TokenAmount::new(reward))
            .unwrap();
        vault.approve(&poster(), &platform(), TokenAmount::new(reward));
        vault
            .lock_escrow(&poster(), &platform(), TOKEN, TokenAmount::new(reward))
            .unwrap();

        let book = BountyBook::new(admin());
        let bounty = Bounty::new(
            AuditId::new(),
            IssueId::new(),
            poster(),
            TokenAmount::new(reward),
            TOKEN,
            deadline,
            1_000,
        );
        let bounty_id = book.open(bounty);
        (book, vault, bounty_id)
    }

    fn submit(book: &BountyBook, bounty_id: BountyId, hunter: &str, now: i64) -> SubmissionId {
        book.submit_solution(
            bounty_id,
            Identity::new(hunter),
            ContentId::from_bytes(hunter.as_bytes()),
            now,
        )
        .unwrap()
    }

    // ─── Submission tests ───

    #[test]
    fn test_submit_solution_appends_pending() {
        let (book, _vault, bounty_id) = setup(1_000, 10_000);
        let submission_id = submit(&book, bounty_id, "hunter_a", 2_000);

        let submissions = book.submissions(bounty_id).unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].id, submission_id);
        assert_eq!(submissions[0].decision, Decision::Pending);
    }

    #[test]
    fn test_submit_unknown_bounty() {
        let book = BountyBook::new(admin());
        let result = book.submit_solution(
            BountyId::new(),
            Identity::new("hunter"),
            ContentId::from_bytes(b"fix"),
            2_000,
        );
        assert!(matches!(result, Err(BountyError::NotFound { .. })));
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let (book, _vault, bounty_id) = setup(1_000, 10_000);
        submit(&book, bounty_id, "hunter_a", 2_000);

        let result = book.submit_solution(
            bounty_id,
            Identity::new("hunter_a"),
            ContentId::from_bytes(b"second"),
            2_500,
        );
        assert_eq!(result.unwrap_err(), BountyError::DuplicateSubmission);
        assert_eq!(book.submissions(bounty_id).unwrap().len(), 1);
    }

    #[test]
    fn test_resubmit_after_rejection_allowed() {
        let (book, _vault, bounty_id) = setup(1_000, 10_000);
        let first = submit(&book, bounty_id, "hunter_a", 2_000);
        book.reject(bounty_id, &poster(), first).unwrap();

        // The rejected submission is no longer pending, so a fresh one lands
        submit(&book, bounty_id, "hunter_a", 3_000);
        assert_eq!(book.submissions(bounty_id).unwrap().len(), 2);
    }

    #[test]
    fn test_submit_past_deadline() {
        let (book, _vault, bounty_id) = setup(1_000, 5_000);
        let result = book.submit_solution(
            bounty_id,
            Identity::new("hunter"),
            ContentId::from_bytes(b"fix"),
            5_001,
        );
        assert_eq!(
            result.unwrap_err(),
            BountyError::PastDeadline { deadline: 5_000 }
        );
    }

    #[test]
    fn test_submit_at_deadline_allowed() {
        let (book, _vault, bounty_id) = setup(1_000, 5_000);
        // Lazy expiry: now == deadline is still open
        submit(&book, bounty_id, "hunter", 5_000);
    }

    // ─── Resolution tests ───

    #[test]
    fn test_resolve_pays_winner_and_fee() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);

        book.resolve(
            bounty_id,
            &poster(),
            &Identity::new("hunter_a"),
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            69,
            &vault,
            &credentials,
            3_000,
        )
        .unwrap();

        // reward 1000 at 100 bps: fee 10, payout 990, escrow drained
        assert_eq!(
            vault.balance(&Identity::new("hunter_a"), TOKEN).available,
            TokenAmount::new(990)
        );
        assert_eq!(
            vault.balance(&platform(), TOKEN).available,
            TokenAmount::new(10)
        );
        assert_eq!(vault.balance(&poster(), TOKEN).locked, TokenAmount::ZERO);

        let bounty = book.get(bounty_id).unwrap();
        assert_eq!(bounty.status, BountyStatus::Resolved);
        assert_eq!(bounty.winner, Some(Identity::new("hunter_a")));
    }

    #[test]
    fn test_resolve_approves_winner_leaves_others_pending() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);
        submit(&book, bounty_id, "hunter_b", 2_100);

        book.resolve(
            bounty_id,
            &poster(),
            &Identity::new("hunter_a"),
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            69,
            &vault,
            &credentials,
            3_000,
        )
        .unwrap();

        let submissions = book.submissions(bounty_id).unwrap();
        let a = submissions.iter().find(|s| s.hunter.as_str() == "hunter_a").unwrap();
        let b = submissions.iter().find(|s| s.hunter.as_str() == "hunter_b").unwrap();
        assert_eq!(a.decision, Decision::Approved);
        assert_eq!(b.decision, Decision::Pending, "losers stay pending");

        // The leftover pending submission can still be rejected explicitly
        book.reject(bounty_id, &poster(), b.id).unwrap();
        let submissions = book.submissions(bounty_id).unwrap();
        let b = submissions.iter().find(|s| s.hunter.as_str() == "hunter_b").unwrap();
        assert_eq!(b.decision, Decision::Rejected);
    }

    #[test]
    fn test_resolve_issues_credential() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);

        let credential_id = book
            .resolve(
                bounty_id,
                &poster(),
                &Identity::new("hunter_a"),
                ContentId::from_bytes(b"evidence"),
                100,
                &platform(),
                69,
                &vault,
                &credentials,
                3_000,
            )
            .unwrap();

        let credential = credentials.get(credential_id).unwrap();
        assert_eq!(credential.recipient, Identity::new("hunter_a"));
        assert_eq!(credential.bounty_id, bounty_id);
        assert_eq!(credential.quality_score, 69);
    }

    #[test]
    fn test_resolve_requires_poster() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);

        let result = book.resolve(
            bounty_id,
            &Identity::new("eve"),
            &Identity::new("hunter_a"),
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            69,
            &vault,
            &credentials,
            3_000,
        );
        assert_eq!(result.unwrap_err(), BountyError::NotPoster);
    }

    #[test]
    fn test_resolve_requires_pending_submission() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);

        let result = book.resolve(
            bounty_id,
            &poster(),
            &Identity::new("hunter_never_submitted"),
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            69,
            &vault,
            &credentials,
            3_000,
        );
        assert_eq!(result.unwrap_err(), BountyError::InvalidWinner);

        // Bounty untouched by the rejected call
        assert!(book.get(bounty_id).unwrap().is_open());
    }

    #[test]
    fn test_resolve_twice_rejected() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);
        submit(&book, bounty_id, "hunter_b", 2_100);

        let resolve = |winner: &str, at: i64| {
            book.resolve(
                bounty_id,
                &poster(),
                &Identity::new(winner),
                ContentId::from_bytes(b"evidence"),
                100,
                &platform(),
                69,
                &vault,
                &credentials,
                at,
            )
        };
        resolve("hunter_a", 3_000).unwrap();
        let second = resolve("hunter_b", 3_100);
        assert!(matches!(second, Err(BountyError::BountyNotOpen { .. })));
    }

    // ─── Close tests ───

    #[test]
    fn test_close_refunds_poster() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        book.close(bounty_id, &poster(), &vault, 4_000).unwrap();

        let balance = vault.balance(&poster(), TOKEN);
        assert_eq!(balance.available, TokenAmount::new(1_000));
        assert_eq!(balance.locked, TokenAmount::ZERO);
        assert_eq!(book.get(bounty_id).unwrap().status, BountyStatus::Closed);
    }

    #[test]
    fn test_close_by_admin_allowed() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        book.close(bounty_id, &admin(), &vault, 4_000).unwrap();
        assert_eq!(book.get(bounty_id).unwrap().status, BountyStatus::Closed);
    }

    #[test]
    fn test_close_by_stranger_rejected() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let result = book.close(bounty_id, &Identity::new("eve"), &vault, 4_000);
        assert_eq!(result.unwrap_err(), BountyError::NotPoster);
    }

    #[test]
    fn test_close_terminal_rejected() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        book.close(bounty_id, &poster(), &vault, 4_000).unwrap();
        let again = book.close(bounty_id, &poster(), &vault, 4_100);
        assert!(matches!(again, Err(BountyError::AlreadyTerminal { .. })));
    }

    #[test]
    fn test_submit_on_closed_bounty() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        book.close(bounty_id, &poster(), &vault, 4_000).unwrap();

        let result = book.submit_solution(
            bounty_id,
            Identity::new("hunter"),
            ContentId::from_bytes(b"late"),
            4_500,
        );
        assert!(matches!(result, Err(BountyError::BountyNotOpen { .. })));
    }

    // ─── Reject tests ───

    #[test]
    fn test_reject_keeps_bounty_open() {
        let (book, _vault, bounty_id) = setup(1_000, 10_000);
        let submission_id = submit(&book, bounty_id, "hunter_a", 2_000);

        book.reject(bounty_id, &poster(), submission_id).unwrap();
        assert!(book.get(bounty_id).unwrap().is_open());
    }

    #[test]
    fn test_reject_decided_submission() {
        let (book, _vault, bounty_id) = setup(1_000, 10_000);
        let submission_id = submit(&book, bounty_id, "hunter_a", 2_000);
        book.reject(bounty_id, &poster(), submission_id).unwrap();

        let again = book.reject(bounty_id, &poster(), submission_id);
        assert!(matches!(
            again,
            Err(BountyError::SubmissionAlreadyDecided { .. })
        ));
    }

    // ─── Query tests ───

    #[test]
    fn test_list_filters_by_status() {
        let (book, vault, open_id) = setup(1_000, 10_000);

        // Open a second bounty on the same escrow pool and close it
        vault.credit(&poster(), TOKEN, TokenAmount::new(500)).unwrap();
        vault.approve(&poster(), &platform(), TokenAmount::new(500));
        vault
            .lock_escrow(&poster(), &platform(), TOKEN, TokenAmount::new(500))
            .unwrap();
        let closed_id = book.open(Bounty::new(
            AuditId::new(),
            IssueId::new(),
            poster(),
            TokenAmount::new(500),
            TOKEN,
            10_000,
            1_100,
        ));
        book.close(closed_id, &poster(), &vault, 2_000).unwrap();

        assert_eq!(book.list(None).len(), 2);
        let open = book.list(Some(BountyStatus::Open));
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, open_id);
        assert_eq!(book.list(Some(BountyStatus::Closed)).len(), 1);
    }

    #[test]
    fn test_events_follow_lifecycle() {
        let (book, vault, bounty_id) = setup(1_000, 10_000);
        let credentials = CredentialLog::new();
        submit(&book, bounty_id, "hunter_a", 2_000);
        book.resolve(
            bounty_id,
            &poster(),
            &Identity::new("hunter_a"),
            ContentId::from_bytes(b"evidence"),
            100,
            &platform(),
            69,
            &vault,
            &credentials,
            3_000,
        )
        .unwrap();

        let events = book.events();
        assert!(matches!(events[0], BountyEvent::BountyOpened(_)));
        assert!(matches!(events[1], BountyEvent::SolutionSubmitted(_)));
        assert!(matches!(events[2], BountyEvent::BountyResolved(_)));
        assert!(matches!(events[3], BountyEvent::CredentialIssued(_)));
    }
}
