//! Commit-reveal protocol store
//!
//! Binds a hunter to a hidden solution before disclosure: the hunter first
//! commits `SHA-256(value || nonce)`, then reveals the value and nonce within
//! the reveal window. The raw solution is never visible before the reveal,
//! and the commitment cryptographically pins the hunter to one solution.
//!
//! Expiry is lazy: a commitment past its window is only treated as expired
//! when it is next read or acted upon. There are no background timers.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use types::ids::{BountyId, Identity};

use crate::errors::CommitRevealError;

/// Derived state of a `(hunter, bounty)` commitment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommitmentStatus {
    /// No commitment recorded
    NoCommit,
    /// Committed and still within the reveal window
    Committed,
    /// Revealed — terminal
    Revealed,
    /// Window passed without a reveal — terminal
    Expired,
}

/// A recorded commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub hunter: Identity,
    pub bounty_id: BountyId,
    pub commit_hash: [u8; 32],
    pub committed_at: i64,
    pub revealed: bool,
    pub revealed_value: Option<String>,
}

impl Commitment {
    fn is_expired(&self, reveal_window_secs: i64, now: i64) -> bool {
        !self.revealed && now > self.committed_at + reveal_window_secs
    }
}

/// Compute the commitment digest for a solution value and nonce.
///
/// Hunters and verifiers must derive the hash identically, so this is the
/// single place the binding is defined: `SHA-256(value || nonce)`.
pub fn commitment_digest(value: &str, nonce: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.finalize().into()
}

/// Commit-reveal store keyed by `(hunter, bounty)`.
///
/// Operations on the same pair serialize on the map entry; unrelated pairs
/// never contend. The reveal window is fixed at construction and immutable
/// afterwards.
#[derive(Debug)]
pub struct CommitReveal {
    commitments: DashMap<(Identity, BountyId), Commitment>,
    reveal_window_secs: i64,
}

impl CommitReveal {
    /// Create a protocol instance with the given reveal window in seconds.
    pub fn new(reveal_window_secs: i64) -> Self {
        Self {
            commitments: DashMap::new(),
            reveal_window_secs,
        }
    }

    /// The configured reveal window in seconds.
    pub fn reveal_window_secs(&self) -> i64 {
        self.reveal_window_secs
    }

    /// Record a commitment for `(hunter, bounty)`.
    ///
    /// Fails with `AlreadyCommitted` while a live (unrevealed, unexpired)
    /// commitment exists, and also once a pair has revealed — a revealed
    /// slot is terminal. An expired commitment may be replaced.
    pub fn commit(
        &self,
        hunter: Identity,
        bounty_id: BountyId,
        commit_hash: [u8; 32],
        now: i64,
    ) -> Result<(), CommitRevealError> {
        let key = (hunter.clone(), bounty_id);
        match self.commitments.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if existing.revealed || !existing.is_expired(self.reveal_window_secs, now) {
                    return Err(CommitRevealError::AlreadyCommitted);
                }
                // Expired without reveal: the slot reopens
                occupied.insert(Commitment {
                    hunter,
                    bounty_id,
                    commit_hash,
                    committed_at: now,
                    revealed: false,
                    revealed_value: None,
                });
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                debug!(%hunter, %bounty_id, "commitment recorded");
                vacant.insert(Commitment {
                    hunter,
                    bounty_id,
                    commit_hash,
                    committed_at: now,
                    revealed: false,
                    revealed_value: None,
                });
                Ok(())
            }
        }
    }

    /// Reveal the committed value.
    ///
    /// Succeeds iff a commitment exists, the window is still open
    /// (`now <= committed_at + window`), and `SHA-256(value || nonce)`
    /// matches the committed hash. On success the value becomes the public
    /// solution payload and the slot is terminal.
    pub fn reveal(
        &self,
        hunter: &Identity,
        bounty_id: BountyId,
        value: &str,
        nonce: &str,
        now: i64,
    ) -> Result<(), CommitRevealError> {
        let key = (hunter.clone(), bounty_id);
        let mut entry = self
            .commitments
            .get_mut(&key)
            .ok_or(CommitRevealError::NoCommitment)?;

        if entry.revealed {
            return Err(CommitRevealError::AlreadyRevealed);
        }

        let expired_at = entry.committed_at + self.reveal_window_secs;
        if now > expired_at {
            return Err(CommitRevealError::WindowExpired { expired_at });
        }

        if commitment_digest(value, nonce) != entry.commit_hash {
            return Err(CommitRevealError::HashMismatch);
        }

        entry.revealed = true;
        entry.revealed_value = Some(value.to_string());
        debug!(%hunter, %bounty_id, "commitment revealed");
        Ok(())
    }

    /// Derived status of a pair, evaluating expiry against `now`.
    pub fn status(&self, hunter: &Identity, bounty_id: BountyId, now: i64) -> CommitmentStatus {
        let key = (hunter.clone(), bounty_id);
        match self.commitments.get(&key) {
            None => CommitmentStatus::NoCommit,
            Some(c) if c.revealed => CommitmentStatus::Revealed,
            Some(c) if c.is_expired(self.reveal_window_secs, now) => CommitmentStatus::Expired,
            Some(_) => CommitmentStatus::Committed,
        }
    }

    /// Snapshot of the stored commitment for a pair, if any.
    pub fn get(&self, hunter: &Identity, bounty_id: BountyId) -> Option<Commitment> {
        self.commitments
            .get(&(hunter.clone(), bounty_id))
            .map(|c| c.clone())
    }
}
