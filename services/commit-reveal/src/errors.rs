//! Commit-reveal error types

use thiserror::Error;

/// Errors raised by the commit-reveal protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitRevealError {
    #[error("A live commitment already exists for this hunter and bounty")]
    AlreadyCommitted,

    #[error("No commitment found for this hunter and bounty")]
    NoCommitment,

    #[error("Commitment already revealed")]
    AlreadyRevealed,

    #[error("Reveal window expired at {expired_at}")]
    WindowExpired { expired_at: i64 },

    #[error("Revealed value does not match the committed hash")]
    HashMismatch,
}
