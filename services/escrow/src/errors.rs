//! Escrow-specific error types
//!
//! Error taxonomy for vault, bounty lifecycle, and factory operations.
//! Every variant is a typed, recoverable rejection; a rejected call leaves
//! all entities exactly as they were.

use thiserror::Error;

/// Vault-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Insufficient balance for {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: String,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance { required: String, approved: String },

    #[error("Insufficient escrow for {token}: required {required}, locked {locked}")]
    InsufficientEscrow {
        token: String,
        required: String,
        locked: String,
    },

    #[error("Invalid fee rate: {bps} basis points")]
    InvalidFee { bps: u32 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Bounty lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BountyError {
    #[error("Bounty not found: {bounty_id}")]
    NotFound { bounty_id: String },

    #[error("Bounty is not open: {status}")]
    BountyNotOpen { status: String },

    #[error("Bounty already in terminal state: {status}")]
    AlreadyTerminal { status: String },

    #[error("Deadline passed at {deadline}")]
    PastDeadline { deadline: i64 },

    #[error("Hunter already has a pending submission on this bounty")]
    DuplicateSubmission,

    #[error("Winner has no pending submission on this bounty")]
    InvalidWinner,

    #[error("Caller is not the bounty poster")]
    NotPoster,

    #[error("Submission not found: {submission_id}")]
    SubmissionNotFound { submission_id: String },

    #[error("Submission already decided: {decision}")]
    SubmissionAlreadyDecided { decision: String },

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}

/// Bounty factory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("Reward sum overflows")]
    RewardOverflow,

    /// The poster cannot cover the whole batch; no bounty was created.
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}
