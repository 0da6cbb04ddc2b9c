//! Ledger error types

use thiserror::Error;

/// Errors raised by audit ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Audit not found: {audit_id}")]
    NotFound { audit_id: String },

    /// Completion is exactly-once: a second `complete` (or a `fail` after
    /// completion) is rejected and its payload discarded.
    #[error("Audit already completed: {audit_id}")]
    AlreadyCompleted { audit_id: String },

    #[error("Score {score} is outside 0..=100")]
    InvalidScore { score: u8 },
}
