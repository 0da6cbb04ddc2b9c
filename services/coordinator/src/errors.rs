//! Engine-level error type
//!
//! Wraps the per-service taxonomies into one surface for callers of the
//! coordinator. Every variant is recoverable; rejected operations leave all
//! entities untouched.

use thiserror::Error;

/// Errors surfaced by coordinator operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] audit_ledger::LedgerError),

    #[error("Bounty error: {0}")]
    Bounty(#[from] escrow::BountyError),

    #[error("Factory error: {0}")]
    Factory(#[from] escrow::FactoryError),

    #[error("Vault error: {0}")]
    Vault(#[from] escrow::VaultError),

    #[error("Commit-reveal error: {0}")]
    CommitReveal(#[from] commit_reveal::CommitRevealError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] scoring::ScoringError),

    #[error("Config error: {0}")]
    Config(#[from] escrow::ConfigError),

    #[error("Unauthorized: caller is not the engine admin")]
    Unauthorized,
}
