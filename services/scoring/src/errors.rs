//! Scoring error types

use thiserror::Error;

use crate::analyzer::AnalysisStage;

/// Content store failures. These are transport-level and abort the
/// operation; domain logic never swallows them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentStoreError {
    #[error("Content store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors raised while scoring an artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// An analysis stage failed. The whole run fails rather than computing
    /// the weighted score from partial results.
    #[error("Analysis stage {stage:?} failed: {reason}")]
    StageFailed {
        stage: AnalysisStage,
        reason: String,
    },

    /// A stage task panicked or was cancelled before producing a result.
    #[error("Analysis stage {stage:?} did not complete")]
    StageAborted { stage: AnalysisStage },

    /// A stage returned a score outside 0..=100.
    #[error("Analysis stage {stage:?} produced invalid score {score}")]
    InvalidStageScore { stage: AnalysisStage, score: u8 },

    #[error("Content store error: {0}")]
    Store(#[from] ContentStoreError),
}
