//! Analyzer seam and stage report types
//!
//! The three analysis stages are pluggable strategies behind one trait, so a
//! real static analyzer, semantic model, or fuzzer can replace the built-in
//! heuristics without touching aggregation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use types::issue::{Issue, Severity};

use crate::errors::ScoringError;

/// The three analysis stages. Each contributes a fixed share of the final
/// score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStage {
    StaticPattern,
    Semantic,
    Simulation,
}

/// Result of one analysis stage: an independent score in 0..=100 and the
/// issues the stage found, tagged with their origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: AnalysisStage,
    pub score: u8,
    pub issues: Vec<Issue>,
}

/// A pluggable analysis stage.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Which stage this analyzer implements.
    fn stage(&self) -> AnalysisStage;

    /// Analyze the artifact and produce a stage report.
    async fn analyze(&self, source: &str) -> Result<StageReport, ScoringError>;
}

/// Shared score model for the built-in analyzers: start from 100 and deduct
/// per finding, weighted by severity, saturating at zero.
pub(crate) fn deduct_score(issues: &[Issue]) -> u8 {
    let penalty: u32 = issues
        .iter()
        .map(|i| match i.severity {
            Severity::High => 15u32,
            Severity::Medium => 8,
            Severity::Low => 3,
        })
        .sum();
    100u32.saturating_sub(penalty) as u8
}
