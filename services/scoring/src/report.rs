//! Structured audit reports
//!
//! The full analysis result — per-stage scores, issues, recommendations,
//! and the derived risk tier — is serialized and persisted to the content
//! store. The returned content id is what the ledger records.

use serde::{Deserialize, Serialize};
use types::ids::ContentId;
use types::issue::{count_severity, Issue, IssueKind, Severity};
use types::risk::RiskTier;

/// Per-stage score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageScores {
    pub static_pattern: u8,
    pub semantic: u8,
    pub simulation: u8,
}

/// The persisted report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub source_ref: ContentId,
    pub produced_at: i64,
    /// True when the source could not be fetched and analysis ran on the
    /// deterministic fallback artifact.
    pub source_missing: bool,
    pub stage_scores: StageScores,
    pub final_score: u8,
    pub risk_tier: RiskTier,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    /// Derive one recommendation per distinct issue kind, in first-seen
    /// order.
    pub fn recommendations_for(issues: &[Issue]) -> Vec<String> {
        let mut seen: Vec<IssueKind> = Vec::new();
        let mut recommendations = Vec::new();
        for issue in issues {
            if seen.contains(&issue.kind) {
                continue;
            }
            seen.push(issue.kind);
            recommendations.push(recommendation(issue.kind).to_string());
        }
        recommendations
    }

    /// Risk tier for a score and issue list.
    pub fn tier(final_score: u8, issues: &[Issue]) -> RiskTier {
        RiskTier::classify(final_score, count_severity(issues, Severity::High))
    }
}

fn recommendation(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Reentrancy => "Settle internal state before making external calls",
        IssueKind::UncheckedCall => "Check and handle the result of every external call",
        IssueKind::UncheckedArithmetic => "Use checked arithmetic on all balance math",
        IssueKind::AccessControl => "Gate privileged paths on the direct caller's role",
        IssueKind::UnvalidatedInput => "Validate externally supplied values before use",
        IssueKind::HardcodedSecret => "Move key material out of source into managed secrets",
        IssueKind::CodeQuality => "Refactor oversized or deeply nested functions",
        IssueKind::SimulationAnomaly => "Reproduce the probe sequence and harden the failing path",
    }
}
