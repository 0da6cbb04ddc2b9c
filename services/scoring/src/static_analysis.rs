//! Static pattern analysis stage
//!
//! Line-oriented scan for known dangerous constructs. The scan reports every
//! occurrence, including repeats of the same pattern on the same line —
//! de-duplication belongs to downstream consumers.

use async_trait::async_trait;
use types::issue::{Issue, IssueKind, Severity};

use crate::analyzer::{deduct_score, AnalysisStage, Analyzer, StageReport};
use crate::errors::ScoringError;

/// One recognizable dangerous construct.
struct Pattern {
    needle: &'static str,
    kind: IssueKind,
    severity: Severity,
    description: &'static str,
}

/// Patterns scanned on every line, checked in order.
const PATTERNS: &[Pattern] = &[
    Pattern {
        needle: "tx.origin",
        kind: IssueKind::AccessControl,
        severity: Severity::High,
        description: "Authorization decided by transaction origin instead of the direct caller",
    },
    Pattern {
        needle: "delegatecall",
        kind: IssueKind::UncheckedCall,
        severity: Severity::High,
        description: "Delegatecall hands full control of storage to the callee",
    },
    Pattern {
        needle: "selfdestruct",
        kind: IssueKind::AccessControl,
        severity: Severity::High,
        description: "Self-destruct path reachable from contract code",
    },
    Pattern {
        needle: ".call(",
        kind: IssueKind::UncheckedCall,
        severity: Severity::Medium,
        description: "Low-level call whose return value may be ignored",
    },
    Pattern {
        needle: "unchecked",
        kind: IssueKind::UncheckedArithmetic,
        severity: Severity::Medium,
        description: "Arithmetic explicitly exempt from overflow checks",
    },
    Pattern {
        needle: "block.timestamp",
        kind: IssueKind::UnvalidatedInput,
        severity: Severity::Low,
        description: "Miner-influenced timestamp used in contract logic",
    },
    Pattern {
        needle: "private_key",
        kind: IssueKind::HardcodedSecret,
        severity: Severity::High,
        description: "Key material referenced directly in source",
    },
    Pattern {
        needle: "api_key =",
        kind: IssueKind::HardcodedSecret,
        severity: Severity::High,
        description: "Credential assigned inline in source",
    },
];

/// Name used for issue locations when the artifact is a single blob.
const ARTIFACT_FILE: &str = "artifact";

/// Built-in static pattern analyzer.
#[derive(Debug, Default)]
pub struct StaticPatternAnalyzer;

impl StaticPatternAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn scan(source: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let line_no = (idx + 1) as u32;
            for pattern in PATTERNS {
                if line.contains(pattern.needle) {
                    issues.push(Issue::new(
                        pattern.kind,
                        pattern.severity,
                        pattern.description,
                        ARTIFACT_FILE,
                        line_no,
                        line.trim(),
                    ));
                }
            }
        }
        issues
    }
}

#[async_trait]
impl Analyzer for StaticPatternAnalyzer {
    fn stage(&self) -> AnalysisStage {
        AnalysisStage::StaticPattern
    }

    async fn analyze(&self, source: &str) -> Result<StageReport, ScoringError> {
        let issues = Self::scan(source);
        let score = deduct_score(&issues);
        Ok(StageReport {
            stage: AnalysisStage::StaticPattern,
            score,
            issues,
        })
    }
}
