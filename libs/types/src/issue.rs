//! Issue records produced by the analysis stages
//!
//! An issue is owned by exactly one audit and is immutable once recorded.

use crate::ids::IssueId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// Kind of defect an analysis stage can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Re-entrant external call before state is settled
    Reentrancy,
    /// External call whose result is never checked
    UncheckedCall,
    /// Arithmetic without overflow protection
    UncheckedArithmetic,
    /// Missing or weak caller authorization
    AccessControl,
    /// Input consumed without validation
    UnvalidatedInput,
    /// Secret or key material embedded in source
    HardcodedSecret,
    /// Structural quality defect (oversized function, deep nesting)
    CodeQuality,
    /// Behavioral anomaly observed under simulated execution
    SimulationAnomaly,
}

/// Where in the artifact an issue was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLocation {
    pub file: String,
    pub line: u32,
}

/// A single finding, owned by the audit that produced it.
///
/// Duplicate findings on the same line/kind are kept as-is — de-duplication
/// is a consumer concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub location: IssueLocation,
    pub snippet: String,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        description: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            id: IssueId::new(),
            kind,
            severity,
            description: description.into(),
            location: IssueLocation {
                file: file.into(),
                line,
            },
            snippet: snippet.into(),
        }
    }
}

/// Count issues at a given severity.
pub fn count_severity(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}
