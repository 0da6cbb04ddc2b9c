//! Audit records — one risk-assessment run over a code artifact
//!
//! Audits follow append-only ledger semantics: created once in `Requested`,
//! transitioned exactly once to a terminal status, never deleted.

use crate::ids::{AuditId, ContentId, Identity, IssueId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an audit.
///
/// `Requested → Completed` is the normal path; `Requested → Failed` is the
/// compensating transition when analysis cannot produce a trustworthy score.
/// Both terminal states are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", tag = "status", content = "detail")]
pub enum AuditStatus {
    Requested,
    Completed,
    Failed { reason: String },
}

impl AuditStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuditStatus::Requested)
    }
}

/// One audit run, tracked end-to-end.
///
/// Invariant: `status == Completed` implies `score` and `report_ref` are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub id: AuditId,
    pub requester: Identity,
    pub source_ref: ContentId,
    pub score: Option<u8>,
    pub issues: Vec<IssueId>,
    pub report_ref: Option<ContentId>,
    pub status: AuditStatus,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl Audit {
    /// Create a freshly requested audit.
    pub fn new(requester: Identity, source_ref: ContentId, created_at: i64) -> Self {
        Self {
            id: AuditId::new(),
            requester,
            source_ref,
            score: None,
            issues: Vec::new(),
            report_ref: None,
            status: AuditStatus::Requested,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, AuditStatus::Completed)
    }

    /// Check the completion invariant: a completed audit carries its score
    /// and a non-empty report reference.
    pub fn check_invariant(&self) -> bool {
        match self.status {
            AuditStatus::Completed => {
                self.score.is_some()
                    && self
                        .report_ref
                        .as_ref()
                        .map(|r| !r.as_str().is_empty())
                        .unwrap_or(false)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested_audit() -> Audit {
        Audit::new(
            Identity::new("requester_1"),
            ContentId::from_bytes(b"source"),
            1_700_000_000,
        )
    }

    #[test]
    fn test_new_audit_is_requested() {
        let audit = requested_audit();
        assert_eq!(audit.status, AuditStatus::Requested);
        assert!(audit.score.is_none());
        assert!(audit.completed_at.is_none());
        assert!(audit.check_invariant());
    }

    #[test]
    fn test_requested_is_not_terminal() {
        assert!(!AuditStatus::Requested.is_terminal());
        assert!(AuditStatus::Completed.is_terminal());
        assert!(AuditStatus::Failed {
            reason: "stage error".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_invariant_rejects_completed_without_score() {
        let mut audit = requested_audit();
        audit.status = AuditStatus::Completed;
        assert!(!audit.check_invariant(), "Completed without score/report");

        audit.score = Some(80);
        audit.report_ref = Some(ContentId::from_bytes(b"report"));
        assert!(audit.check_invariant());
    }

    #[test]
    fn test_audit_serialization() {
        let audit = requested_audit();
        let json = serde_json::to_string(&audit).unwrap();
        let deser: Audit = serde_json::from_str(&json).unwrap();
        assert_eq!(audit, deser);
    }
}
