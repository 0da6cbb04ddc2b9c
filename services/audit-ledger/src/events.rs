//! Ledger events
//!
//! Emitted on every state transition. `AuditRequested` doubles as the work
//! item the scoring consumer pulls from the queue, so it carries everything
//! analysis needs without re-reading the ledger.

use serde::{Deserialize, Serialize};
use types::ids::{AuditId, ContentId, Identity};

/// A new audit was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequested {
    pub audit_id: AuditId,
    pub requester: Identity,
    pub source_ref: ContentId,
    pub requested_at: i64,
}

/// An audit reached `Completed` with its final score and report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCompleted {
    pub audit_id: AuditId,
    pub score: u8,
    pub issue_count: usize,
    pub report_ref: ContentId,
    pub completed_at: i64,
}

/// An audit was marked `Failed` (compensating action for a failed run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFailed {
    pub audit_id: AuditId,
    pub reason: String,
    pub failed_at: i64,
}

/// Enum wrapper for all ledger events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AuditRequested(AuditRequested),
    AuditCompleted(AuditCompleted),
    AuditFailed(AuditFailed),
}
