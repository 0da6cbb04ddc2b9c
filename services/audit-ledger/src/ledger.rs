//! Audit ledger store
//!
//! One record per audit request, append-only: records are created in
//! `Requested`, transitioned exactly once to a terminal status, and never
//! deleted. Operations on different audits serialize independently.

use dashmap::DashMap;
use std::sync::Mutex;
use tracing::info;
use types::audit::{Audit, AuditStatus};
use types::ids::{AuditId, ContentId, Identity, IssueId};

use crate::errors::LedgerError;
use crate::events::{AuditCompleted, AuditFailed, AuditRequested, LedgerEvent};

/// Append-only ledger of audit runs.
#[derive(Debug, Default)]
pub struct AuditLedger {
    audits: DashMap<AuditId, Audit>,
    /// Insertion order, so listings replay the request sequence
    order: Mutex<Vec<AuditId>>,
    /// Emitted events (append-only)
    events: Mutex<Vec<LedgerEvent>>,
}

impl AuditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new audit request. Returns immediately — analysis happens
    /// elsewhere, driven by the emitted `AuditRequested` event.
    pub fn request(&self, requester: Identity, source_ref: ContentId, now: i64) -> AuditId {
        let audit = Audit::new(requester.clone(), source_ref.clone(), now);
        let audit_id = audit.id;

        self.audits.insert(audit_id, audit);
        if let Ok(mut order) = self.order.lock() {
            order.push(audit_id);
        }
        self.push_event(LedgerEvent::AuditRequested(AuditRequested {
            audit_id,
            requester,
            source_ref,
            requested_at: now,
        }));

        info!(%audit_id, "audit requested");
        audit_id
    }

    /// Complete an audit with its final score, issue list, and report.
    ///
    /// Exactly-once: a second completion fails with `AlreadyCompleted` and
    /// the second payload is discarded, leaving the record untouched.
    pub fn complete(
        &self,
        audit_id: AuditId,
        score: u8,
        issues: Vec<IssueId>,
        report_ref: ContentId,
        now: i64,
    ) -> Result<(), LedgerError> {
        if score > 100 {
            return Err(LedgerError::InvalidScore { score });
        }

        let mut audit = self.audits.get_mut(&audit_id).ok_or(LedgerError::NotFound {
            audit_id: audit_id.to_string(),
        })?;

        if audit.status.is_terminal() {
            return Err(LedgerError::AlreadyCompleted {
                audit_id: audit_id.to_string(),
            });
        }

        let issue_count = issues.len();
        audit.score = Some(score);
        audit.issues = issues;
        audit.report_ref = Some(report_ref.clone());
        audit.status = AuditStatus::Completed;
        audit.completed_at = Some(now);
        debug_assert!(audit.check_invariant());
        drop(audit);

        self.push_event(LedgerEvent::AuditCompleted(AuditCompleted {
            audit_id,
            score,
            issue_count,
            report_ref,
            completed_at: now,
        }));

        info!(%audit_id, score, issue_count, "audit completed");
        Ok(())
    }

    /// Mark an audit `Failed` — the compensating action when analysis could
    /// not produce a trustworthy score. Guarded like `complete`.
    pub fn fail(
        &self,
        audit_id: AuditId,
        reason: impl Into<String>,
        now: i64,
    ) -> Result<(), LedgerError> {
        let mut audit = self.audits.get_mut(&audit_id).ok_or(LedgerError::NotFound {
            audit_id: audit_id.to_string(),
        })?;

        if audit.status.is_terminal() {
            return Err(LedgerError::AlreadyCompleted {
                audit_id: audit_id.to_string(),
            });
        }

        let reason = reason.into();
        audit.status = AuditStatus::Failed {
            reason: reason.clone(),
        };
        audit.completed_at = Some(now);
        drop(audit);

        self.push_event(LedgerEvent::AuditFailed(AuditFailed {
            audit_id,
            reason,
            failed_at: now,
        }));
        Ok(())
    }

    /// Snapshot of an audit in any status.
    pub fn get(&self, audit_id: AuditId) -> Option<Audit> {
        self.audits.get(&audit_id).map(|a| a.clone())
    }

    /// All audits in request order.
    pub fn audits(&self) -> Vec<Audit> {
        self.order
            .lock()
            .map(|order| {
                order
                    .iter()
                    .filter_map(|id| self.audits.get(id).map(|a| a.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.audits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audits.is_empty()
    }

    /// All emitted events.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain emitted events (consume and clear).
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    fn push_event(&self, event: LedgerEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
