//! Achievement credentials
//!
//! Issued to the winning hunter when a bounty resolves. Credentials are
//! non-transferable by construction: the log is append-only and exposes no
//! operation that changes a credential's recipient.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use types::ids::{AuditId, BountyId, ContentId, CredentialId, Identity};

/// A non-transferable record of a resolved bounty win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub recipient: Identity,
    pub audit_id: AuditId,
    pub bounty_id: BountyId,
    pub quality_score: u8,
    pub evidence_ref: ContentId,
    pub issued_at: i64,
}

/// Append-only credential log.
#[derive(Debug, Default)]
pub struct CredentialLog {
    credentials: Mutex<Vec<Credential>>,
}

impl CredentialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a credential. Returns its id.
    pub fn issue(
        &self,
        recipient: Identity,
        audit_id: AuditId,
        bounty_id: BountyId,
        quality_score: u8,
        evidence_ref: ContentId,
        issued_at: i64,
    ) -> CredentialId {
        let credential = Credential {
            id: CredentialId::new(),
            recipient,
            audit_id,
            bounty_id,
            quality_score,
            evidence_ref,
            issued_at,
        };
        let id = credential.id;
        if let Ok(mut credentials) = self.credentials.lock() {
            credentials.push(credential);
        }
        id
    }

    /// All credentials held by a recipient, in issue order.
    pub fn for_recipient(&self, recipient: &Identity) -> Vec<Credential> {
        self.credentials
            .lock()
            .map(|credentials| {
                credentials
                    .iter()
                    .filter(|c| c.recipient == *recipient)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up one credential by id.
    pub fn get(&self, id: CredentialId) -> Option<Credential> {
        self.credentials
            .lock()
            .ok()
            .and_then(|credentials| credentials.iter().find(|c| c.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.credentials.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
