//! Coordination engine
//!
//! Wires the pipeline: `submit` records the audit and enqueues a job; the
//! worker pulls jobs, runs the scoring aggregator, completes (or fails) the
//! ledger record, and lets the factory spawn escrowed bounties for
//! high-risk results. Hunters then compete through the commit-reveal
//! protocol and the bounty lifecycle.
//!
//! The ledger/listener coupling is a queue, not callbacks: `request` emits
//! the typed `AuditRequested` job and the consumer drains it on its own
//! schedule.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{info, warn};

use audit_ledger::AuditLedger;
use commit_reveal::{CommitReveal, CommitmentStatus};
use escrow::book::BountyBook;
use escrow::config::EscrowConfig;
use escrow::credential::{Credential, CredentialLog};
use escrow::factory;
use escrow::vault::{TokenBalance, TokenVault};
use scoring::{AuditReport, ContentStore, ScoringAggregator};
use types::amount::TokenAmount;
use types::audit::Audit;
use types::bounty::{Bounty, BountyStatus, Submission};
use types::ids::{AuditId, BountyId, ContentId, Identity, SubmissionId};

use crate::clock::Clock;
use crate::errors::EngineError;

/// Engine configuration: escrow/factory settings plus the commit-reveal
/// window, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub escrow: EscrowConfig,
    pub reveal_window_secs: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            escrow: EscrowConfig::default(),
            reveal_window_secs: 3_600,
        }
    }
}

/// Work item consumed by the analysis worker.
#[derive(Debug, Clone)]
pub struct AuditJob {
    pub audit_id: AuditId,
    pub requester: Identity,
    pub source_ref: ContentId,
}

/// The audit-to-bounty coordination engine.
pub struct Coordinator {
    ledger: AuditLedger,
    book: BountyBook,
    vault: TokenVault,
    credentials: CredentialLog,
    commit_reveal: CommitReveal,
    aggregator: ScoringAggregator,
    store: Arc<dyn ContentStore>,
    config: RwLock<EscrowConfig>,
    clock: Arc<dyn Clock>,
    jobs_tx: UnboundedSender<AuditJob>,
    jobs_rx: Mutex<UnboundedReceiver<AuditJob>>,
}

impl Coordinator {
    /// Build an engine with the built-in analyzers.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        let aggregator = ScoringAggregator::new(store.clone());
        Self::with_aggregator(config, store, clock, aggregator)
    }

    /// Build an engine around a custom aggregator (substituted analyzers).
    pub fn with_aggregator(
        config: PipelineConfig,
        store: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
        aggregator: ScoringAggregator,
    ) -> Result<Self, EngineError> {
        config.escrow.validate()?;
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();

        Ok(Self {
            ledger: AuditLedger::new(),
            book: BountyBook::new(config.escrow.admin.clone()),
            vault: TokenVault::new(),
            credentials: CredentialLog::new(),
            commit_reveal: CommitReveal::new(config.reveal_window_secs),
            aggregator,
            store,
            config: RwLock::new(config.escrow),
            clock,
            jobs_tx,
            jobs_rx: Mutex::new(jobs_rx),
        })
    }

    fn config(&self) -> EscrowConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    // ───────────────────────── Intake ─────────────────────────

    /// Store a source artifact, returning its content id.
    pub async fn upload_source(&self, bytes: Vec<u8>) -> Result<ContentId, EngineError> {
        Ok(self.store.put(bytes).await.map_err(scoring::ScoringError::Store)?)
    }

    /// Request an audit. Records the ledger entry and enqueues the analysis
    /// job; never blocks on analysis.
    pub fn submit_audit(&self, requester: Identity, source_ref: ContentId) -> AuditId {
        let now = self.clock.now();
        let audit_id = self.ledger.request(requester.clone(), source_ref.clone(), now);

        // The send only fails if the receiver is gone, which means the
        // engine is shutting down; the ledger record still stands.
        let _ = self.jobs_tx.send(AuditJob {
            audit_id,
            requester,
            source_ref,
        });
        audit_id
    }

    // ───────────────────────── Worker ─────────────────────────

    /// Consume queued jobs until the engine is dropped. Spawn this on the
    /// runtime for live operation.
    pub async fn run(self: Arc<Self>) {
        loop {
            let job = {
                let mut rx = self.jobs_rx.lock().await;
                rx.recv().await
            };
            match job {
                Some(job) => self.process_job(job).await,
                None => break,
            }
        }
    }

    /// Drain every currently queued job, then return. Lets callers drive
    /// the pipeline to quiescence deterministically.
    pub async fn process_pending(&self) {
        loop {
            let job = {
                let mut rx = self.jobs_rx.lock().await;
                match rx.try_recv() {
                    Ok(job) => job,
                    Err(_) => break,
                }
            };
            self.process_job(job).await;
        }
    }

    /// One job: score, record the outcome, spawn bounties if triggered.
    async fn process_job(&self, job: AuditJob) {
        let now = self.clock.now();
        let outcome = match self.aggregator.analyze(&job.source_ref, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(audit_id = %job.audit_id, error = %e, "analysis failed");
                if let Err(ledger_err) = self.ledger.fail(job.audit_id, e.to_string(), now) {
                    warn!(audit_id = %job.audit_id, error = %ledger_err, "could not mark audit failed");
                }
                return;
            }
        };

        let issue_ids: Vec<_> = outcome.issues.iter().map(|i| i.id).collect();
        if let Err(e) = self.ledger.complete(
            job.audit_id,
            outcome.final_score,
            issue_ids.clone(),
            outcome.report_ref.clone(),
            now,
        ) {
            warn!(audit_id = %job.audit_id, error = %e, "completion rejected");
            return;
        }

        let config = self.config();
        if !factory::should_trigger(&config, outcome.final_score, issue_ids.len()) {
            return;
        }

        match factory::create_for_audit(
            &config,
            job.audit_id,
            &job.requester,
            &issue_ids,
            &HashMap::new(),
            &self.vault,
            &self.book,
            now,
        ) {
            Ok(bounty_ids) => {
                info!(audit_id = %job.audit_id, count = bounty_ids.len(), "bounties spawned");
            }
            Err(e) => {
                // The audit stands; the batch failed atomically with zero
                // bounties. The poster can fund and re-trigger manually.
                warn!(audit_id = %job.audit_id, error = %e, "bounty batch not created");
            }
        }
    }

    // ───────────────────────── Funding ─────────────────────────

    /// Credit reward-token funds to an identity (bridge from the external
    /// token capability).
    pub fn deposit(&self, identity: &Identity, amount: TokenAmount) -> Result<(), EngineError> {
        let config = self.config();
        self.vault.credit(identity, &config.reward_token, amount)?;
        Ok(())
    }

    /// Approve the platform to lock the owner's funds into bounty escrow.
    pub fn approve_escrow(&self, owner: &Identity, amount: TokenAmount) {
        let config = self.config();
        self.vault
            .approve(owner, &config.platform_recipient, amount);
    }

    /// Balance snapshot in the reward token.
    pub fn balance(&self, identity: &Identity) -> TokenBalance {
        let config = self.config();
        self.vault.balance(identity, &config.reward_token)
    }

    // ───────────────────────── Hunter operations ─────────────────────────

    /// Commit to a solution hash for a bounty.
    pub fn commit(
        &self,
        hunter: Identity,
        bounty_id: BountyId,
        commit_hash: [u8; 32],
    ) -> Result<(), EngineError> {
        let now = self.clock.now();
        self.commit_reveal.commit(hunter, bounty_id, commit_hash, now)?;
        Ok(())
    }

    /// Reveal a previously committed solution.
    pub fn reveal(
        &self,
        hunter: &Identity,
        bounty_id: BountyId,
        value: &str,
        nonce: &str,
    ) -> Result<(), EngineError> {
        let now = self.clock.now();
        self.commit_reveal.reveal(hunter, bounty_id, value, nonce, now)?;
        Ok(())
    }

    /// Submit a full solution on an open bounty.
    pub fn submit_solution(
        &self,
        bounty_id: BountyId,
        hunter: Identity,
        solution_ref: ContentId,
    ) -> Result<SubmissionId, EngineError> {
        let now = self.clock.now();
        Ok(self
            .book
            .submit_solution(bounty_id, hunter, solution_ref, now)?)
    }

    // ───────────────────────── Owner operations ─────────────────────────

    /// Resolve a bounty in the winner's favor, paying out escrow and
    /// issuing an achievement credential. The credential's quality score is
    /// the originating audit's final score.
    pub fn resolve(
        &self,
        bounty_id: BountyId,
        caller: &Identity,
        winner: &Identity,
        evidence_ref: ContentId,
    ) -> Result<(), EngineError> {
        let now = self.clock.now();
        let config = self.config();

        let quality_score = self
            .book
            .get(bounty_id)
            .and_then(|b| self.ledger.get(b.audit_id))
            .and_then(|a| a.score)
            .unwrap_or(0);

        self.book.resolve(
            bounty_id,
            caller,
            winner,
            evidence_ref,
            config.platform_fee_bps,
            &config.platform_recipient,
            quality_score,
            &self.vault,
            &self.credentials,
            now,
        )?;
        Ok(())
    }

    /// Close an open bounty and refund the poster.
    pub fn close(&self, bounty_id: BountyId, caller: &Identity) -> Result<(), EngineError> {
        let now = self.clock.now();
        self.book.close(bounty_id, caller, &self.vault, now)?;
        Ok(())
    }

    /// Reject one submission without changing the bounty status.
    pub fn reject(
        &self,
        bounty_id: BountyId,
        caller: &Identity,
        submission_id: SubmissionId,
    ) -> Result<(), EngineError> {
        self.book.reject(bounty_id, caller, submission_id)?;
        Ok(())
    }

    /// Replace the engine configuration. Admin-only, validated, logged.
    /// Returns the previous configuration.
    pub fn update_config(
        &self,
        caller: &Identity,
        new_config: EscrowConfig,
    ) -> Result<EscrowConfig, EngineError> {
        let current = self.config();
        if current.admin != *caller {
            return Err(EngineError::Unauthorized);
        }
        new_config.validate()?;

        if let Ok(mut config) = self.config.write() {
            *config = new_config.clone();
        }
        info!(caller = %caller, ?new_config, "engine configuration updated");
        Ok(current)
    }

    // ───────────────────────── Query surface ─────────────────────────
    // Read-only snapshots for the display layer; safe to poll.

    pub fn get_audit(&self, audit_id: AuditId) -> Option<Audit> {
        self.ledger.get(audit_id)
    }

    pub fn list_audits(&self) -> Vec<Audit> {
        self.ledger.audits()
    }

    pub fn get_bounty(&self, bounty_id: BountyId) -> Option<Bounty> {
        self.book.get(bounty_id)
    }

    pub fn list_bounties(&self, status: Option<BountyStatus>) -> Vec<Bounty> {
        self.book.list(status)
    }

    pub fn get_submissions(&self, bounty_id: BountyId) -> Result<Vec<Submission>, EngineError> {
        Ok(self.book.submissions(bounty_id)?)
    }

    pub fn get_commitment_status(
        &self,
        hunter: &Identity,
        bounty_id: BountyId,
    ) -> CommitmentStatus {
        self.commit_reveal
            .status(hunter, bounty_id, self.clock.now())
    }

    pub fn credentials_for(&self, recipient: &Identity) -> Vec<Credential> {
        self.credentials.for_recipient(recipient)
    }

    /// Fetch and decode the persisted report for a completed audit.
    pub async fn audit_report(&self, audit_id: AuditId) -> Option<AuditReport> {
        let report_ref = self.ledger.get(audit_id)?.report_ref?;
        let bytes = self.store.get(&report_ref).await.ok()??;
        serde_json::from_slice(&bytes).ok()
    }
}
