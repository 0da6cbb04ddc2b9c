//! Audit-to-Bounty Coordination Engine
//!
//! Ties the services together: code is submitted for concurrent
//! vulnerability analysis, high-risk findings automatically spawn escrowed
//! bounties, and hunters compete through an anti-front-running
//! commit-reveal protocol until the poster resolves payment.
//!
//! **Control flow:**
//! `submit_audit` → work queue → scoring fan-out/fan-in →
//! `ledger.complete` → factory trigger → escrowed bounties →
//! commit/reveal → `submit_solution` → `resolve` (payout + fee +
//! credential)
//!
//! The display layer consumes the read-only query surface; identity and
//! token custody arrive from external collaborators.

pub mod clock;
pub mod engine;
pub mod errors;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AuditJob, Coordinator, PipelineConfig};
pub use errors::EngineError;
