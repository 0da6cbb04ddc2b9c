//! Audit Ledger Service
//!
//! Records one audit per submission and transitions it exactly once from
//! `Requested` to a terminal status. Append-only: no record is ever deleted
//! or mutated after reaching a terminal state.
//!
//! **State machine:**
//! `Requested --complete--> Completed` (normal path)
//! `Requested --fail--> Failed` (compensating action)
//!
//! **Key invariants:**
//! - Exactly-once completion: a second `complete` fails `AlreadyCompleted`
//!   with its payload discarded
//! - `Completed` records always carry a score and a report reference
//! - `request` never blocks on analysis; the emitted `AuditRequested` event
//!   drives the scoring consumer

pub mod errors;
pub mod events;
pub mod ledger;

pub use errors::LedgerError;
pub use events::{AuditCompleted, AuditFailed, AuditRequested, LedgerEvent};
pub use ledger::AuditLedger;
