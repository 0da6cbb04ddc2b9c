//! Commit-Reveal Protocol Service
//!
//! A standalone two-phase submission primitive: hunters commit to a hidden
//! solution hash, then reveal the solution within a fixed window. This keeps
//! raw solutions invisible (and uncopyable) before disclosure while binding
//! each hunter to exactly one solution at commit time.
//!
//! **Key invariants:**
//! - Reveal is only valid while `now <= committed_at + reveal_window`
//! - Reveal is only valid when `SHA-256(value || nonce)` equals the
//!   committed hash
//! - `Revealed` and `Expired` are terminal per `(hunter, bounty)` pair
//! - Expiry is lazy — evaluated at each read, never by a timer

pub mod errors;
pub mod protocol;

pub use errors::CommitRevealError;
pub use protocol::{commitment_digest, CommitReveal, Commitment, CommitmentStatus};
