//! Escrow & Bounty Lifecycle Service
//!
//! Owns locked reward funds per bounty, tracks hunter submissions, and
//! executes resolution (pay winner, split platform fee) or closure (refund
//! poster). Includes the risk-triggered bounty factory.
//!
//! **Key invariants:**
//! - The sum of all open bounties' rewards equals the poster's locked
//!   escrow balance
//! - `payout + fee == reward` exactly; the fee floor-divides basis points
//!   and any remainder stays with the payout
//! - Batch creation is all-or-nothing: one escrow lock funds the batch
//! - Rejected operations leave every entity exactly as it was

pub mod book;
pub mod config;
pub mod credential;
pub mod errors;
pub mod events;
pub mod factory;
pub mod vault;

pub use book::BountyBook;
pub use config::{ConfigError, EscrowConfig};
pub use credential::{Credential, CredentialLog};
pub use errors::{BountyError, FactoryError, VaultError};
pub use events::BountyEvent;
pub use vault::{TokenBalance, TokenVault};
