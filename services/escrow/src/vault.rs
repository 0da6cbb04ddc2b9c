//! Token vault — balances, allowances, and escrow accounting
//!
//! Holds per-`(identity, token)` balances with the invariant
//! `total = available + locked`. Escrowed bounty rewards live in the locked
//! portion until resolution pays them out or closure releases them back.
//!
//! Balance entries serialize per key: concurrent operations on the same
//! identity/token pair queue on the map entry, while unrelated pairs
//! proceed untouched.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::amount::TokenAmount;
use types::ids::Identity;

use crate::errors::VaultError;

/// Balance for one identity and token.
///
/// Invariant: the total is always `available + locked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub available: TokenAmount,
    pub locked: TokenAmount,
}

impl TokenBalance {
    pub fn total(&self) -> Option<TokenAmount> {
        self.available.checked_add(self.locked)
    }
}

/// Token custody for the bounty engine.
///
/// This is the engine's view of the external token capability: credits and
/// debits are atomic per entry and fail loudly on shortfalls, exactly as the
/// upstream transfer capability is assumed to behave.
#[derive(Debug, Default)]
pub struct TokenVault {
    /// Balances: (identity, token) -> balance
    balances: DashMap<(Identity, String), TokenBalance>,
    /// Allowances: (owner, spender) -> remaining approved amount
    allowances: DashMap<(Identity, Identity), TokenAmount>,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Balances ─────────────────────────

    /// Credit available funds.
    pub fn credit(
        &self,
        identity: &Identity,
        token: &str,
        amount: TokenAmount,
    ) -> Result<(), VaultError> {
        let mut balance = self
            .balances
            .entry((identity.clone(), token.to_string()))
            .or_default();
        balance.available = balance
            .available
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        Ok(())
    }

    /// Debit available funds.
    pub fn debit(
        &self,
        identity: &Identity,
        token: &str,
        amount: TokenAmount,
    ) -> Result<(), VaultError> {
        let mut balance = self
            .balances
            .entry((identity.clone(), token.to_string()))
            .or_default();
        balance.available =
            balance
                .available
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientBalance {
                    token: token.to_string(),
                    required: amount.to_string(),
                    available: balance.available.to_string(),
                })?;
        Ok(())
    }

    /// Balance snapshot for an identity and token.
    pub fn balance(&self, identity: &Identity, token: &str) -> TokenBalance {
        self.balances
            .get(&(identity.clone(), token.to_string()))
            .map(|b| *b)
            .unwrap_or_default()
    }

    // ───────────────────────── Allowances ─────────────────────────

    /// Approve a spender for up to `amount`. Overwrites any prior approval.
    pub fn approve(&self, owner: &Identity, spender: &Identity, amount: TokenAmount) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    /// Remaining approved amount for a spender.
    pub fn allowance(&self, owner: &Identity, spender: &Identity) -> TokenAmount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .map(|a| *a)
            .unwrap_or(TokenAmount::ZERO)
    }

    // ───────────────────────── Escrow ─────────────────────────

    /// Atomically move `amount` of the owner's available funds into escrow,
    /// spending the spender's allowance.
    ///
    /// Checks allowance first, then balance; nothing is mutated unless both
    /// checks pass. This is the all-or-nothing seam batch bounty creation
    /// relies on: one lock covers the whole batch sum.
    pub fn lock_escrow(
        &self,
        owner: &Identity,
        spender: &Identity,
        token: &str,
        amount: TokenAmount,
    ) -> Result<(), VaultError> {
        let mut allowance = self
            .allowances
            .entry((owner.clone(), spender.clone()))
            .or_insert(TokenAmount::ZERO);
        let remaining =
            allowance
                .checked_sub(amount)
                .ok_or_else(|| VaultError::InsufficientAllowance {
                    required: amount.to_string(),
                    approved: allowance.to_string(),
                })?;

        // Allowance guard stays held: the balance entry is keyed differently,
        // and lock ordering is always allowance -> balance.
        let mut balance = self
            .balances
            .entry((owner.clone(), token.to_string()))
            .or_default();
        let available =
            balance
                .available
                .checked_sub(amount)
                .ok_or_else(|| VaultError::InsufficientBalance {
                    token: token.to_string(),
                    required: amount.to_string(),
                    available: balance.available.to_string(),
                })?;
        let locked = balance
            .locked
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        balance.available = available;
        balance.locked = locked;
        *allowance = remaining;

        debug!(%owner, token, %amount, "escrow locked");
        Ok(())
    }

    /// Release escrowed funds back to the owner's available balance
    /// (refund path).
    pub fn release_escrow(
        &self,
        owner: &Identity,
        token: &str,
        amount: TokenAmount,
    ) -> Result<(), VaultError> {
        let mut balance = self
            .balances
            .entry((owner.clone(), token.to_string()))
            .or_default();
        let locked = balance
            .locked
            .checked_sub(amount)
            .ok_or_else(|| VaultError::InsufficientEscrow {
                token: token.to_string(),
                required: amount.to_string(),
                locked: balance.locked.to_string(),
            })?;
        let available = balance
            .available
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        balance.locked = locked;
        balance.available = available;

        debug!(%owner, token, %amount, "escrow released");
        Ok(())
    }

    /// Pay out escrowed funds: deduct `amount` from the owner's locked
    /// balance, credit `payout` to the winner and `fee` to the fee
    /// recipient, with `payout + fee == amount` exactly (fee floor-divided
    /// from basis points).
    ///
    /// Returns `(payout, fee)` on success. If a credit fails the escrow
    /// deduction is rolled back before returning.
    pub fn settle_escrow(
        &self,
        owner: &Identity,
        token: &str,
        amount: TokenAmount,
        winner: &Identity,
        fee_recipient: &Identity,
        fee_bps: u32,
    ) -> Result<(TokenAmount, TokenAmount), VaultError> {
        let (payout, fee) = amount
            .split_fee(fee_bps)
            .ok_or(VaultError::InvalidFee { bps: fee_bps })?;

        self.deduct_locked(owner, token, amount)?;

        if let Err(e) = self.credit(winner, token, payout) {
            self.relock(owner, token, amount);
            return Err(e);
        }
        if let Err(e) = self.credit(fee_recipient, token, fee) {
            let _ = self.debit(winner, token, payout);
            self.relock(owner, token, amount);
            return Err(e);
        }

        debug!(%owner, %winner, token, %payout, %fee, "escrow settled");
        Ok((payout, fee))
    }

    /// Remove funds from the locked portion entirely (payout source).
    fn deduct_locked(
        &self,
        owner: &Identity,
        token: &str,
        amount: TokenAmount,
    ) -> Result<(), VaultError> {
        let mut balance = self
            .balances
            .entry((owner.clone(), token.to_string()))
            .or_default();
        balance.locked =
            balance
                .locked
                .checked_sub(amount)
                .ok_or_else(|| VaultError::InsufficientEscrow {
                    token: token.to_string(),
                    required: amount.to_string(),
                    locked: balance.locked.to_string(),
                })?;
        Ok(())
    }

    /// Put funds back into the locked portion after a failed settlement leg.
    fn relock(&self, owner: &Identity, token: &str, amount: TokenAmount) {
        if let Some(mut balance) = self
            .balances
            .get_mut(&(owner.clone(), token.to_string()))
        {
            if let Some(locked) = balance.locked.checked_add(amount) {
                balance.locked = locked;
            }
        }
    }
}
