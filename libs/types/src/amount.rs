//! Token amount arithmetic
//!
//! All monetary values are unsigned integers in the smallest token unit.
//! Arithmetic is checked; the fee split floor-divides basis points so that
//! `payout + fee == amount` holds exactly — any remainder from the division
//! stays with the payout, never with the fee.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis point denominator: 10,000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// An unsigned token amount in the smallest token unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on u128 overflow.
    pub fn checked_add(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    /// Checked subtraction. `None` if `other` exceeds `self`.
    pub fn checked_sub(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }

    /// Sum a sequence of amounts, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = TokenAmount>>(amounts: I) -> Option<TokenAmount> {
        amounts
            .into_iter()
            .try_fold(TokenAmount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// Split the amount into `(payout, fee)` for a fee in basis points.
    ///
    /// The fee is `amount * fee_bps / 10_000`, floor-divided; the payout is
    /// the exact remainder, so `payout + fee == amount` always. `None` if the
    /// intermediate multiplication overflows u128 or `fee_bps` exceeds
    /// 10,000.
    pub fn split_fee(self, fee_bps: u32) -> Option<(TokenAmount, TokenAmount)> {
        if u128::from(fee_bps) > BPS_DENOMINATOR {
            return None;
        }
        let fee = self.0.checked_mul(u128::from(fee_bps))? / BPS_DENOMINATOR;
        let payout = self.0 - fee;
        Some((TokenAmount(payout), TokenAmount(fee)))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for TokenAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for TokenAmount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}
