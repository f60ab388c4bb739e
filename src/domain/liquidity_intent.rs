//! Liquidity deposit and withdrawal requests.

use core::fmt;

use super::{Amount, LpShares, OwnerId, PoolId};
use crate::error::DexError;

/// What a [`LiquidityIntent`] does to the pool.
///
/// Side amounts follow the pool's canonical pair order (side A is the
/// lower asset id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiquidityAction {
    /// Deposit both sides in the pool ratio; mint at least `min_shares`.
    Deposit {
        /// Side A deposit.
        amount_a: Amount,
        /// Side B deposit.
        amount_b: Amount,
        /// Minimum acceptable LP-share delta.
        min_shares: LpShares,
    },
    /// Mint exactly `shares`, paying at most `max_a` / `max_b`.
    DepositForShares {
        /// Shares to mint.
        shares: LpShares,
        /// Maximum side A payment.
        max_a: Amount,
        /// Maximum side B payment.
        max_b: Amount,
    },
    /// Burn `shares` for at least `min_a` / `min_b`.
    Withdraw {
        /// Shares to burn.
        shares: LpShares,
        /// Minimum side A payout.
        min_a: Amount,
        /// Minimum side B payout.
        min_b: Amount,
    },
}

impl fmt::Display for LiquidityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit { .. } => write!(f, "Deposit"),
            Self::DepositForShares { .. } => write!(f, "DepositForShares"),
            Self::Withdraw { .. } => write!(f, "Withdraw"),
        }
    }
}

/// A liquidity request against one pool on behalf of one owner.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, LiquidityIntent, LpShares, OwnerId, PoolId};
///
/// let owner = OwnerId::from_bytes([7u8; 32]);
/// let add = LiquidityIntent::deposit(PoolId::new(0), owner, Amount::new(100), Amount::new(100), LpShares::ZERO);
/// assert!(add.is_ok());
///
/// let remove = LiquidityIntent::withdraw(PoolId::new(0), owner, LpShares::ZERO, Amount::ZERO, Amount::ZERO);
/// assert!(remove.is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiquidityIntent {
    pool: PoolId,
    owner: OwnerId,
    action: LiquidityAction,
}

impl LiquidityIntent {
    /// Deposit both sides.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidQuantity`] if either amount is zero.
    pub fn deposit(
        pool: PoolId,
        owner: OwnerId,
        amount_a: Amount,
        amount_b: Amount,
        min_shares: LpShares,
    ) -> Result<Self, DexError> {
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(DexError::InvalidQuantity("deposit requires both sides"));
        }
        Ok(Self {
            pool,
            owner,
            action: LiquidityAction::Deposit {
                amount_a,
                amount_b,
                min_shares,
            },
        })
    }

    /// Deposit for an exact share amount.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidQuantity`] if `shares` is zero.
    pub fn deposit_for_shares(
        pool: PoolId,
        owner: OwnerId,
        shares: LpShares,
        max_a: Amount,
        max_b: Amount,
    ) -> Result<Self, DexError> {
        if shares.is_zero() {
            return Err(DexError::InvalidQuantity("share amount must be non-zero"));
        }
        Ok(Self {
            pool,
            owner,
            action: LiquidityAction::DepositForShares {
                shares,
                max_a,
                max_b,
            },
        })
    }

    /// Withdraw by burning shares.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidQuantity`] if `shares` is zero.
    pub fn withdraw(
        pool: PoolId,
        owner: OwnerId,
        shares: LpShares,
        min_a: Amount,
        min_b: Amount,
    ) -> Result<Self, DexError> {
        if shares.is_zero() {
            return Err(DexError::InvalidQuantity("cannot withdraw zero shares"));
        }
        Ok(Self {
            pool,
            owner,
            action: LiquidityAction::Withdraw {
                shares,
                min_a,
                min_b,
            },
        })
    }

    /// Target pool.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }

    /// Depositing or withdrawing owner.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Requested action.
    #[must_use]
    pub const fn action(&self) -> LiquidityAction {
        self.action
    }

    /// Returns `true` for deposits of either kind.
    #[must_use]
    pub const fn is_deposit(&self) -> bool {
        !matches!(self.action, LiquidityAction::Withdraw { .. })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::from_bytes([7u8; 32])
    }

    #[test]
    fn one_sided_deposit_rejected() {
        let r = LiquidityIntent::deposit(
            PoolId::new(0),
            owner(),
            Amount::new(10),
            Amount::ZERO,
            LpShares::ZERO,
        );
        assert_eq!(r, Err(DexError::InvalidQuantity("deposit requires both sides")));
    }

    #[test]
    fn deposit_for_zero_shares_rejected() {
        let r = LiquidityIntent::deposit_for_shares(
            PoolId::new(0),
            owner(),
            LpShares::ZERO,
            Amount::new(10),
            Amount::new(10),
        );
        assert!(r.is_err());
    }

    #[test]
    fn withdraw_is_not_deposit() {
        let Ok(intent) = LiquidityIntent::withdraw(
            PoolId::new(1),
            owner(),
            LpShares::new(5),
            Amount::ZERO,
            Amount::ZERO,
        ) else {
            panic!("expected Ok");
        };
        assert!(!intent.is_deposit());
        assert_eq!(intent.action().to_string(), "Withdraw");
    }
}
