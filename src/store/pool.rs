//! Constant-product pool record and its compare-and-swap update.
//!
//! A [`Pool`] never mutates except through [`Pool::apply`], which checks the
//! caller's expected sequence, validates the whole [`PoolUpdate`] and only
//! then writes it, bumping the sequence by one.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{Amount, AssetId, AssetPair, FeeRate, LpShares, OwnerId, PoolId, Side};
use crate::error::{DexError, Result};
use crate::math::CheckedArithmetic;

/// Reserve, lock and share changes applied to a pool in one step.
///
/// Built with the chaining methods; an empty update still bumps the
/// sequence when applied.
///
/// ```
/// use hydra_dex::domain::{Amount, Side};
/// use hydra_dex::store::PoolUpdate;
///
/// let swap = PoolUpdate::new()
///     .credit(Side::A, Amount::new(100))
///     .debit(Side::B, Amount::new(90));
/// assert!(!swap.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolUpdate {
    credit: [Amount; 2],
    debit: [Amount; 2],
    lock: [Amount; 2],
    unlock: [Amount; 2],
    mint: Vec<(OwnerId, LpShares)>,
    burn: Vec<(OwnerId, LpShares)>,
}

const fn slot(side: Side) -> usize {
    match side {
        Side::A => 0,
        Side::B => 1,
    }
}

fn accumulate(total: &mut Amount, amount: Amount) {
    *total = total.checked_add(&amount).unwrap_or(Amount::MAX);
}

impl PoolUpdate {
    /// An update that changes nothing but the sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an update from signed reserve deltas.
    #[must_use]
    pub fn from_deltas(delta_a: i128, delta_b: i128) -> Self {
        let mut update = Self::new();
        for (side, delta) in [(Side::A, delta_a), (Side::B, delta_b)] {
            let magnitude = Amount::new(delta.unsigned_abs());
            update = if delta >= 0 {
                update.credit(side, magnitude)
            } else {
                update.debit(side, magnitude)
            };
        }
        update
    }

    /// Adds `amount` to the reserve on `side`.
    #[must_use]
    pub fn credit(mut self, side: Side, amount: Amount) -> Self {
        accumulate(&mut self.credit[slot(side)], amount);
        self
    }

    /// Removes `amount` from the reserve on `side`.
    #[must_use]
    pub fn debit(mut self, side: Side, amount: Amount) -> Self {
        accumulate(&mut self.debit[slot(side)], amount);
        self
    }

    /// Locks `amount` of output capacity on `side`.
    #[must_use]
    pub fn lock(mut self, side: Side, amount: Amount) -> Self {
        accumulate(&mut self.lock[slot(side)], amount);
        self
    }

    /// Releases `amount` of previously locked capacity on `side`.
    #[must_use]
    pub fn unlock(mut self, side: Side, amount: Amount) -> Self {
        accumulate(&mut self.unlock[slot(side)], amount);
        self
    }

    /// Issues `shares` to `owner`.
    #[must_use]
    pub fn mint_shares(mut self, owner: OwnerId, shares: LpShares) -> Self {
        self.mint.push((owner, shares));
        self
    }

    /// Retires `shares` held by `owner`.
    #[must_use]
    pub fn burn_shares(mut self, owner: OwnerId, shares: LpShares) -> Self {
        self.burn.push((owner, shares));
        self
    }

    /// Returns `true` if applying the update would only bump the sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credit.iter().chain(&self.debit).chain(&self.lock).chain(&self.unlock).all(Amount::is_zero)
            && self.mint.is_empty()
            && self.burn.is_empty()
    }
}

/// A constant-product pool over an unordered asset pair.
///
/// # Invariants
///
/// - Both reserves are non-zero while any shares are outstanding.
/// - `locked(side) <= reserve(side)` on both sides.
/// - `total_shares` equals the sum of the per-owner ledger.
/// - `sequence` grows by exactly one per applied update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    id: PoolId,
    pair: AssetPair,
    fee: FeeRate,
    reserves: [Amount; 2],
    locked: [Amount; 2],
    sequence: u64,
    total_shares: LpShares,
    shares: BTreeMap<OwnerId, LpShares>,
}

impl Pool {
    pub(crate) fn genesis(
        id: PoolId,
        pair: AssetPair,
        fee: FeeRate,
        reserve_a: Amount,
        reserve_b: Amount,
        founder: OwnerId,
        founder_shares: LpShares,
    ) -> Self {
        let mut shares = BTreeMap::new();
        shares.insert(founder, founder_shares);
        Self {
            id,
            pair,
            fee,
            reserves: [reserve_a, reserve_b],
            locked: [Amount::ZERO; 2],
            sequence: 0,
            total_shares: founder_shares,
            shares,
        }
    }

    /// Pool identifier.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Canonically ordered asset pair.
    #[must_use]
    pub const fn pair(&self) -> AssetPair {
        self.pair
    }

    /// Swap fee.
    #[must_use]
    pub const fn fee(&self) -> FeeRate {
        self.fee
    }

    /// Account holding this pool's reserves in the registry.
    #[must_use]
    pub const fn vault(&self) -> OwnerId {
        OwnerId::pool_vault(self.id)
    }

    /// Reserve on `side`.
    #[must_use]
    pub const fn reserve(&self, side: Side) -> Amount {
        self.reserves[slot(side)]
    }

    /// Reserve of the asset on `side`'s position in the pair.
    pub fn reserve_of(&self, asset: &AssetId) -> Result<Amount> {
        Ok(self.reserve(self.pair.side_of(asset)?))
    }

    /// Output capacity currently locked by pending settlements on `side`.
    #[must_use]
    pub const fn locked(&self, side: Side) -> Amount {
        self.locked[slot(side)]
    }

    /// Reserve on `side` not locked by pending settlements.
    #[must_use]
    pub const fn available(&self, side: Side) -> Amount {
        match self.reserve(side).checked_sub(&self.locked(side)) {
            Some(a) => a,
            None => Amount::ZERO,
        }
    }

    /// Current sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Total outstanding LP shares.
    #[must_use]
    pub const fn total_shares(&self) -> LpShares {
        self.total_shares
    }

    /// Shares recorded for `owner`.
    #[must_use]
    pub fn shares_of(&self, owner: &OwnerId) -> LpShares {
        self.shares.get(owner).copied().unwrap_or(LpShares::ZERO)
    }

    /// Applies `update` if the pool is still at `expected_sequence`.
    ///
    /// Nothing is written unless every delta is valid.
    ///
    /// # Errors
    ///
    /// - [`DexError::StaleSequence`] if the pool moved on.
    /// - [`DexError::NegativeReserve`] if a reserve or lock would drop below
    ///   zero.
    /// - [`DexError::InsufficientLiquidity`] if locks would exceed the
    ///   reserve.
    /// - [`DexError::InsufficientShare`] if an owner burns more than they
    ///   hold.
    pub fn apply(&mut self, expected_sequence: u64, update: &PoolUpdate) -> Result<()> {
        if self.sequence != expected_sequence {
            return Err(DexError::StaleSequence {
                expected: expected_sequence,
                actual: self.sequence,
            });
        }
        let mut next = self.clone();
        for i in 0..2 {
            next.reserves[i] = next.reserves[i]
                .safe_add(&update.credit[i])?
                .safe_sub(&update.debit[i])?;
            next.locked[i] = next.locked[i]
                .safe_add(&update.lock[i])?
                .safe_sub(&update.unlock[i])?;
            if next.locked[i] > next.reserves[i] {
                return Err(DexError::InsufficientLiquidity);
            }
        }
        for (owner, shares) in &update.burn {
            let owned = next.shares_of(owner);
            let remaining = owned.checked_sub(shares).ok_or(DexError::InsufficientShare {
                requested: *shares,
                owned,
            })?;
            if remaining.is_zero() {
                next.shares.remove(owner);
            } else {
                next.shares.insert(*owner, remaining);
            }
            next.total_shares = next.total_shares.safe_sub(shares)?;
        }
        for (owner, shares) in &update.mint {
            let held = next.shares_of(owner).safe_add(shares)?;
            next.shares.insert(*owner, held);
            next.total_shares = next.total_shares.safe_add(shares)?;
        }
        if !next.total_shares.is_zero() && next.reserves.iter().any(Amount::is_zero) {
            return Err(DexError::InsufficientLiquidity);
        }
        next.sequence = self
            .sequence
            .checked_add(1)
            .ok_or(DexError::Overflow("pool sequence overflow"))?;
        *self = next;
        Ok(())
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] reserves {}/{} seq {}",
            self.id, self.pair, self.reserves[0], self.reserves[1], self.sequence
        )
    }
}
