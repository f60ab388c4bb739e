//! What the engine reports back for each executed instruction.

use crate::domain::{Amount, AssetId, LpShares, OwnerId, PoolId, SettlementId, Slot, SwapQuote};

/// A committed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapReceipt {
    pool: PoolId,
    owner: OwnerId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Amount,
    amount_out: Amount,
    fee: Amount,
    sequence: u64,
}

impl SwapReceipt {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        pool: PoolId,
        owner: OwnerId,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
        sequence: u64,
    ) -> Self {
        Self {
            pool,
            owner,
            asset_in,
            asset_out,
            amount_in,
            amount_out,
            fee,
            sequence,
        }
    }

    /// Pool traded against.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }

    /// Owner whose balances moved.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Asset paid in.
    #[must_use]
    pub const fn asset_in(&self) -> AssetId {
        self.asset_in
    }

    /// Asset received.
    #[must_use]
    pub const fn asset_out(&self) -> AssetId {
        self.asset_out
    }

    /// Amount paid in, fee included.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Amount received.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Fee retained by the pool.
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Pool sequence after the swap.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// A committed deposit or withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiquidityReceipt {
    pool: PoolId,
    owner: OwnerId,
    amount_a: Amount,
    amount_b: Amount,
    shares: LpShares,
    deposit: bool,
    sequence: u64,
}

impl LiquidityReceipt {
    pub(crate) const fn new(
        pool: PoolId,
        owner: OwnerId,
        amount_a: Amount,
        amount_b: Amount,
        shares: LpShares,
        deposit: bool,
        sequence: u64,
    ) -> Self {
        Self {
            pool,
            owner,
            amount_a,
            amount_b,
            shares,
            deposit,
            sequence,
        }
    }

    /// Pool affected.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }

    /// Liquidity provider.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Side A paid in (deposit) or out (withdrawal).
    pub const fn amount_a(&self) -> Amount {
        self.amount_a
    }

    /// Side B paid in (deposit) or out (withdrawal).
    pub const fn amount_b(&self) -> Amount {
        self.amount_b
    }

    /// Shares minted (deposit) or burned (withdrawal).
    #[must_use]
    pub const fn shares(&self) -> LpShares {
        self.shares
    }

    /// `true` for deposits.
    #[must_use]
    pub const fn is_deposit(&self) -> bool {
        self.deposit
    }

    /// Pool sequence after the change.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// How a finalize call resolved its reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementResult {
    /// The swap went through at the reserved price.
    Finalized(SwapReceipt),
    /// The reservation had expired: it was reverted and its lock released.
    Slashed {
        /// Expired settlement.
        settlement: SettlementId,
        /// Output capacity returned to the pool.
        released: Amount,
    },
}

impl SettlementResult {
    /// Returns `true` if the swap executed.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }
}

/// Result of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Native units wrapped.
    Wrapped {
        /// Owner whose balance converted.
        owner: OwnerId,
        /// Units converted.
        amount: Amount,
    },
    /// Wrapped units returned to native form.
    Unwrapped {
        /// Owner whose balance converted.
        owner: OwnerId,
        /// Units converted (zero if there was nothing to unwrap).
        amount: Amount,
    },
    /// A pool was created and funded.
    PoolCreated {
        /// New pool.
        pool: PoolId,
        /// Shares credited to the founder.
        shares: LpShares,
    },
    /// A direct swap committed.
    Swapped(SwapReceipt),
    /// A swap was reserved for later settlement.
    Reserved {
        /// Handle for finalize or revert.
        settlement: SettlementId,
        /// Locked price.
        quote: SwapQuote,
        /// First expired slot.
        expires_at: Slot,
    },
    /// A reservation was finalized (or slashed on expiry).
    Settled(SettlementResult),
    /// A reservation was reverted.
    Reverted {
        /// Reverted settlement.
        settlement: SettlementId,
        /// Output capacity returned to the pool.
        released: Amount,
    },
    /// A liquidity change committed.
    Liquidity(LiquidityReceipt),
}
