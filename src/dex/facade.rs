//! Operation-level entry points over a shared [`SettlementEngine`].
//!
//! Every operation family has two entry points:
//!
//! - **manual**: builds an [`InstructionSequence`] and commits it one
//!   instruction at a time.  Swaps go through a reservation that is then
//!   finalized in a second submission, so a different settler can step in.
//! - **transaction**: builds one [`Transaction`](crate::builder::Transaction)
//!   committed all-or-nothing.
//!
//! The `_sol` forms take the native asset on one side; wrapping and
//! unwrapping instructions are added around the operation by
//! [`TransactionBuilder`].

use std::sync::Arc;

use tracing::{info, instrument};

use super::OperationKind;
use crate::builder::{InstructionSequence, TransactionBuilder};
use crate::config::PoolConfig;
use crate::domain::{Amount, AssetId, LiquidityIntent, OwnerId, PoolId, SettlementId, Side, SwapIntent, SwapQuote};
use crate::error::{DexError, Result};
use crate::settlement::{LiquidityReceipt, Outcome, SettlementEngine, SettlementResult, SwapReceipt};
use crate::traits::TransactionSubmitter;

/// Harness-facing facade: one method per named operation.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hydra_dex::config::{EngineConfig, PoolConfig};
/// use hydra_dex::dex::Dex;
/// use hydra_dex::domain::{Amount, Asset, AssetId, Decimals, FeeRate, OwnerId, Slot, SwapIntent};
/// use hydra_dex::registry::AssetRegistry;
/// use hydra_dex::settlement::SettlementEngine;
/// use hydra_dex::store::PoolStore;
/// use hydra_dex::traits::ManualClock;
///
/// let registry = Arc::new(AssetRegistry::new());
/// let d = Decimals::new(6).expect("valid");
/// let (x, y) = (AssetId::from_bytes([1; 32]), AssetId::from_bytes([2; 32]));
/// registry.register(Asset::new(x, d)).expect("x");
/// registry.register(Asset::new(y, d)).expect("y");
/// let user = OwnerId::from_bytes([9; 32]);
/// registry.mint(user, x, Amount::new(5_000)).expect("mint");
/// registry.mint(user, y, Amount::new(5_000)).expect("mint");
///
/// let engine = SettlementEngine::new(
///     EngineConfig::default(),
///     registry,
///     Arc::new(PoolStore::new()),
///     Arc::new(ManualClock::new(Slot::new(0))),
/// )
/// .expect("engine");
/// let dex = Dex::new(Arc::new(engine));
///
/// let config = PoolConfig::new(x, y, FeeRate::STANDARD, Amount::new(1_000), Amount::new(1_000))
///     .expect("config");
/// dex.init_pool(user, &config).expect("pool");
///
/// let intent = SwapIntent::new(user, x, y, Amount::new(100), Amount::new(1)).expect("intent");
/// let result = dex.manual_swap(intent).expect("reserved and finalized");
/// assert!(result.is_finalized());
/// ```
#[derive(Debug, Clone)]
pub struct Dex {
    engine: Arc<SettlementEngine>,
}

impl Dex {
    /// Wraps a shared engine.
    #[must_use]
    pub const fn new(engine: Arc<SettlementEngine>) -> Self {
        Self { engine }
    }

    /// The engine behind the facade.
    #[must_use]
    pub fn engine(&self) -> &Arc<SettlementEngine> {
        &self.engine
    }

    /// `quote`: prices a swap; the native asset is priced as its wrapped
    /// form.
    ///
    /// # Errors
    ///
    /// See [`SettlementEngine::quote`].
    pub fn quote(&self, asset_in: AssetId, asset_out: AssetId, amount_in: Amount) -> Result<SwapQuote> {
        let registry = self.engine.registry();
        self.engine
            .quote(registry.pool_asset(asset_in), registry.pool_asset(asset_out), amount_in)
    }

    // -----------------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------------

    /// `manual_swap`: reserve, then finalize as the owner.
    ///
    /// # Errors
    ///
    /// Any reservation or finalize error.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn manual_swap(&self, intent: SwapIntent) -> Result<SettlementResult> {
        let id = self.manual_reserve(intent)?;
        self.manual_finalize(id, intent.owner())
    }

    /// `manual_swap_different_settler`: reserve naming `settler`, who then
    /// finalizes.
    ///
    /// # Errors
    ///
    /// Any reservation or finalize error.
    #[instrument(skip(self, intent), fields(owner = %intent.owner(), settler = %settler))]
    pub fn manual_swap_different_settler(&self, intent: SwapIntent, settler: OwnerId) -> Result<SettlementResult> {
        let id = self.manual_reserve(intent.with_settler(settler))?;
        self.manual_finalize(id, settler)
    }

    /// `manual_swap_slash`: finalize an expired reservation, returning the
    /// capacity released back to the pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::OperationMismatch`] if the reservation has not expired.
    /// - Any finalize error.
    #[instrument(skip(self), fields(settlement = %settlement))]
    pub fn manual_swap_slash(&self, settlement: SettlementId, caller: OwnerId) -> Result<Amount> {
        let record = self.engine.get_settlement(settlement)?;
        if !record.is_expired(self.engine.now()) {
            return Err(DexError::OperationMismatch("settlement has not expired"));
        }
        match self.manual_finalize(settlement, caller)? {
            SettlementResult::Slashed { released, .. } => Ok(released),
            SettlementResult::Finalized(_) => Err(DexError::OperationMismatch("expired settlement finalized")),
        }
    }

    /// Reserves a swap through the manual path and returns its handle.
    ///
    /// # Errors
    ///
    /// Any reservation error.
    pub fn manual_reserve(&self, intent: SwapIntent) -> Result<SettlementId> {
        let sequence = TransactionBuilder::new().reserve_swap(intent).build_sequence()?;
        reserved(&self.run_sequence(&sequence)?)
    }

    /// Finalizes a reservation through the manual path.
    ///
    /// # Errors
    ///
    /// Any finalize error.
    pub fn manual_finalize(&self, settlement: SettlementId, settler: OwnerId) -> Result<SettlementResult> {
        let sequence = TransactionBuilder::new()
            .finalize(settlement, settler)
            .build_sequence()?;
        settled(&self.run_sequence(&sequence)?)
    }

    /// `swap`: direct swap in one transaction.
    ///
    /// # Errors
    ///
    /// Any swap error; nothing changes on failure.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn swap(&self, intent: SwapIntent) -> Result<SwapReceipt> {
        let tx = TransactionBuilder::new().swap(intent).build_transaction()?;
        swapped(&self.engine.submit(&tx)?)
    }

    /// `swap_different_settler`: a reservation transaction naming
    /// `settler`, followed by the settler's finalize transaction.
    ///
    /// # Errors
    ///
    /// Any reservation or finalize error.  A failed finalize leaves the
    /// reservation in place for a retry or a revert.
    #[instrument(skip(self, intent), fields(owner = %intent.owner(), settler = %settler))]
    pub fn swap_different_settler(&self, intent: SwapIntent, settler: OwnerId) -> Result<SettlementResult> {
        let reserve = TransactionBuilder::new()
            .reserve_swap(intent.with_settler(settler))
            .build_transaction()?;
        let id = reserved(&self.engine.submit(&reserve)?)?;
        let finalize = TransactionBuilder::new().finalize(id, settler).build_transaction()?;
        settled(&self.engine.submit(&finalize)?)
    }

    /// `manual_swap_from_sol`: wrap and reserve, then finalize.
    ///
    /// The wrap and the reservation run as a manual sequence, so a failed
    /// reservation leaves the owner's native units wrapped.
    ///
    /// # Errors
    ///
    /// - [`DexError::NativeAssetMissing`] without a native asset.
    /// - [`DexError::InvalidPair`] if the input is not the native asset.
    /// - Any reservation or finalize error.  The wrap stays committed if the
    ///   reservation fails.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn manual_swap_from_sol(&self, intent: SwapIntent) -> Result<SettlementResult> {
        let native = self.native()?;
        if intent.asset_in() != native {
            return Err(DexError::InvalidPair("input must be the native asset"));
        }
        let sequence = TransactionBuilder::new()
            .reserve_swap_native(intent, native)?
            .build_sequence()?;
        let id = reserved(&self.run_sequence(&sequence)?)?;
        self.manual_finalize(id, intent.owner())
    }

    /// `manual_swap_to_sol`: reserve, then finalize and unwrap.
    ///
    /// The unwrap converts the owner's entire wrapped balance, see
    /// [`TransactionBuilder::finalize_native`].
    ///
    /// # Errors
    ///
    /// - [`DexError::NativeAssetMissing`] without a native asset.
    /// - [`DexError::InvalidPair`] if the output is not the native asset.
    /// - Any reservation or finalize error.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn manual_swap_to_sol(&self, intent: SwapIntent) -> Result<SettlementResult> {
        let native = self.native()?;
        if intent.asset_out() != native {
            return Err(DexError::InvalidPair("output must be the native asset"));
        }
        let reserve = TransactionBuilder::new()
            .reserve_swap_native(intent, native)?
            .build_sequence()?;
        let id = reserved(&self.run_sequence(&reserve)?)?;
        let finalize = TransactionBuilder::new()
            .finalize_native(id, intent.owner(), intent.owner())
            .build_sequence()?;
        settled(&self.run_sequence(&finalize)?)
    }

    /// `swap_from_sol`: wrap and swap in one transaction.
    ///
    /// # Errors
    ///
    /// As [`manual_swap_from_sol`](Self::manual_swap_from_sol); nothing
    /// changes on failure.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn swap_from_sol(&self, intent: SwapIntent) -> Result<SwapReceipt> {
        let native = self.native()?;
        if intent.asset_in() != native {
            return Err(DexError::InvalidPair("input must be the native asset"));
        }
        self.swap_native(intent, native)
    }

    /// `swap_to_sol`: swap and unwrap in one transaction.
    ///
    /// Like [`TransactionBuilder::swap_native`], the unwrap converts the
    /// owner's entire wrapped balance.
    ///
    /// # Errors
    ///
    /// As [`manual_swap_to_sol`](Self::manual_swap_to_sol); nothing changes
    /// on failure.
    #[instrument(skip(self, intent), fields(owner = %intent.owner()))]
    pub fn swap_to_sol(&self, intent: SwapIntent) -> Result<SwapReceipt> {
        let native = self.native()?;
        if intent.asset_out() != native {
            return Err(DexError::InvalidPair("output must be the native asset"));
        }
        self.swap_native(intent, native)
    }

    // -----------------------------------------------------------------------
    // Liquidity
    // -----------------------------------------------------------------------

    /// `manual_add_liquidity`.
    ///
    /// # Errors
    ///
    /// [`DexError::OperationMismatch`] for a withdrawal, or any deposit
    /// error.
    pub fn manual_add_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, true)?;
        let sequence = TransactionBuilder::new().liquidity(intent).build_sequence()?;
        liquidity(&self.run_sequence(&sequence)?)
    }

    /// `add_liquidity`.
    ///
    /// # Errors
    ///
    /// [`DexError::OperationMismatch`] for a withdrawal, or any deposit
    /// error.
    pub fn add_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, true)?;
        let tx = TransactionBuilder::new().liquidity(intent).build_transaction()?;
        liquidity(&self.engine.submit(&tx)?)
    }

    /// `manual_remove_liquidity`.
    ///
    /// # Errors
    ///
    /// [`DexError::OperationMismatch`] for a deposit, or any withdrawal
    /// error.
    pub fn manual_remove_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, false)?;
        let sequence = TransactionBuilder::new().liquidity(intent).build_sequence()?;
        liquidity(&self.run_sequence(&sequence)?)
    }

    /// `remove_liquidity`.
    ///
    /// # Errors
    ///
    /// [`DexError::OperationMismatch`] for a deposit, or any withdrawal
    /// error.
    pub fn remove_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, false)?;
        let tx = TransactionBuilder::new().liquidity(intent).build_transaction()?;
        liquidity(&self.engine.submit(&tx)?)
    }

    /// `manual_add_liquidity_sol`: wrap the native side, then deposit.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if the pool does not hold the wrapped
    ///   native asset.
    /// - [`DexError::OperationMismatch`] for a withdrawal.
    /// - Any deposit error.  The wrap stays committed if the deposit fails.
    pub fn manual_add_liquidity_sol(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, true)?;
        let sequence = self.native_liquidity(intent)?.build_sequence()?;
        liquidity(&self.run_sequence(&sequence)?)
    }

    /// `add_liquidity_sol`: wrap and deposit in one transaction.
    ///
    /// # Errors
    ///
    /// As [`manual_add_liquidity_sol`](Self::manual_add_liquidity_sol);
    /// nothing changes on failure.
    pub fn add_liquidity_sol(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, true)?;
        let tx = self.native_liquidity(intent)?.build_transaction()?;
        liquidity(&self.engine.submit(&tx)?)
    }

    /// `manual_remove_liquidity_sol`: withdraw, then unwrap.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if the pool does not hold the wrapped
    ///   native asset.
    /// - [`DexError::OperationMismatch`] for a deposit.
    /// - Any withdrawal error.
    pub fn manual_remove_liquidity_sol(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, false)?;
        let sequence = self.native_liquidity(intent)?.build_sequence()?;
        liquidity(&self.run_sequence(&sequence)?)
    }

    /// `remove_liquidity_sol`: withdraw and unwrap in one transaction.
    ///
    /// # Errors
    ///
    /// As [`manual_remove_liquidity_sol`](Self::manual_remove_liquidity_sol);
    /// nothing changes on failure.
    pub fn remove_liquidity_sol(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        expect_deposit(&intent, false)?;
        let tx = self.native_liquidity(intent)?.build_transaction()?;
        liquidity(&self.engine.submit(&tx)?)
    }

    // -----------------------------------------------------------------------
    // Pool initialization
    // -----------------------------------------------------------------------

    /// `manual_init_pool`.
    ///
    /// # Errors
    ///
    /// Any pool-creation error.
    pub fn manual_init_pool(&self, founder: OwnerId, config: &PoolConfig) -> Result<PoolId> {
        let sequence = TransactionBuilder::new()
            .init_pool(founder, *config)
            .build_sequence()?;
        created(&self.run_sequence(&sequence)?)
    }

    /// `init_pool`.
    ///
    /// # Errors
    ///
    /// Any pool-creation error; nothing changes on failure.
    pub fn init_pool(&self, founder: OwnerId, config: &PoolConfig) -> Result<PoolId> {
        let tx = TransactionBuilder::new()
            .init_pool(founder, *config)
            .build_transaction()?;
        created(&self.engine.submit(&tx)?)
    }

    /// `init_pool_sol`: wrap the founder's native side and create the pool
    /// against the wrapped asset, in one transaction.
    ///
    /// # Errors
    ///
    /// - [`DexError::NativeAssetMissing`] without a native asset.
    /// - [`DexError::InvalidPair`] if neither side is native.
    /// - Any pool-creation error; nothing changes on failure.
    pub fn init_pool_sol(&self, founder: OwnerId, config: &PoolConfig) -> Result<PoolId> {
        let native = self.native()?;
        let tx = TransactionBuilder::new()
            .init_pool_native(founder, *config, native)?
            .build_transaction()?;
        created(&self.engine.submit(&tx)?)
    }

    /// Operations this facade serves, for harness listings.
    #[must_use]
    pub const fn operations() -> [OperationKind; 21] {
        OperationKind::ALL
    }

    fn native(&self) -> Result<AssetId> {
        self.engine
            .registry()
            .native_asset()
            .ok_or(DexError::NativeAssetMissing)
    }

    fn swap_native(&self, intent: SwapIntent, native: AssetId) -> Result<SwapReceipt> {
        let tx = TransactionBuilder::new()
            .swap_native(intent, native)?
            .build_transaction()?;
        swapped(&self.engine.submit(&tx)?)
    }

    fn native_liquidity(&self, intent: LiquidityIntent) -> Result<TransactionBuilder> {
        let wrapped = self.engine.registry().wrapped_native()?;
        let pool = self.engine.pools().get_pool(intent.pool())?;
        let side: Side = pool
            .pair()
            .side_of(&wrapped)
            .map_err(|_| DexError::InvalidPair("pool does not trade the native asset"))?;
        Ok(TransactionBuilder::new().liquidity_native(intent, side))
    }

    fn run_sequence(&self, sequence: &InstructionSequence) -> Result<Vec<Outcome>> {
        let report = self.engine.submit_sequence(sequence);
        if let Some(&(index, ref error)) = report.failure() {
            if index > 0 {
                info!(committed = index, error = %error, "manual sequence stopped part-way");
            }
        }
        report.into_result()
    }
}

fn expect_deposit(intent: &LiquidityIntent, deposit: bool) -> Result<()> {
    match (intent.is_deposit(), deposit) {
        (true, false) => Err(DexError::OperationMismatch("remove needs a withdraw intent")),
        (false, true) => Err(DexError::OperationMismatch("add needs a deposit intent")),
        _ => Ok(()),
    }
}

fn reserved(outcomes: &[Outcome]) -> Result<SettlementId> {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::Reserved { settlement, .. } => Some(*settlement),
            _ => None,
        })
        .ok_or(DexError::OperationMismatch("no reservation in outcomes"))
}

fn settled(outcomes: &[Outcome]) -> Result<SettlementResult> {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::Settled(result) => Some(*result),
            _ => None,
        })
        .ok_or(DexError::OperationMismatch("no settlement result in outcomes"))
}

fn swapped(outcomes: &[Outcome]) -> Result<SwapReceipt> {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::Swapped(receipt) => Some(*receipt),
            _ => None,
        })
        .ok_or(DexError::OperationMismatch("no swap receipt in outcomes"))
}

fn liquidity(outcomes: &[Outcome]) -> Result<LiquidityReceipt> {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::Liquidity(receipt) => Some(*receipt),
            _ => None,
        })
        .ok_or(DexError::OperationMismatch("no liquidity receipt in outcomes"))
}

fn created(outcomes: &[Outcome]) -> Result<PoolId> {
    outcomes
        .iter()
        .find_map(|o| match o {
            Outcome::PoolCreated { pool, .. } => Some(*pool),
            _ => None,
        })
        .ok_or(DexError::OperationMismatch("no pool creation in outcomes"))
}
