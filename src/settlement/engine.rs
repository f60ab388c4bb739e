//! The settlement engine.
//!
//! [`SettlementEngine`] owns the pending-settlement arena and executes
//! instructions against a shared [`AssetRegistry`] and [`PoolStore`].
//! Single-operation entry points ([`swap`](SettlementEngine::swap),
//! [`reserve_swap`](SettlementEngine::reserve_swap), ...) are one-instruction
//! transactions; [`execute_transaction`](SettlementEngine::execute_transaction)
//! and [`execute_sequence`](SettlementEngine::execute_sequence) run built
//! instruction lists.
//!
//! # Concurrency
//!
//! The engine is `Send + Sync` and meant to be shared behind an `Arc`.
//! Every execution locks the records it touches in a fixed order:
//! settlement records, then pools, then registry balances, each ascending
//! by id.  Executions over disjoint pools run in parallel.

use core::fmt;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::arena::SettlementArena;
use super::finalizer::Finalizer;
use super::pending::PendingSettlement;
use super::pricing;
use super::receipt::{LiquidityReceipt, Outcome, SwapReceipt};
use super::staging::Staging;
use crate::builder::{Instruction, InstructionSequence, Transaction};
use crate::config::{EngineConfig, PoolConfig};
use crate::domain::{Amount, AssetId, LiquidityIntent, OwnerId, PoolId, SettlementId, Slot, SwapIntent, SwapQuote};
use crate::error::{DexError, Result};
use crate::registry::AssetRegistry;
use crate::store::PoolStore;
use crate::traits::{SequenceReport, SlotClock, TransactionSubmitter};

/// Executes swaps, reservations and liquidity changes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hydra_dex::config::{EngineConfig, PoolConfig};
/// use hydra_dex::domain::{Amount, Asset, AssetId, Decimals, FeeRate, OwnerId, Slot, SwapIntent};
/// use hydra_dex::registry::AssetRegistry;
/// use hydra_dex::settlement::SettlementEngine;
/// use hydra_dex::store::PoolStore;
/// use hydra_dex::traits::ManualClock;
///
/// let registry = Arc::new(AssetRegistry::new());
/// let (x, y) = (AssetId::from_bytes([1; 32]), AssetId::from_bytes([2; 32]));
/// let decimals = Decimals::new(6).expect("valid decimals");
/// registry.register(Asset::new(x, decimals)).expect("x");
/// registry.register(Asset::new(y, decimals)).expect("y");
///
/// let alice = OwnerId::from_bytes([7; 32]);
/// registry.mint(alice, x, Amount::new(10_000)).expect("mint x");
/// registry.mint(alice, y, Amount::new(10_000)).expect("mint y");
///
/// let engine = SettlementEngine::new(
///     EngineConfig::default(),
///     Arc::clone(&registry),
///     Arc::new(PoolStore::new()),
///     Arc::new(ManualClock::new(Slot::new(0))),
/// )
/// .expect("valid config");
/// let config = PoolConfig::new(x, y, FeeRate::STANDARD, Amount::new(1_000), Amount::new(1_000))
///     .expect("valid pool");
/// engine.init_pool(alice, &config).expect("funded pool");
///
/// let intent = SwapIntent::new(alice, x, y, Amount::new(100), Amount::new(90)).expect("intent");
/// let receipt = engine.swap(intent).expect("swap");
/// assert_eq!(receipt.amount_out(), Amount::new(90));
/// ```
pub struct SettlementEngine {
    pub(super) config: EngineConfig,
    pub(super) registry: Arc<AssetRegistry>,
    pub(super) pools: Arc<PoolStore>,
    pub(super) clock: Arc<dyn SlotClock>,
    pub(super) arena: SettlementArena,
}

impl fmt::Debug for SettlementEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("config", &self.config)
            .field("pools", &self.pools.len())
            .field("settlements", &self.arena.len())
            .finish_non_exhaustive()
    }
}

impl SettlementEngine {
    /// Wires an engine to its registry, pool store and clock.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] if `config` does not
    /// validate.
    pub fn new(
        config: EngineConfig,
        registry: Arc<AssetRegistry>,
        pools: Arc<PoolStore>,
        clock: Arc<dyn SlotClock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            pools,
            clock,
            arena: SettlementArena::default(),
        })
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared asset registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<AssetRegistry> {
        &self.registry
    }

    /// Shared pool store.
    #[must_use]
    pub fn pools(&self) -> &Arc<PoolStore> {
        &self.pools
    }

    /// Current slot according to the injected clock.
    #[must_use]
    pub fn now(&self) -> Slot {
        self.clock.now()
    }

    /// Prices an exact-input swap without changing anything.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if no pool trades the pair, or a side is
    ///   the unwrapped native asset.
    /// - Any pricing error (see [`pricing::swap_output`]).
    pub fn quote(&self, asset_in: AssetId, asset_out: AssetId, amount_in: Amount) -> Result<SwapQuote> {
        for asset in [&asset_in, &asset_out] {
            if self.registry.is_native(asset) {
                return Err(DexError::InvalidPair("pools trade the wrapped native asset"));
            }
        }
        let id = self
            .pools
            .find_pool(&asset_in, &asset_out)
            .ok_or(DexError::InvalidPair("no pool trades this pair"))?;
        let pool = self.pools.get_pool(id)?;
        pricing::quote(&pool, &asset_in, amount_in)
    }

    /// Executes a direct swap.
    ///
    /// # Errors
    ///
    /// - [`DexError::StaleSequence`] if the intent pins a sequence the pool
    ///   has moved past.
    /// - [`DexError::SlippageExceeded`] if the output is below the bound.
    /// - [`DexError::InsufficientBalance`] if the owner cannot pay.
    #[instrument(skip(self, intent), fields(owner = %intent.owner(), amount_in = %intent.amount_in()))]
    pub fn swap(&self, intent: SwapIntent) -> Result<SwapReceipt> {
        match self.run_one(Instruction::Swap(intent))? {
            Outcome::Swapped(receipt) => Ok(receipt),
            _ => Err(DexError::OperationMismatch("swap produced no receipt")),
        }
    }

    /// Reserves a swap for later settlement, locking its output.
    ///
    /// The owner's balance is checked now and moved on finalize.
    ///
    /// # Errors
    ///
    /// As [`swap`](Self::swap), plus [`DexError::DuplicateOrder`] if the
    /// intent's salt is held by an unresolved settlement of the same owner.
    #[instrument(skip(self, intent), fields(owner = %intent.owner(), amount_in = %intent.amount_in()))]
    pub fn reserve_swap(&self, intent: SwapIntent) -> Result<PendingSettlement> {
        match self.run_one(Instruction::ReserveSwap(intent))? {
            Outcome::Reserved { settlement, .. } => self.arena.snapshot(settlement),
            _ => Err(DexError::OperationMismatch("reservation produced no settlement")),
        }
    }

    /// Deposits into a pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::OperationMismatch`] if `intent` withdraws.
    /// - [`DexError::RatioMismatch`] if the amounts stray from the pool
    ///   ratio beyond the configured tolerance.
    /// - [`DexError::SlippageExceeded`] if the share bound is missed.
    #[instrument(skip(self, intent), fields(pool = %intent.pool(), owner = %intent.owner()))]
    pub fn add_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        if !intent.is_deposit() {
            return Err(DexError::OperationMismatch("add_liquidity needs a deposit intent"));
        }
        self.run_liquidity(intent)
    }

    /// Withdraws from a pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::OperationMismatch`] if `intent` deposits.
    /// - [`DexError::InsufficientShare`] if the owner holds fewer shares.
    /// - [`DexError::InsufficientLiquidity`] if pending settlements lock the
    ///   payout.
    /// - [`DexError::SlippageExceeded`] if a payout bound is missed.
    #[instrument(skip(self, intent), fields(pool = %intent.pool(), owner = %intent.owner()))]
    pub fn remove_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        if intent.is_deposit() {
            return Err(DexError::OperationMismatch("remove_liquidity needs a withdraw intent"));
        }
        self.run_liquidity(intent)
    }

    /// Creates a pool funded by `founder`.
    ///
    /// # Errors
    ///
    /// - [`DexError::PoolAlreadyExists`] if the pair is taken.
    /// - [`DexError::InvalidPair`] if a side is the unwrapped native asset.
    /// - [`DexError::InsufficientBalance`] if the founder cannot fund it.
    #[instrument(skip(self, config), fields(pair = %config.pair()))]
    pub fn init_pool(&self, founder: OwnerId, config: &PoolConfig) -> Result<PoolId> {
        let instruction = Instruction::InitPool {
            founder,
            config: *config,
        };
        match self.run_one(instruction)? {
            Outcome::PoolCreated { pool, .. } => Ok(pool),
            _ => Err(DexError::OperationMismatch("pool creation produced no pool")),
        }
    }

    /// Executes every instruction, committing all of them or none.
    ///
    /// # Errors
    ///
    /// The first failing instruction's error; no state changes.
    #[instrument(skip(self, transaction), fields(instructions = transaction.len()))]
    pub fn execute_transaction(&self, transaction: &Transaction) -> Result<Vec<Outcome>> {
        self.run(transaction.instructions())
    }

    /// Executes instructions one at a time, stopping at the first failure.
    #[instrument(skip(self, sequence), fields(instructions = sequence.len()))]
    pub fn execute_sequence(&self, sequence: &InstructionSequence) -> SequenceReport {
        let instructions = sequence.instructions();
        if instructions.len() > self.config.max_instructions() {
            return SequenceReport::new(Vec::new(), Some((0, self.too_many(instructions.len()))));
        }
        let mut outcomes = Vec::with_capacity(instructions.len());
        for (index, instruction) in instructions.iter().enumerate() {
            match self.run(core::slice::from_ref(instruction)) {
                Ok(mut done) => outcomes.append(&mut done),
                Err(e) => {
                    warn!(index, %instruction, error = %e, committed = outcomes.len(), "sequence stopped");
                    return SequenceReport::new(outcomes, Some((index, e)));
                }
            }
        }
        SequenceReport::new(outcomes, None)
    }

    /// Snapshot of a settlement record.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownSettlement`] if `id` is not in the arena.
    pub fn get_settlement(&self, id: SettlementId) -> Result<PendingSettlement> {
        self.arena.snapshot(id)
    }

    /// Ids of every settlement record still held, ascending.
    #[must_use]
    pub fn settlement_ids(&self) -> Vec<SettlementId> {
        self.arena.ids()
    }

    /// Number of settlement records still held.
    #[must_use]
    pub fn settlement_count(&self) -> usize {
        self.arena.len()
    }

    /// Drops finalized and reverted records; returns how many went.
    pub fn prune_resolved(&self) -> usize {
        self.arena.prune_resolved()
    }

    /// Finalize/revert handle bound to this engine.
    #[must_use]
    pub const fn finalizer(&self) -> Finalizer<'_> {
        Finalizer::new(self)
    }

    pub(super) fn run_one(&self, instruction: Instruction) -> Result<Outcome> {
        self.run(core::slice::from_ref(&instruction))?
            .pop()
            .ok_or(DexError::EmptyOperationSet)
    }

    fn run_liquidity(&self, intent: LiquidityIntent) -> Result<LiquidityReceipt> {
        match self.run_one(Instruction::Liquidity(intent))? {
            Outcome::Liquidity(receipt) => Ok(receipt),
            _ => Err(DexError::OperationMismatch("liquidity change produced no receipt")),
        }
    }

    fn too_many(&self, count: usize) -> DexError {
        warn!(count, max = self.config.max_instructions(), "instruction list too long");
        DexError::InvalidQuantity("too many instructions in one submission")
    }

    fn run(&self, instructions: &[Instruction]) -> Result<Vec<Outcome>> {
        if instructions.is_empty() {
            return Err(DexError::EmptyOperationSet);
        }
        if instructions.len() > self.config.max_instructions() {
            return Err(self.too_many(instructions.len()));
        }
        let mut staging = Staging::open(self, instructions);
        let mut outcomes = Vec::with_capacity(instructions.len());
        for (index, instruction) in instructions.iter().enumerate() {
            match staging.execute(instruction) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    if instructions.len() > 1 {
                        warn!(index, %instruction, error = %e, "transaction rolled back");
                    }
                    return Err(e);
                }
            }
        }
        staging.commit()?;
        if instructions.len() > 1 {
            info!(instructions = instructions.len(), "transaction committed");
        }
        Ok(outcomes)
    }
}

impl TransactionSubmitter for SettlementEngine {
    fn submit(&self, transaction: &Transaction) -> Result<Vec<Outcome>> {
        self.execute_transaction(transaction)
    }

    fn submit_sequence(&self, sequence: &InstructionSequence) -> SequenceReport {
        self.execute_sequence(sequence)
    }
}
