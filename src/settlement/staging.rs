//! Staged execution of a batch of instructions.
//!
//! [`Staging::open`] locks every settlement record and pool the batch
//! touches (records first, then pools, each in ascending id order) and
//! works on copies.  Balance movements are checked against an overlay and
//! collected as registry legs.  Nothing is visible until
//! [`Staging::commit`], which claims salts, publishes new pools, applies all
//! legs atomically and writes the copies back under the held locks.
//! Dropping a `Staging` without committing discards everything.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use super::arena::{held_on, InputHold, SaltClaim, SettlementGuard};
use super::pending::{PendingSettlement, SettlementState};
use super::pricing;
use super::receipt::{LiquidityReceipt, Outcome, SettlementResult, SwapReceipt};
use super::SettlementEngine;
use crate::builder::Instruction;
use crate::config::PoolConfig;
use crate::domain::{
    Amount, AssetId, AssetPair, LiquidityAction, LiquidityIntent, LpShares, OwnerId, PoolId, Salt,
    SettlementId, Side, Slot, SwapIntent, SwapQuote,
};
use crate::error::{DexError, Result};
use crate::math::CheckedArithmetic;
use crate::registry::{AssetRegistry, Leg};
use crate::store::{Pool, PoolGuard, PoolUpdate};

struct StagedPool {
    guard: PoolGuard,
    working: Pool,
}

struct StagedSettlement {
    guard: SettlementGuard,
    working: PendingSettlement,
}

#[derive(Default)]
struct PoolSet {
    locked: BTreeMap<PoolId, StagedPool>,
    created: BTreeMap<PoolId, Pool>,
}

impl PoolSet {
    fn get_mut(&mut self, id: PoolId) -> Result<&mut Pool> {
        if let Some(pool) = self.created.get_mut(&id) {
            return Ok(pool);
        }
        self.locked
            .get_mut(&id)
            .map(|staged| &mut staged.working)
            .ok_or(DexError::UnknownPool(id))
    }

    fn created_with_pair(&self, pair: AssetPair) -> Option<PoolId> {
        self.created
            .values()
            .find(|pool| pool.pair() == pair)
            .map(Pool::id)
    }
}

#[derive(Default)]
struct SettlementSet {
    locked: BTreeMap<SettlementId, StagedSettlement>,
    created: BTreeMap<SettlementId, PendingSettlement>,
    claimed: Vec<SaltClaim>,
    released: Vec<SaltClaim>,
    held: Vec<InputHold>,
    freed: Vec<InputHold>,
}

impl SettlementSet {
    fn get_mut(&mut self, id: SettlementId) -> Result<&mut PendingSettlement> {
        if let Some(record) = self.created.get_mut(&id) {
            return Ok(record);
        }
        self.locked
            .get_mut(&id)
            .map(|staged| &mut staged.working)
            .ok_or(DexError::UnknownSettlement(id))
    }

    /// Holds this batch adds on `(owner, asset)`, net of those it frees.
    fn net_held(&self, owner: &OwnerId, asset: &AssetId) -> (Amount, Amount) {
        (held_on(&self.held, owner, asset), held_on(&self.freed, owner, asset))
    }

    fn claimed_by(&self, owner: &OwnerId, salt: &Salt) -> Option<SettlementId> {
        self.claimed
            .iter()
            .find(|(o, s, _)| o == owner && s == salt)
            .map(|(_, _, id)| *id)
    }
}

/// Staged balances on top of the registry.
struct BalanceOverlay<'r> {
    registry: &'r AssetRegistry,
    balances: HashMap<(OwnerId, AssetId), Amount>,
    legs: Vec<Leg>,
}

impl<'r> BalanceOverlay<'r> {
    fn new(registry: &'r AssetRegistry) -> Self {
        Self {
            registry,
            balances: HashMap::new(),
            legs: Vec::new(),
        }
    }

    fn balance(&mut self, owner: OwnerId, asset: AssetId) -> Amount {
        let registry = self.registry;
        *self
            .balances
            .entry((owner, asset))
            .or_insert_with(|| registry.balance_of(&owner, &asset))
    }

    /// Staged balance without caching a registry read.
    fn peek(&self, owner: &OwnerId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(*owner, *asset))
            .copied()
            .unwrap_or_else(|| self.registry.balance_of(owner, asset))
    }

    fn ensure_covers(&mut self, owner: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        let available = self.balance(owner, asset);
        if available < amount {
            return Err(DexError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    fn debit(&mut self, owner: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        self.ensure_covers(owner, asset, amount)?;
        let next = self.balance(owner, asset).safe_sub(&amount)?;
        self.balances.insert((owner, asset), next);
        Ok(())
    }

    fn credit(&mut self, owner: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        let next = self.balance(owner, asset).safe_add(&amount)?;
        self.balances.insert((owner, asset), next);
        Ok(())
    }

    fn transfer(&mut self, from: OwnerId, to: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.debit(from, asset, amount)?;
        self.credit(to, asset, amount)?;
        self.legs.push(Leg::Transfer {
            from,
            to,
            asset,
            amount,
        });
        Ok(())
    }

    /// Burns `from_asset` and mints `to_asset` for the same owner, 1:1.
    fn convert(&mut self, owner: OwnerId, from_asset: AssetId, to_asset: AssetId, amount: Amount) -> Result<()> {
        self.debit(owner, from_asset, amount)?;
        self.credit(owner, to_asset, amount)?;
        self.legs.push(Leg::Burn {
            from: owner,
            asset: from_asset,
            amount,
        });
        self.legs.push(Leg::Mint {
            to: owner,
            asset: to_asset,
            amount,
        });
        Ok(())
    }
}

pub(super) struct Staging<'e> {
    engine: &'e SettlementEngine,
    now: Slot,
    pools: PoolSet,
    settlements: SettlementSet,
    balances: BalanceOverlay<'e>,
}

impl<'e> Staging<'e> {
    /// Locks everything `instructions` reference that already exists.
    ///
    /// Ids that do not resolve here are left for the instruction to report
    /// (they may be created earlier in the same batch).
    pub(super) fn open(engine: &'e SettlementEngine, instructions: &[Instruction]) -> Self {
        let mut settlements = SettlementSet::default();
        let mut pool_ids = BTreeSet::new();

        let settlement_ids: BTreeSet<SettlementId> = instructions
            .iter()
            .filter_map(|ix| match ix {
                Instruction::FinalizeSwap { settlement, .. }
                | Instruction::RevertSwap { settlement, .. } => Some(*settlement),
                _ => None,
            })
            .collect();
        for id in settlement_ids {
            if let Ok(guard) = engine.arena.lock(id) {
                pool_ids.insert(guard.pool());
                let working = (*guard).clone();
                settlements.locked.insert(id, StagedSettlement { guard, working });
            }
        }

        for ix in instructions {
            match ix {
                Instruction::Swap(intent) | Instruction::ReserveSwap(intent) => {
                    if let Some(id) = engine.pools.find_pool(&intent.asset_in(), &intent.asset_out()) {
                        pool_ids.insert(id);
                    }
                }
                Instruction::Liquidity(intent) => {
                    pool_ids.insert(intent.pool());
                }
                _ => {}
            }
        }

        let mut pools = PoolSet::default();
        for id in pool_ids {
            if let Ok(guard) = engine.pools.lock(id) {
                let working = (*guard).clone();
                pools.locked.insert(id, StagedPool { guard, working });
            }
        }

        Self {
            engine,
            now: engine.clock.now(),
            pools,
            settlements,
            balances: BalanceOverlay::new(&engine.registry),
        }
    }

    pub(super) fn execute(&mut self, instruction: &Instruction) -> Result<Outcome> {
        match instruction {
            Instruction::WrapNative { owner, amount } => self.wrap_native(*owner, *amount),
            Instruction::UnwrapNative { owner, amount } => self.unwrap_native(*owner, *amount),
            Instruction::InitPool { founder, config } => self.init_pool(*founder, config),
            Instruction::Swap(intent) => self.swap(intent),
            Instruction::ReserveSwap(intent) => self.reserve_swap(intent),
            Instruction::FinalizeSwap {
                settlement,
                settler,
            } => self.finalize(*settlement, *settler),
            Instruction::RevertSwap { settlement, caller } => self.revert(*settlement, *caller),
            Instruction::Liquidity(intent) => self.liquidity(intent),
        }
    }

    /// Publishes every staged change, or nothing.
    pub(super) fn commit(self) -> Result<()> {
        let Self {
            engine,
            pools,
            settlements,
            balances,
            ..
        } = self;

        engine.arena.claim_salts(&settlements.claimed)?;
        if let Err(e) = engine
            .arena
            .hold_inputs(&settlements.held, &settlements.freed, |owner, asset| balances.peek(owner, asset))
        {
            engine.arena.release_salts(&settlements.claimed);
            return Err(e);
        }

        let mut published = Vec::with_capacity(pools.created.len());
        for pool in pools.created.into_values() {
            match engine.pools.insert_locked(pool) {
                Ok(guard) => published.push(guard),
                Err(e) => {
                    abandon(engine, published, &settlements);
                    return Err(e);
                }
            }
        }

        if !balances.legs.is_empty() {
            if let Err(e) = engine.registry.apply(&balances.legs) {
                abandon(engine, published, &settlements);
                return Err(e);
            }
        }

        let mut held: Vec<PoolGuard> = Vec::with_capacity(pools.locked.len());
        for StagedPool { mut guard, working } in pools.locked.into_values() {
            *guard = working;
            held.push(guard);
        }
        let mut records: Vec<SettlementGuard> = Vec::with_capacity(settlements.locked.len());
        for StagedSettlement { mut guard, working } in settlements.locked.into_values() {
            *guard = working;
            records.push(guard);
        }
        for record in settlements.created.into_values() {
            engine.arena.insert(record);
        }
        engine.arena.release_salts(&settlements.released);
        engine.arena.release_inputs(&settlements.freed);
        debug!(
            pools = held.len() + published.len(),
            settlements = records.len(),
            legs = balances.legs.len(),
            "staged batch committed"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Native wrapping
    // -----------------------------------------------------------------------

    fn wrap_native(&mut self, owner: OwnerId, amount: Amount) -> Result<Outcome> {
        if amount.is_zero() {
            return Err(DexError::InvalidQuantity("wrap amount must be non-zero"));
        }
        let native = self
            .engine
            .registry
            .native_asset()
            .ok_or(DexError::NativeAssetMissing)?;
        self.balances
            .convert(owner, native, AssetId::wrapped_of(native), amount)?;
        Ok(Outcome::Wrapped { owner, amount })
    }

    fn unwrap_native(&mut self, owner: OwnerId, amount: Option<Amount>) -> Result<Outcome> {
        let native = self
            .engine
            .registry
            .native_asset()
            .ok_or(DexError::NativeAssetMissing)?;
        let wrapped = AssetId::wrapped_of(native);
        let amount = match amount {
            Some(a) if a.is_zero() => {
                return Err(DexError::InvalidQuantity("unwrap amount must be non-zero"));
            }
            Some(a) => a,
            None => self.balances.balance(owner, wrapped),
        };
        if !amount.is_zero() {
            self.balances.convert(owner, wrapped, native, amount)?;
        }
        Ok(Outcome::Unwrapped { owner, amount })
    }

    // -----------------------------------------------------------------------
    // Pools
    // -----------------------------------------------------------------------

    fn ensure_pool_asset(&self, asset: &AssetId) -> Result<()> {
        let registry = &self.engine.registry;
        if registry.is_native(asset) {
            return Err(DexError::InvalidPair("pools trade the wrapped native asset"));
        }
        registry.ensure_registered(asset)
    }

    fn init_pool(&mut self, founder: OwnerId, config: &PoolConfig) -> Result<Outcome> {
        self.ensure_pool_asset(&config.asset_a())?;
        self.ensure_pool_asset(&config.asset_b())?;
        if let Some(existing) = self.pools.created_with_pair(config.pair()) {
            return Err(DexError::PoolAlreadyExists(existing));
        }
        let pool = self
            .engine
            .pools
            .prepare(&self.engine.registry, config, founder)?;
        let pair = pool.pair();
        let vault = pool.vault();
        self.balances
            .transfer(founder, vault, pair.first(), pool.reserve(Side::A))?;
        self.balances
            .transfer(founder, vault, pair.second(), pool.reserve(Side::B))?;
        let outcome = Outcome::PoolCreated {
            pool: pool.id(),
            shares: pool.total_shares(),
        };
        self.pools.created.insert(pool.id(), pool);
        Ok(outcome)
    }

    fn resolve_pool(&self, asset_in: &AssetId, asset_out: &AssetId) -> Result<PoolId> {
        self.ensure_pool_asset(asset_in)?;
        self.ensure_pool_asset(asset_out)?;
        let pair = AssetPair::new(*asset_in, *asset_out)?;
        if let Some(id) = self.pools.created_with_pair(pair) {
            return Ok(id);
        }
        self.engine
            .pools
            .find_pool(asset_in, asset_out)
            .ok_or(DexError::InvalidPair("no pool trades this pair"))
    }

    // -----------------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------------

    /// Prices `intent` against the staged pool, enforcing the pinned
    /// sequence and the slippage bound.
    fn price(&mut self, intent: &SwapIntent) -> Result<(Side, SwapQuote)> {
        let id = self.resolve_pool(&intent.asset_in(), &intent.asset_out())?;
        let pool = self.pools.get_mut(id)?;
        if let Some(expected) = intent.expected_sequence() {
            if expected != pool.sequence() {
                warn!(pool = %id, expected, actual = pool.sequence(), "swap priced against stale pool");
                return Err(DexError::StaleSequence {
                    expected,
                    actual: pool.sequence(),
                });
            }
        }
        let side_in = pool.pair().side_of(&intent.asset_in())?;
        let quote = pricing::quote(pool, &intent.asset_in(), intent.amount_in())?;
        if quote.amount_out() < intent.min_output() {
            return Err(DexError::SlippageExceeded {
                bound: intent.min_output(),
                actual: quote.amount_out(),
            });
        }
        debug!(pool = %id, amount_in = %quote.amount_in(), amount_out = %quote.amount_out(), fee = %quote.fee(), "swap priced");
        Ok((side_in, quote))
    }

    /// Moves the swap's reserves and balances; shared by direct swaps and
    /// finalized reservations.
    fn settle_swap(&mut self, intent: &SwapIntent, side_in: Side, quote: SwapQuote, locked: bool) -> Result<SwapReceipt> {
        let side_out = side_in.opposite();
        let owner = intent.owner();
        let mut update = PoolUpdate::new()
            .credit(side_in, quote.amount_in())
            .debit(side_out, quote.amount_out());
        if locked {
            update = update.unlock(side_out, quote.amount_out());
        }
        let pool = self.pools.get_mut(quote.pool())?;
        pool.apply(pool.sequence(), &update)?;
        let (vault, sequence) = (pool.vault(), pool.sequence());

        self.balances
            .transfer(owner, vault, intent.asset_in(), quote.amount_in())?;
        self.balances
            .transfer(vault, owner, intent.asset_out(), quote.amount_out())?;
        Ok(SwapReceipt::new(
            quote.pool(),
            owner,
            intent.asset_in(),
            intent.asset_out(),
            quote.amount_in(),
            quote.amount_out(),
            quote.fee(),
            sequence,
        ))
    }

    fn swap(&mut self, intent: &SwapIntent) -> Result<Outcome> {
        self.balances
            .ensure_covers(intent.owner(), intent.asset_in(), intent.amount_in())?;
        let (side_in, quote) = self.price(intent)?;
        let receipt = self.settle_swap(intent, side_in, quote, false)?;
        info!(
            pool = %receipt.pool(),
            owner = %receipt.owner(),
            amount_in = %receipt.amount_in(),
            amount_out = %receipt.amount_out(),
            "swap executed"
        );
        Ok(Outcome::Swapped(receipt))
    }

    fn reserve_swap(&mut self, intent: &SwapIntent) -> Result<Outcome> {
        let owner = intent.owner();
        self.ensure_unreserved_covers(intent)?;
        if let Some(salt) = intent.salt() {
            let holder = self
                .engine
                .arena
                .salt_holder(&owner, &salt)
                .or_else(|| self.settlements.claimed_by(&owner, &salt));
            if let Some(holder) = holder {
                return Err(DexError::DuplicateOrder(holder));
            }
        }

        let (side_in, quote) = self.price(intent)?;
        let pool = self.pools.get_mut(quote.pool())?;
        pool.apply(
            pool.sequence(),
            &PoolUpdate::new().lock(side_in.opposite(), quote.amount_out()),
        )?;

        let id = self.engine.arena.allocate();
        let expires_at = self
            .now
            .saturating_add(self.engine.config.settlement_ttl_slots());
        let record = PendingSettlement::new(id, *intent, quote, side_in, self.now, expires_at);
        self.settlements.created.insert(id, record);
        if let Some(salt) = intent.salt() {
            self.settlements.claimed.push((owner, salt, id));
        }
        self.settlements
            .held
            .push((owner, intent.asset_in(), intent.amount_in()));
        info!(settlement = %id, pool = %quote.pool(), locked = %quote.amount_out(), %expires_at, "swap reserved");
        Ok(Outcome::Reserved {
            settlement: id,
            quote,
            expires_at,
        })
    }

    /// Fails unless the owner's balance, less the input every unresolved
    /// reservation already promised, covers `intent`.
    fn ensure_unreserved_covers(&mut self, intent: &SwapIntent) -> Result<()> {
        let (owner, asset) = (intent.owner(), intent.asset_in());
        let (held, freed) = self.settlements.net_held(&owner, &asset);
        let promised = self
            .engine
            .arena
            .reserved_input(&owner, &asset)
            .checked_add(&held)
            .unwrap_or(Amount::MAX)
            .checked_sub(&freed)
            .unwrap_or(Amount::ZERO);
        let available = self
            .balances
            .balance(owner, asset)
            .checked_sub(&promised)
            .unwrap_or(Amount::ZERO);
        if available < intent.amount_in() {
            warn!(owner = %owner, asset = %asset, %promised, "reservation exceeds unreserved balance");
            return Err(DexError::InsufficientBalance {
                requested: intent.amount_in(),
                available,
            });
        }
        Ok(())
    }

    /// Marks a reservation reverted and stages the release of its lock.
    fn release(&mut self, id: SettlementId) -> Result<Amount> {
        let record = self.settlements.get_mut(id)?;
        record.resolve(SettlementState::Reverted);
        let intent = *record.intent();
        let side_out = record.input_side().opposite();
        let (pool_id, released) = (record.pool(), record.locked_output());

        let pool = self.pools.get_mut(pool_id)?;
        pool.apply(pool.sequence(), &PoolUpdate::new().unlock(side_out, released))?;
        self.unclaim(&intent, id);
        Ok(released)
    }

    /// Stages the release of a resolved reservation's salt and input hold.
    fn unclaim(&mut self, intent: &SwapIntent, id: SettlementId) {
        if let Some(salt) = intent.salt() {
            self.settlements.released.push((intent.owner(), salt, id));
        }
        self.settlements
            .freed
            .push((intent.owner(), intent.asset_in(), intent.amount_in()));
    }

    fn finalize(&mut self, id: SettlementId, settler: OwnerId) -> Result<Outcome> {
        let now = self.now;
        let record = self.settlements.get_mut(id)?;
        record.ensure_reserved()?;
        if record.is_expired(now) {
            let released = self.release(id)?;
            warn!(settlement = %id, %now, "finalize after expiry; reservation slashed");
            return Ok(Outcome::Settled(SettlementResult::Slashed {
                settlement: id,
                released,
            }));
        }

        let intent = *record.intent();
        let (side_in, quote) = (record.input_side(), record.quote());
        let policy = self.engine.config.settler_policy();
        if !policy.permits(&settler, &intent.owner(), intent.settler().as_ref()) {
            return Err(DexError::UnauthorizedSettler { id, caller: settler });
        }
        record.resolve(SettlementState::Finalized);
        self.unclaim(&intent, id);

        let receipt = self.settle_swap(&intent, side_in, quote, true)?;
        info!(settlement = %id, settler = %settler, amount_out = %receipt.amount_out(), "settlement finalized");
        Ok(Outcome::Settled(SettlementResult::Finalized(receipt)))
    }

    fn revert(&mut self, id: SettlementId, caller: OwnerId) -> Result<Outcome> {
        let now = self.now;
        let record = self.settlements.get_mut(id)?;
        record.ensure_reserved()?;
        let expired = record.is_expired(now);
        if !expired {
            let intent = record.intent();
            let policy = self.engine.config.settler_policy();
            if !policy.permits(&caller, &intent.owner(), intent.settler().as_ref()) {
                return Err(DexError::UnauthorizedSettler { id, caller });
            }
        }
        let released = self.release(id)?;
        if expired {
            warn!(settlement = %id, caller = %caller, %released, "expired reservation reverted");
        } else {
            info!(settlement = %id, caller = %caller, %released, "settlement reverted");
        }
        Ok(Outcome::Reverted {
            settlement: id,
            released,
        })
    }

    // -----------------------------------------------------------------------
    // Liquidity
    // -----------------------------------------------------------------------

    fn liquidity(&mut self, intent: &LiquidityIntent) -> Result<Outcome> {
        let owner = intent.owner();
        let tolerance = self.engine.config.ratio_tolerance();
        let pool = self.pools.get_mut(intent.pool())?;
        let pair = pool.pair();
        let vault = pool.vault();
        let (reserve_a, reserve_b) = (pool.reserve(Side::A), pool.reserve(Side::B));
        let total = pool.total_shares();

        let (amount_a, amount_b, shares, update) = match intent.action() {
            LiquidityAction::Deposit {
                amount_a,
                amount_b,
                min_shares,
            } => {
                let minted =
                    pricing::deposit_shares(amount_a, amount_b, reserve_a, reserve_b, total, tolerance)?;
                if minted < min_shares {
                    return Err(DexError::SlippageExceeded {
                        bound: Amount::new(min_shares.get()),
                        actual: Amount::new(minted.get()),
                    });
                }
                (amount_a, amount_b, minted, deposit_update(owner, amount_a, amount_b, minted))
            }
            LiquidityAction::DepositForShares {
                shares,
                max_a,
                max_b,
            } => {
                if total.is_zero() {
                    return Err(DexError::InsufficientLiquidity);
                }
                let cost_a = pricing::share_cost(shares, reserve_a, total)?;
                let cost_b = pricing::share_cost(shares, reserve_b, total)?;
                for (cost, max) in [(cost_a, max_a), (cost_b, max_b)] {
                    if cost > max {
                        return Err(DexError::SlippageExceeded {
                            bound: max,
                            actual: cost,
                        });
                    }
                }
                (cost_a, cost_b, shares, deposit_update(owner, cost_a, cost_b, shares))
            }
            LiquidityAction::Withdraw {
                shares,
                min_a,
                min_b,
            } => {
                let owned = pool.shares_of(&owner);
                if shares > owned {
                    return Err(DexError::InsufficientShare {
                        requested: shares,
                        owned,
                    });
                }
                let pay_a = pricing::share_payout(shares, reserve_a, total)?;
                let pay_b = pricing::share_payout(shares, reserve_b, total)?;
                if pay_a > pool.available(Side::A) || pay_b > pool.available(Side::B) {
                    return Err(DexError::InsufficientLiquidity);
                }
                for (pay, min) in [(pay_a, min_a), (pay_b, min_b)] {
                    if pay < min {
                        return Err(DexError::SlippageExceeded {
                            bound: min,
                            actual: pay,
                        });
                    }
                }
                let update = PoolUpdate::new()
                    .debit(Side::A, pay_a)
                    .debit(Side::B, pay_b)
                    .burn_shares(owner, shares);
                (pay_a, pay_b, shares, update)
            }
        };

        pool.apply(pool.sequence(), &update)?;
        let sequence = pool.sequence();
        let deposit = intent.is_deposit();
        for (asset, amount) in [(pair.first(), amount_a), (pair.second(), amount_b)] {
            if deposit {
                self.balances.transfer(owner, vault, asset, amount)?;
            } else {
                self.balances.transfer(vault, owner, asset, amount)?;
            }
        }
        info!(
            pool = %intent.pool(),
            owner = %owner,
            action = %intent.action(),
            %amount_a,
            %amount_b,
            %shares,
            "liquidity changed"
        );
        Ok(Outcome::Liquidity(LiquidityReceipt::new(
            intent.pool(),
            owner,
            amount_a,
            amount_b,
            shares,
            deposit,
            sequence,
        )))
    }
}

fn deposit_update(owner: OwnerId, amount_a: Amount, amount_b: Amount, shares: LpShares) -> PoolUpdate {
    PoolUpdate::new()
        .credit(Side::A, amount_a)
        .credit(Side::B, amount_b)
        .mint_shares(owner, shares)
}

/// Rolls back the parts of a failed commit that were already published.
fn abandon(engine: &SettlementEngine, published: Vec<PoolGuard>, settlements: &SettlementSet) {
    for guard in published {
        engine.pools.discard(guard);
    }
    engine.arena.release_salts(&settlements.claimed);
    engine.arena.release_inputs(&settlements.held);
    warn!("commit abandoned after partial publish");
}
