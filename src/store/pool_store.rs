//! Shared pool storage with per-pool locks.
//!
//! The index (`id -> record`, `pair -> id`) sits behind one `RwLock` that is
//! only held long enough to clone an `Arc`; each pool then has its own
//! mutex.  Writers go through [`Pool::apply`], so a write computed against
//! an outdated snapshot fails with [`DexError::StaleSequence`] instead of
//! overwriting newer state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};
use tracing::{debug, info, warn};

use super::pool::{Pool, PoolUpdate};
use crate::config::PoolConfig;
use crate::domain::{Amount, AssetId, AssetPair, FeeRate, LpShares, OwnerId, PoolId, Side};
use crate::error::{DexError, Result};
use crate::math::sqrt_product;
use crate::registry::{AssetRegistry, Leg};

/// Exclusive handle on one pool, held across a multi-step commit.
pub(crate) type PoolGuard = ArcMutexGuard<RawMutex, Pool>;

#[derive(Debug, Default)]
struct Index {
    pools: HashMap<PoolId, Arc<Mutex<Pool>>>,
    by_pair: HashMap<AssetPair, PoolId>,
}

/// Owns every [`Pool`] record.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, Asset, AssetId, Decimals, FeeRate, OwnerId};
/// use hydra_dex::registry::AssetRegistry;
/// use hydra_dex::store::PoolStore;
///
/// let registry = AssetRegistry::new();
/// let d = Decimals::new(6).expect("valid");
/// let a = registry.register(Asset::new(AssetId::from_bytes([1; 32]), d)).expect("fresh");
/// let b = registry.register(Asset::new(AssetId::from_bytes([2; 32]), d)).expect("fresh");
///
/// let founder = OwnerId::from_bytes([7; 32]);
/// registry.mint(founder, a, Amount::new(1_000)).expect("mint");
/// registry.mint(founder, b, Amount::new(1_000)).expect("mint");
///
/// let store = PoolStore::new();
/// let id = store
///     .create_pool(&registry, a, b, Amount::new(1_000), Amount::new(1_000), FeeRate::STANDARD, founder)
///     .expect("new pair");
///
/// let pool = store.get_pool(id).expect("exists");
/// assert_eq!(pool.total_shares().get(), 1_000);
/// assert_eq!(store.find_pool(&b, &a), Some(id));
/// assert_eq!(registry.balance_of(&pool.vault(), &a), Amount::new(1_000));
/// ```
#[derive(Debug, Default)]
pub struct PoolStore {
    index: RwLock<Index>,
    next_id: AtomicU64,
}

impl PoolStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool, moving the founder's initial reserves into its vault.
    ///
    /// Initial shares are `floor(sqrt(reserve_a * reserve_b))` and belong to
    /// the founder.  The pool is published only once both reserves sit in
    /// [`OwnerId::pool_vault`], so every pool the store holds can settle.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if the assets are identical.
    /// - [`DexError::UnknownAsset`] if either asset is unregistered.
    /// - [`DexError::InvalidReserves`] if either reserve is zero.
    /// - [`DexError::PoolAlreadyExists`] if the unordered pair has a pool.
    /// - [`DexError::InsufficientBalance`] if the founder cannot fund the
    ///   reserves.
    #[allow(clippy::too_many_arguments)]
    pub fn create_pool(
        &self,
        registry: &AssetRegistry,
        asset_a: AssetId,
        asset_b: AssetId,
        reserve_a: Amount,
        reserve_b: Amount,
        fee: FeeRate,
        founder: OwnerId,
    ) -> Result<PoolId> {
        let config = PoolConfig::new(asset_a, asset_b, fee, reserve_a, reserve_b)?;
        self.create_from_config(registry, &config, founder)
    }

    /// Creates a pool from a validated [`PoolConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`create_pool`](Self::create_pool).
    pub fn create_from_config(
        &self,
        registry: &AssetRegistry,
        config: &PoolConfig,
        founder: OwnerId,
    ) -> Result<PoolId> {
        let pool = self.prepare(registry, config, founder)?;
        let pair = pool.pair();
        let vault = pool.vault();
        let funding = [
            Leg::Transfer {
                from: founder,
                to: vault,
                asset: pair.first(),
                amount: pool.reserve(Side::A),
            },
            Leg::Transfer {
                from: founder,
                to: vault,
                asset: pair.second(),
                amount: pool.reserve(Side::B),
            },
        ];
        let guard = self.insert_locked(pool)?;
        if let Err(e) = registry.apply(&funding) {
            self.discard(guard);
            return Err(e);
        }
        Ok(guard.id())
    }

    /// Validates `config` and builds the genesis record under a fresh id.
    pub(crate) fn prepare(
        &self,
        registry: &AssetRegistry,
        config: &PoolConfig,
        founder: OwnerId,
    ) -> Result<Pool> {
        config.validate()?;
        let pair = config.pair();
        registry.ensure_registered(&pair.first())?;
        registry.ensure_registered(&pair.second())?;
        if let Some(existing) = self.find_pool(&pair.first(), &pair.second()) {
            return Err(DexError::PoolAlreadyExists(existing));
        }
        let (reserve_a, reserve_b) = config.reserves_in_pair_order();
        let shares = LpShares::new(sqrt_product(reserve_a.get(), reserve_b.get()));
        let id = PoolId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(Pool::genesis(
            id,
            pair,
            config.fee(),
            reserve_a,
            reserve_b,
            founder,
            shares,
        ))
    }

    /// Publishes a prepared pool, returning it already locked.
    ///
    /// Callers that still have to fund the vault keep the guard until the
    /// funds have moved, and call [`discard`](Self::discard) on failure.
    pub(crate) fn insert_locked(&self, pool: Pool) -> Result<PoolGuard> {
        let id = pool.id();
        let pair = pool.pair();
        let record = Arc::new(Mutex::new(pool));
        let guard = record.lock_arc();
        let mut index = self.index.write();
        if let Some(existing) = index.by_pair.get(&pair) {
            return Err(DexError::PoolAlreadyExists(*existing));
        }
        index.by_pair.insert(pair, id);
        index.pools.insert(id, record);
        info!(pool = %id, pair = %pair, shares = %guard.total_shares(), "pool created");
        Ok(guard)
    }

    /// Removes a pool published by [`insert_locked`](Self::insert_locked)
    /// whose funding failed.
    pub(crate) fn discard(&self, guard: PoolGuard) {
        let mut index = self.index.write();
        index.by_pair.remove(&guard.pair());
        index.pools.remove(&guard.id());
        warn!(pool = %guard.id(), "discarded unfunded pool");
    }

    /// Snapshot of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownPool`] for unknown ids.
    pub fn get_pool(&self, id: PoolId) -> Result<Pool> {
        Ok(self.record(id)?.lock().clone())
    }

    /// Looks up the pool trading an unordered pair.
    #[must_use]
    pub fn find_pool(&self, x: &AssetId, y: &AssetId) -> Option<PoolId> {
        let pair = AssetPair::new(*x, *y).ok()?;
        self.index.read().by_pair.get(&pair).copied()
    }

    /// All pool ids, in ascending order.
    #[must_use]
    pub fn pool_ids(&self) -> Vec<PoolId> {
        let mut ids: Vec<PoolId> = self.index.read().pools.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().pools.len()
    }

    /// Returns `true` if the store has no pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare-and-swap of signed reserve deltas.
    ///
    /// The vault balance follows the reserves: a positive delta mints into
    /// the vault, a negative one burns from it, under the same pool lock.
    /// Returns the pool's new sequence.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownPool`] for unknown ids.
    /// - [`DexError::StaleSequence`] if the pool is not at
    ///   `expected_sequence`.
    /// - [`DexError::NegativeReserve`] if a reserve would go below zero.
    pub fn apply_reserve_delta(
        &self,
        registry: &AssetRegistry,
        id: PoolId,
        delta_a: i128,
        delta_b: i128,
        expected_sequence: u64,
    ) -> Result<u64> {
        self.apply_update(registry, id, expected_sequence, &PoolUpdate::from_deltas(delta_a, delta_b))
    }

    /// Compare-and-swap of a full [`PoolUpdate`].
    ///
    /// Reserve changes are mirrored on the vault's registry balances before
    /// the new state is written; if the registry rejects them the pool is
    /// left untouched.  Returns the pool's new sequence.
    ///
    /// # Errors
    ///
    /// [`DexError::UnknownPool`], everything [`Pool::apply`] returns, and
    /// the registry's error if the vault cannot follow the reserves.
    pub fn apply_update(
        &self,
        registry: &AssetRegistry,
        id: PoolId,
        expected_sequence: u64,
        update: &PoolUpdate,
    ) -> Result<u64> {
        let record = self.record(id)?;
        let mut pool = record.lock();
        let mut next = pool.clone();
        if let Err(e) = next.apply(expected_sequence, update) {
            if let DexError::StaleSequence { expected, actual } = e {
                warn!(pool = %id, expected, actual, "stale pool write rejected");
            }
            return Err(e);
        }
        let legs = vault_legs(&pool, &next);
        if !legs.is_empty() {
            registry.apply(&legs)?;
        }
        *pool = next;
        debug!(pool = %id, sequence = pool.sequence(), "pool update committed");
        Ok(pool.sequence())
    }

    /// Locks a pool for a multi-step commit.
    ///
    /// Lock pools in ascending id order when holding more than one.
    pub(crate) fn lock(&self, id: PoolId) -> Result<PoolGuard> {
        Ok(self.record(id)?.lock_arc())
    }

    fn record(&self, id: PoolId) -> Result<Arc<Mutex<Pool>>> {
        self.index
            .read()
            .pools
            .get(&id)
            .cloned()
            .ok_or(DexError::UnknownPool(id))
    }
}

/// Mints or burns vault units so the vault tracks `after`'s reserves.
fn vault_legs(before: &Pool, after: &Pool) -> Vec<Leg> {
    let vault = before.vault();
    let pair = before.pair();
    [(Side::A, pair.first()), (Side::B, pair.second())]
        .into_iter()
        .filter_map(|(side, asset)| {
            let (old, new) = (before.reserve(side), after.reserve(side));
            if new > old {
                new.checked_sub(&old).map(|amount| Leg::Mint {
                    to: vault,
                    asset,
                    amount,
                })
            } else if old > new {
                old.checked_sub(&new).map(|amount| Leg::Burn {
                    from: vault,
                    asset,
                    amount,
                })
            } else {
                None
            }
        })
        .collect()
}
