//! Asset catalogue and per-owner balance ledger.
//!
//! Every balance record `(owner, asset)` has its own mutex.  A mutation
//! locks exactly the records it touches, in key order, so transfers on
//! disjoint records run in parallel and overlapping ones cannot deadlock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::{Amount, Asset, AssetId, OwnerId};
use crate::error::{DexError, Result};
use crate::math::CheckedArithmetic;

type BalanceKey = (OwnerId, AssetId);

/// One balance movement inside an atomic batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Move `amount` of `asset` from `from` to `to`.
    Transfer {
        /// Source owner.
        from: OwnerId,
        /// Destination owner.
        to: OwnerId,
        /// Asset moved.
        asset: AssetId,
        /// Amount moved.
        amount: Amount,
    },
    /// Credit newly issued units.
    Mint {
        /// Receiving owner.
        to: OwnerId,
        /// Asset issued.
        asset: AssetId,
        /// Amount issued.
        amount: Amount,
    },
    /// Destroy units held by an owner.
    Burn {
        /// Owner whose balance shrinks.
        from: OwnerId,
        /// Asset destroyed.
        asset: AssetId,
        /// Amount destroyed.
        amount: Amount,
    },
}

impl Leg {
    fn keys(&self) -> [Option<BalanceKey>; 2] {
        match *self {
            Self::Transfer {
                from, to, asset, ..
            } => [Some((from, asset)), Some((to, asset))],
            Self::Mint { to, asset, .. } => [Some((to, asset)), None],
            Self::Burn { from, asset, .. } => [Some((from, asset)), None],
        }
    }

    fn asset(&self) -> AssetId {
        match *self {
            Self::Transfer { asset, .. } | Self::Mint { asset, .. } | Self::Burn { asset, .. } => {
                asset
            }
        }
    }
}

#[derive(Debug, Default)]
struct Catalogue {
    assets: HashMap<AssetId, Asset>,
    native: Option<AssetId>,
}

/// Registry of assets and the balances owners hold in them.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, Asset, AssetId, Decimals, OwnerId};
/// use hydra_dex::registry::AssetRegistry;
///
/// let registry = AssetRegistry::new();
/// let usdc = registry
///     .register(Asset::new(AssetId::from_bytes([1u8; 32]), Decimals::new(6).expect("valid")))
///     .expect("fresh asset");
///
/// let alice = OwnerId::from_bytes([10u8; 32]);
/// let bob = OwnerId::from_bytes([11u8; 32]);
/// registry.mint(alice, usdc, Amount::new(500)).expect("registered");
/// registry.transfer(alice, bob, usdc, Amount::new(200)).expect("covered");
///
/// assert_eq!(registry.balance_of(&alice, &usdc), Amount::new(300));
/// assert_eq!(registry.balance_of(&bob, &usdc), Amount::new(200));
/// ```
#[derive(Debug, Default)]
pub struct AssetRegistry {
    catalogue: RwLock<Catalogue>,
    balances: RwLock<HashMap<BalanceKey, Arc<Mutex<Amount>>>>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset.
    ///
    /// Registering the native asset also registers its wrapped counterpart
    /// (see [`AssetId::wrapped_of`]), which is what pools hold.
    ///
    /// # Errors
    ///
    /// - [`DexError::DuplicateAsset`] if the id (or the derived wrapped id)
    ///   is already present.
    /// - [`DexError::DuplicateNativeAsset`] if a native asset already exists.
    pub fn register(&self, asset: Asset) -> Result<AssetId> {
        let mut catalogue = self.catalogue.write();
        let id = asset.id();
        if catalogue.assets.contains_key(&id) {
            return Err(DexError::DuplicateAsset(id));
        }
        if asset.is_native() {
            if catalogue.native.is_some() {
                return Err(DexError::DuplicateNativeAsset);
            }
            let wrapped = AssetId::wrapped_of(id);
            if catalogue.assets.contains_key(&wrapped) {
                return Err(DexError::DuplicateAsset(wrapped));
            }
            catalogue
                .assets
                .insert(wrapped, Asset::new(wrapped, asset.decimals()));
            catalogue.native = Some(id);
            info!(asset = %id, wrapped = %wrapped, "registered native asset");
        } else {
            info!(asset = %id, decimals = asset.decimals().get(), "registered asset");
        }
        catalogue.assets.insert(id, asset);
        Ok(id)
    }

    /// Looks up a registered asset.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownAsset`] for unregistered ids.
    pub fn asset(&self, id: &AssetId) -> Result<Asset> {
        self.catalogue
            .read()
            .assets
            .get(id)
            .copied()
            .ok_or(DexError::UnknownAsset(*id))
    }

    /// Returns `Ok(())` if the id is registered.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownAsset`] for unregistered ids.
    pub fn ensure_registered(&self, id: &AssetId) -> Result<()> {
        self.asset(id).map(|_| ())
    }

    /// The native asset, if one is registered.
    #[must_use]
    pub fn native_asset(&self) -> Option<AssetId> {
        self.catalogue.read().native
    }

    /// Returns `true` if `id` is the native asset.
    #[must_use]
    pub fn is_native(&self, id: &AssetId) -> bool {
        self.catalogue.read().native == Some(*id)
    }

    /// The wrapped counterpart of the native asset.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::NativeAssetMissing`] if no native asset exists.
    pub fn wrapped_native(&self) -> Result<AssetId> {
        self.native_asset()
            .map(AssetId::wrapped_of)
            .ok_or(DexError::NativeAssetMissing)
    }

    /// Maps the native asset to its wrapped form; other ids pass through.
    #[must_use]
    pub fn pool_asset(&self, id: AssetId) -> AssetId {
        if self.is_native(&id) {
            AssetId::wrapped_of(id)
        } else {
            id
        }
    }

    /// Current balance; zero for owners that never held the asset.
    #[must_use]
    pub fn balance_of(&self, owner: &OwnerId, asset: &AssetId) -> Amount {
        self.balances
            .read()
            .get(&(*owner, *asset))
            .map_or(Amount::ZERO, |record| *record.lock())
    }

    /// Moves `amount` of `asset` between owners atomically.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownAsset`] for unregistered ids.
    /// - [`DexError::InvalidQuantity`] for a zero amount.
    /// - [`DexError::InsufficientBalance`] if `from` cannot cover `amount`.
    pub fn transfer(&self, from: OwnerId, to: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        self.apply(&[Leg::Transfer {
            from,
            to,
            asset,
            amount,
        }])
    }

    /// Credits newly issued units to `to`.
    ///
    /// # Errors
    ///
    /// Same as [`transfer`](Self::transfer), minus the balance check.
    pub fn mint(&self, to: OwnerId, asset: AssetId, amount: Amount) -> Result<()> {
        self.apply(&[Leg::Mint { to, asset, amount }])
    }

    /// Converts native units into the wrapped asset, 1:1.
    ///
    /// # Errors
    ///
    /// - [`DexError::NativeAssetMissing`] without a native asset.
    /// - [`DexError::InsufficientBalance`] if the native balance is short.
    pub fn wrap_native(&self, owner: OwnerId, amount: Amount) -> Result<()> {
        let native = self.native_asset().ok_or(DexError::NativeAssetMissing)?;
        self.apply(&[
            Leg::Burn {
                from: owner,
                asset: native,
                amount,
            },
            Leg::Mint {
                to: owner,
                asset: AssetId::wrapped_of(native),
                amount,
            },
        ])?;
        debug!(owner = %owner, %amount, "wrapped native");
        Ok(())
    }

    /// Converts wrapped units back into the native asset, 1:1.
    ///
    /// `None` unwraps the owner's whole wrapped balance and is a no-op when
    /// that balance is zero.
    ///
    /// # Errors
    ///
    /// - [`DexError::NativeAssetMissing`] without a native asset.
    /// - [`DexError::InsufficientBalance`] if the wrapped balance is short.
    pub fn unwrap_native(&self, owner: OwnerId, amount: Option<Amount>) -> Result<Amount> {
        let native = self.native_asset().ok_or(DexError::NativeAssetMissing)?;
        let wrapped = AssetId::wrapped_of(native);
        let amount = match amount {
            Some(a) => a,
            None => {
                let all = self.balance_of(&owner, &wrapped);
                if all.is_zero() {
                    return Ok(Amount::ZERO);
                }
                all
            }
        };
        self.apply(&[
            Leg::Burn {
                from: owner,
                asset: wrapped,
                amount,
            },
            Leg::Mint {
                to: owner,
                asset: native,
                amount,
            },
        ])?;
        debug!(owner = %owner, %amount, "unwrapped native");
        Ok(amount)
    }

    /// Applies every leg or none of them.
    ///
    /// Legs are evaluated in order, so a later leg may spend what an earlier
    /// leg credited.
    ///
    /// # Errors
    ///
    /// The first failing leg's error; no balance changes in that case.
    pub fn apply(&self, legs: &[Leg]) -> Result<()> {
        {
            let catalogue = self.catalogue.read();
            for leg in legs {
                let asset = leg.asset();
                if !catalogue.assets.contains_key(&asset) {
                    return Err(DexError::UnknownAsset(asset));
                }
            }
        }
        if legs.iter().any(|leg| match *leg {
            Leg::Transfer { amount, .. } | Leg::Mint { amount, .. } | Leg::Burn { amount, .. } => {
                amount.is_zero()
            }
        }) {
            return Err(DexError::InvalidQuantity("balance movement must be non-zero"));
        }

        let mut keys: Vec<BalanceKey> = legs.iter().flat_map(Leg::keys).flatten().collect();
        keys.sort_unstable();
        keys.dedup();

        let records = self.records(&keys);
        let mut guards: Vec<_> = records.iter().map(|record| record.lock()).collect();
        let mut staged: Vec<Amount> = guards.iter().map(|g| **g).collect();
        let index = |key: &BalanceKey| keys.binary_search(key).map_err(|_| DexError::UnknownAsset(key.1));

        for leg in legs {
            match *leg {
                Leg::Transfer {
                    from,
                    to,
                    asset,
                    amount,
                } => {
                    let src = index(&(from, asset))?;
                    let dst = index(&(to, asset))?;
                    staged[src] = debit(staged[src], amount)?;
                    staged[dst] = staged[dst].safe_add(&amount)?;
                }
                Leg::Mint { to, asset, amount } => {
                    let dst = index(&(to, asset))?;
                    staged[dst] = staged[dst].safe_add(&amount)?;
                }
                Leg::Burn {
                    from,
                    asset,
                    amount,
                } => {
                    let src = index(&(from, asset))?;
                    staged[src] = debit(staged[src], amount)?;
                }
            }
        }

        for (guard, value) in guards.iter_mut().zip(staged) {
            **guard = value;
        }
        debug!(legs = legs.len(), "applied balance legs");
        Ok(())
    }

    /// Fetches (creating when missing) the records for sorted `keys`.
    fn records(&self, keys: &[BalanceKey]) -> Vec<Arc<Mutex<Amount>>> {
        {
            let balances = self.balances.read();
            if keys.iter().all(|k| balances.contains_key(k)) {
                return keys
                    .iter()
                    .filter_map(|k| balances.get(k).cloned())
                    .collect();
            }
        }
        let mut balances = self.balances.write();
        keys.iter()
            .map(|k| Arc::clone(balances.entry(*k).or_default()))
            .collect()
    }
}

fn debit(balance: Amount, amount: Amount) -> Result<Amount> {
    balance
        .checked_sub(&amount)
        .ok_or(DexError::InsufficientBalance {
            requested: amount,
            available: balance,
        })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::domain::Decimals;

    fn asset(b: u8) -> Asset {
        let Ok(d) = Decimals::new(6) else {
            panic!("valid decimals");
        };
        Asset::new(AssetId::from_bytes([b; 32]), d)
    }

    fn native() -> Asset {
        let Ok(d) = Decimals::new(9) else {
            panic!("valid decimals");
        };
        Asset::native(AssetId::from_bytes([0x11; 32]), d)
    }

    fn owner(b: u8) -> OwnerId {
        OwnerId::from_bytes([b; 32])
    }

    fn registry_with(assets: &[Asset]) -> AssetRegistry {
        let registry = AssetRegistry::new();
        for a in assets {
            let Ok(_) = registry.register(*a) else {
                panic!("register");
            };
        }
        registry
    }

    #[test]
    fn duplicate_asset_rejected() {
        let registry = registry_with(&[asset(1)]);
        assert_eq!(
            registry.register(asset(1)),
            Err(DexError::DuplicateAsset(asset(1).id()))
        );
    }

    #[test]
    fn second_native_rejected() {
        let registry = registry_with(&[native()]);
        let Ok(d) = Decimals::new(9) else {
            panic!("valid decimals");
        };
        let other = Asset::native(AssetId::from_bytes([0x22; 32]), d);
        assert_eq!(registry.register(other), Err(DexError::DuplicateNativeAsset));
    }

    #[test]
    fn native_registers_wrapped_counterpart() {
        let registry = registry_with(&[native()]);
        let Ok(wrapped) = registry.wrapped_native() else {
            panic!("native registered");
        };
        assert!(registry.ensure_registered(&wrapped).is_ok());
        assert!(registry.is_native(&native().id()));
        assert!(!registry.is_native(&wrapped));
        assert_eq!(registry.pool_asset(native().id()), wrapped);
    }

    #[test]
    fn transfer_unknown_asset() {
        let registry = registry_with(&[]);
        let id = asset(3).id();
        assert_eq!(
            registry.transfer(owner(1), owner(2), id, Amount::new(1)),
            Err(DexError::UnknownAsset(id))
        );
    }

    #[test]
    fn transfer_insufficient_balance_is_atomic() {
        let registry = registry_with(&[asset(1)]);
        let id = asset(1).id();
        let Ok(()) = registry.mint(owner(1), id, Amount::new(50)) else {
            panic!("mint");
        };
        let result = registry.transfer(owner(1), owner(2), id, Amount::new(51));
        assert_eq!(
            result,
            Err(DexError::InsufficientBalance {
                requested: Amount::new(51),
                available: Amount::new(50),
            })
        );
        assert_eq!(registry.balance_of(&owner(1), &id), Amount::new(50));
        assert_eq!(registry.balance_of(&owner(2), &id), Amount::ZERO);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let registry = registry_with(&[asset(1), asset(2)]);
        let (x, y) = (asset(1).id(), asset(2).id());
        let Ok(()) = registry.mint(owner(1), x, Amount::new(100)) else {
            panic!("mint");
        };
        let result = registry.apply(&[
            Leg::Transfer {
                from: owner(1),
                to: owner(2),
                asset: x,
                amount: Amount::new(100),
            },
            Leg::Transfer {
                from: owner(2),
                to: owner(1),
                asset: y,
                amount: Amount::new(1),
            },
        ]);
        assert!(matches!(result, Err(DexError::InsufficientBalance { .. })));
        assert_eq!(registry.balance_of(&owner(1), &x), Amount::new(100));
        assert_eq!(registry.balance_of(&owner(2), &x), Amount::ZERO);
    }

    #[test]
    fn later_leg_can_spend_earlier_credit() {
        let registry = registry_with(&[asset(1)]);
        let x = asset(1).id();
        let Ok(()) = registry.mint(owner(1), x, Amount::new(10)) else {
            panic!("mint");
        };
        let result = registry.apply(&[
            Leg::Transfer {
                from: owner(1),
                to: owner(2),
                asset: x,
                amount: Amount::new(10),
            },
            Leg::Transfer {
                from: owner(2),
                to: owner(3),
                asset: x,
                amount: Amount::new(10),
            },
        ]);
        assert_eq!(result, Ok(()));
        assert_eq!(registry.balance_of(&owner(3), &x), Amount::new(10));
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let registry = registry_with(&[asset(1)]);
        let x = asset(1).id();
        let Ok(()) = registry.mint(owner(1), x, Amount::new(10)) else {
            panic!("mint");
        };
        assert_eq!(registry.transfer(owner(1), owner(1), x, Amount::new(4)), Ok(()));
        assert_eq!(registry.balance_of(&owner(1), &x), Amount::new(10));
    }

    #[test]
    fn wrap_and_unwrap_round_trip() {
        let registry = registry_with(&[native()]);
        let sol = native().id();
        let Ok(wsol) = registry.wrapped_native() else {
            panic!("native registered");
        };
        let Ok(()) = registry.mint(owner(1), sol, Amount::new(1_000)) else {
            panic!("mint");
        };
        let Ok(()) = registry.wrap_native(owner(1), Amount::new(400)) else {
            panic!("wrap");
        };
        assert_eq!(registry.balance_of(&owner(1), &sol), Amount::new(600));
        assert_eq!(registry.balance_of(&owner(1), &wsol), Amount::new(400));

        assert_eq!(registry.unwrap_native(owner(1), None), Ok(Amount::new(400)));
        assert_eq!(registry.balance_of(&owner(1), &sol), Amount::new(1_000));
        assert_eq!(registry.unwrap_native(owner(1), None), Ok(Amount::ZERO));
    }

    #[test]
    fn wrap_without_native_fails() {
        let registry = registry_with(&[asset(1)]);
        assert_eq!(
            registry.wrap_native(owner(1), Amount::new(1)),
            Err(DexError::NativeAssetMissing)
        );
    }

    #[test]
    fn concurrent_transfers_conserve_supply() {
        let registry = Arc::new(registry_with(&[asset(1)]));
        let x = asset(1).id();
        for b in 1..=4u8 {
            let Ok(()) = registry.mint(owner(b), x, Amount::new(1_000)) else {
                panic!("mint");
            };
        }
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (1..=4u8)
            .map(|b| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..100 {
                        let to = owner(b % 4 + 1);
                        let _ = registry.transfer(owner(b), to, x, Amount::new(3));
                    }
                })
            })
            .collect();
        for h in handles {
            let Ok(()) = h.join() else {
                panic!("thread panicked");
            };
        }
        let total: u128 = (1..=4u8)
            .map(|b| registry.balance_of(&owner(b), &x).get())
            .sum();
        assert_eq!(total, 4_000);
    }
}
