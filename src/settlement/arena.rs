//! Arena of pending settlements, indexed by id.
//!
//! Each record has its own mutex.  The salt index is a leaf lock: nothing
//! else is acquired while it is held.  The input ledger is taken after pool
//! locks and before balance records.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};
use tracing::debug;

use super::pending::PendingSettlement;
use crate::domain::{Amount, AssetId, OwnerId, Salt, SettlementId};
use crate::error::{DexError, Result};
use crate::math::CheckedArithmetic;

/// Exclusive handle on one settlement record.
pub(crate) type SettlementGuard = ArcMutexGuard<RawMutex, PendingSettlement>;

/// An owner's salt claimed by a settlement.
pub(crate) type SaltClaim = (OwnerId, Salt, SettlementId);

/// Input an unresolved reservation has promised to pay.
pub(crate) type InputHold = (OwnerId, AssetId, Amount);

#[derive(Debug, Default)]
pub(crate) struct SettlementArena {
    records: RwLock<BTreeMap<SettlementId, Arc<Mutex<PendingSettlement>>>>,
    salts: Mutex<HashMap<(OwnerId, Salt), SettlementId>>,
    inputs: Mutex<HashMap<(OwnerId, AssetId), Amount>>,
    next_id: AtomicU64,
}

/// Sum of the holds in `holds` on `(owner, asset)`.
pub(crate) fn held_on(holds: &[InputHold], owner: &OwnerId, asset: &AssetId) -> Amount {
    holds
        .iter()
        .filter(|(o, a, _)| o == owner && a == asset)
        .fold(Amount::ZERO, |total, (_, _, amount)| {
            total.checked_add(amount).unwrap_or(Amount::MAX)
        })
}

impl SettlementArena {
    pub(crate) fn allocate(&self) -> SettlementId {
        SettlementId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn lock(&self, id: SettlementId) -> Result<SettlementGuard> {
        Ok(self.record(id)?.lock_arc())
    }

    pub(crate) fn snapshot(&self, id: SettlementId) -> Result<PendingSettlement> {
        Ok(self.record(id)?.lock().clone())
    }

    pub(crate) fn ids(&self) -> Vec<SettlementId> {
        self.records.read().keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.read().len()
    }

    pub(crate) fn insert(&self, record: PendingSettlement) {
        let id = record.id();
        self.records.write().insert(id, Arc::new(Mutex::new(record)));
    }

    /// Unresolved settlement currently holding `(owner, salt)`.
    pub(crate) fn salt_holder(&self, owner: &OwnerId, salt: &Salt) -> Option<SettlementId> {
        self.salts.lock().get(&(*owner, *salt)).copied()
    }

    /// Claims every salt or none.
    pub(crate) fn claim_salts(&self, claims: &[SaltClaim]) -> Result<()> {
        if claims.is_empty() {
            return Ok(());
        }
        let mut salts = self.salts.lock();
        for (owner, salt, _) in claims {
            if let Some(holder) = salts.get(&(*owner, *salt)) {
                return Err(DexError::DuplicateOrder(*holder));
            }
        }
        for (owner, salt, id) in claims {
            salts.insert((*owner, *salt), *id);
        }
        Ok(())
    }

    /// Releases salts still held by the settlement that claimed them.
    pub(crate) fn release_salts(&self, claims: &[SaltClaim]) {
        if claims.is_empty() {
            return;
        }
        let mut salts = self.salts.lock();
        for (owner, salt, id) in claims {
            if salts.get(&(*owner, *salt)) == Some(id) {
                salts.remove(&(*owner, *salt));
            }
        }
    }

    /// Input already promised by `owner`'s unresolved reservations.
    pub(crate) fn reserved_input(&self, owner: &OwnerId, asset: &AssetId) -> Amount {
        self.inputs
            .lock()
            .get(&(*owner, *asset))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Records every hold or none.
    ///
    /// Each `(owner, asset)` must stay covered: what is already held, less
    /// what the same batch frees, plus the new holds may not exceed
    /// `balance(owner, asset)`, the owner's balance once the batch lands.
    pub(crate) fn hold_inputs(
        &self,
        holds: &[InputHold],
        freed: &[InputHold],
        mut balance: impl FnMut(&OwnerId, &AssetId) -> Amount,
    ) -> Result<()> {
        if holds.is_empty() {
            return Ok(());
        }
        let mut inputs = self.inputs.lock();
        let mut totals: Vec<((OwnerId, AssetId), Amount)> = Vec::new();
        for (owner, asset, _) in holds {
            let key = (*owner, *asset);
            if totals.iter().any(|(k, _)| *k == key) {
                continue;
            }
            let requested = held_on(holds, owner, asset);
            let current = inputs.get(&key).copied().unwrap_or(Amount::ZERO);
            let already = current
                .checked_sub(&held_on(freed, owner, asset))
                .unwrap_or(Amount::ZERO);
            let covered = balance(owner, asset);
            let available = covered.checked_sub(&already).unwrap_or(Amount::ZERO);
            if available < requested {
                return Err(DexError::InsufficientBalance {
                    requested,
                    available,
                });
            }
            totals.push((key, current.safe_add(&requested)?));
        }
        inputs.extend(totals);
        Ok(())
    }

    /// Drops holds whose reservation resolved or whose batch was abandoned.
    pub(crate) fn release_inputs(&self, freed: &[InputHold]) {
        if freed.is_empty() {
            return;
        }
        let mut inputs = self.inputs.lock();
        for (owner, asset, amount) in freed {
            let key = (*owner, *asset);
            if let Some(held) = inputs.get_mut(&key) {
                *held = held.checked_sub(amount).unwrap_or(Amount::ZERO);
                if held.is_zero() {
                    inputs.remove(&key);
                }
            }
        }
    }

    /// Drops terminal records, skipping any that are locked right now.
    pub(crate) fn prune_resolved(&self) -> usize {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| match record.try_lock() {
            Some(pending) => !pending.state().is_terminal(),
            None => true,
        });
        let pruned = before - records.len();
        debug!(pruned, remaining = records.len(), "pruned resolved settlements");
        pruned
    }

    fn record(&self, id: SettlementId) -> Result<Arc<Mutex<PendingSettlement>>> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(DexError::UnknownSettlement(id))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::from_bytes([1; 32])
    }

    #[test]
    fn salt_claims_are_all_or_nothing() {
        let arena = SettlementArena::default();
        let (a, b) = (Salt::new([1; 8]), Salt::new([2; 8]));
        assert_eq!(arena.claim_salts(&[(owner(), a, SettlementId::new(0))]), Ok(()));
        let clash = arena.claim_salts(&[(owner(), b, SettlementId::new(1)), (owner(), a, SettlementId::new(1))]);
        assert_eq!(clash, Err(DexError::DuplicateOrder(SettlementId::new(0))));
        assert_eq!(arena.salt_holder(&owner(), &b), None);
    }

    #[test]
    fn release_only_by_holder() {
        let arena = SettlementArena::default();
        let salt = Salt::new([1; 8]);
        let Ok(()) = arena.claim_salts(&[(owner(), salt, SettlementId::new(0))]) else {
            panic!("fresh salt");
        };
        arena.release_salts(&[(owner(), salt, SettlementId::new(5))]);
        assert_eq!(arena.salt_holder(&owner(), &salt), Some(SettlementId::new(0)));
        arena.release_salts(&[(owner(), salt, SettlementId::new(0))]);
        assert_eq!(arena.salt_holder(&owner(), &salt), None);
    }

    #[test]
    fn input_holds_bounded_by_balance() {
        let arena = SettlementArena::default();
        let x = AssetId::from_bytes([9; 32]);
        let balance = |_: &OwnerId, _: &AssetId| Amount::new(200);
        let hold = [(owner(), x, Amount::new(150))];
        assert_eq!(arena.hold_inputs(&hold, &[], balance), Ok(()));
        assert_eq!(
            arena.hold_inputs(&hold, &[], balance),
            Err(DexError::InsufficientBalance {
                requested: Amount::new(150),
                available: Amount::new(50),
            })
        );
        // Freeing the first hold in the same batch makes room again.
        assert_eq!(arena.hold_inputs(&hold, &hold, balance), Ok(()));
        arena.release_inputs(&hold);
        assert_eq!(arena.reserved_input(&owner(), &x), Amount::new(150));
        arena.release_inputs(&hold);
        assert_eq!(arena.reserved_input(&owner(), &x), Amount::ZERO);
    }

    #[test]
    fn unknown_record() {
        let arena = SettlementArena::default();
        assert_eq!(
            arena.snapshot(SettlementId::new(3)),
            Err(DexError::UnknownSettlement(SettlementId::new(3)))
        );
    }
}
