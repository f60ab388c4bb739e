//! Resolution of reserved swaps.
//!
//! A [`Finalizer`] is a short-lived handle on a [`SettlementEngine`] that
//! finalizes, reverts and sweeps reservations.  Authorization follows the
//! engine's [`SettlerPolicy`](crate::config::SettlerPolicy) until a
//! reservation expires; after that anyone may resolve it, and a finalize
//! becomes a slash (the reservation is reverted instead of executed).

use tracing::{info, instrument, warn};

use super::pending::SettlementState;
use super::receipt::{Outcome, SettlementResult};
use super::SettlementEngine;
use crate::builder::Instruction;
use crate::domain::{Amount, OwnerId, SettlementId};
use crate::error::{DexError, Result};

/// Finalizes and reverts pending settlements.
#[derive(Debug, Clone, Copy)]
pub struct Finalizer<'e> {
    engine: &'e SettlementEngine,
}

impl<'e> Finalizer<'e> {
    pub(super) const fn new(engine: &'e SettlementEngine) -> Self {
        Self { engine }
    }

    /// Executes a reserved swap at its locked price.
    ///
    /// Past expiry the reservation is slashed instead, and
    /// [`SettlementResult::Slashed`] is returned.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownSettlement`] if `id` was never reserved.
    /// - [`DexError::AlreadyResolved`] if it was finalized or reverted.
    /// - [`DexError::UnauthorizedSettler`] if `settler` may not act on it.
    /// - [`DexError::InsufficientBalance`] if the owner can no longer pay.
    #[instrument(skip(self), fields(settlement = %id, settler = %settler))]
    pub fn finalize(&self, id: SettlementId, settler: OwnerId) -> Result<SettlementResult> {
        match self.engine.run_one(Instruction::FinalizeSwap {
            settlement: id,
            settler,
        })? {
            Outcome::Settled(result) => Ok(result),
            _ => Err(DexError::OperationMismatch("finalize produced no settlement result")),
        }
    }

    /// Reverts a reservation, returning the output capacity it released.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownSettlement`] if `id` was never reserved.
    /// - [`DexError::AlreadyResolved`] if it was finalized or reverted.
    /// - [`DexError::UnauthorizedSettler`] if `caller` may not act on it
    ///   and it has not expired.
    #[instrument(skip(self), fields(settlement = %id, caller = %caller))]
    pub fn revert(&self, id: SettlementId, caller: OwnerId) -> Result<Amount> {
        match self.engine.run_one(Instruction::RevertSwap {
            settlement: id,
            caller,
        })? {
            Outcome::Reverted { released, .. } => Ok(released),
            _ => Err(DexError::OperationMismatch("revert produced no release")),
        }
    }

    /// Reverts every expired reservation; returns the ids reverted.
    ///
    /// Records resolved concurrently are skipped.
    pub fn expire_stale(&self) -> Vec<SettlementId> {
        let now = self.engine.now();
        let mut expired = Vec::new();
        for id in self.engine.settlement_ids() {
            let Ok(record) = self.engine.get_settlement(id) else {
                continue;
            };
            if record.state() != SettlementState::Reserved || !record.is_expired(now) {
                continue;
            }
            match self.revert(id, record.intent().owner()) {
                Ok(_) => expired.push(id),
                Err(DexError::AlreadyResolved(_) | DexError::UnknownSettlement(_)) => {}
                Err(e) => warn!(settlement = %id, error = %e, "expiry sweep could not revert"),
            }
        }
        if !expired.is_empty() {
            info!(count = expired.len(), %now, "expired settlements reverted");
        }
        expired
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{EngineConfig, PoolConfig};
    use crate::domain::{Asset, AssetId, Decimals, FeeRate, Slot, SwapIntent};
    use crate::registry::AssetRegistry;
    use crate::store::PoolStore;
    use crate::traits::{ManualClock, SlotClock};

    const X: AssetId = AssetId::from_bytes([1; 32]);
    const Y: AssetId = AssetId::from_bytes([2; 32]);
    const OWNER: OwnerId = OwnerId::from_bytes([5; 32]);

    fn engine(clock: &Arc<ManualClock>) -> SettlementEngine {
        let registry = Arc::new(AssetRegistry::new());
        let Ok(decimals) = Decimals::new(9) else {
            panic!("decimals");
        };
        for id in [X, Y] {
            let (Ok(_), Ok(())) = (
                registry.register(Asset::new(id, decimals)),
                registry.mint(OWNER, id, Amount::new(1_000_000)),
            ) else {
                panic!("setup");
            };
        }
        let Ok(engine) = SettlementEngine::new(
            EngineConfig::default(),
            registry,
            Arc::new(PoolStore::new()),
            Arc::clone(clock) as Arc<dyn SlotClock>,
        ) else {
            panic!("engine");
        };
        let Ok(config) = PoolConfig::new(X, Y, FeeRate::STANDARD, Amount::new(100_000), Amount::new(100_000))
        else {
            panic!("pool config");
        };
        let Ok(_) = engine.init_pool(OWNER, &config) else {
            panic!("pool");
        };
        engine
    }

    fn reserve(engine: &SettlementEngine) -> SettlementId {
        let Ok(intent) = SwapIntent::new(OWNER, X, Y, Amount::new(1_000), Amount::new(1)) else {
            panic!("intent");
        };
        let Ok(pending) = engine.reserve_swap(intent) else {
            panic!("reserve");
        };
        pending.id()
    }

    #[test]
    fn double_revert_is_already_resolved() {
        let clock = Arc::new(ManualClock::new(Slot::new(0)));
        let engine = engine(&clock);
        let id = reserve(&engine);
        let finalizer = engine.finalizer();
        assert!(finalizer.revert(id, OWNER).is_ok());
        assert_eq!(finalizer.revert(id, OWNER), Err(DexError::AlreadyResolved(id)));
        assert_eq!(finalizer.finalize(id, OWNER), Err(DexError::AlreadyResolved(id)));
    }

    #[test]
    fn unknown_settlement() {
        let clock = Arc::new(ManualClock::new(Slot::new(0)));
        let engine = engine(&clock);
        let id = SettlementId::new(42);
        assert_eq!(engine.finalizer().finalize(id, OWNER), Err(DexError::UnknownSettlement(id)));
    }

    #[test]
    fn sweep_reverts_only_expired() {
        let clock = Arc::new(ManualClock::new(Slot::new(0)));
        let engine = engine(&clock);
        let old = reserve(&engine);
        clock.advance(100);
        let fresh = reserve(&engine);
        clock.advance(60);

        assert_eq!(engine.finalizer().expire_stale(), vec![old]);
        let (Ok(old), Ok(fresh)) = (engine.get_settlement(old), engine.get_settlement(fresh)) else {
            panic!("records");
        };
        assert_eq!(old.state(), SettlementState::Reverted);
        assert_eq!(fresh.state(), SettlementState::Reserved);
        assert!(engine.finalizer().expire_stale().is_empty());
    }
}
