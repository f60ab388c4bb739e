//! Property-based tests for pricing and settlement invariants.
//!
//! 1. **Output monotonicity**: more input never yields less output.
//! 2. **Invariant preservation**: `reserve_a * reserve_b` never decreases
//!    across a swap, and the output stays below the output reserve.
//! 3. **Swap reversibility**: a round trip A→B→A returns at most the input.
//! 4. **Liquidity round trip**: deposit then withdraw returns at most what
//!    was deposited, short by rounding only.
//! 5. **Reserve/revert neutrality**: reverting a reservation restores the
//!    pool's reserves and unlocks everything.
//! 6. **Balance conservation**: swaps move units between owners and the
//!    vault but never create or destroy them.
//! 7. **18-decimal scale**: properties 1 and 2 hold for reserves around
//!    `10^21` and above, where products exceed `u128`.

use std::sync::Arc;

use proptest::prelude::*;

use super::pricing;
use super::SettlementEngine;
use crate::config::{EngineConfig, PoolConfig};
use crate::domain::{
    Amount, Asset, AssetId, BasisPoints, Decimals, FeeRate, LiquidityIntent, LpShares, OwnerId, PoolId,
    Side, Slot, SwapIntent,
};
use crate::math::wide_mul;
use crate::registry::AssetRegistry;
use crate::store::PoolStore;
use crate::traits::{ManualClock, SlotClock};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const X: AssetId = AssetId::from_bytes([1; 32]);
const Y: AssetId = AssetId::from_bytes([2; 32]);
const LP: OwnerId = OwnerId::from_bytes([20; 32]);
const TRADER: OwnerId = OwnerId::from_bytes([21; 32]);
const FUNDING: u128 = 1_000_000_000_000;

fn engine_with_pool(ra: u128, rb: u128) -> (SettlementEngine, PoolId) {
    let registry = Arc::new(AssetRegistry::new());
    let Ok(d) = Decimals::new(6) else {
        panic!("valid decimals");
    };
    for id in [X, Y] {
        let Ok(_) = registry.register(Asset::new(id, d)) else {
            panic!("fresh asset");
        };
        for owner in [LP, TRADER] {
            let Ok(()) = registry.mint(owner, id, Amount::new(FUNDING)) else {
                panic!("mint");
            };
        }
    }
    let clock: Arc<dyn SlotClock> = Arc::new(ManualClock::new(Slot::new(0)));
    let Ok(engine) = SettlementEngine::new(EngineConfig::default(), registry, Arc::new(PoolStore::new()), clock)
    else {
        panic!("engine");
    };
    let Ok(config) = PoolConfig::new(X, Y, FeeRate::STANDARD, Amount::new(ra), Amount::new(rb)) else {
        panic!("valid pool config");
    };
    let Ok(pool) = engine.init_pool(LP, &config) else {
        panic!("funded pool");
    };
    (engine, pool)
}

fn reserves(engine: &SettlementEngine, pool: PoolId) -> (u128, u128) {
    let Ok(p) = engine.pools().get_pool(pool) else {
        panic!("pool exists");
    };
    (p.reserve(Side::A).get(), p.reserve(Side::B).get())
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Reserve values in range [10_000, 10_000_000] to avoid extremes.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

/// Fee rates from zero to 1%.
fn fee_strategy() -> impl Strategy<Value = FeeRate> {
    (0u32..=100u32).prop_filter_map("valid fee", |bps| {
        FeeRate::new(BasisPoints::new(bps)).ok()
    })
}

// ---------------------------------------------------------------------------
// Property 1: Output Monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_output_monotonic_in_input(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fee in fee_strategy(),
        small in 1_000u128..=100_000u128,
        extra in 0u128..=100_000u128,
    ) {
        let price = |dx: u128| pricing::swap_output(
            fee,
            Amount::new(dx),
            Amount::new(ra),
            Amount::new(rb),
            Amount::new(rb),
        );
        let (Ok((out_small, _)), Ok((out_large, _))) = (price(small), price(small + extra)) else {
            return Ok(());
        };
        prop_assert!(
            out_large >= out_small,
            "output shrank: {} for {} vs {} for {}",
            out_large, small + extra, out_small, small
        );
    }
}

// ---------------------------------------------------------------------------
// Property 2: Invariant Preservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_product_never_decreases(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        fee in fee_strategy(),
        dx in 1u128..=1_000_000u128,
    ) {
        let Ok((dy, _)) = pricing::swap_output(
            fee,
            Amount::new(dx),
            Amount::new(ra),
            Amount::new(rb),
            Amount::new(rb),
        ) else {
            return Ok(());
        };
        let dy = dy.get();
        prop_assert!(dy < rb, "output {} reached reserve {}", dy, rb);
        let before = ra * rb;
        let after = (ra + dx) * (rb - dy);
        prop_assert!(after >= before, "k decreased: {} -> {}", before, after);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Swap Reversibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_round_trip_loses_value(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let (engine, _) = engine_with_pool(ra, rb);
        let swap_in = (ra / 1_000).max(1_000);
        let Ok(there) = SwapIntent::new(TRADER, X, Y, Amount::new(swap_in), Amount::new(1)) else {
            return Ok(());
        };
        let Ok(first) = engine.swap(there) else {
            return Ok(());
        };
        let Ok(back) = SwapIntent::new(TRADER, Y, X, first.amount_out(), Amount::new(1)) else {
            return Ok(());
        };
        let Ok(second) = engine.swap(back) else {
            return Ok(());
        };
        prop_assert!(
            second.amount_out().get() <= swap_in,
            "round trip gained: {} > {}",
            second.amount_out().get(), swap_in
        );
    }
}

// ---------------------------------------------------------------------------
// Property 4: Liquidity Round Trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_add_remove_within_rounding(
        ra in reserve_strategy(),
        ratio in 1u128..=4u128,
        permille in 1u128..=500u128,
    ) {
        let rb = ra * ratio;
        let (engine, pool) = engine_with_pool(ra, rb);
        let a = (ra * permille / 1_000).max(1);
        let b = a * ratio;
        let Ok(add) = LiquidityIntent::deposit(pool, TRADER, Amount::new(a), Amount::new(b), LpShares::ZERO) else {
            return Ok(());
        };
        let Ok(minted) = engine.add_liquidity(add) else {
            return Ok(());
        };
        let Ok(remove) = LiquidityIntent::withdraw(pool, TRADER, minted.shares(), Amount::ZERO, Amount::ZERO) else {
            return Ok(());
        };
        let Ok(burned) = engine.remove_liquidity(remove) else {
            panic!("fresh shares are withdrawable");
        };
        let (back_a, back_b) = (burned.amount_a().get(), burned.amount_b().get());
        prop_assert!(back_a <= a && back_b <= b, "withdrew more than deposited");
        // Loss is bounded by one share's worth of each reserve plus rounding.
        let Ok(p) = engine.pools().get_pool(pool) else {
            panic!("pool exists");
        };
        let total = p.total_shares().get().max(1);
        let slack_a = p.reserve(Side::A).get() / total + 2;
        let slack_b = p.reserve(Side::B).get() / total + 2;
        prop_assert!(a - back_a <= slack_a, "side A lost {} (slack {})", a - back_a, slack_a);
        prop_assert!(b - back_b <= slack_b, "side B lost {} (slack {})", b - back_b, slack_b);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Reserve/Revert Neutrality
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_revert_restores_pool(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        dx in 1_000u128..=100_000u128,
    ) {
        let (engine, pool) = engine_with_pool(ra, rb);
        let before = reserves(&engine, pool);
        let Ok(intent) = SwapIntent::new(TRADER, X, Y, Amount::new(dx), Amount::new(1)) else {
            return Ok(());
        };
        let Ok(pending) = engine.reserve_swap(intent) else {
            return Ok(());
        };
        let Ok(released) = engine.finalizer().revert(pending.id(), TRADER) else {
            panic!("owner may revert");
        };
        prop_assert_eq!(released, pending.locked_output());
        prop_assert_eq!(reserves(&engine, pool), before);
        let Ok(p) = engine.pools().get_pool(pool) else {
            panic!("pool exists");
        };
        prop_assert!(p.locked(Side::A).is_zero() && p.locked(Side::B).is_zero());
    }
}

// ---------------------------------------------------------------------------
// Property 6: Balance Conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_swaps_conserve_units(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        amounts in proptest::collection::vec((1_000u128..=50_000u128, any::<bool>()), 1..8),
    ) {
        let (engine, pool) = engine_with_pool(ra, rb);
        let vault = OwnerId::pool_vault(pool);
        let supply = |asset: AssetId| -> u128 {
            [LP, TRADER, vault]
                .iter()
                .map(|o| engine.registry().balance_of(o, &asset).get())
                .sum()
        };
        let (sx, sy) = (supply(X), supply(Y));
        for (dx, forward) in amounts {
            let (from, to) = if forward { (X, Y) } else { (Y, X) };
            if let Ok(intent) = SwapIntent::new(TRADER, from, to, Amount::new(dx), Amount::new(1)) {
                let _ = engine.swap(intent);
            }
        }
        prop_assert_eq!(supply(X), sx);
        prop_assert_eq!(supply(Y), sy);
        let (rx, ry) = reserves(&engine, pool);
        prop_assert_eq!(engine.registry().balance_of(&vault, &X).get(), rx);
        prop_assert_eq!(engine.registry().balance_of(&vault, &Y).get(), ry);
    }
}

// ---------------------------------------------------------------------------
// Property 7: 18-Decimal Scale
// ---------------------------------------------------------------------------

const E18: u128 = 1_000_000_000_000_000_000;

/// Reserves of 1 000 to 10 000 000 whole 18-decimal tokens.
fn wide_reserve_strategy() -> impl Strategy<Value = u128> {
    (1_000u128..=10_000_000u128).prop_map(|whole| whole * E18)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_wide_reserves_price_without_overflow(
        ra in wide_reserve_strategy(),
        rb in wide_reserve_strategy(),
        fee in fee_strategy(),
        dx in 1u128..=1_000_000u128,
        extra in 0u128..=1_000_000u128,
    ) {
        let price = |units: u128| pricing::swap_output(
            fee,
            Amount::new(units * E18 / 1_000),
            Amount::new(ra),
            Amount::new(rb),
            Amount::new(rb),
        );
        let Ok((dy, _)) = price(dx) else {
            panic!("1e21-scale swap must price");
        };
        let Ok((dy_more, _)) = price(dx + extra) else {
            panic!("1e21-scale swap must price");
        };
        prop_assert!(dy_more >= dy, "output shrank at scale");
        let dy = dy.get();
        prop_assert!(dy < rb, "output {} reached reserve {}", dy, rb);
        let before = wide_mul(ra, rb);
        let after = wide_mul(ra + dx * E18 / 1_000, rb - dy);
        prop_assert!(after >= before, "k decreased at scale");
    }
}
