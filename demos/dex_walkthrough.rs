//! DEX walkthrough.
//!
//! Funds two accounts, creates a pool, then runs a direct swap, a
//! reserve-then-finalize swap, an expired reservation swept by the
//! finalizer, a liquidity round trip and a native-asset swap.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=hydra_dex=debug cargo run --example dex_walkthrough
//! ```

use std::sync::Arc;

use hydra_dex::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Hydra DEX walkthrough ===\n");

    // ── 1. Register assets and fund accounts ────────────────────────────
    let registry = Arc::new(AssetRegistry::new());
    let usdc = AssetId::from_bytes([1u8; 32]);
    let weth = AssetId::from_bytes([2u8; 32]);
    let sol = AssetId::from_bytes([3u8; 32]);
    registry.register(Asset::new(usdc, Decimals::new(6)?))?;
    registry.register(Asset::new(weth, Decimals::new(18)?))?;
    registry.register(Asset::native(sol, Decimals::new(9)?))?;

    let lp = OwnerId::from_bytes([10u8; 32]);
    let trader = OwnerId::from_bytes([11u8; 32]);
    for owner in [lp, trader] {
        for asset in [usdc, weth, sol] {
            registry.mint(owner, asset, Amount::new(5_000_000))?;
        }
    }

    // ── 2. Build the engine on a manual clock ───────────────────────────
    let clock = Arc::new(ManualClock::new(Slot::new(0)));
    let engine = SettlementEngine::new(
        EngineConfig::default(),
        Arc::clone(&registry),
        Arc::new(PoolStore::new()),
        Arc::clone(&clock) as Arc<dyn SlotClock>,
    )?;
    let dex = Dex::new(Arc::new(engine));
    println!("Operations served: {}", Dex::operations().len());

    // ── 3. Create a 0.30% USDC/WETH pool ────────────────────────────────
    let config = PoolConfig::new(usdc, weth, FeeRate::STANDARD, Amount::new(1_000_000), Amount::new(1_000_000))?;
    let pool_id = dex.init_pool(lp, &config)?;
    let pool = dex.engine().pools().get_pool(pool_id)?;
    println!("\nPool {pool_id} created, {} LP shares minted", pool.total_shares());

    // ── 4. Quote and swap directly ──────────────────────────────────────
    let quote = dex.quote(usdc, weth, Amount::new(10_000))?;
    println!("\nQuote 10000 USDC -> {} WETH (fee {})", quote.amount_out(), quote.fee());
    let receipt = dex.swap(SwapIntent::new(trader, usdc, weth, Amount::new(10_000), quote.amount_out())?)?;
    println!("Direct swap paid out {}", receipt.amount_out());

    // ── 5. Reserve, then finalize ───────────────────────────────────────
    let intent = SwapIntent::new(trader, weth, usdc, Amount::new(5_000), Amount::new(1))?;
    if let SettlementResult::Finalized(receipt) = dex.manual_swap(intent)? {
        println!("\nTwo-phase swap finalized: {} USDC out", receipt.amount_out());
    }

    // ── 6. Let a reservation expire and sweep it ────────────────────────
    let stale = dex.manual_reserve(SwapIntent::new(trader, usdc, weth, Amount::new(2_000), Amount::new(1))?)?;
    let pool = dex.engine().pools().get_pool(pool_id)?;
    println!("\nReserved {stale}: available WETH now {}", pool.available(Side::B));
    clock.advance(dex.engine().config().settlement_ttl_slots());
    let swept = dex.engine().finalizer().expire_stale();
    let pool = dex.engine().pools().get_pool(pool_id)?;
    println!("Swept {} expired reservation(s); available WETH back to {}", swept.len(), pool.available(Side::B));
    println!("Pruned {} resolved record(s)", dex.engine().prune_resolved());

    // ── 7. Liquidity round trip ─────────────────────────────────────────
    let added = dex.add_liquidity(LiquidityIntent::deposit_for_shares(
        pool_id,
        trader,
        LpShares::new(1_000),
        Amount::new(10_000),
        Amount::new(10_000),
    )?)?;
    println!(
        "\nDeposited {} USDC + {} WETH for {} shares",
        added.amount_a(),
        added.amount_b(),
        added.shares()
    );
    let removed = dex.remove_liquidity(LiquidityIntent::withdraw(
        pool_id,
        trader,
        added.shares(),
        Amount::ZERO,
        Amount::ZERO,
    )?)?;
    println!("Withdrew {} USDC + {} WETH", removed.amount_a(), removed.amount_b());

    // ── 8. Native asset ─────────────────────────────────────────────────
    let native_config = PoolConfig::new(sol, usdc, FeeRate::STANDARD, Amount::new(500_000), Amount::new(500_000))?;
    let native_pool = dex.init_pool_sol(lp, &native_config)?;
    let out = dex.swap_to_sol(SwapIntent::new(trader, usdc, sol, Amount::new(1_000), Amount::new(1))?)?;
    println!(
        "\nNative pool {native_pool}: 1000 USDC bought {} SOL; trader holds {} SOL",
        out.amount_out(),
        registry.balance_of(&trader, &sol)
    );

    println!("\nDone.");
    Ok(())
}
