//! # Hydra DEX
//!
//! Constant-product DEX settlement and liquidity engine with direct and
//! two-phase (reserve, then finalize) settlement.
//!
//! This crate provides domain types, an asset registry, a pool store with
//! optimistic concurrency, a settlement engine, an instruction builder and
//! a facade exposing the operations a DEX harness runs:
//!
//! - **Swaps**: direct, reserved-then-finalized, finalized by a different
//!   settler, and slashed after expiry
//! - **Liquidity**: proportional deposits, deposits for an exact share
//!   amount, and withdrawals
//! - **Pool initialization**
//! - **Native-asset forms** of all of the above, wrapping and unwrapping
//!   around the pool's wrapped asset
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hydra_dex::prelude::*;
//!
//! let registry = Arc::new(AssetRegistry::new());
//! let usdc = AssetId::from_bytes([1u8; 32]);
//! let weth = AssetId::from_bytes([2u8; 32]);
//! registry.register(Asset::new(usdc, Decimals::new(6).expect("valid"))).expect("fresh");
//! registry.register(Asset::new(weth, Decimals::new(18).expect("valid"))).expect("fresh");
//!
//! let lp = OwnerId::from_bytes([7u8; 32]);
//! registry.mint(lp, usdc, Amount::new(2_000_000)).expect("mint");
//! registry.mint(lp, weth, Amount::new(2_000_000)).expect("mint");
//!
//! let engine = SettlementEngine::new(
//!     EngineConfig::default(),
//!     Arc::clone(&registry),
//!     Arc::new(PoolStore::new()),
//!     Arc::new(ManualClock::new(Slot::new(0))),
//! )
//! .expect("valid config");
//! let dex = Dex::new(Arc::new(engine));
//!
//! // 1. Create and fund a pool
//! let config = PoolConfig::new(usdc, weth, FeeRate::STANDARD, Amount::new(1_000_000), Amount::new(1_000_000))
//!     .expect("valid pool");
//! dex.init_pool(lp, &config).expect("pool created");
//!
//! // 2. Reserve a swap, then finalize it
//! let intent = SwapIntent::new(lp, usdc, weth, Amount::new(10_000), Amount::new(9_000)).expect("intent");
//! let result = dex.manual_swap(intent).expect("settled");
//! assert!(result.is_finalized());
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │       Dex        │  twenty named operations, manual + transaction forms
//! └────────┬─────────┘
//!          │ TransactionBuilder → Transaction / InstructionSequence
//!          ▼
//! ┌──────────────────┐
//! │ SettlementEngine │  staged execution, pending-settlement arena
//! └───┬──────────┬───┘  Finalizer: finalize / revert / expire
//!     │          │
//!     ▼          ▼
//! ┌────────┐ ┌───────────────┐
//! │PoolStore│ │ AssetRegistry │  per-record locks, CAS on pool sequence
//! └────────┘ └───────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      Domain      │  Amount, AssetId, SwapIntent, LiquidityIntent, …
//! └──────────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`AssetId`](domain::AssetId), [`SwapIntent`](domain::SwapIntent), etc. |
//! | [`registry`] | [`AssetRegistry`](registry::AssetRegistry): assets and per-owner balances |
//! | [`store`] | [`PoolStore`](store::PoolStore) and the [`Pool`](store::Pool) record |
//! | [`settlement`] | [`SettlementEngine`](settlement::SettlementEngine), [`Finalizer`](settlement::Finalizer), pricing |
//! | [`builder`] | [`TransactionBuilder`](builder::TransactionBuilder) and instructions |
//! | [`dex`] | [`Dex`](dex::Dex) facade and [`OperationKind`](dex::OperationKind) |
//! | [`config`] | [`EngineConfig`](config::EngineConfig), [`PoolConfig`](config::PoolConfig) |
//! | [`traits`] | [`SlotClock`](traits::SlotClock), [`TransactionSubmitter`](traits::TransactionSubmitter) |
//! | [`math`] | Checked arithmetic, `mul_div`, integer square root |
//! | [`error`] | [`DexError`](error::DexError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod builder;
pub mod config;
pub mod dex;
pub mod domain;
pub mod error;
pub mod math;
pub mod prelude;
pub mod registry;
pub mod settlement;
pub mod store;
pub mod traits;
