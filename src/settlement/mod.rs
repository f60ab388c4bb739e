//! Settlement: direct swaps, two-phase reservations and liquidity changes.
//!
//! | Type | Role |
//! |------|------|
//! | [`SettlementEngine`] | Executes instructions against the registry and pool store |
//! | [`Finalizer`] | Finalizes, reverts and sweeps reservations |
//! | [`PendingSettlement`] | A reserved swap awaiting resolution |
//! | [`Outcome`] | Result of one executed instruction |
//!
//! Pricing lives in [`pricing`] and is usable on its own.
//!
//! # Two-Phase Settlement
//!
//! ```text
//!  reserve_swap ──► Reserved ──finalize──► Finalized
//!                      │
//!                      ├──revert────────► Reverted
//!                      └──(expired) finalize/revert by anyone ──► Reverted
//! ```
//!
//! A reservation locks its output in the pool so later trades cannot
//! consume it.  The owner's input moves only on finalize.

mod arena;
mod engine;
mod finalizer;
mod pending;
pub mod pricing;
mod receipt;
mod staging;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

pub use engine::SettlementEngine;
pub use finalizer::Finalizer;
pub use pending::{PendingSettlement, SettlementState};
pub use receipt::{LiquidityReceipt, Outcome, SettlementResult, SwapReceipt};
