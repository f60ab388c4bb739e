//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use hydra_dex::prelude::*;
//! ```

// Domain types
pub use crate::domain::{
    Amount, Asset, AssetId, AssetPair, BasisPoints, Decimals, FeeRate, LiquidityAction,
    LiquidityIntent, LpShares, OwnerId, PoolId, Salt, SettlementId, Side, Slot, SwapIntent,
    SwapQuote,
};

// Core components
pub use crate::builder::{Instruction, InstructionSequence, Transaction, TransactionBuilder};
pub use crate::dex::{Dex, OperationKind};
pub use crate::registry::AssetRegistry;
pub use crate::settlement::{
    Finalizer, LiquidityReceipt, Outcome, PendingSettlement, SettlementEngine, SettlementResult,
    SettlementState, SwapReceipt,
};
pub use crate::store::{Pool, PoolStore, PoolUpdate};

// Traits
pub use crate::math::CheckedArithmetic;
pub use crate::traits::{ManualClock, SequenceReport, SlotClock, TransactionSubmitter};

// Configuration
pub use crate::config::{EngineConfig, PoolConfig, SettlerPolicy};

// Errors
pub use crate::error::{DexError, ErrorKind, Result};
