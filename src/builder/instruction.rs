//! The instruction set the settlement engine executes.

use core::fmt;

use crate::config::PoolConfig;
use crate::domain::{Amount, LiquidityIntent, OwnerId, SettlementId, SwapIntent};

/// One step of a [`Transaction`](super::Transaction) or
/// [`InstructionSequence`](super::InstructionSequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Convert native units into the wrapped asset.
    WrapNative {
        /// Owner converting.
        owner: OwnerId,
        /// Units to convert.
        amount: Amount,
    },
    /// Convert wrapped units back to native; `None` converts everything.
    UnwrapNative {
        /// Owner converting.
        owner: OwnerId,
        /// Units to convert, or the whole wrapped balance.
        amount: Option<Amount>,
    },
    /// Create a pool funded by `founder`.
    InitPool {
        /// Owner paying the initial reserves and receiving the initial shares.
        founder: OwnerId,
        /// Pool parameters.
        config: PoolConfig,
    },
    /// Swap immediately.
    Swap(SwapIntent),
    /// Lock output capacity for later settlement.
    ReserveSwap(SwapIntent),
    /// Complete a reservation.
    FinalizeSwap {
        /// Reservation to complete.
        settlement: SettlementId,
        /// Caller, checked against the settler policy.
        settler: OwnerId,
    },
    /// Release a reservation.
    RevertSwap {
        /// Reservation to release.
        settlement: SettlementId,
        /// Caller, checked against the settler policy until expiry.
        caller: OwnerId,
    },
    /// Deposit or withdraw liquidity.
    Liquidity(LiquidityIntent),
}

impl Instruction {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WrapNative { .. } => "wrap_native",
            Self::UnwrapNative { .. } => "unwrap_native",
            Self::InitPool { .. } => "init_pool",
            Self::Swap(_) => "swap",
            Self::ReserveSwap(_) => "reserve_swap",
            Self::FinalizeSwap { .. } => "finalize_swap",
            Self::RevertSwap { .. } => "revert_swap",
            Self::Liquidity(intent) => {
                if intent.is_deposit() {
                    "add_liquidity"
                } else {
                    "remove_liquidity"
                }
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
