//! The named operations a harness can ask the [`Dex`](super::Dex) for.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DexError;

/// One of the operations exposed by [`Dex`](super::Dex): the twenty
/// state-changing ones plus the read-only [`Quote`](Self::Quote).
///
/// Names are the harness's `snake_case` spellings; `sol` marks the
/// native-asset forms.  `Manual*` variants run as instruction sequences
/// that commit step by step; the others run as one all-or-nothing
/// transaction.
///
/// ```
/// use hydra_dex::dex::OperationKind;
///
/// let kind: OperationKind = "manual_swap_to_sol".parse().expect("known name");
/// assert!(kind.is_manual());
/// assert!(kind.is_native());
/// assert_eq!(kind.as_str(), "manual_swap_to_sol");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Reserve a swap, then finalize it as the owner.
    ManualSwap,
    /// Reserve a swap naming a settler, who then finalizes it.
    ManualSwapDifferentSettler,
    /// Resolve an expired reservation; its locked output is released.
    ManualSwapSlash,
    /// Direct swap in one transaction.
    Swap,
    /// Reservation transaction naming a settler, then the settler's
    /// finalize transaction.
    SwapDifferentSettler,
    /// Proportional deposit as a single instruction.
    ManualAddLiquidity,
    /// Proportional deposit in one transaction.
    AddLiquidity,
    /// Share withdrawal as a single instruction.
    ManualRemoveLiquidity,
    /// Share withdrawal in one transaction.
    RemoveLiquidity,
    /// Wrap native units, then deposit; each step commits on its own.
    ManualAddLiquiditySol,
    /// Withdraw, then unwrap the native side; each step commits on its own.
    ManualRemoveLiquiditySol,
    /// Withdraw and unwrap in one transaction.
    RemoveLiquiditySol,
    /// Wrap and deposit in one transaction.
    AddLiquiditySol,
    /// Wrap and reserve native input, then finalize.
    ManualSwapFromSol,
    /// Reserve with native output, then finalize and unwrap.
    ManualSwapToSol,
    /// Wrap and swap in one transaction.
    SwapFromSol,
    /// Swap and unwrap in one transaction.
    SwapToSol,
    /// Pool creation as a single instruction.
    ManualInitPool,
    /// Pool creation in one transaction.
    InitPool,
    /// Wrap the native side and create the pool in one transaction.
    InitPoolSol,
    /// Price a swap against current reserves without changing anything.
    Quote,
}

impl OperationKind {
    /// Every operation, in the harness's listing order, `quote` last.
    pub const ALL: [Self; 21] = [
        Self::ManualSwap,
        Self::ManualSwapDifferentSettler,
        Self::ManualSwapSlash,
        Self::Swap,
        Self::SwapDifferentSettler,
        Self::ManualAddLiquidity,
        Self::AddLiquidity,
        Self::ManualRemoveLiquidity,
        Self::RemoveLiquidity,
        Self::ManualAddLiquiditySol,
        Self::ManualRemoveLiquiditySol,
        Self::RemoveLiquiditySol,
        Self::AddLiquiditySol,
        Self::ManualSwapFromSol,
        Self::ManualSwapToSol,
        Self::SwapFromSol,
        Self::SwapToSol,
        Self::ManualInitPool,
        Self::InitPool,
        Self::InitPoolSol,
        Self::Quote,
    ];

    /// Harness name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualSwap => "manual_swap",
            Self::ManualSwapDifferentSettler => "manual_swap_different_settler",
            Self::ManualSwapSlash => "manual_swap_slash",
            Self::Swap => "swap",
            Self::SwapDifferentSettler => "swap_different_settler",
            Self::ManualAddLiquidity => "manual_add_liquidity",
            Self::AddLiquidity => "add_liquidity",
            Self::ManualRemoveLiquidity => "manual_remove_liquidity",
            Self::RemoveLiquidity => "remove_liquidity",
            Self::ManualAddLiquiditySol => "manual_add_liquidity_sol",
            Self::ManualRemoveLiquiditySol => "manual_remove_liquidity_sol",
            Self::RemoveLiquiditySol => "remove_liquidity_sol",
            Self::AddLiquiditySol => "add_liquidity_sol",
            Self::ManualSwapFromSol => "manual_swap_from_sol",
            Self::ManualSwapToSol => "manual_swap_to_sol",
            Self::SwapFromSol => "swap_from_sol",
            Self::SwapToSol => "swap_to_sol",
            Self::ManualInitPool => "manual_init_pool",
            Self::InitPool => "init_pool",
            Self::InitPoolSol => "init_pool_sol",
            Self::Quote => "quote",
        }
    }

    /// Instruction-level (sequence) entry point rather than a composed
    /// transaction.
    #[must_use]
    pub const fn is_manual(self) -> bool {
        matches!(
            self,
            Self::ManualSwap
                | Self::ManualSwapDifferentSettler
                | Self::ManualSwapSlash
                | Self::ManualAddLiquidity
                | Self::ManualRemoveLiquidity
                | Self::ManualAddLiquiditySol
                | Self::ManualRemoveLiquiditySol
                | Self::ManualSwapFromSol
                | Self::ManualSwapToSol
                | Self::ManualInitPool
        )
    }

    /// One side of the pair is the native asset.
    #[must_use]
    pub const fn is_native(self) -> bool {
        matches!(
            self,
            Self::ManualAddLiquiditySol
                | Self::ManualRemoveLiquiditySol
                | Self::RemoveLiquiditySol
                | Self::AddLiquiditySol
                | Self::ManualSwapFromSol
                | Self::ManualSwapToSol
                | Self::SwapFromSol
                | Self::SwapToSol
                | Self::InitPoolSol
        )
    }

    /// Reads pool state only.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Quote)
    }

    /// A settler other than the owner resolves the swap.
    #[must_use]
    pub const fn uses_distinct_settler(self) -> bool {
        matches!(self, Self::ManualSwapDifferentSettler | Self::SwapDifferentSettler)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(DexError::InvalidConfiguration("unknown operation name"))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>(), Ok(kind));
        }
    }

    #[test]
    fn manual_and_native_split() {
        let manual = OperationKind::ALL.iter().filter(|k| k.is_manual()).count();
        let native = OperationKind::ALL.iter().filter(|k| k.is_native()).count();
        assert_eq!(manual, 10);
        assert_eq!(native, 9);
        assert!(!OperationKind::Swap.is_manual());
        assert!(OperationKind::SwapDifferentSettler.uses_distinct_settler());
    }

    #[test]
    fn quote_is_the_only_read_only_operation() {
        let read_only: Vec<_> = OperationKind::ALL.into_iter().filter(|k| k.is_read_only()).collect();
        assert_eq!(read_only, [OperationKind::Quote]);
        assert_eq!("quote".parse::<OperationKind>(), Ok(OperationKind::Quote));
        assert!(!OperationKind::Quote.is_manual() && !OperationKind::Quote.is_native());
    }

    #[test]
    fn unknown_name_rejected() {
        assert!("quote_all".parse::<OperationKind>().is_err());
    }

    #[test]
    fn serde_uses_harness_names() {
        let Ok(json) = serde_json::to_string(&OperationKind::AddLiquiditySol) else {
            panic!("serializes");
        };
        assert_eq!(json, "\"add_liquidity_sol\"");
    }
}
