//! Composition of instructions into a transaction or a sequence.

use crate::config::PoolConfig;
use crate::domain::{
    AssetId, LiquidityAction, LiquidityIntent, OwnerId, SettlementId, Side, SwapIntent,
};
use crate::error::{DexError, Result};

use super::Instruction;

/// Instructions committed all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    instructions: Vec<Instruction>,
}

/// Instructions committed one at a time, stopping at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
}

macro_rules! instruction_list {
    ($ty:ident) => {
        impl $ty {
            /// Instructions in execution order.
            #[must_use]
            pub fn instructions(&self) -> &[Instruction] {
                &self.instructions
            }

            /// Consumes the wrapper.
            #[must_use]
            pub fn into_instructions(self) -> Vec<Instruction> {
                self.instructions
            }

            /// Number of instructions (never zero).
            #[must_use]
            pub fn len(&self) -> usize {
                self.instructions.len()
            }

            /// Always `false`: empty lists are rejected at build time.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.instructions.is_empty()
            }
        }
    };
}

instruction_list!(Transaction);
instruction_list!(InstructionSequence);

/// Collects instructions in caller order.
///
/// The builder never reorders.  The native-asset helpers insert a
/// [`Instruction::WrapNative`] before an instruction that pays native units
/// and an [`Instruction::UnwrapNative`] after one that pays them out, and
/// rewrite the native asset id to its wrapped form, which is what pools
/// trade.
///
/// # Examples
///
/// ```
/// use hydra_dex::builder::TransactionBuilder;
/// use hydra_dex::domain::{Amount, AssetId, OwnerId, SwapIntent};
/// use hydra_dex::error::DexError;
///
/// assert_eq!(TransactionBuilder::new().build_transaction(), Err(DexError::EmptyOperationSet));
///
/// let owner = OwnerId::from_bytes([1; 32]);
/// let native = AssetId::from_bytes([0x11; 32]);
/// let usdc = AssetId::from_bytes([2; 32]);
/// let intent = SwapIntent::new(owner, native, usdc, Amount::new(1_000), Amount::new(1)).expect("valid");
///
/// let tx = TransactionBuilder::new()
///     .swap_native(intent, native)
///     .expect("native input")
///     .build_transaction()
///     .expect("non-empty");
/// assert_eq!(tx.len(), 2);
/// assert_eq!(tx.instructions()[0].name(), "wrap_native");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBuilder {
    instructions: Vec<Instruction>,
}

impl TransactionBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one instruction.
    #[must_use]
    pub fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Number of collected instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Appends a direct swap.
    #[must_use]
    pub fn swap(self, intent: SwapIntent) -> Self {
        self.push(Instruction::Swap(intent))
    }

    /// Appends a reservation.
    #[must_use]
    pub fn reserve_swap(self, intent: SwapIntent) -> Self {
        self.push(Instruction::ReserveSwap(intent))
    }

    /// Appends a finalize.
    #[must_use]
    pub fn finalize(self, settlement: SettlementId, settler: OwnerId) -> Self {
        self.push(Instruction::FinalizeSwap {
            settlement,
            settler,
        })
    }

    /// Appends a revert.
    #[must_use]
    pub fn revert(self, settlement: SettlementId, caller: OwnerId) -> Self {
        self.push(Instruction::RevertSwap { settlement, caller })
    }

    /// Appends a liquidity change.
    #[must_use]
    pub fn liquidity(self, intent: LiquidityIntent) -> Self {
        self.push(Instruction::Liquidity(intent))
    }

    /// Appends a pool creation.
    #[must_use]
    pub fn init_pool(self, founder: OwnerId, config: PoolConfig) -> Self {
        self.push(Instruction::InitPool { founder, config })
    }

    /// Direct swap with native units on either side.
    ///
    /// Native output is paid by unwrapping the owner's whole wrapped
    /// balance after the swap, so wrapped units held beforehand come back
    /// as native too.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidPair`] if neither side is `native`.
    pub fn swap_native(self, intent: SwapIntent, native: AssetId) -> Result<Self> {
        let pays = intent.asset_in() == native;
        let receives = intent.asset_out() == native;
        if !pays && !receives {
            return Err(DexError::InvalidPair("neither side is the native asset"));
        }
        let owner = intent.owner();
        let wrapped = wrap_assets(intent, native);
        let mut builder = self;
        if pays {
            builder = builder.push(Instruction::WrapNative {
                owner,
                amount: intent.amount_in(),
            });
        }
        builder = builder.swap(wrapped);
        if receives {
            builder = builder.push(Instruction::UnwrapNative {
                owner,
                amount: None,
            });
        }
        Ok(builder)
    }

    /// Reservation with native units on either side.
    ///
    /// Native input is wrapped up front; native output is unwrapped by
    /// [`finalize_native`](Self::finalize_native).
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidPair`] if neither side is `native`.
    pub fn reserve_swap_native(self, intent: SwapIntent, native: AssetId) -> Result<Self> {
        if intent.asset_in() != native && intent.asset_out() != native {
            return Err(DexError::InvalidPair("neither side is the native asset"));
        }
        let mut builder = self;
        if intent.asset_in() == native {
            builder = builder.push(Instruction::WrapNative {
                owner: intent.owner(),
                amount: intent.amount_in(),
            });
        }
        Ok(builder.reserve_swap(wrap_assets(intent, native)))
    }

    /// Finalize followed by unwrapping `owner`'s wrapped balance.
    ///
    /// The unwrap takes the whole wrapped balance, not just this
    /// settlement's output.  Wrapped units the owner held before, including
    /// input promised to other open reservations, are unwrapped as well;
    /// those reservations then fail to finalize until the owner wraps again.
    #[must_use]
    pub fn finalize_native(self, settlement: SettlementId, settler: OwnerId, owner: OwnerId) -> Self {
        self.finalize(settlement, settler).push(Instruction::UnwrapNative {
            owner,
            amount: None,
        })
    }

    /// Pool creation with native units on one side.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if neither side is `native`.
    /// - Any [`PoolConfig`] validation error for the rewritten config.
    pub fn init_pool_native(self, founder: OwnerId, config: PoolConfig, native: AssetId) -> Result<Self> {
        let amount = if config.asset_a() == native {
            config.reserve_a()
        } else if config.asset_b() == native {
            config.reserve_b()
        } else {
            return Err(DexError::InvalidPair("neither side is the native asset"));
        };
        let wrapped = config.with_asset_replaced(native, AssetId::wrapped_of(native))?;
        Ok(self
            .push(Instruction::WrapNative {
                owner: founder,
                amount,
            })
            .init_pool(founder, wrapped))
    }

    /// Liquidity change on a pool whose `native_side` holds the wrapped
    /// native asset.
    ///
    /// Deposits wrap the native side's amount first (the maximum, for
    /// exact-share deposits); withdrawals and exact-share deposits unwrap
    /// whatever wrapped balance remains afterwards.
    #[must_use]
    pub fn liquidity_native(self, intent: LiquidityIntent, native_side: Side) -> Self {
        let owner = intent.owner();
        let pick = |a, b| match native_side {
            Side::A => a,
            Side::B => b,
        };
        match intent.action() {
            LiquidityAction::Deposit {
                amount_a, amount_b, ..
            } => self
                .push(Instruction::WrapNative {
                    owner,
                    amount: pick(amount_a, amount_b),
                })
                .liquidity(intent),
            LiquidityAction::DepositForShares { max_a, max_b, .. } => self
                .push(Instruction::WrapNative {
                    owner,
                    amount: pick(max_a, max_b),
                })
                .liquidity(intent)
                .push(Instruction::UnwrapNative {
                    owner,
                    amount: None,
                }),
            LiquidityAction::Withdraw { .. } => self.liquidity(intent).push(Instruction::UnwrapNative {
                owner,
                amount: None,
            }),
        }
    }

    /// Finishes an all-or-nothing transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::EmptyOperationSet`] if nothing was collected.
    pub fn build_transaction(self) -> Result<Transaction> {
        if self.instructions.is_empty() {
            return Err(DexError::EmptyOperationSet);
        }
        Ok(Transaction {
            instructions: self.instructions,
        })
    }

    /// Finishes a one-at-a-time sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::EmptyOperationSet`] if nothing was collected.
    pub fn build_sequence(self) -> Result<InstructionSequence> {
        if self.instructions.is_empty() {
            return Err(DexError::EmptyOperationSet);
        }
        Ok(InstructionSequence {
            instructions: self.instructions,
        })
    }
}

fn wrap_assets(intent: SwapIntent, native: AssetId) -> SwapIntent {
    let wrapped = AssetId::wrapped_of(native);
    let swap = |id: AssetId| if id == native { wrapped } else { id };
    intent.with_assets(swap(intent.asset_in()), swap(intent.asset_out()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Amount, FeeRate, LpShares, PoolId};

    fn owner() -> OwnerId {
        OwnerId::from_bytes([1; 32])
    }

    fn native() -> AssetId {
        AssetId::from_bytes([0x11; 32])
    }

    fn usdc() -> AssetId {
        AssetId::from_bytes([2; 32])
    }

    fn intent(asset_in: AssetId, asset_out: AssetId) -> SwapIntent {
        let Ok(i) = SwapIntent::new(owner(), asset_in, asset_out, Amount::new(1_000), Amount::new(1)) else {
            panic!("valid intent");
        };
        i
    }

    #[test]
    fn empty_builds_fail() {
        assert_eq!(TransactionBuilder::new().build_sequence(), Err(DexError::EmptyOperationSet));
        assert_eq!(TransactionBuilder::new().build_transaction(), Err(DexError::EmptyOperationSet));
    }

    #[test]
    fn order_is_preserved() {
        let Ok(seq) = TransactionBuilder::new()
            .revert(SettlementId::new(2), owner())
            .swap(intent(usdc(), native()))
            .finalize(SettlementId::new(1), owner())
            .build_sequence()
        else {
            panic!("non-empty");
        };
        let names: Vec<&str> = seq.instructions().iter().map(Instruction::name).collect();
        assert_eq!(names, ["revert_swap", "swap", "finalize_swap"]);
    }

    #[test]
    fn native_output_unwraps_after_swap() {
        let Ok(builder) = TransactionBuilder::new().swap_native(intent(usdc(), native()), native()) else {
            panic!("native output");
        };
        let Ok(tx) = builder.build_transaction() else {
            panic!("non-empty");
        };
        let [Instruction::Swap(rewritten), Instruction::UnwrapNative { amount: None, .. }] = tx.instructions()
        else {
            panic!("unexpected shape: {tx:?}");
        };
        assert_eq!(rewritten.asset_out(), AssetId::wrapped_of(native()));
        assert_eq!(rewritten.asset_in(), usdc());
    }

    #[test]
    fn non_native_swap_rejected() {
        let r = TransactionBuilder::new().swap_native(intent(usdc(), AssetId::from_bytes([3; 32])), native());
        assert!(matches!(r, Err(DexError::InvalidPair(_))));
    }

    #[test]
    fn native_pool_wraps_native_reserve() {
        let Ok(cfg) = PoolConfig::new(native(), usdc(), FeeRate::STANDARD, Amount::new(1_000), Amount::new(1_001))
        else {
            panic!("valid config");
        };
        let Ok(builder) = TransactionBuilder::new().init_pool_native(owner(), cfg, native()) else {
            panic!("native side present");
        };
        let Ok(tx) = builder.build_transaction() else {
            panic!("non-empty");
        };
        let [Instruction::WrapNative { amount, .. }, Instruction::InitPool { config, .. }] = tx.instructions()
        else {
            panic!("unexpected shape: {tx:?}");
        };
        assert_eq!(*amount, Amount::new(1_000));
        assert_eq!(config.asset_a(), AssetId::wrapped_of(native()));
    }

    #[test]
    fn native_withdraw_unwraps() {
        let Ok(intent) = LiquidityIntent::withdraw(PoolId::new(0), owner(), LpShares::new(20), Amount::new(1), Amount::new(1))
        else {
            panic!("valid intent");
        };
        let builder = TransactionBuilder::new().liquidity_native(intent, Side::B);
        assert_eq!(builder.len(), 2);
    }
}
