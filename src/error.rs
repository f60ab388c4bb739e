//! Unified error types for the Hydra DEX engine.
//!
//! Every fallible operation in the crate returns [`DexError`].  Callers that
//! need a coarser view (retry or not, surface to the operator or not) can
//! classify any error with [`DexError::kind`].

use thiserror::Error;

use crate::domain::{AssetId, Amount, BasisPoints, LpShares, OwnerId, PoolId, SettlementId};

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, DexError>;

/// Coarse classification of a [`DexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters, rejected before any state change.
    Validation,
    /// A stale optimistic-concurrency write; retry with a fresh read.
    ConcurrencyConflict,
    /// A business rule rejected the request; retry only with new parameters.
    BusinessRule,
    /// Terminal-state or authorization violation; never retried.
    Authorization,
    /// Arithmetic overflow or division by zero.
    Arithmetic,
}

/// All errors produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DexError {
    /// A quantity is zero or otherwise out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// The two assets of a pair are identical or do not belong to the pool.
    #[error("invalid asset pair: {0}")]
    InvalidPair(&'static str),

    /// Decimals outside `0..=18`.
    #[error("invalid precision: {0}")]
    InvalidPrecision(&'static str),

    /// Fee rate outside the supported range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// Engine or pool configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Pool initial reserves must both be non-zero.
    #[error("invalid reserves: initial reserves must be non-zero")]
    InvalidReserves,

    /// The operation kind does not match the supplied request.
    #[error("operation mismatch: {0}")]
    OperationMismatch(&'static str),

    /// The asset id is not registered.
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    /// The asset id is already registered.
    #[error("asset {0} is already registered")]
    DuplicateAsset(AssetId),

    /// A second native asset was registered.
    #[error("a native asset is already registered")]
    DuplicateNativeAsset,

    /// A native-asset operation ran against a registry without one.
    #[error("no native asset is registered")]
    NativeAssetMissing,

    /// No pool with this id.
    #[error("unknown pool {0}")]
    UnknownPool(PoolId),

    /// No pending settlement with this id.
    #[error("unknown settlement {0}")]
    UnknownSettlement(SettlementId),

    /// The transaction builder was asked to build nothing.
    #[error("operation set is empty")]
    EmptyOperationSet,

    /// The unordered asset pair already has a pool.
    #[error("a pool already exists for this asset pair ({0})")]
    PoolAlreadyExists(PoolId),

    /// Optimistic-concurrency write against an outdated sequence.
    #[error("stale sequence: expected {expected}, pool is at {actual}")]
    StaleSequence {
        /// Sequence the caller observed.
        expected: u64,
        /// Sequence the pool is currently at.
        actual: u64,
    },

    /// The source balance cannot cover the transfer.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount the transfer needed.
        requested: Amount,
        /// Balance actually held.
        available: Amount,
    },

    /// The computed amount fell outside the caller's bound.
    #[error("slippage exceeded: bound {bound}, computed {actual}")]
    SlippageExceeded {
        /// Minimum (or maximum) the caller accepts.
        bound: Amount,
        /// Amount the engine computed.
        actual: Amount,
    },

    /// A deposit deviates from the pool ratio by more than the tolerance.
    #[error("deposit ratio deviates by {deviation} (tolerance {tolerance})")]
    RatioMismatch {
        /// Measured deviation.
        deviation: BasisPoints,
        /// Configured tolerance.
        tolerance: BasisPoints,
    },

    /// Withdrawal exceeds the owner's recorded LP shares.
    #[error("insufficient LP share: requested {requested}, owned {owned}")]
    InsufficientShare {
        /// Shares requested.
        requested: LpShares,
        /// Shares recorded for the owner.
        owned: LpShares,
    },

    /// Available reserves cannot satisfy the request.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The delta would drive a reserve, lock or share balance below zero.
    #[error("reserve delta would drive pool state negative")]
    NegativeReserve,

    /// An unresolved settlement by the same owner already uses this salt.
    #[error("duplicate order: salt is in use by settlement {0}")]
    DuplicateOrder(SettlementId),

    /// The pending settlement already reached a terminal state.
    #[error("settlement {0} is already resolved")]
    AlreadyResolved(SettlementId),

    /// The caller may not finalize or revert this settlement.
    #[error("{caller} is not authorized to resolve settlement {id}")]
    UnauthorizedSettler {
        /// Settlement in question.
        id: SettlementId,
        /// Identity that attempted the resolution.
        caller: OwnerId,
    },

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Division by zero in a pricing or share computation.
    #[error("division by zero")]
    DivisionByZero,
}

impl DexError {
    /// Classifies the error for retry and reporting policy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity(_)
            | Self::InvalidPair(_)
            | Self::InvalidPrecision(_)
            | Self::InvalidFee(_)
            | Self::InvalidConfiguration(_)
            | Self::InvalidReserves
            | Self::OperationMismatch(_)
            | Self::UnknownAsset(_)
            | Self::DuplicateAsset(_)
            | Self::DuplicateNativeAsset
            | Self::NativeAssetMissing
            | Self::UnknownPool(_)
            | Self::UnknownSettlement(_)
            | Self::EmptyOperationSet
            | Self::DuplicateOrder(_) => ErrorKind::Validation,
            Self::StaleSequence { .. } => ErrorKind::ConcurrencyConflict,
            Self::PoolAlreadyExists(_)
            | Self::InsufficientBalance { .. }
            | Self::SlippageExceeded { .. }
            | Self::RatioMismatch { .. }
            | Self::InsufficientShare { .. }
            | Self::InsufficientLiquidity
            | Self::NegativeReserve => ErrorKind::BusinessRule,
            Self::AlreadyResolved(_) | Self::UnauthorizedSettler { .. } => {
                ErrorKind::Authorization
            }
            Self::Overflow(_) | Self::DivisionByZero => ErrorKind::Arithmetic,
        }
    }

    /// Returns `true` if retrying with a refreshed pool read may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConcurrencyConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_sequence_is_retryable() {
        let e = DexError::StaleSequence {
            expected: 3,
            actual: 4,
        };
        assert_eq!(e.kind(), ErrorKind::ConcurrencyConflict);
        assert!(e.is_retryable());
    }

    #[test]
    fn business_rules_are_not_retryable() {
        let e = DexError::SlippageExceeded {
            bound: Amount::new(100),
            actual: Amount::new(90),
        };
        assert_eq!(e.kind(), ErrorKind::BusinessRule);
        assert!(!e.is_retryable());
    }

    #[test]
    fn terminal_state_is_authorization() {
        let e = DexError::AlreadyResolved(SettlementId::new(7));
        assert_eq!(e.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn display_includes_context() {
        let e = DexError::StaleSequence {
            expected: 1,
            actual: 2,
        };
        assert_eq!(e.to_string(), "stale sequence: expected 1, pool is at 2");
        assert_eq!(
            DexError::InvalidQuantity("zero").to_string(),
            "invalid quantity: zero"
        );
    }
}
