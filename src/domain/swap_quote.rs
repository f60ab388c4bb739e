//! Priced swap against a specific pool state.

use super::{Amount, PoolId};
use crate::error::DexError;

/// The price of a swap against the pool state at `sequence`.
///
/// # Invariants
///
/// - `amount_in > 0` and `amount_out > 0`.
/// - `fee < amount_in`.
///
/// ```
/// use hydra_dex::domain::{Amount, PoolId, SwapQuote};
///
/// let q = SwapQuote::new(PoolId::new(0), 4, Amount::new(100), Amount::new(90), Amount::new(1));
/// assert!(q.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapQuote {
    pool: PoolId,
    sequence: u64,
    amount_in: Amount,
    amount_out: Amount,
    fee: Amount,
}

impl SwapQuote {
    /// Creates a quote with validated invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidQuantity`] if an amount is zero or the fee
    /// swallows the whole input.
    pub const fn new(
        pool: PoolId,
        sequence: u64,
        amount_in: Amount,
        amount_out: Amount,
        fee: Amount,
    ) -> crate::error::Result<Self> {
        if amount_in.is_zero() {
            return Err(DexError::InvalidQuantity("amount_in must be positive"));
        }
        if amount_out.is_zero() {
            return Err(DexError::InvalidQuantity("amount_out must be positive"));
        }
        if fee.get() >= amount_in.get() {
            return Err(DexError::InvalidQuantity("fee must be less than amount_in"));
        }
        Ok(Self {
            pool,
            sequence,
            amount_in,
            amount_out,
            fee,
        })
    }

    /// Pool the quote was computed against.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }

    /// Pool sequence observed when pricing.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Input amount.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Output amount.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Fee retained by the pool.
    pub const fn fee(&self) -> Amount {
        self.fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_must_be_below_input() {
        let r = SwapQuote::new(PoolId::new(0), 0, Amount::new(5), Amount::new(1), Amount::new(5));
        assert_eq!(r, Err(DexError::InvalidQuantity("fee must be less than amount_in")));
    }

    #[test]
    fn zero_output_rejected() {
        let r = SwapQuote::new(PoolId::new(0), 0, Amount::new(5), Amount::ZERO, Amount::ZERO);
        assert!(r.is_err());
    }
}
