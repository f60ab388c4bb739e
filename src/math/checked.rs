//! Checked arithmetic trait for domain wrapper types.
//!
//! [`CheckedArithmetic`] turns the `Option`-returning `checked_*` methods of
//! [`Amount`] and [`LpShares`] into `Result`s carrying a [`DexError`], so
//! engine code can chain them with `?`.
//!
//! ```
//! use hydra_dex::domain::Amount;
//! use hydra_dex::math::CheckedArithmetic;
//!
//! let sum = Amount::new(100).safe_add(&Amount::new(200));
//! assert_eq!(sum, Ok(Amount::new(300)));
//! assert!(Amount::new(1).safe_sub(&Amount::new(2)).is_err());
//! ```

use crate::domain::{Amount, LpShares};
use crate::error::DexError;

/// Fallible arithmetic for domain wrapper types.
///
/// No panics and no saturation: every error condition is an `Err`.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Overflow`] on overflow.
    fn safe_add(&self, other: &Self) -> Result<Self, DexError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::NegativeReserve`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, DexError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, DexError> {
        self.checked_add(other)
            .ok_or(DexError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, DexError> {
        self.checked_sub(other).ok_or(DexError::NegativeReserve)
    }
}

impl CheckedArithmetic for LpShares {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, DexError> {
        self.checked_add(other)
            .ok_or(DexError::Overflow("share addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, DexError> {
        self.checked_sub(other).ok_or(DexError::NegativeReserve)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn amount_overflow() {
        let Err(DexError::Overflow(_)) = Amount::MAX.safe_add(&Amount::new(1)) else {
            panic!("expected Overflow");
        };
    }

    #[test]
    fn amount_negative() {
        assert_eq!(
            Amount::new(1).safe_sub(&Amount::new(2)),
            Err(DexError::NegativeReserve)
        );
    }

    #[test]
    fn shares_round_trip() {
        let Ok(sum) = LpShares::new(10).safe_add(&LpShares::new(5)) else {
            panic!("expected Ok");
        };
        assert_eq!(sum.safe_sub(&LpShares::new(5)), Ok(LpShares::new(10)));
    }
}
