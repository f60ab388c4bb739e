//! Pool fee rate built on [`BasisPoints`].

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, BasisPoints, Rounding};
use crate::error::DexError;

/// The swap fee charged by a pool, deducted from the input amount.
///
/// Rates of 100% or more are rejected: they would leave no effective input
/// for the pricing formula.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, FeeRate, Rounding};
///
/// let fee = FeeRate::STANDARD;
/// assert_eq!(fee.basis_points().get(), 30);
/// assert_eq!(fee.fee_on(Amount::new(100)).expect("no overflow"), Amount::new(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "BasisPoints", into = "BasisPoints")]
pub struct FeeRate(BasisPoints);

impl FeeRate {
    /// No fee.
    pub const ZERO: Self = Self(BasisPoints::ZERO);

    /// 0.05%, stable pairs.
    pub const STABLE: Self = Self(BasisPoints::new(5));

    /// 0.30%, standard volatile pairs.
    pub const STANDARD: Self = Self(BasisPoints::new(30));

    /// 1.00%, exotic pairs.
    pub const HIGH: Self = Self(BasisPoints::new(100));

    /// Creates a fee rate after checking it is below 100%.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidFee`] if `basis_points >= 10_000`.
    pub const fn new(basis_points: BasisPoints) -> Result<Self, DexError> {
        if basis_points.get() >= BasisPoints::WHOLE.get() {
            return Err(DexError::InvalidFee("fee rate must be below 100%"));
        }
        Ok(Self(basis_points))
    }

    /// Returns the underlying [`BasisPoints`].
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.0
    }

    /// Fee charged on `amount_in`, rounded up so the pool never undercharges.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Overflow`] if the intermediate product overflows.
    pub const fn fee_on(&self, amount_in: Amount) -> crate::error::Result<Amount> {
        self.0.portion_of(amount_in, Rounding::Up)
    }
}

impl TryFrom<BasisPoints> for FeeRate {
    type Error = DexError;

    fn try_from(value: BasisPoints) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeRate> for BasisPoints {
    fn from(value: FeeRate) -> Self {
        value.0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeRate({})", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(FeeRate::ZERO.basis_points().get(), 0);
        assert_eq!(FeeRate::STABLE.basis_points().get(), 5);
        assert_eq!(FeeRate::STANDARD.basis_points().get(), 30);
        assert_eq!(FeeRate::HIGH.basis_points().get(), 100);
    }

    #[test]
    fn full_fee_rejected() {
        let Err(e) = FeeRate::new(BasisPoints::WHOLE) else {
            panic!("expected Err");
        };
        assert_eq!(e, DexError::InvalidFee("fee rate must be below 100%"));
    }

    #[test]
    fn fee_rounds_up() {
        let Ok(fee) = FeeRate::STANDARD.fee_on(Amount::new(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(fee, Amount::new(3));
        let Ok(fee) = FeeRate::STANDARD.fee_on(Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(fee, Amount::new(1));
    }

    #[test]
    fn zero_fee_is_zero() {
        let Ok(fee) = FeeRate::ZERO.fee_on(Amount::new(12_345)) else {
            panic!("expected Ok");
        };
        assert!(fee.is_zero());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<FeeRate, _> = serde_json::from_str("30");
        assert!(ok.is_ok());
        let bad: Result<FeeRate, _> = serde_json::from_str("10000");
        assert!(bad.is_err());
    }
}
