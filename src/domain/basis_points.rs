//! Hundredths of a percent.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, Rounding};
use crate::error::DexError;

/// 100% in basis points.
pub(crate) const MAX_BPS: u32 = 10_000;

/// A share of a whole in basis points, `1bp = 0.01%`.
///
/// Pool fees and the deposit ratio tolerance are both expressed this way.
/// The raw value is unchecked; [`within_whole`](Self::within_whole) tells
/// whether it is at most 100%.
///
/// ```
/// use hydra_dex::domain::{Amount, BasisPoints, Rounding};
///
/// let fee = BasisPoints::new(30);
/// assert_eq!(fee.portion_of(Amount::new(100), Rounding::Up), Ok(Amount::new(1)));
/// assert!(fee.within_whole());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub const ZERO: Self = Self(0);

    /// 10 000 bp.
    pub const WHOLE: Self = Self(MAX_BPS);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// `true` for `0..=10_000`.
    #[must_use]
    pub const fn within_whole(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// `amount * self / 10_000`, rounded as asked.
    ///
    /// # Errors
    ///
    /// [`DexError::Overflow`] if `amount * self` does not fit in `u128`.
    pub const fn portion_of(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        let Some(scaled) = amount.get().checked_mul(self.0 as u128) else {
            return Err(DexError::Overflow("basis-point portion overflow"));
        };
        match Amount::new(scaled).checked_div(&Amount::new(MAX_BPS as u128), rounding) {
            Some(v) => Ok(v),
            None => Err(DexError::DivisionByZero),
        }
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn whole_boundary() {
        assert!(BasisPoints::WHOLE.within_whole());
        assert!(!BasisPoints::new(10_001).within_whole());
        assert_eq!(BasisPoints::new(100).to_string(), "100bp");
    }

    #[test]
    fn standard_fee_portions() {
        let fee = BasisPoints::new(30);
        let Ok(down) = fee.portion_of(Amount::new(1_000_000), Rounding::Down) else {
            panic!("fits");
        };
        assert_eq!(down, Amount::new(3_000));
        // 0.3 of a unit still costs one.
        let Ok(up) = fee.portion_of(Amount::new(100), Rounding::Up) else {
            panic!("fits");
        };
        assert_eq!(up, Amount::new(1));
        assert_eq!(BasisPoints::ZERO.portion_of(Amount::new(100), Rounding::Up), Ok(Amount::ZERO));
    }

    #[test]
    fn portion_overflow() {
        assert_eq!(
            BasisPoints::new(2).portion_of(Amount::MAX, Rounding::Down),
            Err(DexError::Overflow("basis-point portion overflow"))
        );
    }

    #[test]
    fn deserializes_from_number() {
        let Ok(bp) = serde_json::from_str::<BasisPoints>("25") else {
            panic!("deserializes");
        };
        assert_eq!(bp, BasisPoints::new(25));
    }
}
