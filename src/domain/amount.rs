//! Raw asset quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Rounding;

/// A quantity of some asset in its smallest integer unit.
///
/// Balances, pool reserves, locked outputs and swap legs are all `Amount`s.
/// The value carries no asset or decimals; pair it with an
/// [`AssetId`](super::AssetId) wherever that matters.
///
/// Arithmetic is checked and yields `None` rather than wrapping, so callers
/// decide which [`DexError`](crate::error::DexError) a failure maps to.
///
/// ```
/// use hydra_dex::domain::{Amount, Rounding};
///
/// let reserve = Amount::new(1_000);
/// let locked = Amount::new(90);
/// assert_eq!(reserve.checked_sub(&locked), Some(Amount::new(910)));
/// assert_eq!(locked.checked_sub(&reserve), None);
/// assert_eq!(Amount::new(91).checked_div(&Amount::new(10), Rounding::Up), Some(Amount::new(10)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Divides by `divisor`, rounding as asked.  `None` when `divisor` is
    /// zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        if divisor.0 == 0 {
            return None;
        }
        let (q, r) = (self.0 / divisor.0, self.0 % divisor.0);
        // A non-zero remainder means q < u128::MAX.
        if r != 0 && rounding.is_up() {
            Some(Self(q + 1))
        } else {
            Some(Self(q))
        }
    }

    /// Distance between two amounts, whichever is larger.
    pub const fn abs_diff(&self, other: &Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn overflow_and_underflow_are_none() {
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(&Amount::new(1)), None);
        assert_eq!(Amount::MAX.checked_mul(&Amount::new(2)), None);
        assert_eq!(Amount::new(5).checked_div(&Amount::ZERO, Rounding::Up), None);
    }

    #[test]
    fn fee_style_division_rounds_up_only_on_remainder() {
        // 100 in at 30 bp: 3000 / 10000.
        let scaled = Amount::new(3_000);
        let bps = Amount::new(10_000);
        assert_eq!(scaled.checked_div(&bps, Rounding::Up), Some(Amount::new(1)));
        assert_eq!(scaled.checked_div(&bps, Rounding::Down), Some(Amount::ZERO));
        assert_eq!(Amount::new(20_000).checked_div(&bps, Rounding::Up), Some(Amount::new(2)));
    }

    #[test]
    fn ceiling_of_max_does_not_overflow() {
        assert_eq!(
            Amount::MAX.checked_div(&Amount::new(2), Rounding::Up),
            Some(Amount::new(u128::MAX / 2 + 1))
        );
    }

    #[test]
    fn abs_diff_either_order() {
        assert_eq!(Amount::new(910).abs_diff(&Amount::new(1_000)), Amount::new(90));
        assert_eq!(Amount::new(1_000).abs_diff(&Amount::new(910)), Amount::new(90));
    }

    #[test]
    fn serializes_as_bare_number() {
        let Ok(json) = serde_json::to_string(&Amount::from(42u64)) else {
            panic!("serializes");
        };
        assert_eq!(json, "42");
        assert_eq!(Amount::new(1_000_000).to_string(), "1000000");
    }
}
