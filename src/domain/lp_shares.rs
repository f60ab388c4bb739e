//! LP share units.

use core::fmt;

/// A proportional claim on a pool's reserves, minted on deposit and burned
/// on withdrawal.
///
/// Distinct from [`Amount`](super::Amount) because it does not denominate
/// any asset.
///
/// ```
/// use hydra_dex::domain::LpShares;
///
/// let a = LpShares::new(1_000);
/// assert_eq!(a.checked_add(&LpShares::new(24)), Some(LpShares::new(1_024)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LpShares(u128);

impl LpShares {
    /// No shares.
    pub const ZERO: Self = Self(0);

    /// Creates shares from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Display for LpShares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
