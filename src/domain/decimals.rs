//! Decimal places of a registered asset.

use serde::{Deserialize, Serialize};

use crate::error::DexError;

const MAX_DECIMALS: u8 = 18;

/// How many decimal places one whole unit of an asset has, `0..=18`.
///
/// The engine itself only moves raw [`Amount`](super::Amount)s; decimals
/// are kept on the [`Asset`](super::Asset) so callers can convert whole
/// units to raw ones and back.  A wrapped native asset inherits the
/// decimals of its native counterpart.
///
/// ```
/// use hydra_dex::domain::Decimals;
///
/// let sol = Decimals::new(9).expect("in range");
/// assert_eq!(sol.scale_up(2), 2_000_000_000);
/// assert!(Decimals::new(19).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decimals(u8);

impl Decimals {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(MAX_DECIMALS);

    /// # Errors
    ///
    /// [`DexError::InvalidPrecision`] above 18.
    pub const fn new(value: u8) -> Result<Self, DexError> {
        if value > MAX_DECIMALS {
            return Err(DexError::InvalidPrecision("decimals must be 0..=18"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Whole units to raw units.  `u64::MAX * 10^18` fits in `u128`.
    #[must_use]
    pub const fn scale_up(&self, whole: u64) -> u128 {
        (whole as u128) * self.unit()
    }

    /// Raw units to whole units, truncating any fraction.
    ///
    /// # Errors
    ///
    /// [`DexError::Overflow`] if the whole amount exceeds `u64`.
    pub const fn scale_down(&self, raw: u128) -> Result<u64, DexError> {
        let whole = raw / self.unit();
        if whole > u64::MAX as u128 {
            return Err(DexError::Overflow("whole amount exceeds u64"));
        }
        Ok(whole as u64)
    }

    const fn unit(&self) -> u128 {
        10u128.pow(self.0 as u32)
    }
}

impl TryFrom<u8> for Decimals {
    type Error = DexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Decimals> for u8 {
    fn from(d: Decimals) -> Self {
        d.0
    }
}
