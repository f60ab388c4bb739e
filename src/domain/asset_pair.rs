//! Unordered pair of distinct assets.

use core::fmt;

use super::AssetId;
use crate::error::DexError;

/// Which side of a canonical [`AssetPair`] an asset sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The lower asset id.
    A,
    /// The higher asset id.
    B,
}

impl Side {
    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// An unordered pair of distinct assets, stored in canonical order.
///
/// `(A, B)` and `(B, A)` produce equal values, so the pair can key the pool
/// index directly.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{AssetId, AssetPair};
///
/// let x = AssetId::from_bytes([1u8; 32]);
/// let y = AssetId::from_bytes([2u8; 32]);
///
/// let pair = AssetPair::new(y, x).expect("distinct assets");
/// assert_eq!(pair, AssetPair::new(x, y).expect("distinct assets"));
/// assert_eq!(pair.first(), x);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetPair {
    asset_a: AssetId,
    asset_b: AssetId,
}

impl AssetPair {
    /// Creates a canonically-ordered pair.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidPair`] if both ids are equal.
    pub fn new(x: AssetId, y: AssetId) -> Result<Self, DexError> {
        if x == y {
            return Err(DexError::InvalidPair("pair requires two distinct assets"));
        }
        let (asset_a, asset_b) = if x < y { (x, y) } else { (y, x) };
        Ok(Self { asset_a, asset_b })
    }

    /// Returns the lower asset id.
    #[must_use]
    pub const fn first(&self) -> AssetId {
        self.asset_a
    }

    /// Returns the higher asset id.
    #[must_use]
    pub const fn second(&self) -> AssetId {
        self.asset_b
    }

    /// Returns `true` if `asset` is part of the pair.
    #[must_use]
    pub fn contains(&self, asset: &AssetId) -> bool {
        self.asset_a == *asset || self.asset_b == *asset
    }

    /// Returns the side `asset` occupies.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidPair`] if `asset` is not in the pair.
    pub fn side_of(&self, asset: &AssetId) -> Result<Side, DexError> {
        if *asset == self.asset_a {
            Ok(Side::A)
        } else if *asset == self.asset_b {
            Ok(Side::B)
        } else {
            Err(DexError::InvalidPair("asset is not part of this pair"))
        }
    }

    /// Returns the asset on `side`.
    #[must_use]
    pub const fn asset_on(&self, side: Side) -> AssetId {
        match side {
            Side::A => self.asset_a,
            Side::B => self.asset_b,
        }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset_a, self.asset_b)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn id(b: u8) -> AssetId {
        AssetId::from_bytes([b; 32])
    }

    #[test]
    fn order_independent() {
        let (Ok(p1), Ok(p2)) = (AssetPair::new(id(1), id(2)), AssetPair::new(id(2), id(1))) else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
        assert_eq!(p1.first(), id(1));
        assert_eq!(p1.second(), id(2));
    }

    #[test]
    fn rejects_identical_assets() {
        let Err(e) = AssetPair::new(id(4), id(4)) else {
            panic!("expected Err");
        };
        assert_eq!(e, DexError::InvalidPair("pair requires two distinct assets"));
    }

    #[test]
    fn side_lookup() {
        let Ok(pair) = AssetPair::new(id(5), id(3)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.side_of(&id(3)), Ok(Side::A));
        assert_eq!(pair.side_of(&id(5)), Ok(Side::B));
        assert!(pair.side_of(&id(9)).is_err());
        assert_eq!(pair.asset_on(Side::A.opposite()), id(5));
    }
}
