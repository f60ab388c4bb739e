//! Configuration for constant-product pools.

use crate::domain::{Amount, AssetId, AssetPair, FeeRate};
use crate::error::DexError;

/// Parameters for creating a constant-product pool (`x · y = k`).
///
/// Assets may be given in any order; [`pair`](Self::pair) is canonical and
/// [`reserves_in_pair_order`](Self::reserves_in_pair_order) follows it.
///
/// # Derived Values
///
/// - Initial invariant: `k = reserve_a × reserve_b`
/// - Founder shares: `floor(sqrt(k))`
///
/// # Validation
///
/// - The two assets must differ.
/// - Both reserves must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pair: AssetPair,
    asset_a: AssetId,
    asset_b: AssetId,
    fee: FeeRate,
    reserve_a: Amount,
    reserve_b: Amount,
}

impl PoolConfig {
    /// Creates a new `PoolConfig`.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPair`] if the assets are identical.
    /// - [`DexError::InvalidReserves`] if either reserve is zero.
    pub fn new(
        asset_a: AssetId,
        asset_b: AssetId,
        fee: FeeRate,
        reserve_a: Amount,
        reserve_b: Amount,
    ) -> Result<Self, DexError> {
        let config = Self {
            pair: AssetPair::new(asset_a, asset_b)?,
            asset_a,
            asset_b,
            fee,
            reserve_a,
            reserve_b,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn validate(&self) -> Result<(), DexError> {
        if AssetPair::new(self.asset_a, self.asset_b)? != self.pair {
            return Err(DexError::InvalidPair("pair does not match assets"));
        }
        if self.reserve_a.is_zero() || self.reserve_b.is_zero() {
            return Err(DexError::InvalidReserves);
        }
        Ok(())
    }

    /// First asset as given.
    #[must_use]
    pub const fn asset_a(&self) -> AssetId {
        self.asset_a
    }

    /// Second asset as given.
    #[must_use]
    pub const fn asset_b(&self) -> AssetId {
        self.asset_b
    }

    /// Canonical pair.
    #[must_use]
    pub const fn pair(&self) -> AssetPair {
        self.pair
    }

    /// Swap fee.
    #[must_use]
    pub const fn fee(&self) -> FeeRate {
        self.fee
    }

    /// Initial reserve of `asset_a`.
    pub const fn reserve_a(&self) -> Amount {
        self.reserve_a
    }

    /// Initial reserve of `asset_b`.
    pub const fn reserve_b(&self) -> Amount {
        self.reserve_b
    }

    /// Initial reserves ordered like [`pair`](Self::pair).
    #[must_use]
    pub fn reserves_in_pair_order(&self) -> (Amount, Amount) {
        if self.pair().first() == self.asset_a {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    /// Returns a copy with `asset` swapped for `replacement` on whichever
    /// side holds it.
    pub(crate) fn with_asset_replaced(self, asset: AssetId, replacement: AssetId) -> Result<Self, DexError> {
        let swap = |x: AssetId| if x == asset { replacement } else { x };
        Self::new(swap(self.asset_a), swap(self.asset_b), self.fee, self.reserve_a, self.reserve_b)
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
    fn valid_config() {
        let result = PoolConfig::new(id(1), id(2), FeeRate::STANDARD, Amount::new(1_000), Amount::new(2_000));
        assert!(result.is_ok());
    }

    #[test]
    fn zero_reserve_rejected() {
        let a = PoolConfig::new(id(1), id(2), FeeRate::STANDARD, Amount::ZERO, Amount::new(1));
        let b = PoolConfig::new(id(1), id(2), FeeRate::STANDARD, Amount::new(1), Amount::ZERO);
        assert_eq!(a, Err(DexError::InvalidReserves));
        assert_eq!(b, Err(DexError::InvalidReserves));
    }

    #[test]
    fn identical_assets_rejected() {
        let r = PoolConfig::new(id(1), id(1), FeeRate::STANDARD, Amount::new(1), Amount::new(1));
        assert!(matches!(r, Err(DexError::InvalidPair(_))));
    }

    #[test]
    fn reserves_follow_canonical_order() {
        let Ok(cfg) = PoolConfig::new(id(9), id(2), FeeRate::STANDARD, Amount::new(100), Amount::new(200))
        else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.pair().first(), id(2));
        assert_eq!(cfg.reserves_in_pair_order(), (Amount::new(200), Amount::new(100)));
        assert_eq!(cfg.reserve_a(), Amount::new(100));
    }

    #[test]
    fn replace_asset() {
        let Ok(cfg) = PoolConfig::new(id(1), id(2), FeeRate::STANDARD, Amount::new(1), Amount::new(1))
        else {
            panic!("expected Ok");
        };
        let Ok(swapped) = cfg.with_asset_replaced(id(2), id(3)) else {
            panic!("still distinct");
        };
        assert_eq!(swapped.asset_b(), id(3));
        assert_eq!(swapped.asset_a(), id(1));
    }
}
