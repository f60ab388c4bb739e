//! Asset identity types.

use core::fmt;

use super::Decimals;

/// Opaque, chain-agnostic asset identifier (a mint address on most chains).
///
/// Ordering is lexicographic over the bytes; [`AssetPair`](super::AssetPair)
/// relies on it for canonical ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Creates an `AssetId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Derives the id of the wrapped counterpart of a native asset.
    ///
    /// The derivation flips the high bit of every byte, so it is stable,
    /// collision-free with respect to the native id itself, and needs no
    /// external registry.
    #[must_use]
    pub const fn wrapped_of(native: Self) -> Self {
        let mut out = native.0;
        let mut i = 0;
        while i < out.len() {
            out[i] ^= 0x80;
            i += 1;
        }
        Self(out)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..4] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "…")
    }
}

/// A registered asset: id, decimals, and whether it is the chain's native
/// asset.  Immutable once registered.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Asset, AssetId, Decimals};
///
/// let usdc = Asset::new(AssetId::from_bytes([1u8; 32]), Decimals::new(6).expect("valid"));
/// assert!(!usdc.is_native());
///
/// let sol = Asset::native(AssetId::from_bytes([9u8; 32]), Decimals::new(9).expect("valid"));
/// assert!(sol.is_native());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Asset {
    id: AssetId,
    decimals: Decimals,
    native: bool,
}

impl Asset {
    /// Creates a regular (non-native) asset.
    #[must_use]
    pub const fn new(id: AssetId, decimals: Decimals) -> Self {
        Self {
            id,
            decimals,
            native: false,
        }
    }

    /// Creates the chain's native asset.
    #[must_use]
    pub const fn native(id: AssetId, decimals: Decimals) -> Self {
        Self {
            id,
            decimals,
            native: true,
        }
    }

    /// Returns the asset id.
    #[must_use]
    pub const fn id(&self) -> AssetId {
        self.id
    }

    /// Returns the asset decimals.
    #[must_use]
    pub const fn decimals(&self) -> Decimals {
        self.decimals
    }

    /// Returns `true` for the chain's native asset.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.native
    }

    /// Converts a human amount to raw units of this asset.
    #[must_use]
    pub const fn to_raw_amount(&self, human: u64) -> u128 {
        self.decimals.scale_up(human)
    }
}
