//! Identifiers for owners, pools, settlements, and the slot clock.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a balance holder: a user, a settler, or a pool vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId([u8; 32]);

impl OwnerId {
    /// Creates an `OwnerId` from raw public-key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The vault account that custodies a pool's reserves.
    ///
    /// Vault ids start with a fixed tag followed by the big-endian pool id,
    /// and the remaining bytes are `0xff`.
    #[must_use]
    pub const fn pool_vault(pool: PoolId) -> Self {
        const TAG: &[u8; 8] = b"hdxvault";
        let mut bytes = [0xffu8; 32];
        let id = pool.get().to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[i] = TAG[i];
            bytes[8 + i] = id[i];
            i += 1;
        }
        Self(bytes)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..4] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "…")
    }
}

/// Identifier of a pool inside a [`PoolStore`](crate::store::PoolStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(u64);

impl PoolId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Identifier of a pending settlement in the engine's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettlementId(u64);

impl SettlementId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settlement#{}", self.0)
    }
}

/// A ledger slot, the unit of time for settlement expiry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Slot(u64);

impl Slot {
    /// Wraps a raw slot number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw slot number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Slot `n` slots after this one, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(&self, n: u64) -> Self {
        Self(self.0.saturating_add(n))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vaults_are_distinct_per_pool() {
        let a = OwnerId::pool_vault(PoolId::new(1));
        let b = OwnerId::pool_vault(PoolId::new(2));
        assert_ne!(a, b);
        assert_eq!(&a.as_bytes()[..8], b"hdxvault");
    }

    #[test]
    fn slot_saturates() {
        assert_eq!(Slot::new(u64::MAX).saturating_add(5), Slot::new(u64::MAX));
        assert_eq!(Slot::new(10).saturating_add(5), Slot::new(15));
    }

    #[test]
    fn display_formats() {
        assert_eq!(PoolId::new(3).to_string(), "pool#3");
        assert_eq!(SettlementId::new(9).to_string(), "settlement#9");
        assert_eq!(OwnerId::from_bytes([0x01; 32]).to_string(), "01010101…");
    }
}
