//! Swap request descriptor.

use core::fmt;

use super::{Amount, AssetId, OwnerId};
use crate::error::DexError;

/// Caller-chosen nonce that makes a reserved order unique per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Salt([u8; 8]);

impl Salt {
    /// Wraps raw salt bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 8] {
        self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// A request to sell `amount_in` of one asset for at least `min_output` of
/// another.
///
/// # Invariants
///
/// - `amount_in` is non-zero.
/// - `asset_in != asset_out`.
///
/// A distinct `settler` is only meaningful on the two-phase path; the direct
/// path ignores it.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::{Amount, AssetId, OwnerId, SwapIntent};
///
/// let intent = SwapIntent::new(
///     OwnerId::from_bytes([7u8; 32]),
///     AssetId::from_bytes([1u8; 32]),
///     AssetId::from_bytes([2u8; 32]),
///     Amount::new(1_000),
///     Amount::new(1),
/// )
/// .expect("valid intent")
/// .with_settler(OwnerId::from_bytes([8u8; 32]));
///
/// assert_eq!(intent.settler(), Some(OwnerId::from_bytes([8u8; 32])));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapIntent {
    owner: OwnerId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Amount,
    min_output: Amount,
    settler: Option<OwnerId>,
    expected_sequence: Option<u64>,
    salt: Option<Salt>,
}

impl SwapIntent {
    /// Creates a validated swap intent.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidQuantity`] if `amount_in` is zero.
    /// - [`DexError::InvalidPair`] if both assets are the same.
    pub fn new(
        owner: OwnerId,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: Amount,
        min_output: Amount,
    ) -> Result<Self, DexError> {
        if amount_in.is_zero() {
            return Err(DexError::InvalidQuantity("swap amount must be non-zero"));
        }
        if asset_in == asset_out {
            return Err(DexError::InvalidPair("cannot swap an asset for itself"));
        }
        Ok(Self {
            owner,
            asset_in,
            asset_out,
            amount_in,
            min_output,
            settler: None,
            expected_sequence: None,
            salt: None,
        })
    }

    /// Designates a settler other than the owner.
    #[must_use]
    pub const fn with_settler(mut self, settler: OwnerId) -> Self {
        self.settler = Some(settler);
        self
    }

    /// Pins the pool sequence the caller priced against.  The engine then
    /// rejects the swap with `StaleSequence` if the pool moved.
    #[must_use]
    pub const fn with_expected_sequence(mut self, sequence: u64) -> Self {
        self.expected_sequence = Some(sequence);
        self
    }

    /// Attaches an order salt.
    #[must_use]
    pub const fn with_salt(mut self, salt: Salt) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Initiating owner.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Asset sold.
    #[must_use]
    pub const fn asset_in(&self) -> AssetId {
        self.asset_in
    }

    /// Asset bought.
    #[must_use]
    pub const fn asset_out(&self) -> AssetId {
        self.asset_out
    }

    /// Amount sold.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Slippage bound.
    pub const fn min_output(&self) -> Amount {
        self.min_output
    }

    /// Designated settler, if any.
    #[must_use]
    pub const fn settler(&self) -> Option<OwnerId> {
        self.settler
    }

    /// The settler if designated, otherwise the owner.
    #[must_use]
    pub const fn settler_or_owner(&self) -> OwnerId {
        match self.settler {
            Some(s) => s,
            None => self.owner,
        }
    }

    /// Pinned pool sequence, if any.
    #[must_use]
    pub const fn expected_sequence(&self) -> Option<u64> {
        self.expected_sequence
    }

    /// Order salt, if any.
    #[must_use]
    pub const fn salt(&self) -> Option<Salt> {
        self.salt
    }

    /// Same intent with different assets, used when native legs are
    /// rewritten to their wrapped counterpart.
    pub(crate) const fn with_assets(mut self, asset_in: AssetId, asset_out: AssetId) -> Self {
        self.asset_in = asset_in;
        self.asset_out = asset_out;
        self
    }
}
