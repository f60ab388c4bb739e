//! Two-phase swap reservations.

use core::fmt;

use crate::domain::{Amount, PoolId, SettlementId, Side, Slot, SwapIntent, SwapQuote};
use crate::error::{DexError, Result};

/// Lifecycle of a [`PendingSettlement`].
///
/// `Reserved` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementState {
    /// Output capacity is locked; balances have not moved.
    Reserved,
    /// Balances and reserves moved; the lock is consumed.
    Finalized,
    /// The lock was released without moving balances.
    Reverted,
}

impl SettlementState {
    /// Returns `true` for `Finalized` and `Reverted`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Reserved)
    }
}

impl fmt::Display for SettlementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "Reserved"),
            Self::Finalized => write!(f, "Finalized"),
            Self::Reverted => write!(f, "Reverted"),
        }
    }
}

/// A reserved swap waiting for its settler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSettlement {
    id: SettlementId,
    intent: SwapIntent,
    quote: SwapQuote,
    input_side: Side,
    created_at: Slot,
    expires_at: Slot,
    state: SettlementState,
}

impl PendingSettlement {
    pub(crate) const fn new(
        id: SettlementId,
        intent: SwapIntent,
        quote: SwapQuote,
        input_side: Side,
        created_at: Slot,
        expires_at: Slot,
    ) -> Self {
        Self {
            id,
            intent,
            quote,
            input_side,
            created_at,
            expires_at,
            state: SettlementState::Reserved,
        }
    }

    /// Settlement identifier.
    #[must_use]
    pub const fn id(&self) -> SettlementId {
        self.id
    }

    /// The reserved intent.
    #[must_use]
    pub const fn intent(&self) -> &SwapIntent {
        &self.intent
    }

    /// The quote the reservation locked.
    #[must_use]
    pub const fn quote(&self) -> SwapQuote {
        self.quote
    }

    /// Pool the reservation locks capacity in.
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.quote.pool()
    }

    /// Pool side the owner pays into.
    #[must_use]
    pub const fn input_side(&self) -> Side {
        self.input_side
    }

    /// Output capacity held by the reservation.
    pub const fn locked_output(&self) -> Amount {
        self.quote.amount_out()
    }

    /// Slot the reservation was made in.
    #[must_use]
    pub const fn created_at(&self) -> Slot {
        self.created_at
    }

    /// First slot at which the reservation counts as expired.
    #[must_use]
    pub const fn expires_at(&self) -> Slot {
        self.expires_at
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SettlementState {
        self.state
    }

    /// Returns `true` once `now` reaches the expiry slot.
    #[must_use]
    pub fn is_expired(&self, now: Slot) -> bool {
        now >= self.expires_at
    }

    /// Fails with [`DexError::AlreadyResolved`] unless still `Reserved`.
    pub(crate) const fn ensure_reserved(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(DexError::AlreadyResolved(self.id));
        }
        Ok(())
    }

    pub(crate) fn resolve(&mut self, state: SettlementState) {
        self.state = state;
    }
}
