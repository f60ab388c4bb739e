//! Explicit rounding direction for integer division.

/// Rounding direction for every division the engine performs.
///
/// The engine rounds in the pool's favour: amounts paid **out** of a pool
/// (swap outputs, withdrawals, minted shares) round [`Down`](Self::Down),
/// amounts charged **into** a pool (fees, required deposits) round
/// [`Up`](Self::Up).
///
/// ```
/// use hydra_dex::domain::Rounding;
///
/// assert_eq!(Rounding::for_payout(), Rounding::Down);
/// assert_eq!(Rounding::for_charge(), Rounding::Up);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Direction for amounts leaving a pool.
    #[must_use]
    pub const fn for_payout() -> Self {
        Self::Down
    }

    /// Direction for amounts owed to a pool.
    #[must_use]
    pub const fn for_charge() -> Self {
        Self::Up
    }

    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_favouring_directions() {
        assert!(!Rounding::for_payout().is_up());
        assert!(Rounding::for_charge().is_up());
    }
}
