//! Source of the current slot for settlement expiry.
//!
//! The engine never reads wall-clock time.  Reservations expire in slots,
//! and whoever embeds the engine decides what a slot is by supplying a
//! [`SlotClock`].  [`ManualClock`] is the in-process implementation used by
//! tests, demos and single-node harnesses.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::Slot;

/// Reports the current slot.
///
/// # Contract
///
/// - `now` is monotonically non-decreasing across calls.
/// - Implementations are shared between threads, hence `Send + Sync`.
pub trait SlotClock: Send + Sync {
    /// The current slot.
    fn now(&self) -> Slot;
}

/// A clock that only moves when told to.
///
/// ```
/// use hydra_dex::domain::Slot;
/// use hydra_dex::traits::{ManualClock, SlotClock};
///
/// let clock = ManualClock::new(Slot::new(5));
/// clock.advance(3);
/// assert_eq!(clock.now(), Slot::new(8));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    slot: AtomicU64,
}

impl ManualClock {
    /// Starts the clock at `start`.
    #[must_use]
    pub const fn new(start: Slot) -> Self {
        Self {
            slot: AtomicU64::new(start.get()),
        }
    }

    /// Moves the clock forward by `slots`, saturating at `u64::MAX`.
    pub fn advance(&self, slots: u64) {
        let _ = self
            .slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| Some(s.saturating_add(slots)));
    }

    /// Moves the clock to `slot` if that is later than now.
    pub fn set(&self, slot: Slot) {
        self.slot.fetch_max(slot.get(), Ordering::AcqRel);
    }
}

impl SlotClock for ManualClock {
    fn now(&self) -> Slot {
        Slot::new(self.slot.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_moves_backwards() {
        let clock = ManualClock::new(Slot::new(10));
        clock.set(Slot::new(4));
        assert_eq!(clock.now(), Slot::new(10));
        clock.set(Slot::new(12));
        assert_eq!(clock.now(), Slot::new(12));
    }

    #[test]
    fn advance_saturates() {
        let clock = ManualClock::new(Slot::new(u64::MAX - 1));
        clock.advance(5);
        assert_eq!(clock.now(), Slot::new(u64::MAX));
    }
}
