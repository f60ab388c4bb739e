//! Seams the engine is wired through.
//!
//! [`SlotClock`] supplies time for settlement expiry and
//! [`TransactionSubmitter`] executes built instructions.  Both are injected,
//! so the engine has no global state.

mod slot_clock;
mod submitter;

pub use slot_clock::{ManualClock, SlotClock};
pub use submitter::{SequenceReport, TransactionSubmitter};
