//! Submission seam between instruction builders and whatever executes them.
//!
//! [`TransactionSubmitter`] is the boundary the [`Dex`](crate::dex::Dex)
//! facade talks to.  The in-memory
//! [`SettlementEngine`](crate::settlement::SettlementEngine) implements it
//! directly; a networked deployment would implement it by signing and
//! sending the instructions elsewhere.
//!
//! # Atomicity Contract
//!
//! - [`submit`](TransactionSubmitter::submit) commits every instruction of
//!   the [`Transaction`] or none of them.
//! - [`submit_sequence`](TransactionSubmitter::submit_sequence) commits
//!   each instruction on its own, in order, and stops at the first failure.
//!   Instructions before the failure stay committed.

use crate::builder::{InstructionSequence, Transaction};
use crate::error::{DexError, Result};
use crate::settlement::Outcome;

/// What a sequence achieved before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    outcomes: Vec<Outcome>,
    failure: Option<(usize, DexError)>,
}

impl SequenceReport {
    pub(crate) const fn new(outcomes: Vec<Outcome>, failure: Option<(usize, DexError)>) -> Self {
        Self { outcomes, failure }
    }

    /// Outcomes of the committed prefix.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Index and error of the instruction that stopped the sequence.
    #[must_use]
    pub const fn failure(&self) -> Option<&(usize, DexError)> {
        self.failure.as_ref()
    }

    /// Returns `true` if every instruction committed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Converts into the committed outcomes, or the stopping error.
    ///
    /// # Errors
    ///
    /// The error of the instruction that stopped the sequence.
    pub fn into_result(self) -> Result<Vec<Outcome>> {
        match self.failure {
            None => Ok(self.outcomes),
            Some((_, e)) => Err(e),
        }
    }
}

/// Executes built transactions and sequences.
pub trait TransactionSubmitter {
    /// Commits the whole transaction or nothing.
    ///
    /// # Errors
    ///
    /// The first failing instruction's error; state is unchanged.
    fn submit(&self, transaction: &Transaction) -> Result<Vec<Outcome>>;

    /// Commits instructions one at a time until one fails.
    fn submit_sequence(&self, sequence: &InstructionSequence) -> SequenceReport;
}
