//! Instruction composition for the manual and transaction paths.
//!
//! A [`Transaction`] commits every instruction or none; an
//! [`InstructionSequence`] commits instructions one at a time and stops at
//! the first failure.  Both come out of the same [`TransactionBuilder`].

mod instruction;
mod transaction;

pub use instruction::Instruction;
pub use transaction::{InstructionSequence, Transaction, TransactionBuilder};
