//! Harness-facing operations.
//!
//! [`Dex`] exposes the twenty named operations as manual (instruction
//! sequence) and transaction entry points, in base, native-asset and
//! distinct-settler forms, plus a read-only `quote`.  [`OperationKind`]
//! names all of them.

mod facade;
mod operation;

pub use facade::Dex;
pub use operation::OperationKind;
