//! Asset catalogue and balance ledger.
//!
//! Holds every known asset (including the native asset and its wrapped
//! form) and every `(owner, asset)` balance, with atomic multi-leg
//! movements.

mod asset_registry;

pub use asset_registry::{AssetRegistry, Leg};
