//! Fundamental domain value types used throughout the engine.
//!
//! Assets, amounts, fee rates, identifiers, and the swap and liquidity
//! requests that flow into the settlement engine.  All types are newtypes
//! or validated structs so that invalid values cannot reach the stores.

mod amount;
mod asset;
mod asset_pair;
mod basis_points;
mod decimals;
mod fee_rate;
mod ids;
mod liquidity_intent;
mod lp_shares;
mod rounding;
mod swap_intent;
mod swap_quote;

pub use amount::Amount;
pub use asset::{Asset, AssetId};
pub use asset_pair::{AssetPair, Side};
pub use basis_points::BasisPoints;
pub(crate) use basis_points::MAX_BPS;
pub use decimals::Decimals;
pub use fee_rate::FeeRate;
pub use ids::{OwnerId, PoolId, SettlementId, Slot};
pub use liquidity_intent::{LiquidityAction, LiquidityIntent};
pub use lp_shares::LpShares;
pub use rounding::Rounding;
pub use swap_intent::{Salt, SwapIntent};
pub use swap_quote::SwapQuote;
