//! Constant-product pricing and LP-share arithmetic.
//!
//! # Swap Algorithm (exact input)
//!
//! 1. `fee = ceil(amount_in × fee_bps / 10 000)`
//! 2. `net_input = amount_in − fee`
//! 3. `amount_out = floor(reserve_out × net_input / (reserve_in + net_input))`
//! 4. `reserve_in += amount_in` (fee stays in the pool)
//! 5. `reserve_out -= amount_out`
//!
//! # Invariant
//!
//! After every swap `k_after ≥ k_before`: the fee increases reserves without
//! a matching output, and every division rounds in the pool's favour.
//!
//! # Liquidity
//!
//! - Deposit: `minted = min(a × T / Ra, b × T / Rb)` (floor), after a ratio
//!   check against the configured tolerance.
//! - Deposit for exact shares: `cost = ceil(shares × R / T)` per side.
//! - Withdraw: `payout = floor(R × shares / T)` per side.

use primitive_types::{U256, U512};

use crate::domain::{Amount, AssetId, BasisPoints, FeeRate, LpShares, Rounding, SwapQuote, MAX_BPS};
use crate::error::{DexError, Result};
use crate::math::{mul_div, wide_mul};
use crate::store::Pool;

/// Output and fee of an exact-input swap.
///
/// `available_out` is the part of the output reserve not locked by pending
/// settlements; the output must stay strictly below it.
///
/// # Errors
///
/// - [`DexError::InvalidQuantity`] if the fee swallows the whole input.
/// - [`DexError::InsufficientLiquidity`] if the output rounds to zero or
///   would reach `available_out`.
/// - [`DexError::Overflow`] if an intermediate product overflows.
///
/// ```
/// use hydra_dex::domain::{Amount, FeeRate};
/// use hydra_dex::settlement::pricing::swap_output;
///
/// let (out, fee) = swap_output(
///     FeeRate::STANDARD,
///     Amount::new(100),
///     Amount::new(1_000),
///     Amount::new(1_000),
///     Amount::new(1_000),
/// )
/// .expect("priced");
/// assert_eq!((out.get(), fee.get()), (90, 1));
/// ```
pub fn swap_output(
    fee_rate: FeeRate,
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    available_out: Amount,
) -> Result<(Amount, Amount)> {
    let fee = fee_rate.fee_on(amount_in)?;
    let net_input = amount_in
        .checked_sub(&fee)
        .ok_or(DexError::Overflow("net input underflow"))?;
    if net_input.is_zero() {
        return Err(DexError::InvalidQuantity("net input after fee is zero"));
    }

    let denominator = reserve_in
        .checked_add(&net_input)
        .ok_or(DexError::Overflow("denominator overflow"))?;
    let amount_out = Amount::new(mul_div(
        reserve_out.get(),
        net_input.get(),
        denominator.get(),
        Rounding::for_payout(),
    )?);

    if amount_out.is_zero() || amount_out >= available_out {
        return Err(DexError::InsufficientLiquidity);
    }
    Ok((amount_out, fee))
}

/// Quotes an exact-input swap of `asset_in` against `pool` as it stands.
///
/// Output is priced on the full reserves but capped by what pending
/// settlements have not locked.
///
/// # Errors
///
/// - [`DexError::InvalidPair`] if the pool does not trade `asset_in`.
/// - Any error of [`swap_output`].
pub fn quote(pool: &Pool, asset_in: &AssetId, amount_in: Amount) -> Result<SwapQuote> {
    let side_in = pool.pair().side_of(asset_in)?;
    let side_out = side_in.opposite();
    let (amount_out, fee) = swap_output(
        pool.fee(),
        amount_in,
        pool.reserve(side_in),
        pool.reserve(side_out),
        pool.available(side_out),
    )?;
    SwapQuote::new(pool.id(), pool.sequence(), amount_in, amount_out, fee)
}

/// Relative gap between `a / reserve_a` and `b / reserve_b`, in basis
/// points of the larger side (rounded up).
///
/// Cross products are formed in 256 bits and cannot overflow.
///
/// # Errors
///
/// None at present.
pub fn ratio_deviation(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> Result<BasisPoints> {
    let lhs = wide_mul(amount_a.get(), reserve_b.get());
    let rhs = wide_mul(amount_b.get(), reserve_a.get());
    let larger = lhs.max(rhs);
    if larger.is_zero() {
        return Ok(BasisPoints::ZERO);
    }
    let gap = if lhs > rhs { lhs - rhs } else { rhs - lhs };
    // ceil(gap * 10000 / larger), at most MAX_BPS since gap <= larger.
    let scaled = gap.full_mul(U256::from(MAX_BPS));
    let larger = U512::from(larger);
    let mut bps = scaled / larger;
    if !(scaled % larger).is_zero() {
        bps += U512::one();
    }
    Ok(BasisPoints::new(u32::try_from(bps.low_u64()).unwrap_or(MAX_BPS).min(MAX_BPS)))
}

/// Shares minted for a proportional deposit.
///
/// # Errors
///
/// - [`DexError::RatioMismatch`] if the deposit deviates from the pool
///   ratio by more than `tolerance`.
/// - [`DexError::InvalidQuantity`] if the deposit mints nothing.
/// - [`DexError::DivisionByZero`] if a reserve is empty.
pub fn deposit_shares(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    total: LpShares,
    tolerance: BasisPoints,
) -> Result<LpShares> {
    let deviation = ratio_deviation(amount_a, amount_b, reserve_a, reserve_b)?;
    if deviation > tolerance {
        return Err(DexError::RatioMismatch {
            deviation,
            tolerance,
        });
    }
    let via_a = mul_div(amount_a.get(), total.get(), reserve_a.get(), Rounding::Down)?;
    let via_b = mul_div(amount_b.get(), total.get(), reserve_b.get(), Rounding::Down)?;
    let minted = via_a.min(via_b);
    if minted == 0 {
        return Err(DexError::InvalidQuantity("deposit too small to mint shares"));
    }
    Ok(LpShares::new(minted))
}

/// Side amount required to mint exactly `shares` (rounded up).
///
/// # Errors
///
/// - [`DexError::DivisionByZero`] if no shares are outstanding.
/// - [`DexError::Overflow`] if the product overflows.
pub fn share_cost(shares: LpShares, reserve: Amount, total: LpShares) -> Result<Amount> {
    Ok(Amount::new(mul_div(
        shares.get(),
        reserve.get(),
        total.get(),
        Rounding::for_charge(),
    )?))
}

/// Side amount paid out for burning `shares` (rounded down).
///
/// # Errors
///
/// - [`DexError::DivisionByZero`] if no shares are outstanding.
/// - [`DexError::Overflow`] if the product overflows.
pub fn share_payout(shares: LpShares, reserve: Amount, total: LpShares) -> Result<Amount> {
    Ok(Amount::new(mul_div(
        reserve.get(),
        shares.get(),
        total.get(),
        Rounding::for_payout(),
    )?))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn amt(v: u128) -> Amount {
        Amount::new(v)
    }

    #[test]
    fn reference_swap() {
        let Ok((out, fee)) = swap_output(FeeRate::STANDARD, amt(100), amt(1_000), amt(1_000), amt(1_000))
        else {
            panic!("expected Ok");
        };
        assert_eq!(fee, amt(1));
        assert_eq!(out, amt(90));
    }

    #[test]
    fn zero_fee_swap() {
        let Ok((out, fee)) = swap_output(FeeRate::ZERO, amt(100), amt(1_000), amt(1_000), amt(1_000))
        else {
            panic!("expected Ok");
        };
        assert_eq!(fee, Amount::ZERO);
        // 1000 * 100 / 1100 = 90.9
        assert_eq!(out, amt(90));
    }

    #[test]
    fn fee_swallowing_input_rejected() {
        let r = swap_output(FeeRate::STANDARD, amt(1), amt(1_000), amt(1_000), amt(1_000));
        assert_eq!(r, Err(DexError::InvalidQuantity("net input after fee is zero")));
    }

    #[test]
    fn locked_capacity_limits_output() {
        let r = swap_output(FeeRate::STANDARD, amt(100), amt(1_000), amt(1_000), amt(90));
        assert_eq!(r, Err(DexError::InsufficientLiquidity));
        assert!(swap_output(FeeRate::STANDARD, amt(100), amt(1_000), amt(1_000), amt(91)).is_ok());
    }

    #[test]
    fn dust_output_rejected() {
        let r = swap_output(FeeRate::ZERO, amt(1), amt(1_000_000), amt(10), amt(10));
        assert_eq!(r, Err(DexError::InsufficientLiquidity));
    }

    #[test]
    fn proportional_deposit() {
        let Ok(minted) = deposit_shares(
            amt(100),
            amt(200),
            amt(1_000),
            amt(2_000),
            LpShares::new(1_414),
            BasisPoints::new(100),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(minted, LpShares::new(141));
    }

    #[test]
    fn skewed_deposit_rejected() {
        let r = deposit_shares(
            amt(100),
            amt(150),
            amt(1_000),
            amt(1_000),
            LpShares::new(1_000),
            BasisPoints::new(100),
        );
        let Err(DexError::RatioMismatch { deviation, .. }) = r else {
            panic!("expected RatioMismatch, got {r:?}");
        };
        // |100*1000 - 150*1000| / 150_000 = 1/3
        assert_eq!(deviation, BasisPoints::new(3_334));
    }

    #[test]
    fn deviation_within_tolerance() {
        let Ok(d) = ratio_deviation(amt(100), amt(101), amt(1_000), amt(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(d, BasisPoints::new(100));
    }

    #[test]
    fn cost_rounds_up_payout_rounds_down() {
        assert_eq!(share_cost(LpShares::new(20), amt(1_001), LpShares::new(1_000)), Ok(amt(21)));
        assert_eq!(share_payout(LpShares::new(20), amt(1_001), LpShares::new(1_000)), Ok(amt(20)));
    }

    #[test]
    fn empty_pool_division() {
        assert_eq!(
            share_payout(LpShares::new(1), amt(10), LpShares::ZERO),
            Err(DexError::DivisionByZero)
        );
    }

    // ------------------------------------------------------------------
    // 18-decimal scale
    // ------------------------------------------------------------------

    const E18: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn one_token_into_thousand_token_pool() {
        let reserve = amt(1_000 * E18);
        let Ok((out, fee)) = swap_output(FeeRate::STANDARD, amt(E18), reserve, reserve, reserve) else {
            panic!("18-decimal swap prices");
        };
        assert_eq!(fee, amt(3 * E18 / 1_000));
        // 1000e18 * 0.997e18 / 1000.997e18
        let net = E18 - 3 * E18 / 1_000;
        assert_eq!(out.get(), mul_div(1_000 * E18, net, 1_000 * E18 + net, Rounding::Down).unwrap_or(0));
        assert!(out < amt(E18));
        assert!(out > amt(996 * E18 / 1_000));
    }

    #[test]
    fn large_reserve_liquidity_math() {
        let reserve = amt(1_000_000 * E18);
        let total = LpShares::new(1_000_000 * E18);
        let Ok(minted) = deposit_shares(amt(10 * E18), amt(10 * E18), reserve, reserve, total, BasisPoints::new(100))
        else {
            panic!("deposit prices");
        };
        assert_eq!(minted, LpShares::new(10 * E18));
        assert_eq!(share_cost(minted, reserve, total), Ok(amt(10 * E18)));
        assert_eq!(share_payout(minted, reserve, total), Ok(amt(10 * E18)));
        assert_eq!(ratio_deviation(amt(E18), amt(2 * E18), reserve, reserve), Ok(BasisPoints::new(5_000)));
    }

    #[test]
    fn extreme_cross_products_stay_in_range() {
        let max = amt(u128::MAX);
        assert_eq!(ratio_deviation(max, amt(1), amt(1), max), Ok(BasisPoints::WHOLE));
        assert_eq!(ratio_deviation(max, max, max, max), Ok(BasisPoints::ZERO));
    }
}
