//! Integer arithmetic helpers for pricing and share accounting.
//!
//! Amounts are `u128` raw units.  Products of two amounts are formed in a
//! 256-bit intermediate, so 18-decimal assets with reserves far beyond
//! `10^21` still price exactly; only results that do not fit back into
//! `u128` are reported as [`DexError::Overflow`].

mod checked;

pub use checked::CheckedArithmetic;

use primitive_types::U256;

use crate::domain::Rounding;
use crate::error::DexError;

/// Computes `a * b / denominator` with explicit rounding.
///
/// # Errors
///
/// - [`DexError::DivisionByZero`] if `denominator` is zero.
/// - [`DexError::Overflow`] if the quotient does not fit in `u128`.
///
/// ```
/// use hydra_dex::domain::Rounding;
/// use hydra_dex::math::mul_div;
///
/// assert_eq!(mul_div(1_000, 997, 1_100, Rounding::Down), Ok(906));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
///
/// // 1000 tokens at 18 decimals times 1 token: the product exceeds u128.
/// let reserve = 1_000 * 10u128.pow(18);
/// let one = 10u128.pow(18);
/// assert_eq!(mul_div(reserve, one, reserve, Rounding::Down), Ok(one));
/// ```
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128, DexError> {
    if denominator == 0 {
        return Err(DexError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut q = product / denominator;
    if rounding.is_up() && !(product % denominator).is_zero() {
        q += U256::one();
    }
    narrow(q).ok_or(DexError::Overflow("mul_div result exceeds u128"))
}

/// `floor(sqrt(a * b))`, the geometric mean of two reserves.
///
/// Always fits in `u128`, whatever the inputs.
#[must_use]
pub fn sqrt_product(a: u128, b: u128) -> u128 {
    (U256::from(a) * U256::from(b)).integer_sqrt().low_u128()
}

/// `a * b` widened to 256 bits.
#[must_use]
pub fn wide_mul(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Narrows a 256-bit value back to `u128`, if it fits.
#[must_use]
pub fn narrow(value: U256) -> Option<u128> {
    (value <= U256::from(u128::MAX)).then(|| value.low_u128())
}
