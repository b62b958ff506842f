//! Fixed-point arithmetic helpers
//!
//! Amounts are `u64`; every product is formed in `u128` and every division
//! floors. Overflow never wraps: it surfaces as [`MathError::Overflow`].

use thiserror::Error;

use crate::{Amount, BasisPoints};

/// Fixed-point scale for per-share accumulators and NAV (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Denominator for basis-point quantities
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Arithmetic failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// Intermediate or result does not fit
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type for arithmetic
pub type MathResult<T> = Result<T, MathError>;

/// Compute `floor(a * b / denominator)`
pub fn mul_div(a: u128, b: u128, denominator: u128) -> MathResult<u128> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    a.checked_mul(b)
        .ok_or(MathError::Overflow)
        .map(|product| product / denominator)
}

/// Compute `floor(value * bps / 10_000)`
pub fn bps_of(value: Amount, bps: BasisPoints) -> MathResult<Amount> {
    to_amount(mul_div(value as u128, bps as u128, BPS_DENOMINATOR)?)
}

/// Narrow a `u128` intermediate back into an [`Amount`]
pub fn to_amount(value: u128) -> MathResult<Amount> {
    Amount::try_from(value).map_err(|_| MathError::Overflow)
}

/// Checked addition on amounts
pub fn add(a: Amount, b: Amount) -> MathResult<Amount> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Checked subtraction on amounts
pub fn sub(a: Amount, b: Amount) -> MathResult<Amount> {
    a.checked_sub(b).ok_or(MathError::Overflow)
}
