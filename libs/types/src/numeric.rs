//! Checked uint256 helpers
//!
//! All amounts are unsigned 256-bit integers. Nothing here wraps: overflow
//! and division by zero surface as `None` / [`BalanceError::Overflow`].

use alloy_primitives::U256;

use crate::errors::BalanceError;

/// `floor(a * b / denominator)`.
///
/// Returns `None` if the product overflows 256 bits or the denominator is zero.
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    a.checked_mul(b).map(|product| product / denominator)
}

pub fn checked_add(a: U256, b: U256) -> Result<U256, BalanceError> {
    a.checked_add(b).ok_or(BalanceError::Overflow)
}

/// Encode an integer as a big-endian 32-byte word.
pub fn to_word(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}
