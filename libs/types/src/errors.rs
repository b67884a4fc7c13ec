//! Error types for escrow balance arithmetic

use alloy_primitives::U256;
use thiserror::Error;

/// Balance-level failures. Every ledger mutation reports one of these
/// instead of wrapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("insufficient available balance: required {required}, available {available}")]
    InsufficientAvailable { required: U256, available: U256 },

    #[error("insufficient locked balance: required {required}, locked {locked}")]
    InsufficientLocked { required: U256, locked: U256 },

    #[error("arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_available_display() {
        let err = BalanceError::InsufficientAvailable {
            required: U256::from(15),
            available: U256::from(10),
        };
        assert_eq!(
            err.to_string(),
            "insufficient available balance: required 15, available 10"
        );
    }

    #[test]
    fn test_overflow_display() {
        assert_eq!(BalanceError::Overflow.to_string(), "arithmetic overflow");
    }
}
