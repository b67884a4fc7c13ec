//! Contract-specific error types
//!
//! Every failing operation aborts with one of these. The `Display` output is
//! the reason string surfaced to callers and is part of the contract ABI.

use alloy_primitives::U256;
use escrow_types::errors::BalanceError;
use escrow_types::ids::{AssetId, Fingerprint};
use thiserror::Error;

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad input: unknown asset, zero address, unexpected attached value
    Validation,
    /// Ledger underflow, funding shortfall, refused transfer-in
    InsufficientFunds,
    /// Non-owner administration, non-creator cancellation
    Authorization,
    /// Order lifecycle violations
    State,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    // ─── Validation ───
    #[error("invalid asset: {asset}")]
    InvalidAsset { asset: AssetId },

    #[error("zero address not allowed")]
    ZeroAddress,

    #[error("native currency must use deposit or withdraw")]
    NativeAssetNotAllowed,

    #[error("no ether expected")]
    NoEtherExpected,

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("asset already listed: {asset}")]
    AssetAlreadyListed { asset: AssetId },

    #[error("asset not listed: {asset}")]
    AssetNotListed { asset: AssetId },

    // ─── Funds ───
    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("insufficient native value: required {required}, attached {attached}")]
    InsufficientNativeValue { required: U256, attached: U256 },

    #[error("token transfer failed: {asset}")]
    TransferFailed { asset: AssetId },

    #[error("native transfer failed")]
    NativeTransferFailed,

    // ─── Authorization ───
    #[error("caller is not the owner")]
    NotOwner,

    #[error("caller is not the order creator")]
    NotCreator,

    // ─── Order state ───
    #[error("order not found: {fingerprint}")]
    OrderNotFound { fingerprint: Fingerprint },

    #[error("order already canceled")]
    AlreadyCanceled,

    #[error("order expired at height {expiration_height}")]
    OrderExpired { expiration_height: u64 },

    #[error("order fully filled")]
    OrderFullyFilled,

    #[error("fill amount {fill_amount} exceeds remainder {remaining}")]
    FillExceedsRemainder { fill_amount: U256, remaining: U256 },

    #[error("duplicate order: {fingerprint}")]
    DuplicateOrder { fingerprint: Fingerprint },
}

impl ExchangeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExchangeError::InvalidAsset { .. }
            | ExchangeError::ZeroAddress
            | ExchangeError::NativeAssetNotAllowed
            | ExchangeError::NoEtherExpected
            | ExchangeError::InvalidAmount
            | ExchangeError::AssetAlreadyListed { .. }
            | ExchangeError::AssetNotListed { .. }
            | ExchangeError::Balance(BalanceError::Overflow) => ErrorCategory::Validation,

            ExchangeError::Balance(_)
            | ExchangeError::InsufficientNativeValue { .. }
            | ExchangeError::TransferFailed { .. }
            | ExchangeError::NativeTransferFailed => ErrorCategory::InsufficientFunds,

            ExchangeError::NotOwner | ExchangeError::NotCreator => ErrorCategory::Authorization,

            ExchangeError::OrderNotFound { .. }
            | ExchangeError::AlreadyCanceled
            | ExchangeError::OrderExpired { .. }
            | ExchangeError::OrderFullyFilled
            | ExchangeError::FillExceedsRemainder { .. }
            | ExchangeError::DuplicateOrder { .. } => ErrorCategory::State,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("configuration field `{field}` must not be the zero address")]
    ZeroAddress { field: &'static str },

    #[error("native currency cannot be listed as an initial asset")]
    NativeInitialAsset,

    #[error("initial asset listed twice: {asset}")]
    DuplicateInitialAsset { asset: AssetId },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    #[test]
    fn test_reason_strings_are_stable() {
        assert_eq!(ExchangeError::NoEtherExpected.to_string(), "no ether expected");
        assert_eq!(ExchangeError::AlreadyCanceled.to_string(), "order already canceled");
        assert_eq!(ExchangeError::OrderFullyFilled.to_string(), "order fully filled");
        assert_eq!(ExchangeError::NotCreator.to_string(), "caller is not the order creator");
    }

    #[test]
    fn test_balance_error_is_transparent() {
        let err: ExchangeError = BalanceError::InsufficientLocked {
            required: U256::from(2),
            locked: U256::from(1),
        }
        .into();
        assert_eq!(err.to_string(), "insufficient locked balance: required 2, locked 1");
        assert_eq!(err.category(), ErrorCategory::InsufficientFunds);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ExchangeError::NotOwner.category(), ErrorCategory::Authorization);
        assert_eq!(
            ExchangeError::OrderExpired { expiration_height: 1 }.category(),
            ErrorCategory::State
        );
        assert_eq!(
            ExchangeError::Balance(BalanceError::Overflow).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ExchangeError::TransferFailed { asset: AssetId::NATIVE }.category(),
            ErrorCategory::InsufficientFunds
        );
    }

    #[test]
    fn test_order_not_found_carries_fingerprint() {
        let fp = Fingerprint::new(B256::repeat_byte(0xEE));
        let err = ExchangeError::OrderNotFound { fingerprint: fp };
        assert!(err.to_string().contains("0xeeee"));
    }

    #[test]
    fn test_config_error_from_json() {
        let err: ConfigError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
