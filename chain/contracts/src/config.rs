//! Deployment configuration
//!
//! ```json
//! {
//!   "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
//!   "owner": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a",
//!   "initial_assets": ["0x7070707070707070707070707070707070707070"]
//! }
//! ```

use alloy_primitives::Address;
use escrow_types::ids::AssetId;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange address: custody account and token spender
    pub address: Address,
    /// Administrator allowed to manage the asset list
    pub owner: Address,
    /// Token assets listed at deployment
    #[serde(default)]
    pub initial_assets: Vec<AssetId>,
}

impl ExchangeConfig {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            initial_assets: Vec::new(),
        }
    }

    pub fn with_assets(mut self, assets: impl IntoIterator<Item = AssetId>) -> Self {
        self.initial_assets.extend(assets);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ExchangeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_zero() {
            return Err(ConfigError::ZeroAddress { field: "address" });
        }
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroAddress { field: "owner" });
        }
        for (i, asset) in self.initial_assets.iter().enumerate() {
            if asset.is_native() {
                return Err(ConfigError::NativeInitialAsset);
            }
            if self.initial_assets[..i].contains(asset) {
                return Err(ConfigError::DuplicateInitialAsset { asset: *asset });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
        "owner": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a",
        "initial_assets": ["0x7070707070707070707070707070707070707070"]
    }"#;

    #[test]
    fn test_from_json() {
        let config = ExchangeConfig::from_json(JSON).unwrap();
        assert_eq!(config.address, Address::repeat_byte(0xEE));
        assert_eq!(config.owner, Address::repeat_byte(0x0A));
        assert_eq!(
            config.initial_assets,
            vec![AssetId::new(Address::repeat_byte(0x70))]
        );
    }

    #[test]
    fn test_initial_assets_default_empty() {
        let json = r#"{
            "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "owner": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a"
        }"#;
        assert!(ExchangeConfig::from_json(json).unwrap().initial_assets.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ExchangeConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_owner_rejected() {
        let config = ExchangeConfig::new(Address::repeat_byte(0xEE), Address::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroAddress { field: "owner" }));
    }

    #[test]
    fn test_native_initial_asset_rejected() {
        let config = ExchangeConfig::new(Address::repeat_byte(0xEE), Address::repeat_byte(0x0A))
            .with_assets([AssetId::NATIVE]);
        assert_eq!(config.validate(), Err(ConfigError::NativeInitialAsset));
    }

    #[test]
    fn test_duplicate_initial_asset_rejected() {
        let token = AssetId::new(Address::repeat_byte(0x70));
        let config = ExchangeConfig::new(Address::repeat_byte(0xEE), Address::repeat_byte(0x0A))
            .with_assets([token, token]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateInitialAsset { asset: token })
        );
    }
}
