//! Identifier types for exchange entities
//!
//! Users and assets share the 20-byte address space of the host ledger. The
//! zero address is reserved as the native-currency sentinel.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tradable asset.
///
/// Either the native currency ([`AssetId::NATIVE`]) or the address of a
/// fungible-token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Address);

impl AssetId {
    /// Native currency sentinel
    pub const NATIVE: AssetId = AssetId(Address::ZERO);

    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn is_native(&self) -> bool {
        self.0.is_zero()
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for AssetId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Content-addressed order identifier (keccak256 of the order terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(B256);

impl Fingerprint {
    pub const fn new(hash: B256) -> Self {
        Self(hash)
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<B256> for Fingerprint {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_sentinel() {
        assert!(AssetId::NATIVE.is_native());
        assert!(!AssetId::new(Address::repeat_byte(0x11)).is_native());
        assert_eq!(AssetId::NATIVE.to_string(), "native");
    }

    #[test]
    fn test_asset_id_serialization() {
        let asset = AssetId::new(Address::repeat_byte(0xAB));
        let json = serde_json::to_string(&asset).unwrap();
        assert!(json.starts_with("\"0x"));
        assert_eq!(json.len(), 44);

        let deserialized: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, deserialized);
    }

    #[test]
    fn test_fingerprint_display_is_hex() {
        let fp = Fingerprint::new(B256::repeat_byte(0x01));
        let s = fp.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
    }
}
