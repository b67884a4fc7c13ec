//! Order terms, order records and fingerprinting
//!
//! An order is addressed by the keccak256 hash of its immutable terms:
//!
//! ```text
//! haveAsset(20) | haveAmount(32) | wantAsset(20) | wantAmount(32)
//!   | creator(20) | nonce(32) | expirationHeight(32)
//! ```
//!
//! Addresses are raw 20 bytes, integers big-endian 32-byte words. This layout
//! matches the packed encoding used by off-chain order builders; changing
//! field order or width is a breaking protocol change.

use alloy_primitives::{keccak256, Address, U256};
use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, Fingerprint};
use crate::numeric::to_word;

/// Number of blocks an order stays fillable after creation.
pub const ORDER_EXPIRATION_BLOCKS: u64 = 500;

/// Byte length of the packed fingerprint preimage.
pub const PACKED_TERMS_LEN: usize = 20 + 32 + 20 + 32 + 20 + 32 + 32;

/// Immutable terms of an order, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerms {
    pub have_asset: AssetId,
    pub have_amount: U256,
    pub want_asset: AssetId,
    pub want_amount: U256,
    pub creator: Address,
    pub nonce: u64,
    pub expiration_height: u64,
}

impl OrderTerms {
    /// Packed encoding hashed into the fingerprint
    pub fn packed(&self) -> [u8; PACKED_TERMS_LEN] {
        let mut buf = [0u8; PACKED_TERMS_LEN];
        let mut offset = 0;
        let mut put = |bytes: &[u8]| {
            buf[offset..offset + bytes.len()].copy_from_slice(bytes);
            offset += bytes.len();
        };

        put(self.have_asset.address().as_slice());
        put(&to_word(self.have_amount));
        put(self.want_asset.address().as_slice());
        put(&to_word(self.want_amount));
        put(self.creator.as_slice());
        put(&to_word(U256::from(self.nonce)));
        put(&to_word(U256::from(self.expiration_height)));

        buf
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(keccak256(self.packed()))
    }
}

/// Stored order record.
///
/// `filled_amount` is measured in `want_asset` units. `have_released` is the
/// cumulative amount of `have_asset` already handed to fillers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub terms: OrderTerms,
    pub canceled: bool,
    pub filled_amount: U256,
    pub have_released: U256,
}

impl Order {
    pub fn new(terms: OrderTerms) -> Self {
        Self {
            terms,
            canceled: false,
            filled_amount: U256::ZERO,
            have_released: U256::ZERO,
        }
    }

    pub fn creator(&self) -> Address {
        self.terms.creator
    }

    /// Remaining `want_asset` quantity that can still be filled
    pub fn remaining_want(&self) -> U256 {
        self.terms.want_amount.saturating_sub(self.filled_amount)
    }

    /// `have_asset` collateral still escrowed behind this order
    pub fn locked_remaining(&self) -> U256 {
        if self.canceled {
            return U256::ZERO;
        }
        self.terms.have_amount.saturating_sub(self.have_released)
    }

    pub fn is_fully_filled(&self) -> bool {
        self.filled_amount >= self.terms.want_amount
    }

    /// Expired once the chain reaches `expiration_height` (inclusive).
    pub fn is_expired_at(&self, height: u64) -> bool {
        self.terms.expiration_height <= height
    }
}
