//! State Commitment: deterministic SHA-256 root of the exchange state
//!
//! The root covers the owner, registry, every non-zero balance, every user
//! nonce and every order record. Entries are hashed in sorted order so the
//! root depends only on state, never on map iteration order. An indexer that
//! replays the event stream can compare its reconstruction against
//! `state_root()`.

use alloy_primitives::{Address, B256};
use escrow_types::account::Balance;
use escrow_types::ids::{AssetId, Fingerprint};
use escrow_types::numeric::to_word;
use escrow_types::order::Order;
use sha2::{Digest, Sha256};

use crate::ledger::EscrowLedger;
use crate::orderbook::OrderBook;
use crate::registry::AssetRegistry;

/// Domain tags separating the sections of the preimage.
const TAG_OWNER: u8 = 0x01;
const TAG_ASSET: u8 = 0x02;
const TAG_BALANCE: u8 = 0x03;
const TAG_NONCE: u8 = 0x04;
const TAG_ORDER: u8 = 0x05;

pub fn state_root(owner: Address, registry: &AssetRegistry, ledger: &EscrowLedger, book: &OrderBook) -> B256 {
    let mut hasher = Sha256::new();

    hasher.update([TAG_OWNER]);
    hasher.update(owner.as_slice());

    for asset in registry.list() {
        hasher.update([TAG_ASSET]);
        hasher.update(asset.address().as_slice());
        hasher.update([registry.is_valid(*asset) as u8]);
    }

    let mut balances: Vec<(Address, AssetId, Balance)> =
        ledger.entries().filter(|(_, _, b)| !b.is_zero()).collect();
    balances.sort_by_key(|(user, asset, _)| (*user, *asset));
    for (user, asset, balance) in balances {
        hasher.update([TAG_BALANCE]);
        hasher.update(user.as_slice());
        hasher.update(asset.address().as_slice());
        hasher.update(to_word(balance.available));
        hasher.update(to_word(balance.locked));
    }

    let mut nonces: Vec<(Address, u64)> = book.nonces().collect();
    nonces.sort();
    for (user, nonce) in nonces {
        hasher.update([TAG_NONCE]);
        hasher.update(user.as_slice());
        hasher.update(nonce.to_be_bytes());
    }

    let mut orders: Vec<(&Fingerprint, &Order)> = book.orders().collect();
    orders.sort_by_key(|(fp, _)| **fp);
    for (fingerprint, order) in orders {
        hasher.update([TAG_ORDER]);
        hasher.update(fingerprint.as_slice());
        hasher.update([order.canceled as u8]);
        hasher.update(to_word(order.filled_amount));
        hasher.update(to_word(order.have_released));
    }

    B256::from_slice(&hasher.finalize())
}
