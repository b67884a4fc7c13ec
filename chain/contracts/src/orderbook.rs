//! Order Book Store: order records keyed by fingerprint, per-user nonces
//!
//! Records are never deleted. Canceled, expired and fully filled orders stay
//! queryable as an audit trail.

use std::collections::HashMap;

use alloy_primitives::Address;
use escrow_types::ids::Fingerprint;
use escrow_types::order::{Order, OrderTerms};

use crate::errors::ExchangeError;

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: HashMap<Fingerprint, Order>,
    /// Number of orders each user has created
    nonces: HashMap<Address, u64>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Nonces ─────────────────────────

    pub fn nonce_of(&self, user: Address) -> u64 {
        self.nonces.get(&user).copied().unwrap_or(0)
    }

    /// Advance `user`'s nonce and return the new value (first order gets 1).
    pub fn next_nonce(&mut self, user: Address) -> u64 {
        let nonce = self.nonces.entry(user).or_insert(0);
        *nonce += 1;
        *nonce
    }

    pub fn nonces(&self) -> impl Iterator<Item = (Address, u64)> + '_ {
        self.nonces.iter().map(|(user, nonce)| (*user, *nonce))
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Store a fresh order under its fingerprint.
    pub fn insert(&mut self, terms: OrderTerms) -> Result<Fingerprint, ExchangeError> {
        let fingerprint = terms.fingerprint();
        if self.orders.contains_key(&fingerprint) {
            return Err(ExchangeError::DuplicateOrder { fingerprint });
        }
        self.orders.insert(fingerprint, Order::new(terms));
        Ok(fingerprint)
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Order> {
        self.orders.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.orders.contains_key(fingerprint)
    }

    /// Lookup that reports a missing order as [`ExchangeError::OrderNotFound`].
    pub fn require(&self, fingerprint: &Fingerprint) -> Result<&Order, ExchangeError> {
        self.orders
            .get(fingerprint)
            .ok_or(ExchangeError::OrderNotFound {
                fingerprint: *fingerprint,
            })
    }

    pub(crate) fn require_mut(&mut self, fingerprint: &Fingerprint) -> Result<&mut Order, ExchangeError> {
        self.orders
            .get_mut(fingerprint)
            .ok_or(ExchangeError::OrderNotFound {
                fingerprint: *fingerprint,
            })
    }

    /// Cancellation guards: the order exists, `caller` created it, and it is
    /// not canceled yet.
    pub fn check_cancel(&self, fingerprint: &Fingerprint, caller: Address) -> Result<&Order, ExchangeError> {
        let order = self.require(fingerprint)?;
        if order.creator() != caller {
            return Err(ExchangeError::NotCreator);
        }
        if order.canceled {
            return Err(ExchangeError::AlreadyCanceled);
        }
        Ok(order)
    }

    pub fn orders(&self) -> impl Iterator<Item = (&Fingerprint, &Order)> + '_ {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use escrow_types::ids::AssetId;

    fn creator() -> Address {
        Address::repeat_byte(0xC1)
    }

    fn terms(nonce: u64) -> OrderTerms {
        OrderTerms {
            have_asset: AssetId::NATIVE,
            have_amount: U256::from(10),
            want_asset: AssetId::new(Address::repeat_byte(0x70)),
            want_amount: U256::from(5),
            creator: creator(),
            nonce,
            expiration_height: 500,
        }
    }

    #[test]
    fn test_nonce_starts_at_zero_and_increments() {
        let mut book = OrderBook::new();
        assert_eq!(book.nonce_of(creator()), 0);
        assert_eq!(book.next_nonce(creator()), 1);
        assert_eq!(book.next_nonce(creator()), 2);
        assert_eq!(book.nonce_of(creator()), 2);
        assert_eq!(book.nonce_of(Address::repeat_byte(0x02)), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut book = OrderBook::new();
        let fp = book.insert(terms(1)).unwrap();
        let order = book.get(&fp).unwrap();
        assert_eq!(order.terms, terms(1));
        assert!(!order.canceled);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut book = OrderBook::new();
        let fp = book.insert(terms(1)).unwrap();
        assert_eq!(
            book.insert(terms(1)),
            Err(ExchangeError::DuplicateOrder { fingerprint: fp })
        );
    }

    #[test]
    fn test_distinct_nonces_distinct_records() {
        let mut book = OrderBook::new();
        let a = book.insert(terms(1)).unwrap();
        let b = book.insert(terms(2)).unwrap();
        assert_ne!(a, b);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_missing_order_is_none() {
        let book = OrderBook::new();
        let fp = Fingerprint::new(B256::ZERO);
        assert!(book.get(&fp).is_none());
        assert_eq!(
            book.require(&fp).unwrap_err(),
            ExchangeError::OrderNotFound { fingerprint: fp }
        );
    }

    #[test]
    fn test_check_cancel_guards() {
        let mut book = OrderBook::new();
        let fp = book.insert(terms(1)).unwrap();

        assert_eq!(
            book.check_cancel(&fp, Address::repeat_byte(0x99)).unwrap_err(),
            ExchangeError::NotCreator
        );
        assert!(book.check_cancel(&fp, creator()).is_ok());

        book.require_mut(&fp).unwrap().canceled = true;
        assert_eq!(
            book.check_cancel(&fp, creator()).unwrap_err(),
            ExchangeError::AlreadyCanceled
        );
    }
}
