//! Escrow Ledger: per-user, per-asset available/locked balances
//!
//! Balances are stored as `HashMap<Address, HashMap<AssetId, Balance>>`. A
//! pair that was never touched reads as zero. Every mutation is checked and a
//! failed call leaves the ledger unchanged.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use escrow_types::account::Balance;
use escrow_types::errors::BalanceError;
use escrow_types::ids::AssetId;

#[derive(Debug, Clone, Default)]
pub struct EscrowLedger {
    balances: HashMap<Address, HashMap<AssetId, Balance>>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn balance_of(&self, user: Address, asset: AssetId) -> Balance {
        self.balances
            .get(&user)
            .and_then(|assets| assets.get(&asset))
            .copied()
            .unwrap_or_default()
    }

    pub fn available(&self, user: Address, asset: AssetId) -> U256 {
        self.balance_of(user, asset).available
    }

    /// Sum of available and locked balance of `asset` across all users.
    pub fn total_escrowed(&self, asset: AssetId) -> Result<U256, BalanceError> {
        self.balances
            .values()
            .filter_map(|assets| assets.get(&asset))
            .try_fold(U256::ZERO, |acc, b| {
                b.total()
                    .and_then(|t| acc.checked_add(t))
                    .ok_or(BalanceError::Overflow)
            })
    }

    /// Every stored (user, asset, balance) entry, in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (Address, AssetId, Balance)> + '_ {
        self.balances.iter().flat_map(|(user, assets)| {
            assets
                .iter()
                .map(move |(asset, balance)| (*user, *asset, *balance))
        })
    }

    // ───────────────────────── Mutations ─────────────────────────

    pub fn credit(&mut self, user: Address, asset: AssetId, amount: U256) -> Result<(), BalanceError> {
        self.entry(user, asset).credit(amount)
    }

    pub fn debit(&mut self, user: Address, asset: AssetId, amount: U256) -> Result<(), BalanceError> {
        self.entry(user, asset).debit(amount)
    }

    pub fn lock(&mut self, user: Address, asset: AssetId, amount: U256) -> Result<(), BalanceError> {
        self.entry(user, asset).lock(amount)
    }

    pub fn unlock(&mut self, user: Address, asset: AssetId, amount: U256) -> Result<(), BalanceError> {
        self.entry(user, asset).unlock(amount)
    }

    /// Move `amount` of available balance from `from` to `to`.
    ///
    /// Both sides are computed before either is written, so a failure on the
    /// credit side leaves `from` untouched.
    pub fn transfer_available(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), BalanceError> {
        if from == to {
            // Self-transfer: only the debit check matters.
            let balance = self.balance_of(from, asset);
            if balance.available < amount {
                return Err(BalanceError::InsufficientAvailable {
                    required: amount,
                    available: balance.available,
                });
            }
            return Ok(());
        }

        let mut source = self.balance_of(from, asset);
        let mut target = self.balance_of(to, asset);
        source.debit(amount)?;
        target.credit(amount)?;

        *self.entry(from, asset) = source;
        *self.entry(to, asset) = target;
        Ok(())
    }

    fn entry(&mut self, user: Address, asset: AssetId) -> &mut Balance {
        self.balances
            .entry(user)
            .or_default()
            .entry(asset)
            .or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    fn user(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn token() -> AssetId {
        AssetId::new(Address::repeat_byte(0x70))
    }

    #[test]
    fn test_untouched_pair_is_zero() {
        let ledger = EscrowLedger::new();
        assert_eq!(ledger.balance_of(user(1), AssetId::NATIVE), Balance::ZERO);
    }

    #[test]
    fn test_credit_debit() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(10)).unwrap();
        ledger.debit(user(1), token(), u(3)).unwrap();
        assert_eq!(ledger.available(user(1), token()), u(7));
    }

    #[test]
    fn test_debit_insufficient() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(1)).unwrap();
        let err = ledger.debit(user(1), token(), u(5)).unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientAvailable {
                required: u(5),
                available: u(1)
            }
        );
        assert_eq!(ledger.available(user(1), token()), u(1));
    }

    #[test]
    fn test_assets_isolated() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(10)).unwrap();
        ledger.credit(user(1), AssetId::NATIVE, u(4)).unwrap();
        ledger.lock(user(1), token(), u(6)).unwrap();

        assert_eq!(ledger.balance_of(user(1), token()), Balance::new(u(4), u(6)));
        assert_eq!(ledger.balance_of(user(1), AssetId::NATIVE), Balance::new(u(4), U256::ZERO));
    }

    #[test]
    fn test_transfer_available() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(10)).unwrap();
        ledger.transfer_available(token(), user(1), user(2), u(4)).unwrap();

        assert_eq!(ledger.available(user(1), token()), u(6));
        assert_eq!(ledger.available(user(2), token()), u(4));
    }

    #[test]
    fn test_transfer_available_credit_overflow_leaves_source() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(10)).unwrap();
        ledger.credit(user(2), token(), U256::MAX).unwrap();

        let err = ledger
            .transfer_available(token(), user(1), user(2), u(1))
            .unwrap_err();
        assert_eq!(err, BalanceError::Overflow);
        assert_eq!(ledger.available(user(1), token()), u(10));
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(5)).unwrap();
        ledger.transfer_available(token(), user(1), user(1), u(5)).unwrap();
        assert_eq!(ledger.available(user(1), token()), u(5));
        assert!(ledger.transfer_available(token(), user(1), user(1), u(6)).is_err());
    }

    #[test]
    fn test_total_escrowed() {
        let mut ledger = EscrowLedger::new();
        ledger.credit(user(1), token(), u(10)).unwrap();
        ledger.credit(user(2), token(), u(5)).unwrap();
        ledger.lock(user(2), token(), u(5)).unwrap();
        ledger.credit(user(2), AssetId::NATIVE, u(100)).unwrap();

        assert_eq!(ledger.total_escrowed(token()), Ok(u(15)));
        assert_eq!(ledger.total_escrowed(AssetId::NATIVE), Ok(u(100)));
    }
}
