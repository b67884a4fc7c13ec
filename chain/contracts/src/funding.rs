//! Funding Gateway: moves value between the host and the escrow ledger
//!
//! Covers shortfalls when an operation needs more available balance than a
//! user has escrowed: from native value attached to the call, or by pulling
//! tokens through the token's transfer-in capability.

use alloy_primitives::{Address, U256};
use escrow_types::ids::AssetId;
use tracing::debug;

use crate::errors::ExchangeError;
use crate::events::Deposit;
use crate::host::Host;
use crate::ledger::EscrowLedger;

/// Native value attached to the current call that has not been spent yet.
///
/// Whatever remains when the operation commits is refunded to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedValue {
    caller: Address,
    remaining: U256,
}

impl AttachedValue {
    pub fn new(caller: Address, value: U256) -> Self {
        Self {
            caller,
            remaining: value,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn remaining(&self) -> U256 {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Guard for operations or legs that must not carry native value.
    pub fn ensure_none(&self) -> Result<(), ExchangeError> {
        if !self.is_empty() {
            return Err(ExchangeError::NoEtherExpected);
        }
        Ok(())
    }

    /// Spend all remaining value.
    pub fn take_all(&mut self) -> U256 {
        std::mem::take(&mut self.remaining)
    }
}

/// Host-facing half of deposits, withdrawals and shortfall coverage.
pub struct FundingGateway<'a, H: Host + ?Sized> {
    host: &'a mut H,
    /// Exchange address: token spender and custody account
    custodian: Address,
}

impl<'a, H: Host + ?Sized> FundingGateway<'a, H> {
    pub fn new(host: &'a mut H, custodian: Address) -> Self {
        Self { host, custodian }
    }

    /// Pull exactly `amount` of a token from `owner` into custody.
    pub fn pull_token(&mut self, asset: AssetId, owner: Address, amount: U256) -> Result<(), ExchangeError> {
        let custodian = self.custodian;
        let token = self
            .host
            .token(asset)
            .ok_or(ExchangeError::TransferFailed { asset })?;
        if !token.transfer_from(custodian, owner, custodian, amount) {
            return Err(ExchangeError::TransferFailed { asset });
        }
        Ok(())
    }

    /// Pay `amount` of `asset` out of custody to `to`.
    pub fn push(&mut self, asset: AssetId, to: Address, amount: U256) -> Result<(), ExchangeError> {
        if asset.is_native() {
            if !self.host.send_native(to, amount) {
                return Err(ExchangeError::NativeTransferFailed);
            }
            return Ok(());
        }

        let custodian = self.custodian;
        let token = self
            .host
            .token(asset)
            .ok_or(ExchangeError::TransferFailed { asset })?;
        if !token.transfer(custodian, to, amount) {
            return Err(ExchangeError::TransferFailed { asset });
        }
        Ok(())
    }

    /// Credit `user` with `needed` more available balance of `asset`.
    ///
    /// Native: the attached value must cover `needed`; the excess goes back
    /// to the caller right away. Token: exactly `needed` is pulled from
    /// `user`. Returns the deposit notification to emit.
    pub fn cover_shortfall(
        &mut self,
        ledger: &mut EscrowLedger,
        attached: &mut AttachedValue,
        asset: AssetId,
        user: Address,
        needed: U256,
    ) -> Result<Deposit, ExchangeError> {
        if asset.is_native() {
            let value = attached.remaining();
            if value < needed {
                return Err(ExchangeError::InsufficientNativeValue {
                    required: needed,
                    attached: value,
                });
            }
            let excess = attached.take_all() - needed;
            if !excess.is_zero() {
                self.push(AssetId::NATIVE, attached.caller(), excess)?;
            }
            debug!(%user, %needed, %excess, "shortfall covered from attached value");
        } else {
            self.pull_token(asset, user, needed)?;
            debug!(%user, %asset, %needed, "shortfall covered by token pull");
        }

        ledger.credit(user, asset, needed)?;
        Ok(Deposit {
            user,
            asset,
            amount: needed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    fn custodian() -> Address {
        Address::repeat_byte(0xEE)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn token_id() -> AssetId {
        AssetId::new(Address::repeat_byte(0x70))
    }

    /// Host where alice already attached `value` to the call.
    fn host_with_attached(value: u64) -> InMemoryHost {
        let mut host = InMemoryHost::new(custodian());
        host.fund_native(alice(), u(100));
        assert!(host.accept_native(alice(), u(value)));
        host
    }

    #[test]
    fn test_attached_value_guard() {
        assert!(AttachedValue::new(alice(), U256::ZERO).ensure_none().is_ok());
        assert_eq!(
            AttachedValue::new(alice(), u(1)).ensure_none(),
            Err(ExchangeError::NoEtherExpected)
        );
    }

    #[test]
    fn test_native_shortfall_refunds_excess() {
        let mut host = host_with_attached(10);
        let mut ledger = EscrowLedger::new();
        let mut attached = AttachedValue::new(alice(), u(10));

        let deposit = FundingGateway::new(&mut host, custodian())
            .cover_shortfall(&mut ledger, &mut attached, AssetId::NATIVE, alice(), u(6))
            .unwrap();

        assert_eq!(deposit.amount, u(6));
        assert!(attached.is_empty());
        assert_eq!(ledger.available(alice(), AssetId::NATIVE), u(6));
        // 100 - 10 attached + 4 refunded
        assert_eq!(host.native_balance(alice()), u(94));
        assert_eq!(host.custody_balance(AssetId::NATIVE), u(6));
    }

    #[test]
    fn test_native_shortfall_insufficient_value() {
        let mut host = host_with_attached(3);
        let mut ledger = EscrowLedger::new();
        let mut attached = AttachedValue::new(alice(), u(3));

        let err = FundingGateway::new(&mut host, custodian())
            .cover_shortfall(&mut ledger, &mut attached, AssetId::NATIVE, alice(), u(5))
            .unwrap_err();

        assert_eq!(
            err,
            ExchangeError::InsufficientNativeValue {
                required: u(5),
                attached: u(3)
            }
        );
        assert_eq!(attached.remaining(), u(3));
        assert_eq!(ledger.available(alice(), AssetId::NATIVE), U256::ZERO);
    }

    #[test]
    fn test_token_shortfall_pulls_exact_amount() {
        let mut host = InMemoryHost::new(custodian());
        let token = host.deploy_token(token_id());
        token.mint(alice(), u(50));
        token.approve(alice(), custodian(), u(50));

        let mut ledger = EscrowLedger::new();
        let mut attached = AttachedValue::new(alice(), U256::ZERO);
        FundingGateway::new(&mut host, custodian())
            .cover_shortfall(&mut ledger, &mut attached, token_id(), alice(), u(20))
            .unwrap();

        assert_eq!(host.token_balance(token_id(), alice()), u(30));
        assert_eq!(host.custody_balance(token_id()), u(20));
        assert_eq!(ledger.available(alice(), token_id()), u(20));
    }

    #[test]
    fn test_token_shortfall_without_allowance_fails() {
        let mut host = InMemoryHost::new(custodian());
        host.deploy_token(token_id()).mint(alice(), u(50));

        let mut ledger = EscrowLedger::new();
        let mut attached = AttachedValue::new(alice(), U256::ZERO);
        let err = FundingGateway::new(&mut host, custodian())
            .cover_shortfall(&mut ledger, &mut attached, token_id(), alice(), u(20))
            .unwrap_err();

        assert_eq!(err, ExchangeError::TransferFailed { asset: token_id() });
        assert_eq!(ledger.available(alice(), token_id()), U256::ZERO);
    }

    #[test]
    fn test_push_to_missing_token_fails() {
        let mut host = InMemoryHost::new(custodian());
        let err = FundingGateway::new(&mut host, custodian())
            .push(token_id(), alice(), u(1))
            .unwrap_err();
        assert_eq!(err, ExchangeError::TransferFailed { asset: token_id() });
    }
}
