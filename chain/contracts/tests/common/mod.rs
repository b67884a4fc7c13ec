//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use escrow_contracts::{Call, Exchange, ExchangeConfig, InMemoryHost};
use escrow_types::ids::AssetId;

pub const STARTING_NATIVE: u64 = 1_000;
pub const STARTING_TOKENS: u64 = 1_000;

pub fn u(n: u64) -> U256 {
    U256::from(n)
}

pub fn owner() -> Address {
    Address::repeat_byte(0x0A)
}

pub fn custodian() -> Address {
    Address::repeat_byte(0xEE)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xA1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xB0)
}

pub fn mallory() -> Address {
    Address::repeat_byte(0x66)
}

/// Listed at deployment.
pub fn token_t() -> AssetId {
    AssetId::new(Address::repeat_byte(0x70))
}

/// Deployed on the host but not listed.
pub fn token_u() -> AssetId {
    AssetId::new(Address::repeat_byte(0x75))
}

pub fn call(who: Address) -> Call {
    Call::new(who)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Alice and Bob each hold native currency and both tokens, with full
/// allowance granted to the exchange.
pub fn setup() -> Exchange<InMemoryHost> {
    init_tracing();

    let mut host = InMemoryHost::new(custodian());
    for user in [alice(), bob()] {
        host.fund_native(user, u(STARTING_NATIVE));
    }
    for asset in [token_t(), token_u()] {
        let token = host.deploy_token(asset);
        for user in [alice(), bob()] {
            token.mint(user, u(STARTING_TOKENS));
            token.approve(user, custodian(), U256::MAX);
        }
    }

    let config = ExchangeConfig::new(custodian(), owner()).with_assets([token_t()]);
    Exchange::new(config, host).unwrap()
}

/// Every escrowed unit is backed by custody holdings, asset by asset.
pub fn assert_conserved(ex: &Exchange<InMemoryHost>) {
    for asset in [AssetId::NATIVE, token_t(), token_u()] {
        assert_eq!(
            ex.total_escrowed(asset).unwrap(),
            ex.host().custody_balance(asset),
            "escrow does not match custody for {asset}"
        );
    }
}
