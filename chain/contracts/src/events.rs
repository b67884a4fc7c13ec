//! Contract events
//!
//! Events are immutable records emitted by committed operations. They are
//! the only indexable history of ledger activity: an indexer rebuilds state
//! from this stream plus query calls.

use alloy_primitives::{Address, U256};
use escrow_types::ids::{AssetId, Fingerprint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAdded {
    pub asset: AssetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRemoved {
    pub asset: AssetId,
}

/// Funds credited to a user's available balance, either by an explicit
/// deposit or by the funding gateway covering a shortfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub user: Address,
    pub asset: AssetId,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub user: Address,
    pub asset: AssetId,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub fingerprint: Fingerprint,
    pub have_asset: AssetId,
    pub have_amount: U256,
    pub want_asset: AssetId,
    pub want_amount: U256,
    pub creator: Address,
    pub nonce: u64,
    pub expiration_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceled {
    pub fingerprint: Fingerprint,
    pub creator: Address,
    /// Collateral returned to the creator's available balance
    pub unlocked: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub fingerprint: Fingerprint,
    pub filler: Address,
    pub fill_amount: U256,
    pub amount_take: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    AssetAdded(AssetAdded),
    AssetRemoved(AssetRemoved),
    Deposit(Deposit),
    Withdraw(Withdraw),
    OrderCreated(OrderCreated),
    OrderCanceled(OrderCanceled),
    OrderFilled(OrderFilled),
    OwnershipTransferred(OwnershipTransferred),
}

impl ContractEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::AssetAdded(_) => "AssetAdded",
            ContractEvent::AssetRemoved(_) => "AssetRemoved",
            ContractEvent::Deposit(_) => "Deposit",
            ContractEvent::Withdraw(_) => "Withdraw",
            ContractEvent::OrderCreated(_) => "OrderCreated",
            ContractEvent::OrderCanceled(_) => "OrderCanceled",
            ContractEvent::OrderFilled(_) => "OrderFilled",
            ContractEvent::OwnershipTransferred(_) => "OwnershipTransferred",
        }
    }
}
