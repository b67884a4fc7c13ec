//! Ownership gate for administrative operations

use alloy_primitives::Address;

use crate::errors::ExchangeError;

/// Single-owner access control.
///
/// Only the owner may change the asset list or hand ownership over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: Address) -> bool {
        self.owner == caller
    }

    /// Guard used at the top of every owner-only operation.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), ExchangeError> {
        if !self.is_owner(caller) {
            return Err(ExchangeError::NotOwner);
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: Address, new_owner: Address) -> Result<Address, ExchangeError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ExchangeError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
