//! Escrow balance type
//!
//! One `Balance` exists per (user, asset) pair. `available` is spendable and
//! withdrawable; `locked` is collateral behind open orders.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::errors::BalanceError;

/// Escrowed balance of a single asset.
///
/// Every mutation is checked: a failing call leaves the balance untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub available: U256,
    pub locked: U256,
}

impl Balance {
    pub const ZERO: Balance = Balance {
        available: U256::ZERO,
        locked: U256::ZERO,
    };

    pub fn new(available: U256, locked: U256) -> Self {
        Self { available, locked }
    }

    /// `available + locked`, or `None` if it does not fit in 256 bits.
    pub fn total(&self) -> Option<U256> {
        self.available.checked_add(self.locked)
    }

    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.locked.is_zero()
    }

    /// Add to available balance (deposit, trade proceeds)
    pub fn credit(&mut self, amount: U256) -> Result<(), BalanceError> {
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;
        Ok(())
    }

    /// Remove from available balance (withdrawal, trade payment)
    pub fn debit(&mut self, amount: U256) -> Result<(), BalanceError> {
        self.available = self.available.checked_sub(amount).ok_or(
            BalanceError::InsufficientAvailable {
                required: amount,
                available: self.available,
            },
        )?;
        Ok(())
    }

    /// Move `amount` from available to locked
    pub fn lock(&mut self, amount: U256) -> Result<(), BalanceError> {
        let available = self.available.checked_sub(amount).ok_or(
            BalanceError::InsufficientAvailable {
                required: amount,
                available: self.available,
            },
        )?;
        let locked = self
            .locked
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.available = available;
        self.locked = locked;
        Ok(())
    }

    /// Move `amount` from locked back to available
    pub fn unlock(&mut self, amount: U256) -> Result<(), BalanceError> {
        let locked = self
            .locked
            .checked_sub(amount)
            .ok_or(BalanceError::InsufficientLocked {
                required: amount,
                locked: self.locked,
            })?;
        let available = self
            .available
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.locked = locked;
        self.available = available;
        Ok(())
    }
}
