//! Settlement Engine: fill preconditions, trade quantity, two-sided swap
//!
//! A fill swaps `fill_amount` of the order's want asset (paid by the filler)
//! against `amount_take` of its have asset (released from the creator's
//! locked collateral):
//!
//! ```text
//! amount_take = floor(have_amount * fill_amount / want_amount)
//! ```
//!
//! Floor division means a small fill on an order with `have < want` can
//! release nothing. That is accepted; callers pick fill sizes that avoid the
//! rounding loss. The fill that completes an order releases everything still
//! locked behind it, so no rounding dust stays escrowed.

use alloy_primitives::{Address, U256};
use escrow_types::errors::BalanceError;
use escrow_types::ids::Fingerprint;
use escrow_types::numeric::mul_div_floor;
use escrow_types::order::Order;

use crate::errors::ExchangeError;
use crate::ledger::EscrowLedger;

/// Quantities of one validated fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    pub fingerprint: Fingerprint,
    /// Want-asset amount paid by the filler
    pub fill_amount: U256,
    /// Have-asset amount released to the filler
    pub amount_take: U256,
    /// This fill brings `filled_amount` up to `want_amount`
    pub completes: bool,
}

/// Order-state preconditions, in reporting order: canceled, expired, fully
/// filled, fill exceeds remainder.
pub fn check_fillable(order: &Order, fill_amount: U256, height: u64) -> Result<(), ExchangeError> {
    if order.canceled {
        return Err(ExchangeError::AlreadyCanceled);
    }
    if order.is_expired_at(height) {
        return Err(ExchangeError::OrderExpired {
            expiration_height: order.terms.expiration_height,
        });
    }
    if order.is_fully_filled() {
        return Err(ExchangeError::OrderFullyFilled);
    }
    let remaining = order.remaining_want();
    if fill_amount > remaining {
        return Err(ExchangeError::FillExceedsRemainder {
            fill_amount,
            remaining,
        });
    }
    Ok(())
}

/// Compute the trade quantities of filling `fill_amount` on `order`.
pub fn plan_fill(fingerprint: Fingerprint, order: &Order, fill_amount: U256) -> Result<FillPlan, ExchangeError> {
    let terms = &order.terms;
    let completes = fill_amount == order.remaining_want();

    let amount_take = if completes {
        terms.have_amount.saturating_sub(order.have_released)
    } else {
        mul_div_floor(terms.have_amount, fill_amount, terms.want_amount).ok_or(BalanceError::Overflow)?
    };

    Ok(FillPlan {
        fingerprint,
        fill_amount,
        amount_take,
        completes,
    })
}

/// Apply the swap to the ledger and the order record.
///
/// Steps: unlock `amount_take` of the creator's have asset, move it to the
/// filler, move `fill_amount` of the want asset from filler to creator, then
/// record the fill. The caller runs this inside a unit of work, so an error
/// part-way through is rolled back with the rest of the operation.
pub fn settle(
    ledger: &mut EscrowLedger,
    order: &mut Order,
    plan: &FillPlan,
    filler: Address,
) -> Result<(), ExchangeError> {
    let terms = order.terms;
    let creator = terms.creator;

    ledger.unlock(creator, terms.have_asset, plan.amount_take)?;
    ledger.transfer_available(terms.have_asset, creator, filler, plan.amount_take)?;
    ledger.transfer_available(terms.want_asset, filler, creator, plan.fill_amount)?;

    order.filled_amount = order
        .filled_amount
        .checked_add(plan.fill_amount)
        .ok_or(BalanceError::Overflow)?;
    order.have_released = order
        .have_released
        .checked_add(plan.amount_take)
        .ok_or(BalanceError::Overflow)?;
    Ok(())
}
