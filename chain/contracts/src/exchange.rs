//! Exchange: public operations and queries
//!
//! Every mutating operation runs through [`Exchange::transact`]:
//!
//! 1. the ledger state and the host open a checkpoint;
//! 2. native value attached to the call moves into custody;
//! 3. guards run, then mutations, in the order each operation documents;
//! 4. unspent attached value is refunded to the caller;
//! 5. on success, buffered events are appended to the log; on any error,
//!    ledger state and host transfers are restored as if the call never ran.
//!
//! Balances are always debited or locked before value leaves custody.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, B256, U256};
use escrow_types::account::Balance;
use escrow_types::errors::BalanceError;
use escrow_types::ids::{AssetId, Fingerprint};
use escrow_types::order::{Order, OrderTerms, ORDER_EXPIRATION_BLOCKS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commitment;
use crate::config::ExchangeConfig;
use crate::errors::{ConfigError, ExchangeError};
use crate::events::{
    AssetAdded, AssetRemoved, ContractEvent, Deposit, OrderCanceled, OrderCreated, OrderFilled,
    OwnershipTransferred, Withdraw,
};
use crate::funding::{AttachedValue, FundingGateway};
use crate::host::Host;
use crate::ledger::EscrowLedger;
use crate::orderbook::OrderBook;
use crate::registry::AssetRegistry;
use crate::security::Ownable;
use crate::settlement::{self, FillPlan};

/// A transaction: who calls, and how much native value is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub value: U256,
}

impl Call {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Point-in-time view of an order with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub fingerprint: Fingerprint,
    pub have_asset: AssetId,
    pub have_amount: U256,
    pub want_asset: AssetId,
    pub want_amount: U256,
    pub creator: Address,
    pub nonce: u64,
    pub expiration_height: u64,
    pub canceled: bool,
    pub filled_amount: U256,
    pub remaining_want: U256,
    pub locked_remaining: U256,
    pub expired: bool,
    pub fully_filled: bool,
}

/// Everything a failed operation must restore.
#[derive(Debug, Clone)]
struct ExchangeState {
    ownership: Ownable,
    registry: AssetRegistry,
    ledger: EscrowLedger,
    book: OrderBook,
}

/// Per-operation scratch space.
struct Frame {
    attached: AttachedValue,
    events: Vec<ContractEvent>,
}

impl Frame {
    fn emit(&mut self, event: ContractEvent) {
        self.events.push(event);
    }
}

/// Escrow exchange contract.
///
/// Owns its ledger state and the [`Host`] it runs on. Operations take `&mut
/// self`, so within one exchange they are applied strictly one at a time in
/// the order they are called.
#[derive(Debug)]
pub struct Exchange<H: Host> {
    address: Address,
    host: H,
    state: ExchangeState,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl<H: Host> Exchange<H> {
    /// Deploy an exchange. Initial assets are listed as if the owner had
    /// added them, emitting `AssetAdded` for each.
    pub fn new(config: ExchangeConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut registry = AssetRegistry::new();
        let mut events = Vec::with_capacity(config.initial_assets.len());
        for asset in &config.initial_assets {
            registry
                .add(*asset)
                .map_err(|_| ConfigError::DuplicateInitialAsset { asset: *asset })?;
            events.push(ContractEvent::AssetAdded(AssetAdded { asset: *asset }));
        }

        info!(
            address = %config.address,
            owner = %config.owner,
            initial_assets = config.initial_assets.len(),
            "Exchange deployed"
        );

        Ok(Self {
            address: config.address,
            host,
            state: ExchangeState {
                ownership: Ownable::new(config.owner),
                registry,
                ledger: EscrowLedger::new(),
                book: OrderBook::new(),
            },
            events,
        })
    }

    // ───────────────────────── Unit of work ─────────────────────────

    fn transact<T>(
        &mut self,
        op: &'static str,
        call: Call,
        f: impl FnOnce(&mut Self, &mut Frame) -> Result<T, ExchangeError>,
    ) -> Result<T, ExchangeError> {
        let checkpoint = self.state.clone();
        self.host.checkpoint();

        let mut frame = Frame {
            attached: AttachedValue::new(call.caller, call.value),
            events: Vec::new(),
        };

        match self.execute(call, &mut frame, f) {
            Ok(value) => {
                self.host.commit();
                debug!(op, events = frame.events.len(), "operation committed");
                self.events.append(&mut frame.events);
                Ok(value)
            }
            Err(err) => {
                self.state = checkpoint;
                self.host.revert();
                warn!(op, caller = %call.caller, reason = %err, "operation reverted");
                Err(err)
            }
        }
    }

    fn execute<T>(
        &mut self,
        call: Call,
        frame: &mut Frame,
        f: impl FnOnce(&mut Self, &mut Frame) -> Result<T, ExchangeError>,
    ) -> Result<T, ExchangeError> {
        if !call.value.is_zero() && !self.host.accept_native(call.caller, call.value) {
            return Err(ExchangeError::NativeTransferFailed);
        }

        let value = f(self, frame)?;

        let unspent = frame.attached.take_all();
        if !unspent.is_zero() {
            self.gateway().push(AssetId::NATIVE, call.caller, unspent)?;
            debug!(caller = %call.caller, %unspent, "refunded unspent attached value");
        }
        Ok(value)
    }

    fn gateway(&mut self) -> FundingGateway<'_, H> {
        FundingGateway::new(&mut self.host, self.address)
    }

    // ───────────────────────── Administration ─────────────────────────

    /// List a token asset. Owner only.
    pub fn add_asset(&mut self, call: Call, asset: AssetId) -> Result<(), ExchangeError> {
        self.transact("add_asset", call, |ex, frame| {
            ex.state.ownership.ensure_owner(call.caller)?;
            frame.attached.ensure_none()?;
            ex.state.registry.add(asset)?;

            frame.emit(ContractEvent::AssetAdded(AssetAdded { asset }));
            info!(%asset, "Asset listed");
            Ok(())
        })
    }

    /// Delist a token asset. Owner only. Open orders keep settling.
    pub fn remove_asset(&mut self, call: Call, asset: AssetId) -> Result<(), ExchangeError> {
        self.transact("remove_asset", call, |ex, frame| {
            ex.state.ownership.ensure_owner(call.caller)?;
            frame.attached.ensure_none()?;
            ex.state.registry.remove(asset)?;

            frame.emit(ContractEvent::AssetRemoved(AssetRemoved { asset }));
            info!(%asset, "Asset delisted");
            Ok(())
        })
    }

    pub fn transfer_ownership(&mut self, call: Call, new_owner: Address) -> Result<(), ExchangeError> {
        self.transact("transfer_ownership", call, |ex, frame| {
            ex.state.ownership.ensure_owner(call.caller)?;
            frame.attached.ensure_none()?;
            let previous_owner = ex.state.ownership.transfer(call.caller, new_owner)?;

            frame.emit(ContractEvent::OwnershipTransferred(OwnershipTransferred {
                previous_owner,
                new_owner,
            }));
            info!(%previous_owner, %new_owner, "Ownership transferred");
            Ok(())
        })
    }

    // ───────────────────────── Deposits & withdrawals ─────────────────────────

    /// Credit the attached native value to the caller.
    pub fn deposit(&mut self, call: Call) -> Result<(), ExchangeError> {
        self.transact("deposit", call, |ex, frame| {
            let amount = frame.attached.take_all();
            if amount.is_zero() {
                return Err(ExchangeError::InvalidAmount);
            }
            ex.state.ledger.credit(call.caller, AssetId::NATIVE, amount)?;

            frame.emit(ContractEvent::Deposit(Deposit {
                user: call.caller,
                asset: AssetId::NATIVE,
                amount,
            }));
            info!(user = %call.caller, %amount, "Native deposit");
            Ok(())
        })
    }

    /// Pull `amount` of a listed token from the caller and credit it.
    pub fn deposit_asset(&mut self, call: Call, asset: AssetId, amount: U256) -> Result<(), ExchangeError> {
        self.transact("deposit_asset", call, |ex, frame| {
            if asset.is_native() {
                return Err(ExchangeError::NativeAssetNotAllowed);
            }
            ex.state.registry.ensure_valid(asset)?;
            frame.attached.ensure_none()?;
            if amount.is_zero() {
                return Err(ExchangeError::InvalidAmount);
            }

            ex.gateway().pull_token(asset, call.caller, amount)?;
            ex.state.ledger.credit(call.caller, asset, amount)?;

            frame.emit(ContractEvent::Deposit(Deposit {
                user: call.caller,
                asset,
                amount,
            }));
            info!(user = %call.caller, %asset, %amount, "Token deposit");
            Ok(())
        })
    }

    /// Withdraw available native balance to the caller.
    pub fn withdraw(&mut self, call: Call, amount: U256) -> Result<(), ExchangeError> {
        self.transact("withdraw", call, |ex, frame| {
            ex.withdraw_inner(call.caller, frame, AssetId::NATIVE, amount)
        })
    }

    /// Withdraw available token balance to the caller. Works for delisted
    /// assets so escrowed funds are never stranded.
    pub fn withdraw_asset(&mut self, call: Call, asset: AssetId, amount: U256) -> Result<(), ExchangeError> {
        self.transact("withdraw_asset", call, |ex, frame| {
            if asset.is_native() {
                return Err(ExchangeError::NativeAssetNotAllowed);
            }
            ex.withdraw_inner(call.caller, frame, asset, amount)
        })
    }

    fn withdraw_inner(
        &mut self,
        user: Address,
        frame: &mut Frame,
        asset: AssetId,
        amount: U256,
    ) -> Result<(), ExchangeError> {
        frame.attached.ensure_none()?;
        if amount.is_zero() {
            return Err(ExchangeError::InvalidAmount);
        }

        // Debit before value leaves custody.
        self.state.ledger.debit(user, asset, amount)?;
        self.gateway().push(asset, user, amount)?;

        frame.emit(ContractEvent::Withdraw(Withdraw { user, asset, amount }));
        info!(%user, %asset, %amount, "Withdrawal");
        Ok(())
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Post an order offering `have_amount` of `have_asset` for
    /// `want_amount` of `want_asset`. Missing collateral is pulled through
    /// the funding gateway. Returns the order fingerprint.
    pub fn create_order(
        &mut self,
        call: Call,
        have_asset: AssetId,
        have_amount: U256,
        want_asset: AssetId,
        want_amount: U256,
    ) -> Result<Fingerprint, ExchangeError> {
        self.transact("create_order", call, |ex, frame| {
            let creator = call.caller;

            ex.state.registry.ensure_valid(have_asset)?;
            ex.state.registry.ensure_valid(want_asset)?;
            if !have_asset.is_native() {
                frame.attached.ensure_none()?;
            }
            if have_amount.is_zero() || want_amount.is_zero() {
                return Err(ExchangeError::InvalidAmount);
            }

            let available = ex.state.ledger.available(creator, have_asset);
            if available < have_amount {
                let deposit = FundingGateway::new(&mut ex.host, ex.address).cover_shortfall(
                    &mut ex.state.ledger,
                    &mut frame.attached,
                    have_asset,
                    creator,
                    have_amount - available,
                )?;
                frame.emit(ContractEvent::Deposit(deposit));
            }

            let nonce = ex.state.book.next_nonce(creator);
            let expiration_height = ex
                .host
                .block_height()
                .checked_add(ORDER_EXPIRATION_BLOCKS)
                .ok_or(BalanceError::Overflow)?;

            ex.state.ledger.lock(creator, have_asset, have_amount)?;

            let terms = OrderTerms {
                have_asset,
                have_amount,
                want_asset,
                want_amount,
                creator,
                nonce,
                expiration_height,
            };
            let fingerprint = ex.state.book.insert(terms)?;

            frame.emit(ContractEvent::OrderCreated(OrderCreated {
                fingerprint,
                have_asset,
                have_amount,
                want_asset,
                want_amount,
                creator,
                nonce,
                expiration_height,
            }));
            info!(
                %fingerprint,
                %creator,
                nonce,
                %have_asset,
                %have_amount,
                %want_asset,
                %want_amount,
                expiration_height,
                "Order created"
            );
            Ok(fingerprint)
        })
    }

    /// Cancel an order and return its unfilled collateral to the creator.
    pub fn cancel_order(&mut self, call: Call, fingerprint: Fingerprint) -> Result<(), ExchangeError> {
        self.transact("cancel_order", call, |ex, frame| {
            frame.attached.ensure_none()?;

            let order = ex.state.book.check_cancel(&fingerprint, call.caller)?;
            let unlocked = order.locked_remaining();
            let have_asset = order.terms.have_asset;

            ex.state.ledger.unlock(call.caller, have_asset, unlocked)?;
            ex.state.book.require_mut(&fingerprint)?.canceled = true;

            frame.emit(ContractEvent::OrderCanceled(OrderCanceled {
                fingerprint,
                creator: call.caller,
                unlocked,
            }));
            info!(%fingerprint, creator = %call.caller, %unlocked, "Order canceled");
            Ok(())
        })
    }

    /// Fill `fill_amount` of an order's want side. The filler's shortfall in
    /// the want asset is pulled through the funding gateway.
    pub fn fill_order(
        &mut self,
        call: Call,
        fingerprint: Fingerprint,
        fill_amount: U256,
    ) -> Result<FillPlan, ExchangeError> {
        self.transact("fill_order", call, |ex, frame| {
            let filler = call.caller;
            let height = ex.host.block_height();

            let order = ex.state.book.require(&fingerprint)?;
            settlement::check_fillable(order, fill_amount, height)?;
            let want_asset = order.terms.want_asset;
            if !want_asset.is_native() {
                frame.attached.ensure_none()?;
            }
            if fill_amount.is_zero() {
                return Err(ExchangeError::InvalidAmount);
            }
            let plan = settlement::plan_fill(fingerprint, order, fill_amount)?;

            let available = ex.state.ledger.available(filler, want_asset);
            if available < fill_amount {
                let deposit = FundingGateway::new(&mut ex.host, ex.address).cover_shortfall(
                    &mut ex.state.ledger,
                    &mut frame.attached,
                    want_asset,
                    filler,
                    fill_amount - available,
                )?;
                frame.emit(ContractEvent::Deposit(deposit));
            }

            let order = ex.state.book.require_mut(&fingerprint)?;
            settlement::settle(&mut ex.state.ledger, order, &plan, filler)?;

            frame.emit(ContractEvent::OrderFilled(OrderFilled {
                fingerprint,
                filler,
                fill_amount,
                amount_take: plan.amount_take,
            }));
            info!(
                %fingerprint,
                %filler,
                %fill_amount,
                amount_take = %plan.amount_take,
                completes = plan.completes,
                "Order filled"
            );
            Ok(plan)
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.state.ownership.owner()
    }

    pub fn balance_of(&self, user: Address, asset: AssetId) -> Balance {
        self.state.ledger.balance_of(user, asset)
    }

    /// Σ(available + locked) of `asset` over all users.
    pub fn total_escrowed(&self, asset: AssetId) -> Result<U256, BalanceError> {
        self.state.ledger.total_escrowed(asset)
    }

    pub fn is_valid_asset(&self, asset: AssetId) -> bool {
        self.state.registry.is_valid(asset)
    }

    /// Every asset ever listed, in listing order, including delisted ones.
    pub fn list_valid_assets(&self) -> &[AssetId] {
        self.state.registry.list()
    }

    pub fn nonce_of(&self, user: Address) -> u64 {
        self.state.book.nonce_of(user)
    }

    pub fn order(&self, fingerprint: &Fingerprint) -> Option<&Order> {
        self.state.book.get(fingerprint)
    }

    pub fn order_exists(&self, fingerprint: &Fingerprint) -> bool {
        self.state.book.contains(fingerprint)
    }

    pub fn is_order_canceled(&self, fingerprint: &Fingerprint) -> Result<bool, ExchangeError> {
        Ok(self.state.book.require(fingerprint)?.canceled)
    }

    pub fn is_order_filled(&self, fingerprint: &Fingerprint) -> Result<bool, ExchangeError> {
        Ok(self.state.book.require(fingerprint)?.is_fully_filled())
    }

    /// Evaluated against the host's current height.
    pub fn is_order_expired(&self, fingerprint: &Fingerprint) -> Result<bool, ExchangeError> {
        let order = self.state.book.require(fingerprint)?;
        Ok(order.is_expired_at(self.host.block_height()))
    }

    pub fn order_fill_amount(&self, fingerprint: &Fingerprint) -> Result<U256, ExchangeError> {
        Ok(self.state.book.require(fingerprint)?.filled_amount)
    }

    pub fn order_snapshot(&self, fingerprint: &Fingerprint) -> Option<OrderSnapshot> {
        let order = self.state.book.get(fingerprint)?;
        let terms = order.terms;
        Some(OrderSnapshot {
            fingerprint: *fingerprint,
            have_asset: terms.have_asset,
            have_amount: terms.have_amount,
            want_asset: terms.want_asset,
            want_amount: terms.want_amount,
            creator: terms.creator,
            nonce: terms.nonce,
            expiration_height: terms.expiration_height,
            canceled: order.canceled,
            filled_amount: order.filled_amount,
            remaining_want: order.remaining_want(),
            locked_remaining: order.locked_remaining(),
            expired: order.is_expired_at(self.host.block_height()),
            fully_filled: order.is_fully_filled(),
        })
    }

    pub fn state_root(&self) -> B256 {
        commitment::state_root(
            self.state.ownership.owner(),
            &self.state.registry,
            &self.state.ledger,
            &self.state.book,
        )
    }

    // ───────────────────────── Events & host ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the host, outside any unit of work.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

// ═══════════════════════════════════════════════════════════════════
// Shared handle
// ═══════════════════════════════════════════════════════════════════

/// Thread-safe handle serializing all access through one ledger lock.
///
/// Operations from different threads are applied one at a time, in the order
/// the lock is acquired.
pub struct SharedExchange<H: Host> {
    inner: Arc<Mutex<Exchange<H>>>,
}

impl<H: Host> SharedExchange<H> {
    pub fn new(exchange: Exchange<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    /// Lock the exchange. A panic inside a previous holder cannot leave
    /// partial state behind (operations roll back on error, and state is only
    /// replaced wholesale), so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Exchange<H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut Exchange<H>) -> T) -> T {
        f(&mut self.lock())
    }
}

impl<H: Host> Clone for SharedExchange<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
