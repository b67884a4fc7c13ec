//! Host boundary: block height, native currency, token contracts
//!
//! The exchange never touches wallets directly. Everything outside its own
//! ledger goes through [`Host`]: native value attached to a call, native
//! payouts, and the [`FungibleToken`] capability of each token asset.
//!
//! A host also provides unit-of-work hooks. The exchange opens a checkpoint
//! before each operation and either commits or reverts it, so transfers a
//! failed operation already made are undone together with the ledger.
//!
//! [`InMemoryHost`] and [`InMemoryToken`] are complete in-process
//! implementations used by tests and embedders.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};
use escrow_types::ids::AssetId;

/// Fungible-token transfer capability.
///
/// `spender`/`sender` is the contract making the call (the exchange), made
/// explicit because there is no ambient caller in-process. Both methods
/// return `false` on any failure, without saying why.
pub trait FungibleToken {
    /// Move `amount` from `owner` to `recipient` using `spender`'s allowance.
    fn transfer_from(&mut self, spender: Address, owner: Address, recipient: Address, amount: U256) -> bool;

    /// Move `amount` from `sender`'s own balance to `recipient`.
    fn transfer(&mut self, sender: Address, recipient: Address, amount: U256) -> bool;
}

/// Execution environment of the exchange.
pub trait Host {
    /// Current block height
    fn block_height(&self) -> u64;

    /// Take `amount` of native currency from `from` into exchange custody.
    /// Called once per operation for the value attached to the call.
    fn accept_native(&mut self, from: Address, amount: U256) -> bool;

    /// Pay `amount` of native currency out of exchange custody to `to`.
    fn send_native(&mut self, to: Address, amount: U256) -> bool;

    /// Token contract behind `asset`, if one exists.
    fn token(&mut self, asset: AssetId) -> Option<&mut dyn FungibleToken>;

    /// Open a unit of work.
    fn checkpoint(&mut self);

    /// Keep everything since the matching `checkpoint`.
    fn commit(&mut self);

    /// Undo everything since the matching `checkpoint`.
    fn revert(&mut self);
}

// ═══════════════════════════════════════════════════════════════════
// In-memory token
// ═══════════════════════════════════════════════════════════════════

/// Minimal ERC-20 style token with balances and allowances.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    balances: HashMap<Address, U256>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), U256>,
    /// When set, every transfer fails
    frozen: bool,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        let balance = self.balances.entry(to).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn balance_of(&self, who: Address) -> U256 {
        self.balances.get(&who).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let from_balance = self.balance_of(from);
        let Some(from_after) = from_balance.checked_sub(amount) else {
            return false;
        };
        if from == to {
            return true;
        }
        let Some(to_after) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.balances.insert(from, from_after);
        self.balances.insert(to, to_after);
        true
    }
}

impl FungibleToken for InMemoryToken {
    fn transfer_from(&mut self, spender: Address, owner: Address, recipient: Address, amount: U256) -> bool {
        if self.frozen {
            return false;
        }
        let Some(remaining) = self.allowance(owner, spender).checked_sub(amount) else {
            return false;
        };
        if !self.move_balance(owner, recipient, amount) {
            return false;
        }
        self.allowances.insert((owner, spender), remaining);
        true
    }

    fn transfer(&mut self, sender: Address, recipient: Address, amount: U256) -> bool {
        if self.frozen {
            return false;
        }
        self.move_balance(sender, recipient, amount)
    }
}

// ═══════════════════════════════════════════════════════════════════
// In-memory host
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
struct HostSnapshot {
    wallets: HashMap<Address, U256>,
    tokens: HashMap<AssetId, InMemoryToken>,
}

/// In-process host: native wallets, token contracts and a block counter.
///
/// `custodian` is the exchange's own address; native value the exchange
/// holds lives in the custodian's wallet.
#[derive(Debug, Clone)]
pub struct InMemoryHost {
    custodian: Address,
    height: u64,
    wallets: HashMap<Address, U256>,
    tokens: HashMap<AssetId, InMemoryToken>,
    /// Addresses that refuse incoming native payments
    refusing: HashSet<Address>,
    checkpoints: Vec<HostSnapshot>,
}

impl InMemoryHost {
    pub fn new(custodian: Address) -> Self {
        Self {
            custodian,
            height: 0,
            wallets: HashMap::new(),
            tokens: HashMap::new(),
            refusing: HashSet::new(),
            checkpoints: Vec::new(),
        }
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    // ─── Blocks ───

    pub fn set_block_height(&mut self, height: u64) {
        self.height = height;
    }

    pub fn advance_blocks(&mut self, blocks: u64) {
        self.height = self.height.saturating_add(blocks);
    }

    // ─── Native currency ───

    pub fn fund_native(&mut self, who: Address, amount: U256) {
        let wallet = self.wallets.entry(who).or_default();
        *wallet = wallet.saturating_add(amount);
    }

    pub fn native_balance(&self, who: Address) -> U256 {
        self.wallets.get(&who).copied().unwrap_or_default()
    }

    /// Make `who` reject native payments (a contract without a receive hook).
    pub fn refuse_native(&mut self, who: Address) {
        self.refusing.insert(who);
    }

    fn move_native(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let Some(from_after) = self.native_balance(from).checked_sub(amount) else {
            return false;
        };
        let Some(to_after) = self.native_balance(to).checked_add(amount) else {
            return false;
        };
        self.wallets.insert(from, from_after);
        self.wallets.insert(to, to_after);
        true
    }

    // ─── Tokens ───

    /// Deploy an empty token contract at `asset`, replacing any existing one.
    pub fn deploy_token(&mut self, asset: AssetId) -> &mut InMemoryToken {
        self.tokens.insert(asset, InMemoryToken::new());
        self.tokens.entry(asset).or_default()
    }

    pub fn token_mut(&mut self, asset: AssetId) -> Option<&mut InMemoryToken> {
        self.tokens.get_mut(&asset)
    }

    pub fn token_balance(&self, asset: AssetId, who: Address) -> U256 {
        self.tokens
            .get(&asset)
            .map(|t| t.balance_of(who))
            .unwrap_or_default()
    }

    /// Asset holdings of the custodian: native wallet or token balance.
    pub fn custody_balance(&self, asset: AssetId) -> U256 {
        if asset.is_native() {
            self.native_balance(self.custodian)
        } else {
            self.token_balance(asset, self.custodian)
        }
    }
}

impl Host for InMemoryHost {
    fn block_height(&self) -> u64 {
        self.height
    }

    fn accept_native(&mut self, from: Address, amount: U256) -> bool {
        let custodian = self.custodian;
        self.move_native(from, custodian, amount)
    }

    fn send_native(&mut self, to: Address, amount: U256) -> bool {
        if self.refusing.contains(&to) {
            return false;
        }
        let custodian = self.custodian;
        self.move_native(custodian, to, amount)
    }

    fn token(&mut self, asset: AssetId) -> Option<&mut dyn FungibleToken> {
        self.tokens
            .get_mut(&asset)
            .map(|t| t as &mut dyn FungibleToken)
    }

    fn checkpoint(&mut self) {
        self.checkpoints.push(HostSnapshot {
            wallets: self.wallets.clone(),
            tokens: self.tokens.clone(),
        });
    }

    fn commit(&mut self) {
        self.checkpoints.pop();
    }

    fn revert(&mut self) {
        if let Some(snapshot) = self.checkpoints.pop() {
            self.wallets = snapshot.wallets;
            self.tokens = snapshot.tokens;
        }
    }
}
