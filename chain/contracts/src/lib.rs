//! Escrow Exchange Contract Logic
//!
//! Custodial ledger for native currency and fungible tokens, resting orders
//! posted against escrowed balances, and atomic settlement of fills.
//!
//! # Modules
//! - `errors`: Exchange error taxonomy and reason strings
//! - `events`: Notifications emitted by committed operations
//! - `security`: Ownership gate for administrative calls
//! - `registry`: Accepted asset list
//! - `ledger`: Per-user available/locked balances
//! - `orderbook`: Order records keyed by fingerprint, user nonces
//! - `settlement`: Fill preconditions, trade quantity, two-sided swap
//! - `funding`: Attached native value and shortfall coverage
//! - `host`: Block height, native transfers and token capability boundary
//! - `config`: Deployment configuration
//! - `commitment`: Deterministic state root
//! - `exchange`: Public operations and queries
//!
//! Every public operation of [`Exchange`] is a unit of work: it either
//! commits completely (ledger, order book, events and host-side transfers)
//! or has no effect at all.
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod events;
pub mod security;
pub mod registry;
pub mod ledger;
pub mod orderbook;
pub mod settlement;
pub mod funding;
pub mod host;
pub mod config;
pub mod commitment;
pub mod exchange;

pub use config::ExchangeConfig;
pub use errors::{ErrorCategory, ExchangeError};
pub use events::ContractEvent;
pub use exchange::{Call, Exchange, OrderSnapshot, SharedExchange};
pub use host::{FungibleToken, Host, InMemoryHost, InMemoryToken};
pub use settlement::FillPlan;

/// Contract ABI version: frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
