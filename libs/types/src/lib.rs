//! Types library for the escrow exchange
//!
//! Shared type definitions used by the contract layer: identifiers, escrow
//! balances, order records and the order fingerprint encoding.
//!
//! # Version
//! v1.0.0 - Fingerprint layout frozen
//!
//! # Modules
//! - `ids`: Asset identifiers and order fingerprints
//! - `numeric`: Checked uint256 helpers
//! - `account`: Available/locked escrow balance
//! - `order`: Order terms, order record, fingerprinting
//! - `errors`: Balance error taxonomy

pub mod ids;
pub mod numeric;
pub mod account;
pub mod order;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
}
