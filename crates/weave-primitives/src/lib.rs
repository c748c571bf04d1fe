//! # weave-primitives
//!
//! Primitive types shared by the Weave ledger crates.
//!
//! - [`Address`]: 20-byte account address
//! - [`H256`]: 32-byte hash
//! - [`U256`]: 256-bit unsigned integer (re-exported from `primitive-types`)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Block number type
pub type BlockNumber = u64;

/// Account nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;
