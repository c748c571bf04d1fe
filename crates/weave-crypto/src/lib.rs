//! # weave-crypto
//!
//! Cryptographic primitives for the Weave ledger.
//!
//! - Keccak-256, SHA-256 and RIPEMD-160 hashing
//! - secp256k1 public key recovery and address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::{keccak256, ripemd160, sha256, EMPTY_KECCAK};
pub use signature::{public_key_to_address, recover_address, sign, PrivateKey, Signature};
