//! Precompiled contracts
//!
//! Natively implemented contracts addressed like ordinary accounts. The
//! interpreter prices a call with [`PrecompiledContract::gas_for_data`] and
//! then runs [`PrecompiledContract::execute`] without building a frame.

mod digest;
mod ecrecover;
mod identity;
mod modexp;

pub use digest::{Ripemd160, Sha256};
pub use ecrecover::EcRecover;
pub use identity::Identity;
pub use modexp::ModExp;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use weave_primitives::Address;

/// Precompile execution failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrecompileError {
    /// Input cannot be processed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Contract-specific failure
    #[error("{0}")]
    Failed(String),
}

/// A natively implemented contract
pub trait PrecompiledContract: Send + Sync {
    /// Gas charged for running on `input`
    fn gas_for_data(&self, input: &[u8]) -> u64;

    /// Run on `input`, returning the output bytes
    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError>;
}

/// Per-word linear fee used by the hashing and copy precompiles
pub(crate) fn linear_cost(base: u64, per_word: u64, len: usize) -> u64 {
    base.saturating_add(per_word.saturating_mul((len as u64).div_ceil(32)))
}

/// Registry of precompiled contracts keyed by address
#[derive(Clone, Default)]
pub struct PrecompileSet {
    contracts: BTreeMap<Address, Arc<dyn PrecompiledContract>>,
}

impl PrecompileSet {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// 0x01-0x04: ecrecover, sha256, ripemd160, identity
    pub fn frontier() -> Self {
        let mut set = Self::new();
        set.insert(Address::from_low_u64_be(1), Arc::new(EcRecover));
        set.insert(Address::from_low_u64_be(2), Arc::new(Sha256));
        set.insert(Address::from_low_u64_be(3), Arc::new(Ripemd160));
        set.insert(Address::from_low_u64_be(4), Arc::new(Identity));
        set
    }

    /// Frontier set plus 0x05 modexp
    pub fn byzantium() -> Self {
        let mut set = Self::frontier();
        set.insert(Address::from_low_u64_be(5), Arc::new(ModExp));
        set
    }

    /// Register a contract, replacing any previous one at `address`
    pub fn insert(&mut self, address: Address, contract: Arc<dyn PrecompiledContract>) {
        self.contracts.insert(address, contract);
    }

    /// Contract registered at `address`
    pub fn get(&self, address: &Address) -> Option<&dyn PrecompiledContract> {
        self.contracts.get(address).map(|c| c.as_ref())
    }

    /// Check if `address` is a precompile
    pub fn contains(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Registered addresses in ascending order
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.contracts.keys()
    }

    /// Number of registered contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl fmt::Debug for PrecompileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.contracts.keys()).finish()
    }
}

/// Copy `len` bytes of `input` starting at `offset`, zero-filling past the end
pub(crate) fn padded(input: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if offset < input.len() {
        let available = (input.len() - offset).min(len);
        out[..available].copy_from_slice(&input[offset..offset + available]);
    }
    out
}
