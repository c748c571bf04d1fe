//! Block, transaction and call environment of a frame

use crate::word::Word;
use bytes::Bytes;
use std::collections::HashMap;
use weave_primitives::{Address, H256, U256};

/// Number of recent blocks visible to BLOCKHASH
pub const BLOCKHASH_WINDOW: u64 = 256;

/// Block header fields visible to contracts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// Block beneficiary
    pub coinbase: Address,
    /// Block timestamp (seconds)
    pub timestamp: u64,
    /// Block number
    pub number: u64,
    /// Block difficulty
    pub difficulty: U256,
    /// Block gas limit
    pub gas_limit: u64,
    /// Chain identifier
    pub chain_id: u64,
}

/// Transaction-wide values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxContext {
    /// Externally owned account that signed the transaction
    pub origin: Address,
    /// Price per unit of gas
    pub gas_price: U256,
}

/// Everything a frame can read that does not come from state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    /// Current block
    pub block: BlockContext,
    /// Current transaction
    pub tx: TxContext,
}

/// Source of historical block hashes
pub trait BlockHashOracle {
    /// Hash of block `number`, if known
    fn block_hash(&self, number: u64) -> Option<H256>;
}

impl BlockHashOracle for HashMap<u64, H256> {
    fn block_hash(&self, number: u64) -> Option<H256> {
        self.get(&number).copied()
    }
}

impl BlockContext {
    /// Hash of block `requested` as seen from this block, zero outside the window
    pub fn block_hash(&self, oracle: Option<&dyn BlockHashOracle>, requested: Word) -> H256 {
        let Some(requested) = requested.to_u64_strict() else {
            return H256::ZERO;
        };
        let lowest = self.number.max(BLOCKHASH_WINDOW) - BLOCKHASH_WINDOW;
        if requested < lowest || requested >= self.number {
            return H256::ZERO;
        }
        oracle
            .and_then(|o| o.block_hash(requested))
            .unwrap_or(H256::ZERO)
    }
}

/// Per-frame call parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Account whose storage and balance the frame acts on
    pub address: Address,
    /// Immediate caller
    pub caller: Address,
    /// Value transferred (or inherited, for DELEGATECALL)
    pub value: U256,
    /// Input data
    pub data: Bytes,
    /// Gas available to the frame
    pub gas: u64,
    /// State modification forbidden
    pub is_static: bool,
    /// Call depth, 0 for the transaction's own frame
    pub depth: usize,
}

impl CallContext {
    /// Top-level context calling `address` from `caller`
    pub fn new(address: Address, caller: Address, value: U256, data: Bytes, gas: u64) -> Self {
        Self {
            address,
            caller,
            value,
            data,
            gas,
            is_static: false,
            depth: 0,
        }
    }

    /// 32 bytes of calldata at `offset`, zero-filled past the end
    pub fn data_word(&self, offset: Word) -> Word {
        let Some(offset) = offset.to_u64_strict() else {
            return Word::ZERO;
        };
        let offset = offset as usize;
        let mut buf = [0u8; 32];
        if offset < self.data.len() {
            let len = (self.data.len() - offset).min(32);
            buf[..len].copy_from_slice(&self.data[offset..offset + len]);
        }
        Word::from_bytes(&buf)
    }
}
