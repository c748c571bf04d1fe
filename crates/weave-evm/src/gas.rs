//! Fee schedule and gas arithmetic

use crate::error::{EvmError, EvmResult};
use crate::word::Word;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Largest memory size (in bytes) an instruction may request
pub const MAX_MEMORY_SIZE: u64 = i32::MAX as u64;

/// Static fee tier of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// STOP, RETURN, REVERT, INVALID
    Zero,
    /// Environment and block queries
    Base,
    /// Simple arithmetic, stack and memory access
    VeryLow,
    /// Multiplication and division
    Low,
    /// ADDMOD, MULMOD, JUMP
    Mid,
    /// JUMPI
    High,
    /// BLOCKHASH
    Ext,
    /// JUMPDEST, and opcodes whose fee is computed entirely by the interpreter
    Special,
}

/// Per-effect gas constants.
///
/// Field defaults are the Byzantium values, which Constantinople keeps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct FeeSchedule {
    pub zero: u64,
    pub base: u64,
    pub very_low: u64,
    pub low: u64,
    pub mid: u64,
    pub high: u64,
    pub ext: u64,
    pub special: u64,

    pub balance: u64,
    pub sha3: u64,
    pub sha3_word: u64,
    pub sload: u64,
    pub stop: u64,
    pub suicide: u64,
    pub new_acct_suicide: u64,
    pub suicide_refund: u64,

    pub set_sstore: u64,
    pub reset_sstore: u64,
    pub clear_sstore: u64,
    pub refund_sstore: u64,
    pub reuse_sstore: u64,

    pub create: u64,
    pub create_data: u64,
    pub call: u64,
    pub stipend_call: u64,
    pub vt_call: u64,
    pub new_acct_call: u64,

    pub memory: u64,
    pub copy: u64,
    pub quad_coeff_div: u64,

    pub log: u64,
    pub log_topic: u64,
    pub log_data: u64,
    pub exp: u64,
    pub exp_byte: u64,

    pub ext_code_size: u64,
    pub ext_code_copy: u64,
    pub ext_code_hash: u64,
    pub blockhash: u64,

    pub tx: u64,
    pub tx_create_contract: u64,
    pub tx_zero_data: u64,
    pub tx_no_zero_data: u64,
}

impl FeeSchedule {
    /// Fees after EIP-150 (Tangerine Whistle through Constantinople)
    pub const fn byzantium() -> Self {
        Self {
            zero: 0,
            base: 2,
            very_low: 3,
            low: 5,
            mid: 8,
            high: 10,
            ext: 20,
            special: 1,

            balance: 400,
            sha3: 30,
            sha3_word: 6,
            sload: 200,
            stop: 0,
            suicide: 5000,
            new_acct_suicide: 25000,
            suicide_refund: 24000,

            set_sstore: 20000,
            reset_sstore: 5000,
            clear_sstore: 5000,
            refund_sstore: 15000,
            reuse_sstore: 200,

            create: 32000,
            create_data: 200,
            call: 700,
            stipend_call: 2300,
            vt_call: 9000,
            new_acct_call: 25000,

            memory: 3,
            copy: 3,
            quad_coeff_div: 512,

            log: 375,
            log_topic: 375,
            log_data: 8,
            exp: 10,
            exp_byte: 50,

            ext_code_size: 700,
            ext_code_copy: 700,
            ext_code_hash: 400,
            blockhash: 20,

            tx: 21000,
            tx_create_contract: 53000,
            tx_zero_data: 4,
            tx_no_zero_data: 68,
        }
    }

    /// Fees before EIP-150 (Frontier and Homestead)
    pub const fn homestead() -> Self {
        let mut fees = Self::byzantium();
        fees.balance = 20;
        fees.sload = 50;
        fees.call = 40;
        fees.suicide = 0;
        fees.new_acct_suicide = 0;
        fees.ext_code_size = 20;
        fees.ext_code_copy = 20;
        fees.exp_byte = 10;
        fees
    }

    /// Cost of a static tier
    pub fn tier_cost(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Zero => self.zero,
            Tier::Base => self.base,
            Tier::VeryLow => self.very_low,
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
            Tier::Ext => self.ext,
            Tier::Special => self.special,
        }
    }

    /// Total memory fee for `words` words: linear term plus quadratic term
    pub fn memory_cost(&self, words: u64) -> u64 {
        self.memory * words + words * words / self.quad_coeff_div
    }

    /// Fee for growing memory from `old_size` bytes to cover `needed` bytes,
    /// plus the per-word fee for copying `copy_size` bytes
    pub fn memory_gas(&self, old_size: usize, needed: u64, copy_size: u64) -> u64 {
        let mut gas = 0;
        let new_size = needed.div_ceil(32) * 32;
        if new_size > old_size as u64 {
            gas += self.memory_cost(new_size / 32) - self.memory_cost(old_size as u64 / 32);
        }
        gas + self.copy_cost(copy_size)
    }

    /// Per-word copy fee
    pub fn copy_cost(&self, size: u64) -> u64 {
        self.copy * size.div_ceil(32)
    }

    /// EXP fee for the given exponent
    pub fn exp_cost(&self, exponent: Word) -> u64 {
        self.exp + self.exp_byte * exponent.bytes_occupied() as u64
    }

    /// Intrinsic transaction fee
    pub fn intrinsic_gas(&self, data: &[u8], is_create: bool) -> u64 {
        let base = if is_create {
            self.tx_create_contract
        } else {
            self.tx
        };
        data.iter().fold(base, |gas, byte| {
            gas + if *byte == 0 {
                self.tx_zero_data
            } else {
                self.tx_no_zero_data
            }
        })
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::byzantium()
    }
}

/// Highest byte touched by an access of `size` bytes at `offset`, zero when `size` is zero
pub fn mem_needed(offset: Word, size: Word) -> EvmResult<u64> {
    if size.is_zero() {
        return Ok(0);
    }
    let end = offset
        .as_u256()
        .checked_add(size.as_u256())
        .ok_or(EvmError::GasOverflow)?;
    if end > U256::from(MAX_MEMORY_SIZE) {
        return Err(EvmError::GasOverflow);
    }
    Ok(end.low_u64())
}

/// Gas that may be forwarded out of `gas` under EIP-150
pub fn all_but_one_64th(gas: u64) -> u64 {
    gas - gas / 64
}
