//! 256-bit VM word
//!
//! Every value on the stack, in storage slots and in call arguments is a
//! [`Word`]. Arithmetic wraps modulo 2^256; signed operations read the same
//! bits as two's complement.

use primitive_types::{U256, U512};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use weave_primitives::{Address, H256};

/// Errors raised by word operations that have a restricted domain
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WordError {
    /// Sign byte index outside 0..=31
    #[error("sign byte index out of range: {0}")]
    SignByteOutOfRange(usize),
}

/// Immutable 256-bit word
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word(U256);

#[allow(clippy::should_implement_trait)]
impl Word {
    /// Word size in bytes
    pub const LEN: usize = 32;
    /// Zero
    pub const ZERO: Word = Word(U256([0, 0, 0, 0]));
    /// One
    pub const ONE: Word = Word(U256([1, 0, 0, 0]));
    /// All bits set
    pub const MAX: Word = Word(U256::MAX);

    /// Build a word from big-endian bytes.
    ///
    /// Shorter input is zero-padded on the left; longer input keeps its low 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let tail = if bytes.len() > Self::LEN {
            &bytes[bytes.len() - Self::LEN..]
        } else {
            bytes
        };
        Word(U256::from_big_endian(tail))
    }

    /// Big-endian bytes
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    /// Underlying unsigned integer
    pub fn as_u256(self) -> U256 {
        self.0
    }

    /// Low 20 bytes as an address
    pub fn to_address(self) -> Address {
        let bytes = self.to_be_bytes();
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes[12..]);
        Address::from_bytes(out)
    }

    /// Word as a 32-byte hash
    pub fn to_h256(self) -> H256 {
        H256::from_bytes(self.to_be_bytes())
    }

    /// Check if zero
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Check the sign bit
    pub fn is_negative(self) -> bool {
        self.0.bit(255)
    }

    /// Number of significant bits
    pub fn bit_length(self) -> usize {
        self.0.bits()
    }

    /// Number of significant bytes
    pub fn bytes_occupied(self) -> usize {
        self.0.bits().div_ceil(8)
    }

    // ==================== Narrowing ====================

    /// Convert to `u32`, `None` if the value does not fit
    pub fn to_u32_strict(self) -> Option<u32> {
        if self.0 > U256::from(u32::MAX) {
            None
        } else {
            Some(self.0.low_u32())
        }
    }

    /// Convert to `u64`, `None` if the value does not fit
    pub fn to_u64_strict(self) -> Option<u64> {
        if self.0 > U256::from(u64::MAX) {
            None
        } else {
            Some(self.0.low_u64())
        }
    }

    /// Convert to `u32`, saturating at `u32::MAX`
    pub fn to_u32_saturating(self) -> u32 {
        self.to_u32_strict().unwrap_or(u32::MAX)
    }

    /// Convert to `u64`, saturating at `u64::MAX`
    pub fn to_u64_saturating(self) -> u64 {
        self.to_u64_strict().unwrap_or(u64::MAX)
    }

    /// Convert to `usize`, saturating at `usize::MAX`
    pub fn to_usize_saturating(self) -> usize {
        usize::try_from(self.to_u64_saturating()).unwrap_or(usize::MAX)
    }

    // ==================== Arithmetic ====================

    /// Wrapping addition
    pub fn add(self, other: Word) -> Word {
        Word(self.0.overflowing_add(other.0).0)
    }

    /// Wrapping subtraction
    pub fn sub(self, other: Word) -> Word {
        Word(self.0.overflowing_sub(other.0).0)
    }

    /// Wrapping multiplication
    pub fn mul(self, other: Word) -> Word {
        Word(self.0.overflowing_mul(other.0).0)
    }

    /// Unsigned division, zero when dividing by zero
    pub fn div(self, other: Word) -> Word {
        if other.is_zero() {
            return Word::ZERO;
        }
        Word(self.0 / other.0)
    }

    /// Unsigned remainder, zero when dividing by zero
    pub fn rem(self, other: Word) -> Word {
        if other.is_zero() {
            return Word::ZERO;
        }
        Word(self.0 % other.0)
    }

    /// Signed division truncating toward zero, zero when dividing by zero
    pub fn sdiv(self, other: Word) -> Word {
        if other.is_zero() {
            return Word::ZERO;
        }
        let quotient = Word(self.abs().0 / other.abs().0);
        if self.is_negative() != other.is_negative() {
            quotient.negate()
        } else {
            quotient
        }
    }

    /// Signed remainder taking the dividend's sign, zero when dividing by zero
    pub fn smod(self, other: Word) -> Word {
        if other.is_zero() {
            return Word::ZERO;
        }
        let remainder = Word(self.abs().0 % other.abs().0);
        if self.is_negative() {
            remainder.negate()
        } else {
            remainder
        }
    }

    /// `self ^ exponent` modulo 2^256
    pub fn exp(self, exponent: Word) -> Word {
        Word(self.0.overflowing_pow(exponent.0).0)
    }

    /// `(self + other) % modulus` without intermediate overflow
    pub fn addmod(self, other: Word, modulus: Word) -> Word {
        if modulus.is_zero() {
            return Word::ZERO;
        }
        let sum = U512::from(self.0) + U512::from(other.0);
        Word(U256::try_from(sum % U512::from(modulus.0)).unwrap_or_default())
    }

    /// `(self * other) % modulus` without intermediate overflow
    pub fn mulmod(self, other: Word, modulus: Word) -> Word {
        if modulus.is_zero() {
            return Word::ZERO;
        }
        let product = U512::from(self.0) * U512::from(other.0);
        Word(U256::try_from(product % U512::from(modulus.0)).unwrap_or_default())
    }

    /// Two's complement negation
    pub fn negate(self) -> Word {
        Word((!self.0).overflowing_add(U256::one()).0)
    }

    fn abs(self) -> Word {
        if self.is_negative() {
            self.negate()
        } else {
            self
        }
    }

    /// Replicate the sign bit of byte `k` (0 = least significant) into the higher bytes
    pub fn sign_extend(self, k: usize) -> Result<Word, WordError> {
        if k > 31 {
            return Err(WordError::SignByteOutOfRange(k));
        }
        if k == 31 {
            return Ok(self);
        }
        let sign_bit = k * 8 + 7;
        let mask = (U256::one() << (sign_bit + 1)) - U256::one();
        if self.0.bit(sign_bit) {
            Ok(Word(self.0 | !mask))
        } else {
            Ok(Word(self.0 & mask))
        }
    }

    // ==================== Bitwise ====================

    /// Bitwise AND
    pub fn and(self, other: Word) -> Word {
        Word(self.0 & other.0)
    }

    /// Bitwise OR
    pub fn or(self, other: Word) -> Word {
        Word(self.0 | other.0)
    }

    /// Bitwise XOR
    pub fn xor(self, other: Word) -> Word {
        Word(self.0 ^ other.0)
    }

    /// Bitwise NOT
    pub fn bnot(self) -> Word {
        Word(!self.0)
    }

    /// Byte `index` counted from the most significant end, zero past 31
    pub fn byte(self, index: Word) -> Word {
        match index.to_u32_strict() {
            Some(i) if i < 32 => Word::from(self.to_be_bytes()[i as usize] as u64),
            _ => Word::ZERO,
        }
    }

    /// Logical shift left by `shift` bits
    pub fn shl(self, shift: Word) -> Word {
        match shift.to_u32_strict() {
            Some(s) if s < 256 => Word(self.0 << s as usize),
            _ => Word::ZERO,
        }
    }

    /// Logical shift right by `shift` bits
    pub fn shr(self, shift: Word) -> Word {
        match shift.to_u32_strict() {
            Some(s) if s < 256 => Word(self.0 >> s as usize),
            _ => Word::ZERO,
        }
    }

    /// Arithmetic shift right by `shift` bits
    pub fn sar(self, shift: Word) -> Word {
        let negative = self.is_negative();
        match shift.to_u32_strict() {
            Some(0) => self,
            Some(s) if s < 256 => {
                let shifted = self.0 >> s as usize;
                if negative {
                    Word(shifted | (U256::MAX << (256 - s as usize)))
                } else {
                    Word(shifted)
                }
            }
            _ if negative => Word::MAX,
            _ => Word::ZERO,
        }
    }

    // ==================== Comparison ====================

    /// Unsigned less-than
    pub fn lt(self, other: Word) -> bool {
        self.0 < other.0
    }

    /// Unsigned greater-than
    pub fn gt(self, other: Word) -> bool {
        self.0 > other.0
    }

    /// Signed less-than
    pub fn slt(self, other: Word) -> bool {
        self.signed_cmp(other) == Ordering::Less
    }

    /// Signed greater-than
    pub fn sgt(self, other: Word) -> bool {
        self.signed_cmp(other) == Ordering::Greater
    }

    /// Equality
    pub fn eq(self, other: Word) -> bool {
        self == other
    }

    /// Compare as two's complement values
    pub fn signed_cmp(self, other: Word) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.0.cmp(&other.0),
        }
    }
}

impl From<U256> for Word {
    fn from(value: U256) -> Self {
        Word(value)
    }
}

impl From<Word> for U256 {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Word(U256::from(value))
    }
}

impl From<usize> for Word {
    fn from(value: usize) -> Self {
        Word(U256::from(value))
    }
}

impl From<bool> for Word {
    fn from(value: bool) -> Self {
        if value {
            Word::ONE
        } else {
            Word::ZERO
        }
    }
}

impl From<Address> for Word {
    fn from(address: Address) -> Self {
        Word::from_bytes(address.as_bytes())
    }
}

impl From<H256> for Word {
    fn from(hash: H256) -> Self {
        Word::from_bytes(hash.as_bytes())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#x})", self.0)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
