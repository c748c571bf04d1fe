//! Account address type (20 bytes)

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// 20-byte account address.
///
/// Inside the VM an address travels as a 32-byte word; only the low 20 bytes
/// are significant, see [`Address::from_word`] and [`Address::to_word`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != Self::LEN {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Address whose low 8 bytes hold `value` big-endian (precompile slots, test fixtures)
    pub fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// Take the low 20 bytes of a 32-byte big-endian word
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Address(bytes)
    }

    /// Left-pad to a 32-byte big-endian word
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

    impl Encodable for Address {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.0);
        }
    }

    impl Decodable for Address {
        fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
            rlp.decoder().decode_value(|bytes| {
                Address::from_slice(bytes).map_err(|_| DecoderError::RlpInvalidLength)
            })
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Parsing ====================

    #[test]
    fn test_address_from_hex_with_and_without_prefix() {
        let a = Address::from_hex("0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826").unwrap();
        let b = Address::from_hex("cd2a3d9f938e13cd947ec05abc7fe734df8dd826").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826");
    }

    #[test]
    fn test_address_from_hex_mixed_case() {
        let lower = Address::from_hex("0x0f572e5295c57f15886f9b263e2f6d2d6c7b5ec6").unwrap();
        let upper = Address::from_hex("0x0F572E5295C57F15886F9B263E2F6D2D6C7B5EC6").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_address_from_hex_rejects_bad_input() {
        assert!(matches!(
            Address::from_hex("0xzz572e5295c57f15886f9b263e2f6d2d6c7b5ec6"),
            Err(AddressError::InvalidHex(_))
        ));
        assert_eq!(Address::from_hex("0x"), Err(AddressError::InvalidLength(0)));
        assert_eq!(
            Address::from_hex("0x0f572e5295c57f15886f9b263e2f6d2d6c7b5e"),
            Err(AddressError::InvalidLength(19))
        );
    }

    #[test]
    fn test_address_from_str() {
        let addr: Address = "0x0000000000000000000000000000000000000004".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64_be(4));
    }

    // ==================== Word conversions ====================

    #[test]
    fn test_address_word_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn test_address_from_word_drops_high_bytes() {
        let mut word = [0xffu8; 32];
        word[31] = 0x01;
        let addr = Address::from_word(&word);
        assert_eq!(addr.as_bytes()[19], 0x01);
        assert_eq!(addr.as_bytes()[0], 0xff);
    }

    #[test]
    fn test_address_from_low_u64() {
        let addr = Address::from_low_u64_be(0x0102);
        assert_eq!(addr.as_bytes()[18], 0x01);
        assert_eq!(addr.as_bytes()[19], 0x02);
        assert!(Address::from_low_u64_be(0).is_zero());
    }

    // ==================== Formatting ====================

    #[test]
    fn test_address_debug_and_display() {
        let addr = Address::from_low_u64_be(1);
        assert_eq!(
            format!("{}", addr),
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(
            format!("{:?}", addr),
            "Address(0x0000000000000000000000000000000000000001)"
        );
    }

    #[cfg(feature = "rlp")]
    #[test]
    fn test_address_rlp_encoding() {
        let addr = Address::from_bytes([0x11; 20]);
        let encoded = rlp::encode(&addr);
        assert_eq!(encoded.len(), 21);
        assert_eq!(encoded[0], 0x80 + 20);
        let decoded: Address = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, addr);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_address_serde_hex() {
        let addr = Address::from_low_u64_be(0xbeef);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x000000000000000000000000000000000000beef\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
