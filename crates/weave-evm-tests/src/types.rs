//! VMTests JSON schema

use bytes::Bytes;
use serde::{de, Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use weave_primitives::{Address, H256, U256};

fn strip_hex(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// `0x`-prefixed byte string, `"0x"` for empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Bytes);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = strip_hex(&s);
        if digits.is_empty() {
            return Ok(HexBytes(Bytes::new()));
        }
        hex::decode(digits)
            .map(|bytes| HexBytes(Bytes::from(bytes)))
            .map_err(de::Error::custom)
    }
}

/// 256-bit quantity: `0x` hex of any length (odd included) or decimal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexU256(pub U256);

impl HexU256 {
    fn parse(s: &str) -> Result<U256, String> {
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some("") => Ok(U256::zero()),
            Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| format!("{e:?}")),
            None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
        }
    }
}

impl<'de> Deserialize<'de> for HexU256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map(HexU256).map_err(de::Error::custom)
    }
}

/// 64-bit quantity in `0x` hex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU64(pub u64);

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let value = HexU256::parse(&s).map_err(de::Error::custom)?;
        if value > U256::from(u64::MAX) {
            return Err(de::Error::custom(format!("{s} does not fit in 64 bits")));
        }
        Ok(HexU64(value.low_u64()))
    }
}

/// File contents: test name to case
pub type VmTestFile = BTreeMap<String, VmTestCase>;

/// One VMTests case
#[derive(Debug, Deserialize)]
pub struct VmTestCase {
    /// Block environment
    pub env: VmEnv,
    /// Frame parameters
    pub exec: VmExec,
    /// Expected remaining gas, absent when the frame must fault
    pub gas: Option<HexU64>,
    /// Expected keccak of the RLP-encoded log list
    pub logs: Option<H256>,
    /// Expected output
    pub out: Option<HexBytes>,
    /// State before execution
    pub pre: HashMap<Address, FixtureAccount>,
    /// State after execution, absent when the frame must fault
    pub post: Option<HashMap<Address, FixtureAccount>>,
}

impl VmTestCase {
    /// Whether the fixture expects a fault
    pub fn expects_failure(&self) -> bool {
        self.post.is_none()
    }
}

/// Block fields of a case
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmEnv {
    /// Block beneficiary
    pub current_coinbase: Address,
    /// Block difficulty
    pub current_difficulty: HexU256,
    /// Block gas limit
    pub current_gas_limit: HexU64,
    /// Block number
    pub current_number: HexU64,
    /// Block timestamp
    pub current_timestamp: HexU64,
}

/// Frame fields of a case
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmExec {
    /// Executing account
    pub address: Address,
    /// Immediate caller
    pub caller: Address,
    /// Code to run
    pub code: HexBytes,
    /// Calldata
    pub data: HexBytes,
    /// Gas for the frame
    pub gas: HexU64,
    /// Gas price
    pub gas_price: HexU256,
    /// Transaction origin
    pub origin: Address,
    /// Call value
    pub value: HexU256,
}

/// Account in a `pre` or `post` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureAccount {
    /// Balance
    pub balance: HexU256,
    /// Code
    pub code: HexBytes,
    /// Nonce
    pub nonce: HexU64,
    /// Storage, zero slots omitted
    pub storage: HashMap<HexU256, HexU256>,
}
