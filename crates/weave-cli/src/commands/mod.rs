//! Sub-command implementations

pub mod asm;
pub mod disasm;
pub mod run;

use crate::error::CliError;
use bytes::Bytes;
use weave_primitives::{Address, U256};

/// Decode `0x`-optional hex, ignoring surrounding whitespace
pub fn parse_hex(s: &str) -> Result<Bytes, CliError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| CliError::InvalidHex(format!("{s}: {e}")))
}

/// Parse a decimal or `0x` hex quantity
pub fn parse_u256(s: &str) -> Result<U256, CliError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some("") => Ok(U256::zero()),
        Some(digits) => U256::from_str_radix(digits, 16).map_err(|e| format!("{e:?}")),
        None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
    };
    parsed.map_err(|e| CliError::InvalidQuantity(format!("{s}: {e}")))
}

/// Parse a 20-byte hex address
pub fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s.trim()).map_err(|e| CliError::InvalidAddress(format!("{s}: {e}")))
}
