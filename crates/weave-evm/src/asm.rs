//! Human-readable bytecode notation
//!
//! Instructions are whitespace-separated mnemonics. A PUSH is followed by its
//! immediate as a `0x` hex literal; bytes without an opcode render as
//! `INVALID_0xNN`. [`assemble`] accepts the same text, decimal immediates, and
//! a width-less `PUSH` that picks the smallest width holding its operand.

use crate::opcode::Opcode;
use std::fmt;
use thiserror::Error;
use weave_primitives::U256;

/// Assembly parsing failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// Token is not a known mnemonic
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    /// PUSH at the end of the input
    #[error("{0} expects an immediate")]
    MissingImmediate(String),

    /// Immediate is neither decimal nor 0x-hex
    #[error("invalid immediate: {0}")]
    InvalidImmediate(String),

    /// Immediate needs more bytes than the PUSH width
    #[error("immediate {value} does not fit in {width} bytes")]
    ImmediateTooLarge {
        /// Offending literal
        value: String,
        /// PUSH width
        width: usize,
    },
}

/// Result type for assembly
pub type AsmResult<T> = Result<T, AsmError>;

/// One decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmLine {
    /// Byte offset in the code
    pub offset: usize,
    /// Mnemonic, `INVALID_0xNN` for undefined bytes
    pub mnemonic: String,
    /// PUSH immediate as 0x-hex, possibly shorter than the width at the end of code
    pub immediate: Option<String>,
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.immediate {
            Some(immediate) => write!(f, "{} {}", self.mnemonic, immediate),
            None => f.write_str(&self.mnemonic),
        }
    }
}

/// Decode `code` into one row per instruction
pub fn disassemble_lines(code: &[u8]) -> Vec<AsmLine> {
    let mut lines = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let byte = code[pc];
        let mnemonic = match Opcode::from_byte(byte) {
            Some(op) => op.name().to_string(),
            None => format!("INVALID_0x{byte:02x}"),
        };
        let width = Opcode::immediate_size(byte);
        let end = (pc + 1 + width).min(code.len());
        let immediate = (width > 0 && end > pc + 1)
            .then(|| format!("0x{}", hex::encode(&code[pc + 1..end])));
        lines.push(AsmLine {
            offset: pc,
            mnemonic,
            immediate,
        });
        pc += 1 + width;
    }
    lines
}

/// Render `code` as a single line of mnemonics
pub fn disassemble(code: &[u8]) -> String {
    disassemble_lines(code)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the text form back into bytecode
pub fn assemble(text: &str) -> AsmResult<Vec<u8>> {
    let mut code = Vec::new();
    let mut tokens = text.split_whitespace();
    while let Some(token) = tokens.next() {
        let upper = token.to_ascii_uppercase();
        if let Some(byte) = upper.strip_prefix("INVALID_0X") {
            let byte = u8::from_str_radix(byte, 16)
                .map_err(|_| AsmError::UnknownMnemonic(token.to_string()))?;
            code.push(byte);
            continue;
        }

        if upper == "PUSH" {
            let literal = tokens
                .next()
                .ok_or_else(|| AsmError::MissingImmediate(token.to_string()))?;
            let value = parse_immediate(literal)?;
            let op = Opcode::push(value.len())
                .ok_or_else(|| AsmError::InvalidImmediate(literal.to_string()))?;
            code.push(op as u8);
            code.extend_from_slice(&value);
            continue;
        }

        let op = Opcode::from_name(&upper)
            .ok_or_else(|| AsmError::UnknownMnemonic(token.to_string()))?;
        code.push(op as u8);

        let width = op.push_size();
        if width > 0 {
            let literal = tokens
                .next()
                .ok_or_else(|| AsmError::MissingImmediate(token.to_string()))?;
            let value = parse_immediate(literal)?;
            if value.len() > width {
                return Err(AsmError::ImmediateTooLarge {
                    value: literal.to_string(),
                    width,
                });
            }
            code.resize(code.len() + width - value.len(), 0);
            code.extend_from_slice(&value);
        }
    }
    Ok(code)
}

/// Minimal big-endian bytes of a literal, at least one byte
fn parse_immediate(literal: &str) -> AsmResult<Vec<u8>> {
    let invalid = || AsmError::InvalidImmediate(literal.to_string());
    let bytes = match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(digits) if !digits.is_empty() => {
            let digits = if digits.len() % 2 == 1 {
                format!("0{digits}")
            } else {
                digits.to_string()
            };
            hex::decode(digits).map_err(|_| invalid())?
        }
        Some(_) => return Err(invalid()),
        None => {
            let value = U256::from_dec_str(literal).map_err(|_| invalid())?;
            let mut buf = [0u8; 32];
            value.to_big_endian(&mut buf);
            buf.to_vec()
        }
    };

    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len().saturating_sub(1));
    let trimmed = bytes[first..].to_vec();
    if trimmed.len() > 32 {
        return Err(invalid());
    }
    Ok(trimmed)
}
