//! `disasm`: bytecode to mnemonics

use super::parse_hex;
use crate::error::CliError;
use crate::output::Output;
use clap::Args;
use serde_json::json;
use weave_evm::asm::{disassemble, disassemble_lines};

/// Disassemble hex bytecode
#[derive(Debug, Args)]
pub struct DisasmCommand {
    /// Bytecode as hex, `0x` optional
    pub code: String,

    /// One instruction per line, prefixed with its offset
    #[arg(long)]
    pub lines: bool,
}

impl DisasmCommand {
    /// Execute the command
    pub fn execute(&self, json: bool) -> Result<(), CliError> {
        let code = parse_hex(&self.code)?;
        let lines = disassemble_lines(&code);

        let message = if self.lines {
            lines
                .iter()
                .map(|line| format!("{:>6}: {}", line.offset, line))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            disassemble(&code)
        };

        let rows = lines
            .iter()
            .map(|line| {
                json!({
                    "offset": line.offset,
                    "mnemonic": line.mnemonic,
                    "immediate": line.immediate,
                })
            })
            .collect();

        Output::new(json)
            .field("text", &disassemble(&code))
            .field_value("instructions", serde_json::Value::Array(rows))
            .message(message)
            .print();
        Ok(())
    }
}
