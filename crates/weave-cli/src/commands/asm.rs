//! `asm`: mnemonics to bytecode

use crate::error::CliError;
use crate::output::Output;
use clap::Args;
use weave_evm::asm::assemble;

/// Assemble mnemonic text into hex bytecode
#[derive(Debug, Args)]
pub struct AsmCommand {
    /// Whitespace-separated mnemonics, e.g. "PUSH1 0x01 PUSH1 0x02 ADD"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

impl AsmCommand {
    /// Execute the command
    pub fn execute(&self, json: bool) -> Result<(), CliError> {
        let code = assemble(&self.text.join(" "))?;
        let encoded = format!("0x{}", hex::encode(&code));
        Output::new(json)
            .field("code", &encoded)
            .field_u64("size", code.len() as u64)
            .message(encoded)
            .print();
        Ok(())
    }
}
