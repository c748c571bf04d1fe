//! # weave-vm
//!
//! Command-line tools for the Weave contract VM.
//!
//! ## Usage
//!
//! ```bash
//! # Disassemble bytecode
//! weave-vm disasm 0x6001600201
//!
//! # Assemble mnemonics
//! weave-vm asm PUSH1 1 PUSH1 2 ADD
//!
//! # Run bytecode
//! weave-vm run 0x600260030160005260206000f3 --gas 100000
//! weave-vm run 0x60005460005260206000f3 --genesis genesis.json --fork byzantium
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod error;
mod genesis;
mod output;

pub use error::CliError;
pub use output::Output;

/// Weave VM tools
#[derive(Parser, Debug)]
#[command(name = "weave-vm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Disassemble hex bytecode
    Disasm(commands::disasm::DisasmCommand),
    /// Assemble mnemonics into bytecode
    Asm(commands::asm::AsmCommand),
    /// Execute bytecode in a single frame
    Run(commands::run::RunCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    let result = match &cli.command {
        Commands::Disasm(cmd) => cmd.execute(cli.json),
        Commands::Asm(cmd) => cmd.execute(cli.json),
        Commands::Run(cmd) => cmd.execute(cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
    Ok(())
}
