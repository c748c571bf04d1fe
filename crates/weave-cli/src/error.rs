//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid numeric quantity
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Assembly text did not parse
    #[error("Assembly error: {0}")]
    Asm(#[from] weave_evm::asm::AsmError),

    /// Fork name without a preset
    #[error("Unknown fork '{name}', expected one of: {known}")]
    UnknownFork {
        /// Requested name
        name: String,
        /// Available presets
        known: String,
    },

    /// Chain spec file did not parse
    #[error("Chain spec error: {0}")]
    ChainSpec(String),

    /// Genesis file did not parse
    #[error("Genesis error: {0}")]
    Genesis(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
