//! Genesis allocation loading

use crate::commands::{parse_address, parse_hex, parse_u256};
use crate::error::CliError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use weave_primitives::H256;
use weave_state::{AccountState, InMemoryRepository, Repository};

/// Genesis file: `{"alloc": {address: account}}`
#[derive(Debug, Default, Deserialize)]
pub struct GenesisConfig {
    /// Initial accounts
    #[serde(default)]
    pub alloc: BTreeMap<String, GenesisAccount>,
}

/// One allocated account; quantities are decimal or `0x` hex
#[derive(Debug, Default, Deserialize)]
pub struct GenesisAccount {
    /// Balance
    #[serde(default)]
    pub balance: String,
    /// Nonce
    #[serde(default)]
    pub nonce: u64,
    /// Code as hex
    #[serde(default)]
    pub code: Option<String>,
    /// Storage slot to value, both hex
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

impl GenesisConfig {
    /// Read and parse a genesis file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        tracing::info!(path = %path.display(), "loading genesis");
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CliError::Genesis(e.to_string()))
    }

    /// Build the root state
    pub fn into_repository(self) -> Result<InMemoryRepository, CliError> {
        let mut repo = InMemoryRepository::new();
        for (key, account) in self.alloc {
            let address = parse_address(&key)?;
            let balance = if account.balance.trim().is_empty() {
                Default::default()
            } else {
                parse_u256(&account.balance)?
            };
            let code = match &account.code {
                Some(code) => parse_hex(code)?,
                None => Default::default(),
            };
            repo.insert_account(
                address,
                AccountState {
                    nonce: account.nonce,
                    balance,
                    code,
                },
            );
            for (slot, value) in &account.storage {
                repo.put_storage_row(&address, word(slot)?, word(value)?);
            }
            tracing::debug!(%address, %balance, nonce = account.nonce, "genesis allocation");
        }
        Ok(repo)
    }
}

fn word(s: &str) -> Result<H256, CliError> {
    let mut bytes = [0u8; 32];
    parse_u256(s)?.to_big_endian(&mut bytes);
    Ok(H256::from_bytes(bytes))
}
