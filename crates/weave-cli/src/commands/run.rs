//! `run`: execute bytecode in a fresh frame

use super::{parse_address, parse_hex, parse_u256};
use crate::error::CliError;
use crate::genesis::GenesisConfig;
use crate::output::Output;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use weave_evm::{BlockContext, CallContext, ChainSpec, Environment, Evm, ExecutionResult, TxContext};
use weave_state::{InMemoryRepository, Repository};

/// Run hex bytecode against an in-memory state
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Bytecode as hex, `0x` optional
    pub code: String,

    /// Gas available to the frame
    #[arg(long, default_value_t = 10_000_000)]
    pub gas: u64,

    /// Calldata as hex
    #[arg(long, default_value = "")]
    pub input: String,

    /// Call value, decimal or 0x hex
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Address the code runs at
    #[arg(long, default_value = "0x00000000000000000000000000000000000c0de0")]
    pub address: String,

    /// Caller and transaction origin
    #[arg(long, default_value = "0x0000000000000000000000000000000000ca11e7")]
    pub caller: String,

    /// JSON chain spec; missing fields fall back to Constantinople
    #[arg(long, conflicts_with = "fork")]
    pub chain_spec: Option<PathBuf>,

    /// Fork preset
    #[arg(long)]
    pub fork: Option<String>,

    /// Genesis allocation loaded before the run
    #[arg(long)]
    pub genesis: Option<PathBuf>,

    /// Block number seen by the code
    #[arg(long, default_value_t = 1)]
    pub block_number: u64,
}

impl RunCommand {
    /// Execute the command
    pub fn execute(&self, json: bool) -> Result<(), CliError> {
        let spec = self.chain_spec()?;
        let code = parse_hex(&self.code)?;
        let address = parse_address(&self.address)?;
        let caller = parse_address(&self.caller)?;

        let mut repo = match &self.genesis {
            Some(path) => GenesisConfig::load(path)?.into_repository()?,
            None => InMemoryRepository::new(),
        };
        let value = parse_u256(&self.value)?;
        let input = parse_hex(&self.input)?;

        let env = Environment {
            block: BlockContext {
                number: self.block_number,
                gas_limit: self.gas,
                ..Default::default()
            },
            tx: TxContext {
                origin: caller,
                gas_price: Default::default(),
            },
        };
        let evm = Evm::new(&spec, &env);
        let ctx = CallContext::new(address, caller, value, input, self.gas);

        repo.save_code(&address, code.clone());
        repo.add_balance(&caller, value);
        let result = {
            let mut track = repo.start_transaction();
            track.transfer(&caller, &address, value);
            let result = evm.execute(code, ctx, &mut *track);
            if result.is_success() {
                track.commit();
            } else {
                track.rollback();
            }
            result
        };

        report(&result, &repo, &address, json);
        Ok(())
    }

    fn chain_spec(&self) -> Result<ChainSpec, CliError> {
        if let Some(path) = &self.chain_spec {
            let content = std::fs::read_to_string(path)?;
            return ChainSpec::from_json_str(&content)
                .map_err(|e| CliError::ChainSpec(format!("{}: {e}", path.display())));
        }
        match &self.fork {
            Some(name) => ChainSpec::by_name(name).ok_or_else(|| CliError::UnknownFork {
                name: name.clone(),
                known: ChainSpec::NAMES.join(", "),
            }),
            None => Ok(ChainSpec::default()),
        }
    }
}

fn status(result: &ExecutionResult) -> String {
    match &result.exception {
        Some(error) => format!("error: {error}"),
        None if result.is_revert() => "revert".to_string(),
        None => "success".to_string(),
    }
}

fn report(
    result: &ExecutionResult,
    repo: &InMemoryRepository,
    address: &weave_primitives::Address,
    json: bool,
) {
    let output = format!("0x{}", hex::encode(&result.output));
    let status = status(result);

    let logs: Vec<_> = result
        .logs
        .iter()
        .map(|log| {
            json!({
                "address": log.address.to_hex(),
                "topics": log.topics.iter().map(|t| format!("0x{}", hex::encode(t.as_bytes()))).collect::<Vec<_>>(),
                "data": format!("0x{}", hex::encode(&log.data)),
            })
        })
        .collect();

    let mut storage: Vec<_> = repo.storage_of(address).into_iter().collect();
    storage.sort();
    let storage_json: serde_json::Map<_, _> = storage
        .iter()
        .map(|(k, v)| {
            (
                format!("0x{}", hex::encode(k.as_bytes())),
                json!(format!("0x{}", hex::encode(v.as_bytes()))),
            )
        })
        .collect();

    let mut message = format!(
        "Status:   {status}\nGas used: {}\nOutput:   {output}",
        result.gas_used
    );
    for (i, log) in logs.iter().enumerate() {
        message.push_str(&format!("\nLog {i}:    {log}"));
    }
    for (key, value) in &storage_json {
        message.push_str(&format!("\nStorage:  {key} = {}", value.as_str().unwrap_or_default()));
    }

    Output::new(json)
        .field("status", &status)
        .field_u64("gas_used", result.gas_used)
        .field_u64("gas_left", result.gas_left())
        .field("output", &output)
        .field_value("logs", serde_json::Value::Array(logs))
        .field_value("storage", serde_json::Value::Object(storage_json))
        .field_u64(
            "internal_transactions",
            result.internal_transactions.len() as u64,
        )
        .message(message)
        .print();
}
