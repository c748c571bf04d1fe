//! # weave-evm
//!
//! Metered bytecode interpreter for Weave smart contracts.
//!
//! This crate provides:
//! - 256-bit [`Word`] arithmetic, [`Stack`] and [`Memory`]
//! - Jump-destination analysis with a shared [`JumpDestCache`]
//! - The [`Program`] frame and the [`Evm`] interpreter, including nested
//!   call/create dispatch over [`weave_state::Repository`] overlays
//! - Fork rules ([`ChainSpec`], [`FeeSchedule`]) and precompiled contracts
//! - A text form for bytecode ([`asm`])

#![warn(missing_docs)]
#![warn(clippy::all)]

mod analysis;
pub mod asm;
mod chain_spec;
mod context;
mod dispatch;
mod error;
mod gas;
mod interpreter;
mod memory;
mod opcode;
pub mod precompiles;
mod program;
mod result;
mod stack;
mod word;

pub use analysis::{JumpDestCache, JumpTable, DEFAULT_JUMP_CACHE_CAPACITY};
pub use chain_spec::{ChainSpec, MAX_CALL_DEPTH, MAX_CODE_SIZE};
pub use context::{
    BlockContext, BlockHashOracle, CallContext, Environment, TxContext, BLOCKHASH_WINDOW,
};
pub use dispatch::{contract_address, create2_address};
pub use error::{EvmError, EvmResult};
pub use gas::{all_but_one_64th, mem_needed, FeeSchedule, Tier, MAX_MEMORY_SIZE};
pub use interpreter::Evm;
pub use memory::Memory;
pub use opcode::Opcode;
pub use precompiles::{PrecompileError, PrecompileSet, PrecompiledContract};
pub use program::Program;
pub use result::{CallType, ExecutionResult, InternalTransaction, Log};
pub use stack::{Stack, STACK_LIMIT};
pub use word::{Word, WordError};
