//! VM fault types

use crate::precompiles::PrecompileError;
use crate::word::Word;
use thiserror::Error;
use weave_primitives::Address;

/// Faults that abort the current frame.
///
/// A faulted frame forfeits its remaining gas and pending refund. REVERT is
/// not a fault; it is reported through [`ExecutionResult::is_revert`](crate::ExecutionResult::is_revert).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Memory size beyond the addressable bound
    #[error("gas overflow: memory size out of range")]
    GasOverflow,

    /// Stack underflow
    #[error("stack underflow: {required} required, {size} present")]
    StackUnderflow {
        /// Items the instruction needs
        required: usize,
        /// Items on the stack
        size: usize,
    },

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Undefined or fork-disabled opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// Jump target is not a JUMPDEST
    #[error("bad jump destination: {0}")]
    BadJumpDestination(Word),

    /// State modification inside a static call
    #[error("state modification in static call")]
    StaticCallModification,

    /// Call depth limit reached
    #[error("call depth exceeded (max 1024)")]
    CallDepthExceeded,

    /// Sender cannot cover the transferred value
    #[error("insufficient balance")]
    InsufficientBalance,

    /// RETURNDATACOPY past the end of the return buffer
    #[error("return data out of bounds: {offset} + {size} > {available}")]
    ReturnDataOutOfBounds {
        /// Requested offset
        offset: Word,
        /// Requested size
        size: Word,
        /// Buffer length
        available: usize,
    },

    /// Contract already present at the derived address
    #[error("contract address collision: {0}")]
    CreateCollision(Address),

    /// Deployed code exceeds the size limit
    #[error("contract size {size} exceeds limit {limit}")]
    CodeSizeExceeded {
        /// Returned code length
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Not enough gas left to pay for storing deployed code
    #[error("not enough gas to deposit code: {required} required")]
    DepositOutOfGas {
        /// Deposit cost
        required: u64,
    },

    /// Precompiled contract failure
    #[error("precompile failed: {0}")]
    Precompile(#[from] PrecompileError),
}

/// Result type for VM operations
pub type EvmResult<T> = Result<T, EvmError>;
