//! Transaction rejection errors

use thiserror::Error;
use weave_primitives::U256;

/// Reasons a transaction is rejected before any state changes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Nonce mismatch
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// Sender's current nonce
        expected: u64,
        /// Transaction nonce
        got: u64,
    },

    /// Gas limit below the intrinsic cost
    #[error("intrinsic gas too low: required {required}, limit {limit}")]
    IntrinsicGas {
        /// Intrinsic cost
        required: u64,
        /// Transaction gas limit
        limit: u64,
    },

    /// Sender cannot pay for gas and value
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// `gas_limit * gas_price + value`
        required: U256,
        /// Sender balance
        available: U256,
    },

    /// `gas_limit * gas_price + value` does not fit in 256 bits
    #[error("transaction cost overflows")]
    CostOverflow,

    /// Block gas limit exceeded
    #[error("block gas limit exceeded: {used} > {limit}")]
    BlockGasLimitExceeded {
        /// Gas the batch would reserve
        used: u64,
        /// Block gas limit
        limit: u64,
    },
}

/// Result type for transaction execution
pub type ExecutorResult<T> = Result<T, ExecutorError>;
