//! # weave-core
//!
//! Transaction execution for Weave.
//!
//! This crate wraps the interpreter in the per-transaction rules:
//! - Nonce, intrinsic gas and balance validation
//! - Gas purchase, value transfer and the top-level call or create
//! - Refund capping, coinbase payment and self-destruct cleanup
//! - Receipts, and batches of transactions under a block gas limit

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod executor;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::{
    BatchResult, Transaction, TransactionExecutor, TransactionReceipt, TxStatus,
};
