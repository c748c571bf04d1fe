//! # weave-evm-tests
//!
//! Runs `ethereum/tests` VMTests fixtures against the Weave interpreter.
//!
//! Each fixture seeds an [`weave_state::InMemoryRepository`] from its `pre`
//! section, executes `exec.code` in a depth-0 frame and compares remaining
//! gas, output, logs hash and post-state storage. A fixture without `post`
//! expects the frame to fault.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod runner;
mod types;

pub use error::{TestError, TestResult};
pub use runner::{TestRunner, TestStats};
pub use types::*;
pub use vm_test::{logs_hash, FixtureBlockHashes, VmTestResults, VmTestRunner};
