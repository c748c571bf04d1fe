//! # weave-state
//!
//! Account and contract-storage access for the VM.
//!
//! - [`Repository`]: the state boundary the interpreter talks to
//! - [`InMemoryRepository`]: root store backed by hash maps
//! - [`TrackedRepository`]: nested overlay opened by [`Repository::start_tracking`];
//!   its writes reach the parent only on [`Repository::commit`]

#![warn(missing_docs)]
#![warn(clippy::all)]

mod changes;
mod memory;
mod repository;
mod tracked;

pub use changes::ChangeSet;
pub use memory::InMemoryRepository;
pub use repository::{AccountState, Repository};
pub use tracked::TrackedRepository;
