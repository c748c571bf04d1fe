//! Nested state overlay

use crate::changes::ChangeSet;
use crate::repository::{AccountState, Repository};
use bytes::Bytes;
use weave_primitives::{Address, H256, U256};

/// Layered state with fallback to the parent repository.
///
/// Reads check the buffered changes first, then the parent. Writes stay in
/// the overlay until [`commit`](Repository::commit) applies them to the parent.
/// Dropping an overlay without committing discards its writes.
pub struct TrackedRepository<'p> {
    parent: &'p mut dyn Repository,
    changes: ChangeSet,
    /// Parent storage is the transaction's original storage
    transaction_root: bool,
}

impl<'p> TrackedRepository<'p> {
    /// Create an overlay over `parent`
    pub fn new(parent: &'p mut dyn Repository) -> Self {
        Self {
            parent,
            changes: ChangeSet::new(),
            transaction_root: false,
        }
    }

    /// Create the outermost overlay of a transaction over `parent`
    pub fn transaction(parent: &'p mut dyn Repository) -> Self {
        Self {
            transaction_root: true,
            ..Self::new(parent)
        }
    }

    /// Changes buffered so far
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    fn load(&self, address: &Address) -> Option<AccountState> {
        match self.changes.account(address) {
            Some(cached) => cached.clone(),
            None if self.parent.exists(address) => Some(AccountState {
                nonce: self.parent.get_nonce(address),
                balance: self.parent.get_balance(address),
                code: self.parent.get_code(address),
            }),
            None => None,
        }
    }

    fn update(&mut self, address: &Address, f: impl FnOnce(&mut AccountState)) {
        let mut account = self.load(address).unwrap_or_default();
        f(&mut account);
        self.changes.set_account(*address, Some(account));
    }
}

impl Repository for TrackedRepository<'_> {
    fn exists(&self, address: &Address) -> bool {
        match self.changes.account(address) {
            Some(cached) => cached.is_some(),
            None => self.parent.exists(address),
        }
    }

    fn create_account(&mut self, address: &Address) {
        self.changes.wipe(*address);
        self.changes.set_account(*address, Some(AccountState::default()));
    }

    fn delete(&mut self, address: &Address) {
        self.changes.wipe(*address);
        self.changes.set_account(*address, None);
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        match self.changes.account(address) {
            Some(cached) => cached.as_ref().map_or(0, |a| a.nonce),
            None => self.parent.get_nonce(address),
        }
    }

    fn set_nonce(&mut self, address: &Address, nonce: u64) {
        self.update(address, |a| a.nonce = nonce);
    }

    fn get_balance(&self, address: &Address) -> U256 {
        match self.changes.account(address) {
            Some(cached) => cached.as_ref().map_or_else(U256::zero, |a| a.balance),
            None => self.parent.get_balance(address),
        }
    }

    fn set_balance(&mut self, address: &Address, balance: U256) {
        self.update(address, |a| a.balance = balance);
    }

    fn get_code(&self, address: &Address) -> Bytes {
        match self.changes.account(address) {
            Some(cached) => cached.as_ref().map(|a| a.code.clone()).unwrap_or_default(),
            None => self.parent.get_code(address),
        }
    }

    fn save_code(&mut self, address: &Address, code: Bytes) {
        self.update(address, |a| a.code = code);
    }

    fn get_storage_row(&self, address: &Address, key: &H256) -> H256 {
        if let Some(value) = self.changes.storage(address, key) {
            return value;
        }
        if self.changes.is_wiped(address) {
            return H256::ZERO;
        }
        self.parent.get_storage_row(address, key)
    }

    fn put_storage_row(&mut self, address: &Address, key: H256, value: H256) {
        self.changes.set_storage(*address, key, value);
    }

    fn get_original_storage_row(&self, address: &Address, key: &H256) -> H256 {
        if self.transaction_root {
            return self.parent.get_storage_row(address, key);
        }
        self.parent.get_original_storage_row(address, key)
    }

    fn start_tracking(&mut self) -> Box<dyn Repository + '_> {
        Box::new(TrackedRepository::new(self))
    }

    fn start_transaction(&mut self) -> Box<dyn Repository + '_> {
        Box::new(TrackedRepository::transaction(self))
    }

    fn commit(&mut self) {
        let changes = std::mem::take(&mut self.changes);
        tracing::trace!(
            accounts = changes.account_count(),
            slots = changes.storage_count(),
            "overlay committed"
        );
        self.parent.apply(changes);
    }

    fn rollback(&mut self) {
        tracing::trace!(
            accounts = self.changes.account_count(),
            slots = self.changes.storage_count(),
            "overlay rolled back"
        );
        self.changes = ChangeSet::new();
    }

    fn apply(&mut self, changes: ChangeSet) {
        self.changes.merge(changes);
    }
}
