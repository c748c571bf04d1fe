//! Hash-map backed root repository

use crate::changes::ChangeSet;
use crate::repository::{AccountState, Repository};
use crate::tracked::TrackedRepository;
use bytes::Bytes;
use std::collections::HashMap;
use weave_primitives::{Address, H256, U256};

/// Root state store kept entirely in memory.
///
/// Overlays opened on it buffer their writes; [`Repository::commit`] on an
/// overlay lands here through [`Repository::apply`]. Commit and rollback on
/// the root itself are no-ops.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    accounts: HashMap<Address, AccountState>,
    storage: HashMap<Address, HashMap<H256, H256>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account record
    pub fn insert_account(&mut self, address: Address, account: AccountState) {
        self.accounts.insert(address, account);
    }

    /// Get a copy of an account record
    pub fn account(&self, address: &Address) -> Option<AccountState> {
        self.accounts.get(address).cloned()
    }

    /// Non-zero storage slots of an account
    pub fn storage_of(&self, address: &Address) -> HashMap<H256, H256> {
        self.storage.get(address).cloned().unwrap_or_default()
    }

    /// Number of accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn account_mut(&mut self, address: &Address) -> &mut AccountState {
        self.accounts.entry(*address).or_default()
    }
}

impl Repository for InMemoryRepository {
    fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn create_account(&mut self, address: &Address) {
        self.storage.remove(address);
        self.accounts.insert(*address, AccountState::default());
    }

    fn delete(&mut self, address: &Address) {
        self.storage.remove(address);
        self.accounts.remove(address);
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    fn set_nonce(&mut self, address: &Address, nonce: u64) {
        self.account_mut(address).nonce = nonce;
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.accounts
            .get(address)
            .map_or_else(U256::zero, |a| a.balance)
    }

    fn set_balance(&mut self, address: &Address, balance: U256) {
        self.account_mut(address).balance = balance;
    }

    fn get_code(&self, address: &Address) -> Bytes {
        self.accounts
            .get(address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn save_code(&mut self, address: &Address, code: Bytes) {
        self.account_mut(address).code = code;
    }

    fn get_storage_row(&self, address: &Address, key: &H256) -> H256 {
        self.storage
            .get(address)
            .and_then(|slots| slots.get(key))
            .copied()
            .unwrap_or(H256::ZERO)
    }

    fn put_storage_row(&mut self, address: &Address, key: H256, value: H256) {
        if value.is_zero() {
            if let Some(slots) = self.storage.get_mut(address) {
                slots.remove(&key);
                if slots.is_empty() {
                    self.storage.remove(address);
                }
            }
        } else {
            self.storage.entry(*address).or_default().insert(key, value);
        }
    }

    fn start_tracking(&mut self) -> Box<dyn Repository + '_> {
        Box::new(TrackedRepository::new(self))
    }

    fn start_transaction(&mut self) -> Box<dyn Repository + '_> {
        Box::new(TrackedRepository::transaction(self))
    }

    fn commit(&mut self) {}

    fn rollback(&mut self) {}

    fn apply(&mut self, changes: ChangeSet) {
        let (wiped, accounts, storage) = changes.into_parts();
        for address in wiped {
            self.storage.remove(&address);
        }
        for (address, account) in accounts {
            match account {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                    self.storage.remove(&address);
                }
            }
        }
        for ((address, key), value) in storage {
            self.put_storage_row(&address, key, value);
        }
    }
}
