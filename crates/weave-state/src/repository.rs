//! Repository trait and account record

use crate::changes::ChangeSet;
use bytes::Bytes;
use weave_crypto::keccak256;
use weave_primitives::{Address, H256, U256};

/// Account data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: U256,
    /// Contract code (empty for externally owned accounts)
    pub code: Bytes,
}

impl AccountState {
    /// Account holding only a balance
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Check if account is empty (no nonce, no balance, no code)
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code.is_empty()
    }
}

/// State access used by the VM.
///
/// All reads and writes of accounts and contract storage go through this
/// trait. Implementations form a chain: [`start_tracking`](Repository::start_tracking)
/// returns an overlay that borrows its parent exclusively until it is
/// committed or dropped.
pub trait Repository {
    /// Check if an account exists
    fn exists(&self, address: &Address) -> bool;

    /// Create a fresh account, clearing any previous nonce, code, balance and storage
    fn create_account(&mut self, address: &Address);

    /// Remove an account together with its storage
    fn delete(&mut self, address: &Address);

    /// Get account nonce (zero for missing accounts)
    fn get_nonce(&self, address: &Address) -> u64;

    /// Set account nonce
    fn set_nonce(&mut self, address: &Address, nonce: u64);

    /// Get account balance (zero for missing accounts)
    fn get_balance(&self, address: &Address) -> U256;

    /// Set account balance
    fn set_balance(&mut self, address: &Address, balance: U256);

    /// Get contract code (empty for missing accounts)
    fn get_code(&self, address: &Address) -> Bytes;

    /// Store contract code
    fn save_code(&mut self, address: &Address, code: Bytes);

    /// Read a storage slot (zero when unset)
    fn get_storage_row(&self, address: &Address, key: &H256) -> H256;

    /// Write a storage slot; writing zero clears it
    fn put_storage_row(&mut self, address: &Address, key: H256, value: H256);

    /// Open a nested overlay on top of this repository
    fn start_tracking(&mut self) -> Box<dyn Repository + '_>;

    /// Open the overlay of one transaction.
    ///
    /// Storage values seen through this repository at this point are the
    /// original values for every frame nested inside the returned overlay.
    fn start_transaction(&mut self) -> Box<dyn Repository + '_>;

    /// Fold this overlay's changes into its parent
    fn commit(&mut self);

    /// Discard this overlay's changes
    fn rollback(&mut self);

    /// Apply a child overlay's changes
    fn apply(&mut self, changes: ChangeSet);

    /// Storage slot value as of the start of the enclosing transaction
    fn get_original_storage_row(&self, address: &Address, key: &H256) -> H256 {
        self.get_storage_row(address, key)
    }

    /// Increment nonce, returning the new value
    fn increase_nonce(&mut self, address: &Address) -> u64 {
        let nonce = self.get_nonce(address).saturating_add(1);
        self.set_nonce(address, nonce);
        nonce
    }

    /// Add to balance, returning the new balance
    fn add_balance(&mut self, address: &Address, amount: U256) -> U256 {
        let balance = self.get_balance(address).saturating_add(amount);
        self.set_balance(address, balance);
        balance
    }

    /// Subtract from balance; returns false and leaves state untouched on underflow
    fn sub_balance(&mut self, address: &Address, amount: U256) -> bool {
        match self.get_balance(address).checked_sub(amount) {
            Some(balance) => {
                self.set_balance(address, balance);
                true
            }
            None => false,
        }
    }

    /// Move `amount` from `from` to `to`; false when `from` cannot cover it
    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> bool {
        if !self.sub_balance(from, amount) {
            return false;
        }
        self.add_balance(to, amount);
        true
    }

    /// Code hash: zero for missing accounts, keccak of the (possibly empty) code otherwise
    fn get_code_hash(&self, address: &Address) -> H256 {
        if !self.exists(address) {
            return H256::ZERO;
        }
        keccak256(&self.get_code(address))
    }

    /// An account at `address` already holds code or has a nonzero nonce
    fn is_contract_exist(&self, address: &Address) -> bool {
        self.get_nonce(address) != 0 || !self.get_code(address).is_empty()
    }

    /// Missing, or present with zero nonce, zero balance and no code
    fn is_dead(&self, address: &Address) -> bool {
        !self.exists(address)
            || (self.get_nonce(address) == 0
                && self.get_balance(address).is_zero()
                && self.get_code(address).is_empty())
    }
}
