//! Pending state changes of one overlay

use crate::repository::AccountState;
use std::collections::{HashMap, HashSet};
use weave_primitives::{Address, H256};

/// Writes buffered by a [`TrackedRepository`](crate::TrackedRepository).
///
/// Applied in three passes: storage wipes, account records, storage slots.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    /// Account records (None = deleted)
    accounts: HashMap<Address, Option<AccountState>>,
    /// Accounts whose storage is cleared before `storage` is applied
    wiped: HashSet<Address>,
    /// Storage slot writes
    storage: HashMap<(Address, H256), H256>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.wiped.is_empty() && self.storage.is_empty()
    }

    /// Number of touched account records
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of buffered storage writes
    pub fn storage_count(&self) -> usize {
        self.storage.len()
    }

    pub(crate) fn account(&self, address: &Address) -> Option<&Option<AccountState>> {
        self.accounts.get(address)
    }

    pub(crate) fn storage(&self, address: &Address, key: &H256) -> Option<H256> {
        self.storage.get(&(*address, *key)).copied()
    }

    pub(crate) fn is_wiped(&self, address: &Address) -> bool {
        self.wiped.contains(address)
    }

    pub(crate) fn set_account(&mut self, address: Address, account: Option<AccountState>) {
        self.accounts.insert(address, account);
    }

    pub(crate) fn set_storage(&mut self, address: Address, key: H256, value: H256) {
        self.storage.insert((address, key), value);
    }

    /// Drop buffered slots of `address` and mark its stored slots for clearing
    pub(crate) fn wipe(&mut self, address: Address) {
        self.storage.retain(|(owner, _), _| *owner != address);
        self.wiped.insert(address);
    }

    /// Fold a child's changes into this set
    pub(crate) fn merge(&mut self, child: ChangeSet) {
        for address in child.wiped {
            self.wipe(address);
        }
        self.accounts.extend(child.accounts);
        self.storage.extend(child.storage);
    }

    /// Split into `(wiped, accounts, storage)` for a root store
    pub(crate) fn into_parts(
        self,
    ) -> (
        HashSet<Address>,
        HashMap<Address, Option<AccountState>>,
        HashMap<(Address, H256), H256>,
    ) {
        (self.wiped, self.accounts, self.storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wipe_drops_buffered_slots() {
        let a = Address::from_low_u64_be(1);
        let b = Address::from_low_u64_be(2);
        let mut changes = ChangeSet::new();
        changes.set_storage(a, H256::from_low_u64_be(1), H256::from_low_u64_be(7));
        changes.set_storage(b, H256::from_low_u64_be(1), H256::from_low_u64_be(8));

        changes.wipe(a);

        assert!(changes.is_wiped(&a));
        assert_eq!(changes.storage(&a, &H256::from_low_u64_be(1)), None);
        assert_eq!(
            changes.storage(&b, &H256::from_low_u64_be(1)),
            Some(H256::from_low_u64_be(8))
        );
    }

    #[test]
    fn test_merge_applies_child_wipe_before_child_writes() {
        let a = Address::from_low_u64_be(1);
        let slot = H256::from_low_u64_be(3);

        let mut parent = ChangeSet::new();
        parent.set_storage(a, slot, H256::from_low_u64_be(1));

        let mut child = ChangeSet::new();
        child.wipe(a);
        child.set_storage(a, H256::from_low_u64_be(4), H256::from_low_u64_be(9));

        parent.merge(child);

        assert_eq!(parent.storage(&a, &slot), None);
        assert_eq!(
            parent.storage(&a, &H256::from_low_u64_be(4)),
            Some(H256::from_low_u64_be(9))
        );
        assert_eq!(parent.storage_count(), 1);
    }
}
