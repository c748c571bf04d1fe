//! Jump destination analysis

use crate::opcode::Opcode;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use weave_crypto::keccak256;
use weave_primitives::H256;

/// Valid `JUMPDEST` offsets of one code blob
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpTable {
    dests: Vec<bool>,
}

impl JumpTable {
    /// Scan `code` once, skipping PUSH immediates
    pub fn analyze(code: &[u8]) -> Self {
        let mut dests = vec![false; code.len()];
        let mut pc = 0;
        while pc < code.len() {
            let byte = code[pc];
            if byte == Opcode::JUMPDEST as u8 {
                dests[pc] = true;
            }
            pc += 1 + Opcode::immediate_size(byte);
        }
        Self { dests }
    }

    /// Check whether `pc` is a valid jump target
    pub fn is_valid(&self, pc: usize) -> bool {
        self.dests.get(pc).copied().unwrap_or(false)
    }

    /// Number of valid destinations
    pub fn count(&self) -> usize {
        self.dests.iter().filter(|d| **d).count()
    }
}

/// Tables kept by [`JumpDestCache::new`]
pub const DEFAULT_JUMP_CACHE_CAPACITY: usize = 4096;

/// Jump tables shared across frames and transactions, keyed by code hash.
///
/// Holds at most `capacity` tables; the least recently used one is dropped
/// to make room.
#[derive(Clone)]
pub struct JumpDestCache {
    tables: Arc<Mutex<LruCache<H256, Arc<JumpTable>>>>,
}

impl JumpDestCache {
    /// Create an empty cache holding [`DEFAULT_JUMP_CACHE_CAPACITY`] tables
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_JUMP_CACHE_CAPACITY)
    }

    /// Create an empty cache holding at most `capacity` tables (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tables: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Cached table for `code`, analyzing it on first sight
    pub fn get_or_analyze(&self, code: &Bytes) -> Arc<JumpTable> {
        let hash = keccak256(code);
        if let Some(table) = self.tables.lock().get(&hash) {
            return table.clone();
        }
        let table = Arc::new(JumpTable::analyze(code));
        self.tables.lock().get_or_insert(hash, || table).clone()
    }

    /// Check whether the table for `code` is cached, without touching its recency
    pub fn contains(&self, code: &[u8]) -> bool {
        self.tables.lock().contains(&keccak256(code))
    }

    /// Number of cached blobs
    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }

    /// Maximum number of cached blobs
    pub fn capacity(&self) -> usize {
        self.tables.lock().cap().get()
    }
}

impl Default for JumpDestCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JumpDestCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.lock();
        f.debug_struct("JumpDestCache")
            .field("len", &tables.len())
            .field("capacity", &tables.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jumpdest_found() {
        // PUSH1 0x04 JUMP INVALID JUMPDEST
        let table = JumpTable::analyze(&[0x60, 0x04, 0x56, 0xfe, 0x5b]);
        assert!(table.is_valid(4));
        assert!(!table.is_valid(3));
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn test_push_data_skipped() {
        // PUSH2 0x5b5b JUMPDEST
        let table = JumpTable::analyze(&[0x61, 0x5b, 0x5b, 0x5b]);
        assert!(!table.is_valid(1));
        assert!(!table.is_valid(2));
        assert!(table.is_valid(3));
    }

    #[test]
    fn test_truncated_push() {
        // PUSH32 with only two immediate bytes
        let table = JumpTable::analyze(&[0x7f, 0x5b, 0x5b]);
        assert_eq!(table.count(), 0);
        assert!(!table.is_valid(100));
    }

    #[test]
    fn test_cache_shares_tables() {
        let cache = JumpDestCache::new();
        let code = Bytes::from_static(&[0x5b, 0x00]);
        let a = cache.get_or_analyze(&code);
        let b = cache.clone().get_or_analyze(&code);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = JumpDestCache::with_capacity(2);
        let a = Bytes::from_static(&[0x5b]);
        let b = Bytes::from_static(&[0x5b, 0x00]);
        let c = Bytes::from_static(&[0x00, 0x5b]);

        cache.get_or_analyze(&a);
        cache.get_or_analyze(&b);
        // Reading `a` makes `b` the oldest entry
        cache.get_or_analyze(&a);
        let table = cache.get_or_analyze(&c);
        assert!(table.is_valid(1));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_cache_capacity_floor() {
        assert_eq!(JumpDestCache::with_capacity(0).capacity(), 1);
        assert_eq!(JumpDestCache::new().capacity(), DEFAULT_JUMP_CACHE_CAPACITY);
    }
}
