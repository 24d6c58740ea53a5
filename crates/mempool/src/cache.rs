//! Bounded FIFO set of recently seen transactions.
//!
//! Duplicate admission is rejected in O(1) against this cache. Eviction is
//! insertion-order, not access-order: an admitted tx is either live in the
//! pool or already committed, and re-seeing a recently committed tx must
//! still read as a duplicate. A fixed window bounds that protection.

use crate::transaction::Tx;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

/// Thread-safe seen-cache. The map is the source of truth for membership;
/// the list only records insertion order for eviction.
pub struct TxCache {
    size: usize,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    map: HashSet<Tx>,
    list: VecDeque<Tx>,
}

impl TxCache {
    /// Create a cache holding at most `size` entries.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            inner: Mutex::new(CacheInner {
                map: HashSet::with_capacity(size),
                list: VecDeque::new(),
            }),
        }
    }

    /// Whether the tx is present.
    pub fn exists(&self, tx: &Tx) -> bool {
        self.inner.lock().map.contains(tx)
    }

    /// Insert the tx. Returns false if it is already present (no reordering).
    /// At capacity, the oldest-inserted entry is evicted first.
    pub fn push(&self, tx: Tx) -> bool {
        let mut inner = self.inner.lock();

        if inner.map.contains(&tx) {
            return false;
        }

        // The capacity test is against the list: `remove` leaves stale list
        // entries behind, and eviction is where they get reaped.
        if inner.list.len() >= self.size {
            if let Some(oldest) = inner.list.pop_front() {
                // The oldest entry may already be gone from the map; removing
                // an absent key is a no-op.
                inner.map.remove(&oldest);
            }
        }

        inner.map.insert(tx.clone());
        inner.list.push_back(tx);
        true
    }

    /// Remove the tx from the map if present. The insertion-order list is not
    /// updated; its stale entry is reaped lazily at the next eviction.
    pub fn remove(&self, tx: &Tx) {
        self.inner.lock().map.remove(tx);
    }

    /// Drop all state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn tx(data: &[u8]) -> Tx {
        Bytes::copy_from_slice(data)
    }

    #[test]
    fn test_push_and_exists() {
        let cache = TxCache::new(10);

        assert!(!cache.exists(&tx(b"a")));
        assert!(cache.push(tx(b"a")));
        assert!(cache.exists(&tx(b"a")));
    }

    #[test]
    fn test_push_duplicate_returns_false() {
        let cache = TxCache::new(10);

        assert!(cache.push(tx(b"a")));
        assert!(!cache.push(tx(b"a")));
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let cache = TxCache::new(2);

        assert!(cache.push(tx(b"a")));
        assert!(cache.push(tx(b"b")));
        assert!(cache.push(tx(b"c")));

        assert!(!cache.exists(&tx(b"a")));
        assert!(cache.exists(&tx(b"b")));
        assert!(cache.exists(&tx(b"c")));
    }

    #[test]
    fn test_remove_keeps_list_entry_until_eviction() {
        let cache = TxCache::new(2);

        cache.push(tx(b"a"));
        cache.push(tx(b"b"));
        cache.remove(&tx(b"a"));
        assert!(!cache.exists(&tx(b"a")));

        // The list still holds two entries, so this push evicts the stale
        // "a" slot rather than "b".
        cache.push(tx(b"c"));
        assert!(cache.exists(&tx(b"b")));
        assert!(cache.exists(&tx(b"c")));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let cache = TxCache::new(2);

        cache.push(tx(b"a"));
        cache.remove(&tx(b"a"));
        cache.remove(&tx(b"a"));
        assert!(!cache.exists(&tx(b"a")));
    }

    #[test]
    fn test_reset_drops_everything() {
        let cache = TxCache::new(4);

        cache.push(tx(b"a"));
        cache.push(tx(b"b"));
        cache.reset();

        assert!(!cache.exists(&tx(b"a")));
        assert!(!cache.exists(&tx(b"b")));
        assert!(cache.push(tx(b"a")));
    }
}
