// ── Generic keyed collection ──
//
// Lock-free concurrent storage with O(1) lookups by primary key and by
// one secondary index.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

/// A lock-free collection for one registry record type.
///
/// `K` is the secondary index type (e.g. `(domain, platform, unique_id)`
/// for entities). Every record has exactly one index value; re-upserting
/// a key with a different index value drops the stale mapping.
pub(crate) struct Collection<K, T>
where
    K: Eq + Hash + Clone,
{
    /// Primary storage: key string -> record.
    by_key: DashMap<String, Arc<T>>,

    /// Secondary index -> key string.
    index_to_key: DashMap<K, String>,

    /// Reverse of `index_to_key` for efficient removal.
    key_to_index: DashMap<String, K>,
}

impl<K, T> Collection<K, T>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            index_to_key: DashMap::new(),
            key_to_index: DashMap::new(),
        }
    }

    /// Insert or update a record. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, index: K, record: T) -> bool {
        if let Some((_, old_index)) = self.key_to_index.remove(&key) {
            if old_index != index {
                self.index_to_key.remove(&old_index);
            }
        }

        let is_new = self.by_key.insert(key.clone(), Arc::new(record)).is_none();
        self.index_to_key.insert(index.clone(), key.clone());
        self.key_to_index.insert(key, index);
        is_new
    }

    /// Remove a record by key. Returns the removed record if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            if let Some((_, index)) = self.key_to_index.remove(key) {
                self.index_to_key.remove(&index);
            }
        }
        removed
    }

    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Primary key for a secondary index value.
    pub(crate) fn key_for(&self, index: &K) -> Option<String> {
        self.index_to_key.get(index).map(|r| r.value().clone())
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// All records, in no particular order.
    pub(crate) fn values(&self) -> Vec<Arc<T>> {
        self.by_key.iter().map(|r| Arc::clone(r.value())).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
