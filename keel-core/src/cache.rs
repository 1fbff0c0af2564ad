use crate::Result;
use dashmap::DashMap;
use std::{
    fmt::{self, Debug},
    hash::Hash,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

struct Entry<V> {
    value: Arc<V>,
    sequence: u64,
}

/// Concurrent map whose values are computed at most once and then shared.
///
/// Hits only touch the `DashMap` shard of the key. Misses are serialized by a
/// single lock: the key is checked again under the lock, computed, then
/// published, so no two divergent values are ever published for a key.
///
/// With a capacity, inserting into a full cache evicts the oldest entry; a
/// later request for it computes an equivalent value again.
pub struct PublishCache<K: Eq + Hash, V> {
    entries: DashMap<K, Entry<V>>,
    miss: Mutex<()>,
    capacity: Option<usize>,
    sequence: AtomicU64,
}

impl<K: Eq + Hash + Clone, V> PublishCache<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: DashMap::new(),
            miss: Mutex::new(()),
            capacity: capacity.map(|v| v.max(1)),
            sequence: AtomicU64::new(0),
        }
    }
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }
    /// Return the published value for `key`, computing it with `compute` on a miss.
    ///
    /// `compute` runs while holding the miss lock, it must not call back
    /// into this same cache.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let _guard = self.miss.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.get(&key) {
            return value;
        }
        self.publish(key, compute())
    }
    /// Like [`PublishCache::get_or_insert_with`], a failed computation publishes nothing.
    pub fn get_or_try_insert_with<F>(&self, key: K, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let _guard = self.miss.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        Ok(self.publish(key, compute()?))
    }
    fn publish(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            Entry {
                value: value.clone(),
                sequence,
            },
        );
        value
    }
    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().sequence)
            .map(|entry| entry.key().clone());
        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                log::debug!("Evicted the oldest cache entry");
                true
            }
            None => false,
        }
    }
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<K: Eq + Hash + Clone, V> Default for PublishCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> Debug for PublishCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
