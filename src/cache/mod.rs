//! Bounded least-recently-used caching for expensive per-year computations.
//!
//! [`LruCache`] is a generic fixed-capacity cache; recency is tracked by
//! entry order in an [`IndexMap`], with the least-recently-used entry at
//! index zero. [`memoize`] wraps a pure function in a private cache.

use std::hash::Hash;

use indexmap::IndexMap;

/// Default capacity for per-date lookup caches.
pub const DATE_CACHE_CAPACITY: usize = 512;
/// Default capacity for per-year holiday resolution caches.
pub const HOLIDAY_CACHE_CAPACITY: usize = 64;

/// A fixed-capacity cache evicting the least-recently-used entry when full.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is treated as one; a cache that can hold nothing
    /// would turn every `get` into a miss.
    pub fn new(capacity: usize) -> Self {
        LruCache {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Pre-configured cache for per-date lookups.
    pub fn date_cache() -> Self {
        Self::new(DATE_CACHE_CAPACITY)
    }

    /// Pre-configured cache for per-year holiday resolutions.
    pub fn holiday_cache() -> Self {
        Self::new(HOLIDAY_CACHE_CAPACITY)
    }

    /// The maximum number of entries the cache will hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `key` is present, without refreshing its recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Fetch a value and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        // re-insertion moves the entry to the back, the most recent slot
        let value = self.entries.shift_remove(key)?;
        self.entries.insert(key.clone(), value);
        self.entries.get(key)
    }

    /// Insert a value, evicting the least-recently-used entry at capacity.
    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    /// Remove an entry, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only the entries for which `pred` returns true.
    ///
    /// Used for targeted invalidation, e.g. dropping every cached year of a
    /// single locale when one of its rules changes.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut pred: F) {
        self.entries.retain(|k, v| pred(k, v));
    }
}

/// Wrap a pure function so repeated calls with an equal argument return a
/// cached clone of the first result.
///
/// The wrapper owns an [`LruCache`] of the given capacity, so memory stays
/// bounded however many distinct keys are seen.
pub fn memoize<K, V, F>(capacity: usize, mut f: F) -> impl FnMut(K) -> V
where
    K: Hash + Eq + Clone,
    V: Clone,
    F: FnMut(&K) -> V,
{
    let mut cache: LruCache<K, V> = LruCache::new(capacity);
    move |key: K| {
        if let Some(value) = cache.get(&key) {
            return value.clone();
        }
        let value = f(&key);
        cache.insert(key, value.clone());
        value
    }
}
