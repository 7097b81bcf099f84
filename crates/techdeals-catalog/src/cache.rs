//! Bounded memo for point lookups by title.

use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use techdeals_core::Product;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    file: String,
    title: String,
}

/// Least-recently-used cache of title lookups, keyed by source file and the
/// trimmed title of the matched product.
///
/// Entries live until evicted or [`LookupCache::clear`] is called; they are
/// not invalidated when files change on disk. A capacity of 0 disables
/// caching entirely.
///
/// Recency is the map's insertion order, so every hit and insert shifts the
/// map and costs O(capacity) under the lock. Sized for the default of a few
/// thousand entries at most.
#[derive(Debug)]
pub struct LookupCache {
    capacity: usize,
    entries: Mutex<IndexMap<CacheKey, Product>>,
}

impl LookupCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached product and marks it most recently used.
    #[must_use]
    pub fn get(&self, file: &str, title: &str) -> Option<Product> {
        if self.capacity == 0 {
            return None;
        }
        let key = CacheKey {
            file: file.to_string(),
            title: title.trim().to_string(),
        };
        let mut entries = self.lock();
        let product = entries.shift_remove(&key)?;
        entries.insert(key, product.clone());
        Some(product)
    }

    /// Stores a lookup result, evicting the least recently used entries
    /// beyond capacity.
    pub fn insert(&self, file: &str, title: &str, product: Product) {
        if self.capacity == 0 {
            return;
        }
        let key = CacheKey {
            file: file.to_string(),
            title: title.trim().to_string(),
        };
        let mut entries = self.lock();
        entries.shift_remove(&key);
        entries.insert(key, product);
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<CacheKey, Product>> {
        // A panic mid-insert leaves the map structurally valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
