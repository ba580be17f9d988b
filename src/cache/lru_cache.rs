use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use super::CacheKey;
use super::CachedEntry;
use super::EntryCache;
use crate::path;
use crate::UserName;

/// Bounded LRU of directory entries shared between lookups and watchers.
pub struct LruEntryCache {
    inner: Mutex<LruCache<CacheKey, CachedEntry>>,
}

impl LruEntryCache {
    /// A zero `capacity` is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        LruEntryCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn insert(
        &self,
        key: CacheKey,
        value: CachedEntry,
    ) {
        self.inner.lock().put(key, value);
    }

    pub fn remove(
        &self,
        key: &CacheKey,
    ) -> Option<CachedEntry> {
        self.inner.lock().pop(key)
    }

    pub fn contains(
        &self,
        key: &CacheKey,
    ) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl EntryCache for LruEntryCache {
    fn get(
        &self,
        key: &CacheKey,
    ) -> Option<CachedEntry> {
        self.inner.lock().get(key).cloned()
    }

    fn wipe(
        &self,
        user: &UserName,
    ) {
        let mut lru = self.inner.lock();
        let doomed: Vec<CacheKey> = lru
            .iter()
            .filter(|(key, _)| {
                path::parse(&key.name)
                    .map(|p| p.user() == user)
                    .unwrap_or(false)
            })
            .map(|(key, _)| key.clone())
            .collect();
        trace!(%user, count = doomed.len(), "wiping cached entries");
        for key in doomed {
            lru.pop(&key);
        }
    }
}
