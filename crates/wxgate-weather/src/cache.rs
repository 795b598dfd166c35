//! In-memory cache with per-entry expiry.
//!
//! Expired entries are removed lazily, on the read that finds them stale.
//! There is no size bound and no background sweep.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct CacheEntry<T> {
    value: T,
    /// `None` when `now + ttl` is past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now <= expires_at)
    }
}

/// String-keyed TTL cache. Callers own key namespacing.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Fetch a live entry; a stale one is evicted and reported as absent.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub fn set_at(&self, key: impl Into<String>, value: T, ttl: Duration, now: Instant) {
        let expires_at = now.checked_add(ttl);
        self.entries
            .lock()
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<T> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                tracing::trace!(key, "evicted expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}
