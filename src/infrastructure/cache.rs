//! Expiring in-memory cache
//!
//! Key-value store with a per-instance TTL and lazy expiry: a stale entry is
//! removed on the `get` that observes it, not by a background scan. There is
//! no capacity bound; growth is proportional to the distinct keys seen
//! within one TTL window, and the upstream source remains the durable truth.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent TTL cache. Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct ExpiringCache<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ExpiringCache<V> {
    /// Create a cache whose entries expire `ttl` after each `set`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Look up a key, treating an expired entry as absent.
    ///
    /// An entry judged expired is removed before returning. The removal
    /// re-checks expiry under the write lock, so a concurrent fresh `set`
    /// for the same key is never discarded, and racing removals of the same
    /// stale entry are harmless no-ops.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            None => return None,
            Some(entry) => {
                if Instant::now() < entry.expires_at {
                    return Some(entry.value.clone());
                }
            }
        }
        self.entries
            .remove_if(key, |_, entry| Instant::now() >= entry.expires_at);
        None
    }

    /// Insert or overwrite a value, resetting its expiry from now.
    pub fn set(&self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
