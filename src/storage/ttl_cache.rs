use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what the clock can represent.
    expires_at: Option<Instant>,
}

/// In-memory key/value store whose entries expire `ttl` after they were last
/// set. Expired entries are dropped lazily on lookup; there is no size bound
/// and no background sweeper.
///
/// Every operation takes the same lock, so the cache can be shared across
/// tasks. Nothing is atomic across calls: two callers that both miss will both
/// compute and `set`.
pub struct TtlCache<K, V> {
    store: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut store = self.lock();
        let expired = match store.get(key) {
            None => return None,
            Some(entry) => entry.expires_at.is_some_and(|at| Instant::now() > at),
        };
        if expired {
            store.remove(key);
            return None;
        }
        store.get(key).map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites, restarting the expiry window.
    pub fn set(&self, key: K, value: V) {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.lock().insert(key, CacheEntry { value, expires_at });
    }

    pub fn delete(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Entries currently held, including expired ones not yet looked up.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
