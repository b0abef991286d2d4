//! Generic in-memory memoization cache
//!
//! Entries are keyed by exact equality and live as long as the cache
//! itself. There is no TTL and no eviction: dropping the owning scope is
//! the only way entries go away.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Outcome of a single-flight lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Value was already cached; nothing was computed
    Hit(V),
    /// Value was computed by this caller and stored
    Miss(V),
}

impl<V> Lookup<V> {
    /// Whether the value came from the cache
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Borrow the value regardless of where it came from
    pub fn value(&self) -> &V {
        match self {
            Self::Hit(v) | Self::Miss(v) => v,
        }
    }

    /// Take the value regardless of where it came from
    pub fn into_value(self) -> V {
        match self {
            Self::Hit(v) | Self::Miss(v) => v,
        }
    }
}

/// Concurrent key/value memoization cache
///
/// `get` and `put` are plain map operations behind a read/write lock.
/// `get_or_try_insert_with` additionally serializes computations per key,
/// so at most one computation for a given key is in flight at a time.
pub struct MemoCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
    inflight: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up an entry by exact key match. `None` means no entry exists.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store or overwrite the entry for `key`
    pub async fn put(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Number of entries currently stored
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Return the cached value for `key`, or compute and store it.
    ///
    /// Concurrent callers with an equal key wait for the first computation
    /// and then see its stored result. A failed computation stores nothing;
    /// its error goes back to the caller that ran it and the next waiter
    /// computes again.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: K,
        compute: F,
    ) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(Lookup::Hit(value));
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key.clone()).or_default())
        };
        let _guard = gate.lock().await;

        // Another caller may have finished while we waited on the gate
        if let Some(value) = self.get(&key).await {
            return Ok(Lookup::Hit(value));
        }

        let result = compute().await;
        if let Ok(ref value) = result {
            self.put(key.clone(), value.clone()).await;
        }

        // After a failure the gate stays registered while anyone else holds
        // it, so late callers queue behind the waiter that retries.
        {
            let mut inflight = self.inflight.lock().await;
            let others_waiting = Arc::strong_count(&gate) > 2;
            if (result.is_ok() || !others_waiting)
                && inflight.get(&key).is_some_and(|g| Arc::ptr_eq(g, &gate))
            {
                inflight.remove(&key);
            }
        }

        result.map(Lookup::Miss)
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
