use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::trace;

/// A key-value cache whose entries expire a fixed duration after
/// insertion.
///
/// This is the injected stand-in for the short-TTL result cache that
/// fronts the expensive aggregations. It is a collaborator owned by the
/// caller, never hidden inside a computation, so cached staleness is
/// bounded by the TTL the owner chose. A zero TTL disables caching.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// The cached value for `key`, if it was inserted less than the TTL
    /// ago. Expired entries are dropped on access.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some((inserted, value)) if inserted.elapsed() < self.ttl => {
                trace!("ttl cache hit");
                Some(value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
