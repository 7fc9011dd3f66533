//! Memoization of raw table scans.
//!
//! A scan is cached under the fingerprint of the read that triggered it:
//! the table name plus the canonical form of its filter. Only the raw,
//! unfiltered load is stored; filtering happens afterwards on every read.
//!
//! Any mutation clears the whole cache. Entries are never evicted
//! individually.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use primdb_common::CacheConfig;
use tracing::trace;

use crate::stats::{CacheStats, Counters};

/// Cache key for a read request.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Fingerprint {
    /// Table the read targets.
    table: String,
    /// Canonical filter description, if the read was filtered.
    filter: Option<String>,
}

impl Fingerprint {
    /// Creates a new fingerprint.
    pub fn new(table: impl Into<String>, filter: Option<String>) -> Self {
        Self {
            table: table.into(),
            filter,
        }
    }

    /// Creates the fingerprint of an unfiltered read.
    pub fn unfiltered(table: impl Into<String>) -> Self {
        Self::new(table, None)
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the canonical filter description.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "{}[{}]", self.table, filter),
            None => f.write_str(&self.table),
        }
    }
}

/// A cache of loaded values keyed by [`Fingerprint`].
///
/// Lookups take `&self`; the map sits behind a lock so the owner can hand
/// out shared references to the cache.
///
/// # Example
///
/// ```rust
/// use primdb_cache::{Fingerprint, QueryCache};
///
/// let cache: QueryCache<Vec<i64>> = QueryCache::new();
/// let key = Fingerprint::unfiltered("users");
///
/// let first = cache.get_or_load(&key, || Ok::<_, ()>(vec![1, 2])).unwrap();
/// let second = cache.get_or_load(&key, || Ok::<_, ()>(vec![9])).unwrap();
/// assert_eq!(*second, vec![1, 2]);
/// assert_eq!(first, second);
///
/// cache.invalidate_all();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct QueryCache<V> {
    /// When false, loads pass through and nothing is retained.
    enabled: bool,
    /// Cached loads.
    entries: RwLock<HashMap<Fingerprint, Arc<V>>>,
    /// Lookup counters.
    counters: Counters,
}

impl<V> QueryCache<V> {
    /// Creates an empty, enabled cache.
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Creates a cache that never retains anything.
    pub fn disabled() -> Self {
        Self::from_config(&CacheConfig::disabled())
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Returns the cached value for `key`, if present.
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<V>> {
        let hit = self.entries.read().get(key).cloned();
        self.counters.lookup(hit.is_some());
        hit
    }

    /// Returns the cached value for `key`, running `loader` on a miss.
    ///
    /// The loader runs at most once per fingerprint between invalidations.
    /// A failed load is not cached, so the next lookup retries it.
    pub fn get_or_load<E, F>(&self, key: &Fingerprint, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(key) {
            trace!(fingerprint = %key, "scan cache hit");
            return Ok(hit);
        }

        trace!(fingerprint = %key, "scan cache miss");
        let value = Arc::new(loader()?);

        if self.enabled {
            self.entries.write().insert(key.clone(), Arc::clone(&value));
            self.counters.insert();
        }

        Ok(value)
    }

    /// Drops every cached value.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        drop(entries);

        self.counters.invalidate();
        trace!(dropped, "scan cache invalidated");
    }

    /// Returns true if a value is cached for `key`.
    ///
    /// Does not count as an access.
    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns the number of cached values.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns true if loads are retained.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns a snapshot of the lookup statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_loader<'a>(
        calls: &'a Cell<u32>,
        value: Vec<i32>,
    ) -> impl FnOnce() -> Result<Vec<i32>, String> + 'a {
        move || {
            calls.set(calls.get() + 1);
            Ok(value)
        }
    }

    #[test]
    fn test_loads_once_per_fingerprint() {
        let cache: QueryCache<Vec<i32>> = QueryCache::new();
        let calls = Cell::new(0);
        let key = Fingerprint::unfiltered("users");

        let first = cache.get_or_load(&key, counting_loader(&calls, vec![1, 2, 3])).unwrap();
        let second = cache.get_or_load(&key, counting_loader(&calls, vec![9])).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(*first, vec![1, 2, 3]);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.accesses, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
    }

    #[test]
    fn test_distinct_filters_are_distinct_keys() {
        let cache: QueryCache<Vec<i32>> = QueryCache::new();
        let calls = Cell::new(0);

        let plain = Fingerprint::unfiltered("users");
        let by_age = Fingerprint::new("users", Some("age=30".to_string()));
        let by_text = Fingerprint::new("users", Some("age=\"30\"".to_string()));

        cache.get_or_load(&plain, counting_loader(&calls, vec![1])).unwrap();
        cache.get_or_load(&by_age, counting_loader(&calls, vec![1])).unwrap();
        cache.get_or_load(&by_text, counting_loader(&calls, vec![1])).unwrap();
        cache.get_or_load(&by_age, counting_loader(&calls, vec![1])).unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_invalidate_all_forces_reload() {
        let cache: QueryCache<Vec<i32>> = QueryCache::new();
        let calls = Cell::new(0);
        let users = Fingerprint::unfiltered("users");
        let orders = Fingerprint::unfiltered("orders");

        cache.get_or_load(&users, counting_loader(&calls, vec![1])).unwrap();
        cache.get_or_load(&orders, counting_loader(&calls, vec![2])).unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(!cache.contains(&orders));

        let reloaded = cache.get_or_load(&users, counting_loader(&calls, vec![7])).unwrap();
        assert_eq!(*reloaded, vec![7]);
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache: QueryCache<Vec<i32>> = QueryCache::new();
        let key = Fingerprint::unfiltered("users");

        let err = cache
            .get_or_load(&key, || Err::<Vec<i32>, _>("disk on fire".to_string()))
            .unwrap_err();
        assert_eq!(err, "disk on fire");
        assert!(!cache.contains(&key));

        let value = cache.get_or_load(&key, || Ok::<_, String>(vec![4])).unwrap();
        assert_eq!(*value, vec![4]);
    }

    #[test]
    fn test_disabled_cache_always_loads() {
        let cache: QueryCache<Vec<i32>> = QueryCache::disabled();
        let calls = Cell::new(0);
        let key = Fingerprint::unfiltered("users");

        cache.get_or_load(&key, counting_loader(&calls, vec![1])).unwrap();
        cache.get_or_load(&key, counting_loader(&calls, vec![1])).unwrap();

        assert!(!cache.is_enabled());
        assert_eq!(calls.get(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_fingerprint_display() {
        assert_eq!(Fingerprint::unfiltered("users").to_string(), "users");
        assert_eq!(
            Fingerprint::new("users", Some("name=\"Ann\"".to_string())).to_string(),
            "users[name=\"Ann\"]"
        );
    }
}
