//! Lookup counters for the scan cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, bumped through `&self` on every lookup.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    accesses: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    /// Records one lookup and its outcome.
    pub(crate) fn lookup(&self, hit: bool) {
        self.accesses.fetch_add(1, Ordering::Relaxed);
        let outcome = if hit { &self.hits } else { &self.misses };
        outcome.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            accesses: self.accesses.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the scan cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups performed.
    pub accesses: u64,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to load.
    pub misses: u64,
    /// Loads retained.
    pub inserts: u64,
    /// Wholesale invalidations.
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            return 0.0;
        }
        self.hits as f64 / self.accesses as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accesses={} hits={} misses={} hit_ratio={:.1}% inserts={} invalidations={}",
            self.accesses,
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.inserts,
            self.invalidations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_outcomes() {
        let counters = Counters::default();
        counters.lookup(true);
        counters.lookup(false);
        counters.lookup(false);
        counters.insert();

        let stats = counters.snapshot();
        assert_eq!(stats.accesses, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.inserts, 1);
        assert!((stats.hit_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let counters = Counters::default();
        counters.invalidate();
        let before = counters.snapshot();
        counters.invalidate();

        assert_eq!(before.invalidations, 1);
        assert_eq!(counters.snapshot().invalidations, 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);

        let stats = CacheStats {
            accesses: 4,
            hits: 3,
            misses: 1,
            inserts: 1,
            invalidations: 0,
        };
        assert_eq!(
            stats.to_string(),
            "accesses=4 hits=3 misses=1 hit_ratio=75.0% inserts=1 invalidations=0"
        );
    }
}
