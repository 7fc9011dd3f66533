//! Read caching for PrimDB.
//!
//! This crate memoizes raw table scans between mutations:
//!
//! - **QueryCache**: fingerprint-keyed store of loaded scans with
//!   `get_or_load` and wholesale `invalidate_all`
//! - **CacheStats**: snapshot of hit, miss and invalidation counts
//!
//! # Example
//!
//! ```rust
//! use primdb_cache::{Fingerprint, QueryCache};
//!
//! let cache: QueryCache<Vec<&str>> = QueryCache::new();
//! let key = Fingerprint::new("users", Some("name=\"Ann\"".to_string()));
//! let rows = cache.get_or_load(&key, || Ok::<_, ()>(vec!["Ann", "Bob"])).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(cache.stats().misses, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod query_cache;
pub mod stats;

pub use primdb_common::CacheConfig;
pub use query_cache::{Fingerprint, QueryCache};
pub use stats::CacheStats;
