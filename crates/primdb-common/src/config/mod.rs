//! Configuration for PrimDB.
//!
//! This module provides configuration structures for storage and caching.

mod database;

pub use database::{CacheConfig, DatabaseConfig, StorageConfig};
