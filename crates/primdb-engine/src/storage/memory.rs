//! In-memory storage implementation.
//!
//! Holds documents in process memory and counts every load and save, which
//! makes it useful for embedding and for observing how often the engine
//! reaches storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use primdb_common::{PrimResult, Row};

use super::{Loaded, TableStorage};
use crate::catalog::Registry;

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// Persisted registry.
    registry: Mutex<Registry>,
    /// Persisted rows by table.
    tables: Mutex<HashMap<String, Vec<Row>>>,
    registry_loads: AtomicU64,
    registry_saves: AtomicU64,
    table_loads: AtomicU64,
    table_saves: AtomicU64,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the persisted rows of a table, without counting a load.
    pub fn rows(&self, table: &str) -> Option<Vec<Row>> {
        self.tables.lock().get(table).cloned()
    }

    /// Returns true if data is persisted for `table`.
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.lock().contains_key(table)
    }

    /// Number of registry loads.
    pub fn registry_loads(&self) -> u64 {
        self.registry_loads.load(Ordering::Relaxed)
    }

    /// Number of registry saves.
    pub fn registry_saves(&self) -> u64 {
        self.registry_saves.load(Ordering::Relaxed)
    }

    /// Number of table loads.
    pub fn table_loads(&self) -> u64 {
        self.table_loads.load(Ordering::Relaxed)
    }

    /// Number of table saves.
    pub fn table_saves(&self) -> u64 {
        self.table_saves.load(Ordering::Relaxed)
    }
}

impl TableStorage for MemoryStorage {
    fn load_registry(&self) -> PrimResult<Loaded<Registry>> {
        self.registry_loads.fetch_add(1, Ordering::Relaxed);
        Ok(Loaded::clean(self.registry.lock().clone()))
    }

    fn save_registry(&self, registry: &Registry) -> PrimResult<()> {
        self.registry_saves.fetch_add(1, Ordering::Relaxed);
        *self.registry.lock() = registry.clone();
        Ok(())
    }

    fn load_table(&self, table: &str) -> PrimResult<Loaded<Vec<Row>>> {
        self.table_loads.fetch_add(1, Ordering::Relaxed);
        Ok(Loaded::clean(self.rows(table).unwrap_or_default()))
    }

    fn save_table(&self, table: &str, rows: &[Row]) -> PrimResult<()> {
        self.table_saves.fetch_add(1, Ordering::Relaxed);
        self.tables.lock().insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn remove_table(&self, table: &str) -> PrimResult<()> {
        self.tables.lock().remove(table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableSchema;

    #[test]
    fn test_counts_io() {
        let storage = MemoryStorage::new();
        assert!(storage.load_table("users").unwrap().value.is_empty());

        storage.save_table("users", &[Row::with_id(1)]).unwrap();
        assert_eq!(storage.load_table("users").unwrap().value, vec![Row::with_id(1)]);

        assert_eq!(storage.table_loads(), 2);
        assert_eq!(storage.table_saves(), 1);
        assert_eq!(storage.rows("users").unwrap().len(), 1);
        assert_eq!(storage.table_loads(), 2);
    }

    #[test]
    fn test_registry_is_a_snapshot() {
        let storage = MemoryStorage::new();
        let mut registry = storage.load_registry().unwrap().value;
        registry.insert(TableSchema::define("users", &[]).unwrap());

        assert!(storage.load_registry().unwrap().value.is_empty());
        storage.save_registry(&registry).unwrap();
        assert!(storage.load_registry().unwrap().value.contains("users"));
        assert_eq!(storage.registry_loads(), 3);
        assert_eq!(storage.registry_saves(), 1);
    }

    #[test]
    fn test_remove_table() {
        let storage = MemoryStorage::new();
        storage.save_table("users", &[]).unwrap();
        assert!(storage.has_table("users"));

        storage.remove_table("users").unwrap();
        storage.remove_table("users").unwrap();
        assert!(!storage.has_table("users"));
    }
}
