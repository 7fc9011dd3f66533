//! Per-command database facade.
//!
//! `Database` runs each command in one cycle: load the registry, execute
//! the operation on the engine, and save the registry again if the command
//! mutates. The registry is discarded after every command; only the scan
//! cache and pending diagnostics survive between calls.

use primdb_cache::CacheStats;
use primdb_common::{CacheConfig, DatabaseConfig, PrimError, PrimResult, Row, Value};
use tracing::info;

use crate::catalog::{ColumnSpec, Registry, TableSchema};
use crate::engine::TableEngine;
use crate::filter::{Predicate, SetClause};
use crate::result::{Mutation, TableInfo};
use crate::storage::{JsonStorage, TableStorage};

/// A database over a storage backend.
///
/// # Example
///
/// ```rust
/// use primdb_common::{DatabaseConfig, Value};
/// use primdb_engine::{ColumnSpec, Database, Predicate};
///
/// let dir = tempfile::tempdir().unwrap();
/// let db = Database::open(&DatabaseConfig::with_root(dir.path())).unwrap();
///
/// db.create_table("users", &[ColumnSpec::new("name", "str")]).unwrap();
/// let id = db.insert("users", vec![Value::text("Ann")]).unwrap();
/// assert_eq!(id, 1);
///
/// let rows = db.select("users", Some(&Predicate::new("name", "Ann"))).unwrap();
/// assert_eq!(rows[0].id(), Some(1));
/// ```
#[derive(Debug)]
pub struct Database<S = JsonStorage> {
    engine: TableEngine<S>,
}

impl Database<JsonStorage> {
    /// Opens a file-backed database, creating its data directory.
    pub fn open(config: &DatabaseConfig) -> PrimResult<Self> {
        config.validate()?;
        let storage = JsonStorage::new(&config.storage)?;

        info!(
            metadata_file = %config.storage.metadata_file.display(),
            data_dir = %config.storage.data_dir.display(),
            cache = config.cache.enabled,
            "database opened"
        );
        Ok(Self::with_storage(storage, &config.cache))
    }
}

impl<S: TableStorage> Database<S> {
    /// Creates a database over an existing storage.
    pub fn with_storage(storage: S, cache: &CacheConfig) -> Self {
        Self {
            engine: TableEngine::with_cache_config(storage, cache),
        }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &TableEngine<S> {
        &self.engine
    }

    /// Returns the backing storage.
    pub fn storage(&self) -> &S {
        self.engine.storage()
    }

    /// Creates a table.
    pub fn create_table(&self, name: &str, columns: &[ColumnSpec]) -> PrimResult<TableSchema> {
        self.mutate(|engine, registry| engine.create_table(registry, name, columns))
    }

    /// Drops a table.
    pub fn drop_table(&self, name: &str) -> PrimResult<TableSchema> {
        self.mutate(|engine, registry| engine.drop_table(registry, name))
    }

    /// Returns table names in creation order, or `None` when no tables exist.
    pub fn list_tables(&self) -> PrimResult<Option<Vec<String>>> {
        self.read(|engine, registry| Ok(engine.list_tables(registry).into_names()))
    }

    /// Describes a table.
    pub fn info_table(&self, name: &str) -> PrimResult<TableInfo> {
        self.read(|engine, registry| engine.info_table(registry, name))
    }

    /// Inserts a row and returns its ID.
    pub fn insert(&self, table: &str, values: Vec<Value>) -> PrimResult<i64> {
        self.mutate(|engine, registry| engine.insert(registry, table, values))
    }

    /// Returns rows matching `filter`.
    pub fn select(&self, table: &str, filter: Option<&Predicate>) -> PrimResult<Vec<Row>> {
        self.read(|engine, registry| engine.select(registry, table, filter))
    }

    /// Updates rows matching `filter`.
    pub fn update(
        &self,
        table: &str,
        assignments: &SetClause,
        filter: Option<&Predicate>,
    ) -> PrimResult<Mutation> {
        self.mutate(|engine, registry| engine.update(registry, table, assignments, filter))
    }

    /// Deletes rows matching `filter`.
    pub fn delete(&self, table: &str, filter: Option<&Predicate>) -> PrimResult<Mutation> {
        self.mutate(|engine, registry| engine.delete(registry, table, filter))
    }

    /// Drains storage corruption reports.
    pub fn take_diagnostics(&self) -> Vec<PrimError> {
        self.engine.take_diagnostics()
    }

    /// Returns scan cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.engine.cache_stats()
    }

    fn read<T, F>(&self, op: F) -> PrimResult<T>
    where
        F: FnOnce(&TableEngine<S>, &Registry) -> PrimResult<T>,
    {
        let registry = self.engine.load_registry()?;
        op(&self.engine, &registry)
    }

    fn mutate<T, F>(&self, op: F) -> PrimResult<T>
    where
        F: FnOnce(&TableEngine<S>, &mut Registry) -> PrimResult<T>,
    {
        let mut registry = self.engine.load_registry()?;
        let output = op(&self.engine, &mut registry)?;
        self.engine.save_registry(&registry)?;
        Ok(output)
    }
}
