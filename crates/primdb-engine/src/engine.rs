//! Table engine executing schema and data operations.
//!
//! `TableEngine` validates every request against a caller-supplied
//! [`Registry`] snapshot and applies it through a [`TableStorage`]. It keeps
//! no persistent state of its own: only the scan cache and collected
//! storage diagnostics live across calls.
//!
//! Every operation validates fully before touching storage, so a rejected
//! request leaves both the registry and the table data unchanged.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use primdb_cache::{CacheStats, Fingerprint, QueryCache};
use primdb_common::constants::{FIRST_ROW_ID, ID_COLUMN};
use primdb_common::{CacheConfig, PrimError, PrimResult, Row, Value};

use crate::catalog::{ColumnSpec, Registry, TableListing, TableSchema};
use crate::filter::{selects, Predicate, SetClause};
use crate::result::{Mutation, TableInfo};
use crate::storage::{Loaded, TableStorage};

/// Executes table operations against a storage.
#[derive(Debug)]
pub struct TableEngine<S> {
    /// Backing storage.
    storage: S,
    /// Raw scans keyed by read fingerprint.
    cache: QueryCache<Vec<Row>>,
    /// Corruption reports not yet collected.
    diagnostics: Mutex<Vec<PrimError>>,
}

impl<S: TableStorage> TableEngine<S> {
    /// Creates an engine with an enabled scan cache.
    pub fn new(storage: S) -> Self {
        Self::with_cache_config(storage, &CacheConfig::default())
    }

    /// Creates an engine with the given cache configuration.
    pub fn with_cache_config(storage: S, cache: &CacheConfig) -> Self {
        Self {
            storage,
            cache: QueryCache::from_config(cache),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Returns the backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a snapshot of the scan cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the number of cached scans.
    pub fn cached_scans(&self) -> usize {
        self.cache.len()
    }

    /// Drains the corruption reports gathered since the last call.
    pub fn take_diagnostics(&self) -> Vec<PrimError> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    // =========================================================================
    // Registry Persistence
    // =========================================================================

    /// Loads the registry from storage.
    ///
    /// A corrupt registry loads as empty and is reported through
    /// [`take_diagnostics`](Self::take_diagnostics).
    pub fn load_registry(&self) -> PrimResult<Registry> {
        let loaded = self.storage.load_registry()?;
        Ok(self.absorb(loaded))
    }

    /// Persists the registry.
    pub fn save_registry(&self, registry: &Registry) -> PrimResult<()> {
        self.storage.save_registry(registry)
    }

    // =========================================================================
    // DDL Operations
    // =========================================================================

    /// Creates a table with an empty data file.
    ///
    /// `ID:int` is prepended to the requested columns.
    pub fn create_table(
        &self,
        registry: &mut Registry,
        name: &str,
        columns: &[ColumnSpec],
    ) -> PrimResult<TableSchema> {
        if registry.contains(name) {
            return Err(PrimError::TableExists {
                table: name.to_string(),
            });
        }
        let schema = TableSchema::define(name, columns)?;

        self.storage.save_table(name, &[])?;
        registry.insert(schema.clone());
        self.cache.invalidate_all();

        info!(table = name, columns = schema.columns().len(), "table created");
        Ok(schema)
    }

    /// Drops a table and deletes its data.
    pub fn drop_table(&self, registry: &mut Registry, name: &str) -> PrimResult<TableSchema> {
        registry.schema(name)?;

        self.storage.remove_table(name)?;
        let schema = registry
            .remove(name)
            .ok_or_else(|| PrimError::internal(format!("table '{name}' vanished during drop")))?;
        self.cache.invalidate_all();

        info!(table = name, "table dropped");
        Ok(schema)
    }

    /// Lists table names in creation order.
    pub fn list_tables<'a>(&self, registry: &'a Registry) -> TableListing<'a> {
        TableListing::of(registry)
    }

    /// Describes a table, counting its persisted rows.
    ///
    /// Reads storage directly; the scan cache is neither used nor cleared.
    pub fn info_table(&self, registry: &Registry, name: &str) -> PrimResult<TableInfo> {
        let schema = registry.schema(name)?;
        let rows = self.load_rows(name)?;
        Ok(TableInfo::new(schema, rows.len()))
    }

    // =========================================================================
    // DML Operations
    // =========================================================================

    /// Inserts a row and returns its assigned ID.
    ///
    /// `values` are positional, one per non-ID column. The new ID is one
    /// more than the largest existing ID, or 1 for an empty table.
    pub fn insert(&self, registry: &Registry, table: &str, values: Vec<Value>) -> PrimResult<i64> {
        let started = Instant::now();
        let schema = registry.schema(table)?;
        let columns = schema.data_columns();

        if values.len() != columns.len() {
            return Err(PrimError::ArityMismatch {
                table: table.to_string(),
                expected: columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in columns.iter().zip(&values) {
            if !value.conforms_to(column.data_type) {
                return Err(PrimError::TypeMismatch {
                    table: table.to_string(),
                    column: column.name.clone(),
                    expected: column.data_type,
                    actual: value.data_type(),
                });
            }
        }

        let mut rows = self.load_rows(table)?;
        let id = next_id(table, &rows)?;

        let mut row = Row::with_id(id);
        for (column, value) in columns.iter().zip(values) {
            row.insert(column.name.clone(), value);
        }
        rows.push(row);

        self.storage.save_table(table, &rows)?;
        self.cache.invalidate_all();

        debug!(
            table,
            id,
            elapsed_us = started.elapsed().as_micros() as u64,
            "insert"
        );
        Ok(id)
    }

    /// Returns the rows matching `filter` in storage order.
    ///
    /// The unfiltered scan is cached under the read's fingerprint; the
    /// filter is applied to the cached scan on every call.
    pub fn select(
        &self,
        registry: &Registry,
        table: &str,
        filter: Option<&Predicate>,
    ) -> PrimResult<Vec<Row>> {
        let started = Instant::now();
        let schema = registry.schema(table)?;
        if let Some(pred) = filter {
            pred.check(schema)?;
        }

        let key = Fingerprint::new(table, filter.map(ToString::to_string));
        let scan = self.cache.get_or_load(&key, || self.load_rows(table))?;

        let rows: Vec<Row> = scan
            .iter()
            .filter(|row| selects(filter, row))
            .cloned()
            .collect();

        debug!(
            table,
            scanned = scan.len(),
            returned = rows.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "select"
        );
        Ok(rows)
    }

    /// Applies `assignments` to every row matching `filter`.
    ///
    /// With no filter every row is updated. Storage is written only when at
    /// least one row matched.
    pub fn update(
        &self,
        registry: &Registry,
        table: &str,
        assignments: &SetClause,
        filter: Option<&Predicate>,
    ) -> PrimResult<Mutation> {
        let started = Instant::now();
        let schema = registry.schema(table)?;

        if assignments.is_empty() {
            return Err(PrimError::EmptySetClause {
                table: table.to_string(),
            });
        }
        for (column, value) in assignments {
            let expected = schema.column_type(column)?;
            if column == ID_COLUMN {
                return Err(PrimError::ReadOnlyColumn {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
            if !value.conforms_to(expected) {
                return Err(PrimError::TypeMismatch {
                    table: table.to_string(),
                    column: column.clone(),
                    expected,
                    actual: value.data_type(),
                });
            }
        }
        if let Some(pred) = filter {
            pred.check(schema)?;
        }

        let mut rows = self.load_rows(table)?;
        let mut matched = 0usize;
        let mut ids = Vec::new();
        for row in rows.iter_mut().filter(|row| selects(filter, row)) {
            for (column, value) in assignments {
                row.insert(column.clone(), value.clone());
            }
            matched += 1;
            ids.extend(row.id());
        }

        if matched == 0 {
            debug!(table, "update matched no rows");
            return Ok(Mutation::NoMatch);
        }

        self.storage.save_table(table, &rows)?;
        self.cache.invalidate_all();

        debug!(
            table,
            updated = matched,
            elapsed_us = started.elapsed().as_micros() as u64,
            "update"
        );
        Ok(Mutation::Applied(ids))
    }

    /// Deletes every row matching `filter`.
    ///
    /// With no filter every row is deleted. The remaining rows keep their
    /// order. Storage is written only when at least one row matched.
    pub fn delete(
        &self,
        registry: &Registry,
        table: &str,
        filter: Option<&Predicate>,
    ) -> PrimResult<Mutation> {
        let started = Instant::now();
        let schema = registry.schema(table)?;
        if let Some(pred) = filter {
            pred.check(schema)?;
        }

        let rows = self.load_rows(table)?;
        let (deleted, kept): (Vec<Row>, Vec<Row>) =
            rows.into_iter().partition(|row| selects(filter, row));

        if deleted.is_empty() {
            debug!(table, "delete matched no rows");
            return Ok(Mutation::NoMatch);
        }

        self.storage.save_table(table, &kept)?;
        self.cache.invalidate_all();

        debug!(
            table,
            deleted = deleted.len(),
            kept = kept.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "delete"
        );
        Ok(Mutation::Applied(deleted.iter().filter_map(Row::id).collect()))
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Loads a table's rows straight from storage.
    fn load_rows(&self, table: &str) -> PrimResult<Vec<Row>> {
        let loaded = self.storage.load_table(table)?;
        Ok(self.absorb(loaded))
    }

    /// Unwraps a load, keeping any corruption report.
    fn absorb<T>(&self, loaded: Loaded<T>) -> T {
        if let Some(err) = loaded.corruption {
            warn!(error = %err, "storage document degraded to empty default");
            self.diagnostics.lock().push(err);
        }
        loaded.value
    }
}

/// Returns the ID for the next row of `rows`.
fn next_id(table: &str, rows: &[Row]) -> PrimResult<i64> {
    match rows.iter().filter_map(Row::id).max() {
        None => Ok(FIRST_ROW_ID),
        Some(max_id) => max_id.checked_add(1).ok_or_else(|| PrimError::IdExhausted {
            table: table.to_string(),
            max_id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn setup() -> (TableEngine<MemoryStorage>, Registry) {
        let engine = TableEngine::new(MemoryStorage::new());
        let mut registry = Registry::new();
        engine
            .create_table(
                &mut registry,
                "users",
                &[ColumnSpec::new("name", "str"), ColumnSpec::new("age", "int")],
            )
            .unwrap();
        (engine, registry)
    }

    fn values(name: &str, age: i64) -> Vec<Value> {
        vec![Value::text(name), Value::Integer(age)]
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id("t", &[]).unwrap(), 1);
        assert_eq!(next_id("t", &[Row::with_id(4), Row::with_id(2)]).unwrap(), 5);

        let err = next_id("t", &[Row::with_id(i64::MAX)]).unwrap_err();
        assert!(matches!(err, PrimError::IdExhausted { max_id: i64::MAX, .. }));
    }

    #[test]
    fn test_insert_at_id_limit_leaves_data() {
        let (engine, registry) = setup();
        let mut full = Row::with_id(i64::MAX);
        full.insert("name", Value::text("Max"));
        full.insert("age", Value::Integer(1));
        engine.storage().save_table("users", &[full.clone()]).unwrap();
        let saves = engine.storage().table_saves();

        let err = engine.insert(&registry, "users", values("Ann", 30)).unwrap_err();
        assert_eq!(err.table(), Some("users"));
        assert!(matches!(err, PrimError::IdExhausted { .. }));
        assert_eq!(engine.storage().table_saves(), saves);
        assert_eq!(engine.storage().rows("users"), Some(vec![full]));
    }

    #[test]
    fn test_create_table_writes_empty_data() {
        let (engine, registry) = setup();
        assert!(registry.contains("users"));
        assert_eq!(engine.storage().rows("users"), Some(Vec::new()));
    }

    #[test]
    fn test_create_existing_table_keeps_schema() {
        let (engine, mut registry) = setup();
        let err = engine
            .create_table(&mut registry, "users", &[ColumnSpec::new("x", "bool")])
            .unwrap_err();

        assert!(matches!(err, PrimError::TableExists { .. }));
        assert!(registry.schema("users").unwrap().column("name").is_some());
        assert!(registry.schema("users").unwrap().column("x").is_none());
    }

    #[test]
    fn test_insert_assigns_ids() {
        let (engine, registry) = setup();
        assert_eq!(engine.insert(&registry, "users", values("Ann", 30)).unwrap(), 1);
        assert_eq!(engine.insert(&registry, "users", values("Bob", 25)).unwrap(), 2);

        let rows = engine.storage().rows("users").unwrap();
        let columns: Vec<&str> = rows[1].column_names().collect();
        assert_eq!(columns, vec!["ID", "name", "age"]);
    }

    #[test]
    fn test_insert_validation() {
        let (engine, registry) = setup();

        let err = engine.insert(&registry, "ghost", vec![]).unwrap_err();
        assert!(err.is_not_found());

        let err = engine
            .insert(&registry, "users", vec![Value::text("Ann")])
            .unwrap_err();
        assert!(matches!(err, PrimError::ArityMismatch { expected: 2, actual: 1, .. }));

        let err = engine
            .insert(&registry, "users", vec![Value::text("Ann"), Value::text("30")])
            .unwrap_err();
        assert!(matches!(err, PrimError::TypeMismatch { ref column, .. } if column == "age"));

        assert_eq!(engine.storage().table_saves(), 1);
    }

    #[test]
    fn test_select_filters_cached_scan() {
        let (engine, registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();
        engine.insert(&registry, "users", values("Bob", 30)).unwrap();
        let loads = engine.storage().table_loads();

        let by_age = Predicate::new("age", 30i64);
        let rows = engine.select(&registry, "users", Some(&by_age)).unwrap();
        assert_eq!(rows.len(), 2);
        engine.select(&registry, "users", Some(&by_age)).unwrap();
        assert_eq!(engine.storage().table_loads(), loads + 1);

        let by_name = Predicate::new("name", "Bob");
        let rows = engine.select(&registry, "users", Some(&by_name)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some(2));
        assert_eq!(engine.storage().table_loads(), loads + 2);
        assert_eq!(engine.cached_scans(), 2);
    }

    #[test]
    fn test_select_rejects_bad_filter() {
        let (engine, registry) = setup();
        let err = engine
            .select(&registry, "users", Some(&Predicate::new("age", "thirty")))
            .unwrap_err();
        assert!(matches!(err, PrimError::TypeMismatch { .. }));

        let err = engine
            .select(&registry, "users", Some(&Predicate::new("email", "x")))
            .unwrap_err();
        assert!(matches!(err, PrimError::ColumnNotFound { .. }));
        assert_eq!(engine.cache_stats().accesses, 0);
    }

    #[test]
    fn test_update_validation() {
        let (engine, registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();
        let saves = engine.storage().table_saves();
        let before = engine.storage().rows("users");

        let set = |column: &str, value: Value| -> SetClause {
            [(column.to_string(), value)].into_iter().collect()
        };
        let cases = [
            (SetClause::new(), None),
            (set("ID", Value::Integer(9)), None),
            (set("email", Value::text("a@b")), None),
            (set("age", Value::Boolean(true)), None),
            (set("age", Value::Integer(31)), Some(Predicate::new("email", "x"))),
            (set("age", Value::Integer(31)), Some(Predicate::new("name", 1i64))),
        ];
        let errors: Vec<PrimError> = cases
            .iter()
            .map(|(set, filter)| {
                engine
                    .update(&registry, "users", set, filter.as_ref())
                    .unwrap_err()
            })
            .collect();

        assert!(matches!(errors[0], PrimError::EmptySetClause { .. }));
        assert!(matches!(errors[1], PrimError::ReadOnlyColumn { .. }));
        assert!(matches!(errors[2], PrimError::ColumnNotFound { .. }));
        assert!(matches!(errors[3], PrimError::TypeMismatch { .. }));
        assert!(matches!(errors[4], PrimError::ColumnNotFound { .. }));
        assert!(matches!(errors[5], PrimError::TypeMismatch { .. }));

        assert_eq!(engine.storage().table_saves(), saves);
        assert_eq!(engine.storage().rows("users"), before);
    }

    #[test]
    fn test_delete_validation_leaves_data() {
        let (engine, registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();
        let saves = engine.storage().table_saves();
        let before = engine.storage().rows("users");

        let err = engine
            .delete(&registry, "users", Some(&Predicate::new("email", "x")))
            .unwrap_err();
        assert!(matches!(err, PrimError::ColumnNotFound { .. }));

        let err = engine
            .delete(&registry, "users", Some(&Predicate::new("age", "30")))
            .unwrap_err();
        assert!(matches!(err, PrimError::TypeMismatch { .. }));

        assert_eq!(engine.storage().table_saves(), saves);
        assert_eq!(engine.storage().rows("users"), before);
    }

    #[test]
    fn test_update_applies_in_place() {
        let (engine, registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();
        engine.insert(&registry, "users", values("Bob", 25)).unwrap();

        let set: SetClause = [("age".to_string(), Value::Integer(31))].into_iter().collect();
        let outcome = engine
            .update(&registry, "users", &set, Some(&Predicate::new("name", "Ann")))
            .unwrap();
        assert_eq!(outcome, Mutation::Applied(vec![1]));

        let rows = engine.storage().rows("users").unwrap();
        assert_eq!(rows[0].get("age"), Some(&Value::Integer(31)));
        assert_eq!(rows[1].get("age"), Some(&Value::Integer(25)));
    }

    #[test]
    fn test_delete_and_drop() {
        let (engine, mut registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();

        let outcome = engine
            .delete(&registry, "users", Some(&Predicate::new("name", "Zed")))
            .unwrap();
        assert!(outcome.is_no_match());

        let outcome = engine.delete(&registry, "users", None).unwrap();
        assert_eq!(outcome.ids(), &[1]);

        let dropped = engine.drop_table(&mut registry, "users").unwrap();
        assert_eq!(dropped.name(), "users");
        assert!(!engine.storage().has_table("users"));
        assert!(engine.drop_table(&mut registry, "users").unwrap_err().is_not_found());
    }

    #[test]
    fn test_info_table_bypasses_cache() {
        let (engine, registry) = setup();
        engine.insert(&registry, "users", values("Ann", 30)).unwrap();
        engine.select(&registry, "users", None).unwrap();

        let info = engine.info_table(&registry, "users").unwrap();
        assert_eq!(info.row_count, 1);
        assert_eq!(info.columns.len(), 3);
        assert_eq!(engine.cached_scans(), 1);
        assert_eq!(engine.cache_stats().invalidations, 2);
    }
}
