//! Schema registry for table metadata.
//!
//! The registry maps table names to their schemas in creation order. It is
//! persisted as one JSON object keyed by table name:
//!
//! ```text
//! {
//!   "users": {
//!     "columns": [
//!       { "name": "ID", "type": "int" },
//!       { "name": "name", "type": "str" }
//!     ]
//!   }
//! }
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use primdb_common::constants::ID_COLUMN;
use primdb_common::{DataType, PrimError, PrimResult};

/// A column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// The implicit identity column.
    pub fn id() -> Self {
        Self::new(ID_COLUMN, DataType::Integer)
    }
}

/// An unvalidated `name:type` column request.
///
/// The type is kept as raw text so that unknown type names are reported
/// against the table being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Requested column name.
    pub name: String,
    /// Requested type name.
    pub type_name: String,
}

impl ColumnSpec {
    /// Creates a new column request.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

impl<N: Into<String>, T: Into<String>> From<(N, T)> for ColumnSpec {
    fn from((name, type_name): (N, T)) -> Self {
        Self::new(name, type_name)
    }
}

/// Schema of a single table.
///
/// The first column is always `ID:int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name; stored as the registry key, not inside the entry.
    #[serde(skip)]
    name: String,
    /// Columns in declaration order.
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Validates a table definition and builds its schema.
    ///
    /// Checks, in order: the table name, then per column its name, its type
    /// and uniqueness (a user column named `ID` counts as a duplicate).
    pub fn define(name: &str, columns: &[ColumnSpec]) -> PrimResult<Self> {
        if !is_identifier(name) {
            return Err(PrimError::InvalidTableName {
                name: name.to_string(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::from([ID_COLUMN]);
        let mut defs = Vec::with_capacity(columns.len() + 1);
        defs.push(ColumnDef::id());

        for spec in columns {
            let column = spec.name.as_str();
            if !is_identifier(column) {
                return Err(PrimError::InvalidColumnName {
                    table: name.to_string(),
                    column: column.to_string(),
                });
            }

            let data_type: DataType = spec.type_name.parse().map_err(|_| PrimError::UnknownType {
                table: name.to_string(),
                column: column.to_string(),
                type_name: spec.type_name.clone(),
            })?;

            if !seen.insert(column) {
                return Err(PrimError::DuplicateColumn {
                    table: name.to_string(),
                    column: column.to_string(),
                });
            }

            defs.push(ColumnDef::new(column, data_type));
        }

        Ok(Self {
            name: name.to_string(),
            columns: defs,
        })
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all columns, `ID` first.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the columns supplied by callers on insert.
    pub fn data_columns(&self) -> &[ColumnDef] {
        match self.columns.first() {
            Some(first) if first.name == ID_COLUMN => &self.columns[1..],
            _ => &self.columns,
        }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the declared type of a column.
    pub fn column_type(&self, column: &str) -> PrimResult<DataType> {
        self.column(column)
            .map(|c| c.data_type)
            .ok_or_else(|| PrimError::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

/// Returns true for a non-empty ASCII identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// All table schemas, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, TableSchema>", into = "IndexMap<String, TableSchema>")]
pub struct Registry {
    tables: IndexMap<String, TableSchema>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a schema by table name.
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Gets a schema, failing with `TableNotFound` if absent.
    pub fn schema(&self, name: &str) -> PrimResult<&TableSchema> {
        self.get(name).ok_or_else(|| PrimError::TableNotFound {
            table: name.to_string(),
        })
    }

    /// Checks if a table exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no tables are defined.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterates over schemas in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Lazily iterates over table names in creation order.
    pub fn names(&self) -> TableNames<'_> {
        TableNames {
            inner: self.tables.keys(),
        }
    }

    /// Adds a schema, replacing any schema with the same name.
    pub(crate) fn insert(&mut self, schema: TableSchema) {
        self.tables.insert(schema.name.clone(), schema);
    }

    /// Removes a schema, keeping the order of the rest.
    pub(crate) fn remove(&mut self, name: &str) -> Option<TableSchema> {
        self.tables.shift_remove(name)
    }
}

impl From<IndexMap<String, TableSchema>> for Registry {
    fn from(mut tables: IndexMap<String, TableSchema>) -> Self {
        for (name, schema) in tables.iter_mut() {
            schema.name.clone_from(name);
        }
        Self { tables }
    }
}

impl From<Registry> for IndexMap<String, TableSchema> {
    fn from(registry: Registry) -> Self {
        registry.tables
    }
}

/// Iterator over table names.
#[derive(Debug, Clone)]
pub struct TableNames<'a> {
    inner: indexmap::map::Keys<'a, String, TableSchema>,
}

impl<'a> Iterator for TableNames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TableNames<'_> {}

/// Result of listing tables.
///
/// An empty registry is reported explicitly rather than as an empty
/// iterator.
#[derive(Debug, Clone)]
pub enum TableListing<'a> {
    /// No tables are defined.
    NoTables,
    /// Table names in creation order.
    Tables(TableNames<'a>),
}

impl<'a> TableListing<'a> {
    /// Builds the listing for a registry.
    pub fn of(registry: &'a Registry) -> Self {
        if registry.is_empty() {
            TableListing::NoTables
        } else {
            TableListing::Tables(registry.names())
        }
    }

    /// Returns true if no tables are defined.
    pub fn is_empty(&self) -> bool {
        matches!(self, TableListing::NoTables)
    }

    /// Collects the names into owned strings, `None` when no tables exist.
    pub fn into_names(self) -> Option<Vec<String>> {
        match self {
            TableListing::NoTables => None,
            TableListing::Tables(names) => Some(names.map(str::to_string).collect()),
        }
    }
}
