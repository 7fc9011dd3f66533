//! Persistence layer for schemas and table data.
//!
//! This module provides the storage seam used by the table engine:
//!
//! - `TableStorage` trait: load and save the registry and per-table rows
//! - `JsonStorage`: one metadata file plus one JSON file per table
//! - `MemoryStorage`: in-process storage with I/O counters
//!
//! # Failure model
//!
//! Missing documents load as their empty default. A document that exists
//! but cannot be decoded also loads as the empty default; the decode error
//! travels alongside it in [`Loaded::corruption`] so callers can report it
//! without aborting the command. Any other I/O failure is an error.

mod json;
mod memory;

pub use json::JsonStorage;
pub use memory::MemoryStorage;

use primdb_common::{PrimError, PrimResult, Row};

use crate::catalog::Registry;

/// A loaded document, with the decode error if it had to be defaulted.
#[derive(Debug)]
pub struct Loaded<T> {
    /// The document, or its empty default when corrupt.
    pub value: T,
    /// Decode failure that forced the default.
    pub corruption: Option<PrimError>,
}

impl<T> Loaded<T> {
    /// Wraps a cleanly loaded document.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            corruption: None,
        }
    }

    /// Wraps a default that replaced a corrupt document.
    pub fn corrupt(value: T, error: PrimError) -> Self {
        Self {
            value,
            corruption: Some(error),
        }
    }

    /// Returns true if the document had to be defaulted.
    pub fn is_corrupt(&self) -> bool {
        self.corruption.is_some()
    }
}

/// Storage for the registry and table data.
///
/// Every save replaces the whole document.
pub trait TableStorage {
    /// Loads the registry. Absent storage yields an empty registry.
    fn load_registry(&self) -> PrimResult<Loaded<Registry>>;

    /// Replaces the persisted registry.
    fn save_registry(&self, registry: &Registry) -> PrimResult<()>;

    /// Loads the rows of a table. Absent data yields no rows.
    fn load_table(&self, table: &str) -> PrimResult<Loaded<Vec<Row>>>;

    /// Replaces the persisted rows of a table.
    fn save_table(&self, table: &str, rows: &[Row]) -> PrimResult<()>;

    /// Removes a table's data. Removing absent data succeeds.
    fn remove_table(&self, table: &str) -> PrimResult<()>;
}
