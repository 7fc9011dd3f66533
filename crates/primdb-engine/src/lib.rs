//! # primdb-engine
//!
//! Table engine and storage for PrimDB.
//!
//! This crate executes schema and data operations against JSON-persisted
//! tables:
//!
//! - **Catalog**: `Registry` of `TableSchema`s with `ID:int` always first
//! - **Storage**: `TableStorage` trait with `JsonStorage` and `MemoryStorage`
//! - **Engine**: `TableEngine` for create/drop/list/info and
//!   insert/select/update/delete, memoizing scans in a `QueryCache`
//! - **Database**: per-command facade that loads and saves the registry
//!
//! ## Example
//!
//! ```rust
//! use primdb_common::Value;
//! use primdb_engine::{ColumnSpec, Registry, TableEngine, MemoryStorage, Mutation};
//!
//! let engine = TableEngine::new(MemoryStorage::new());
//! let mut registry = Registry::new();
//!
//! engine.create_table(&mut registry, "flags", &[ColumnSpec::new("on", "bool")]).unwrap();
//! engine.insert(&registry, "flags", vec![Value::Boolean(true)]).unwrap();
//!
//! let outcome = engine.delete(&registry, "flags", None).unwrap();
//! assert_eq!(outcome, Mutation::Applied(vec![1]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod database;
pub mod engine;
pub mod filter;
pub mod result;
pub mod storage;

pub use catalog::{ColumnDef, ColumnSpec, Registry, TableListing, TableNames, TableSchema};
pub use database::Database;
pub use engine::TableEngine;
pub use filter::{Predicate, SetClause};
pub use result::{Mutation, TableInfo};
pub use storage::{JsonStorage, Loaded, MemoryStorage, TableStorage};
