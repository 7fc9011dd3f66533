//! # primdb-common
//!
//! Common types, errors, and configuration for PrimDB.
//!
//! This crate provides the foundational pieces shared by the cache and the
//! engine:
//!
//! - **Types**: `DataType`, the tagged `Value`, and the ordered `Row`
//! - **Errors**: Unified error handling with `PrimError` and `ErrorCode`
//! - **Config**: `DatabaseConfig` and its storage/cache sections
//! - **Constants**: Reserved column names and default file locations
//!
//! ## Example
//!
//! ```rust
//! use primdb_common::types::{DataType, Value};
//!
//! let ty: DataType = "int".parse().unwrap();
//! assert_eq!(Value::Integer(7).data_type(), ty);
//! assert!("float".parse::<DataType>().is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::{CacheConfig, DatabaseConfig, StorageConfig};
pub use constants::*;
pub use error::{ErrorCode, PrimError, PrimResult};
pub use types::{DataType, Row, Value};
