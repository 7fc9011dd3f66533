//! Type definitions for PrimDB.
//!
//! This module contains the value model shared by storage and the engine.

mod row;
mod value;

pub use row::Row;
pub use value::{DataType, UnknownTypeName, Value};
