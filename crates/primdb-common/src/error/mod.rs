//! Error handling for PrimDB.
//!
//! This module provides a unified error type and result alias used
//! across all PrimDB components.

mod database;

pub use database::{ErrorCode, PrimError};

/// Result type alias for PrimDB operations.
pub type PrimResult<T> = std::result::Result<T, PrimError>;
