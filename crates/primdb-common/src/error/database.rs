//! Database error types.
//!
//! Provides the error type returned by every fallible PrimDB operation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::DataType;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Storage errors (0x0100 - 0x01FF)
    /// General I/O error while reading.
    Io = 0x0100,
    /// A persisted document could not be decoded.
    StorageCorrupt = 0x0104,
    /// A persisted document could not be written.
    StorageWriteFailure = 0x0105,

    // Schema errors (0x0200 - 0x02FF)
    /// Table or column not found.
    NotFound = 0x0200,
    /// Table name already taken.
    AlreadyExists = 0x0201,
    /// Bad table name, column name, type name, or duplicate column.
    InvalidSchema = 0x0202,

    // Data errors (0x0300 - 0x03FF)
    /// Wrong number of values for an insert.
    ArityMismatch = 0x0300,
    /// Value type disagrees with the column's declared type.
    TypeMismatch = 0x0301,
    /// No further row identifier can be assigned.
    IdExhausted = 0x0302,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Storage",
            0x02 => "Schema",
            0x03 => "Data",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for PrimDB.
///
/// Each variant carries the table, column and type details a caller needs
/// to tell failures apart without parsing the message.
///
/// # Example
///
/// ```rust
/// use primdb_common::error::{ErrorCode, PrimError};
///
/// let err = PrimError::TableNotFound { table: "users".into() };
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "table 'users' does not exist");
/// ```
#[derive(Debug, Error)]
pub enum PrimError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Storage Errors
    // ==========================================================================
    /// A persisted file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    StorageRead {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted file holds malformed JSON.
    #[error("file {} is corrupted or has an invalid format: {message}", .path.display())]
    StorageCorrupt {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// A persisted file could not be written or removed.
    #[error("failed to write {}: {source}", .path.display())]
    StorageWrite {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Schema Errors
    // ==========================================================================
    /// Table not found.
    #[error("table '{table}' does not exist")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// Column not found.
    #[error("column '{column}' does not exist in table '{table}'")]
    ColumnNotFound {
        /// The table name.
        table: String,
        /// The missing column.
        column: String,
    },

    /// Table already exists.
    #[error("table '{table}' already exists")]
    TableExists {
        /// The existing table.
        table: String,
    },

    /// Table name is empty or not an identifier.
    #[error("invalid table name '{name}'")]
    InvalidTableName {
        /// The rejected name.
        name: String,
    },

    /// Column name is empty or not an identifier.
    #[error("invalid column name '{column}' in table '{table}'")]
    InvalidColumnName {
        /// The table name.
        table: String,
        /// The rejected column name.
        column: String,
    },

    /// Column type is outside the supported set.
    #[error("invalid data type '{type_name}' for column '{column}' (supported: int, str, bool)")]
    UnknownType {
        /// The table name.
        table: String,
        /// The column name.
        column: String,
        /// The rejected type name.
        type_name: String,
    },

    /// The same column name appears twice (including the implicit `ID`).
    #[error("duplicate column name '{column}' in table '{table}'")]
    DuplicateColumn {
        /// The table name.
        table: String,
        /// The repeated column name.
        column: String,
    },

    // ==========================================================================
    // Data Errors
    // ==========================================================================
    /// Wrong number of values for an insert.
    #[error("table '{table}' expects {expected} values, got {actual}")]
    ArityMismatch {
        /// The table name.
        table: String,
        /// Number of non-ID columns.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Value type disagrees with the column's declared type.
    #[error("column '{column}' of table '{table}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// The table name.
        table: String,
        /// The offending column.
        column: String,
        /// Declared type.
        expected: DataType,
        /// Supplied type.
        actual: DataType,
    },

    /// The column cannot be assigned.
    #[error("column '{column}' of table '{table}' is read-only")]
    ReadOnlyColumn {
        /// The table name.
        table: String,
        /// The protected column.
        column: String,
    },

    /// An update supplied no assignments.
    #[error("update of table '{table}' has no assignments")]
    EmptySetClause {
        /// The table name.
        table: String,
    },

    /// The largest existing `ID` leaves no room for another row.
    #[error("table '{table}' has no identifiers left after {max_id}")]
    IdExhausted {
        /// The table name.
        table: String,
        /// Largest `ID` present.
        max_id: i64,
    },
}

impl PrimError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::InvalidConfig { .. } => ErrorCode::InvalidArgument,
            Self::StorageRead { .. } => ErrorCode::Io,
            Self::StorageCorrupt { .. } => ErrorCode::StorageCorrupt,
            Self::StorageWrite { .. } => ErrorCode::StorageWriteFailure,
            Self::TableNotFound { .. } | Self::ColumnNotFound { .. } => ErrorCode::NotFound,
            Self::TableExists { .. } => ErrorCode::AlreadyExists,
            Self::InvalidTableName { .. }
            | Self::InvalidColumnName { .. }
            | Self::UnknownType { .. }
            | Self::DuplicateColumn { .. } => ErrorCode::InvalidSchema,
            Self::ArityMismatch { .. } => ErrorCode::ArityMismatch,
            Self::IdExhausted { .. } => ErrorCode::IdExhausted,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::ReadOnlyColumn { .. } | Self::EmptySetClause { .. } => {
                ErrorCode::InvalidArgument
            }
        }
    }

    /// Returns true if a table or column was missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.code(), ErrorCode::NotFound)
    }

    /// Returns true if a table definition was rejected.
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::AlreadyExists | ErrorCode::InvalidSchema
        )
    }

    /// Returns true if the caller's request was rejected before any change.
    ///
    /// Storage and internal failures are not validation errors.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::Internal
                | ErrorCode::Unknown
                | ErrorCode::Io
                | ErrorCode::StorageCorrupt
                | ErrorCode::StorageWriteFailure
        )
    }

    /// Returns the table this error refers to, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::TableNotFound { table }
            | Self::ColumnNotFound { table, .. }
            | Self::TableExists { table }
            | Self::InvalidColumnName { table, .. }
            | Self::UnknownType { table, .. }
            | Self::DuplicateColumn { table, .. }
            | Self::ArityMismatch { table, .. }
            | Self::TypeMismatch { table, .. }
            | Self::ReadOnlyColumn { table, .. }
            | Self::EmptySetClause { table }
            | Self::IdExhausted { table, .. } => Some(table.as_str()),
            Self::InvalidTableName { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a corruption error for a file.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::StorageCorrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
