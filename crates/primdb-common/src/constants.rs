//! System-wide constants for PrimDB.

// =============================================================================
// Schema Constants
// =============================================================================

/// Name of the identity column every table owns.
///
/// The column is injected at the front of every schema and is never supplied
/// by callers on insert.
pub const ID_COLUMN: &str = "ID";

/// Smallest identifier ever assigned to a row.
pub const FIRST_ROW_ID: i64 = 1;

// =============================================================================
// Storage Constants
// =============================================================================

/// Default metadata (registry) file name.
pub const DEFAULT_METADATA_FILE: &str = "db_meta.json";

/// Default directory holding per-table data files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Extension of per-table data files.
pub const TABLE_FILE_EXTENSION: &str = "json";

/// Suffix appended to a file path while it is being rewritten.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";
