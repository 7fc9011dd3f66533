//! Database configuration structures.
//!
//! These structures define where PrimDB keeps its files and whether reads
//! are memoized.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_METADATA_FILE};
use crate::error::{PrimError, PrimResult};

/// Main database configuration.
///
/// # Example
///
/// ```rust
/// use primdb_common::config::DatabaseConfig;
///
/// let config = DatabaseConfig::default();
/// assert_eq!(config.storage.metadata_file.to_str(), Some("db_meta.json"));
/// assert!(config.cache.enabled);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File locations.
    pub storage: StorageConfig,

    /// Read cache configuration.
    pub cache: CacheConfig,
}

impl DatabaseConfig {
    /// Creates a configuration with both files placed under `root`.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            storage: StorageConfig {
                metadata_file: root.join(DEFAULT_METADATA_FILE),
                data_dir: root.join(DEFAULT_DATA_DIR),
            },
            cache: CacheConfig::default(),
        }
    }

    /// Creates a configuration for tests, rooted in a scratch directory.
    #[must_use]
    pub fn for_testing(root: impl AsRef<Path>) -> Self {
        Self::with_root(root)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> PrimResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| PrimError::StorageRead {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PrimError::invalid_config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> PrimResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PrimError::invalid_config(e.to_string()))?;

        let write_err = |source| PrimError::StorageWrite {
            path: path.to_path_buf(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        std::fs::write(path, content).map_err(write_err)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> PrimResult<()> {
        let storage = &self.storage;

        if storage.metadata_file.as_os_str().is_empty() {
            return Err(PrimError::invalid_config("storage.metadata_file must not be empty"));
        }

        if storage.data_dir.as_os_str().is_empty() {
            return Err(PrimError::invalid_config("storage.data_dir must not be empty"));
        }

        // A metadata file inside the data directory would be read back as a table.
        if storage.metadata_file.parent() == Some(storage.data_dir.as_path()) {
            return Err(PrimError::invalid_config(
                "storage.metadata_file must not live directly inside storage.data_dir",
            ));
        }

        Ok(())
    }
}

/// Storage file locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the metadata (registry) document.
    /// Default: `db_meta.json`
    pub metadata_file: PathBuf,

    /// Directory holding one `<table>.json` file per table.
    /// Default: `data`
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// Read cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize table scans between mutations.
    /// Default: true
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CacheConfig {
    /// A configuration that retains nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}
