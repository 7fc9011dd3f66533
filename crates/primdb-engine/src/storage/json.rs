//! JSON file storage.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use primdb_common::constants::{TABLE_FILE_EXTENSION, TEMP_FILE_SUFFIX};
use primdb_common::{PrimError, PrimResult, Row, StorageConfig};

use super::{Loaded, TableStorage};
use crate::catalog::{is_identifier, Registry};

/// File-based storage.
///
/// # Directory Structure
///
/// ```text
/// db_meta.json        # Registry: table name -> columns
/// data/
/// ├── users.json      # Rows of `users`
/// └── orders.json     # Rows of `orders`
/// ```
///
/// Documents are pretty-printed with two-space indentation and non-ASCII
/// text left unescaped. Each save writes `<file>.tmp` and renames it over
/// the target.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    /// Registry document.
    metadata_file: PathBuf,
    /// Directory of table documents.
    data_dir: PathBuf,
}

impl JsonStorage {
    /// Creates a storage, creating the data directory if needed.
    pub fn new(config: &StorageConfig) -> PrimResult<Self> {
        create_dir(&config.data_dir)?;
        if let Some(parent) = config
            .metadata_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            create_dir(parent)?;
        }

        Ok(Self {
            metadata_file: config.metadata_file.clone(),
            data_dir: config.data_dir.clone(),
        })
    }

    /// Opens a storage with the default layout under `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> PrimResult<Self> {
        Self::new(&primdb_common::DatabaseConfig::with_root(root).storage)
    }

    /// Returns the registry file path.
    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the data file path of a table.
    ///
    /// Names that are not identifiers are rejected so that a hand-edited
    /// registry cannot point outside the data directory.
    pub fn table_path(&self, table: &str) -> PrimResult<PathBuf> {
        if !is_identifier(table) {
            return Err(PrimError::InvalidTableName {
                name: table.to_string(),
            });
        }
        Ok(self.data_dir.join(format!("{table}.{TABLE_FILE_EXTENSION}")))
    }
}

impl TableStorage for JsonStorage {
    fn load_registry(&self) -> PrimResult<Loaded<Registry>> {
        read_document(&self.metadata_file)
    }

    fn save_registry(&self, registry: &Registry) -> PrimResult<()> {
        write_document(&self.metadata_file, registry)
    }

    fn load_table(&self, table: &str) -> PrimResult<Loaded<Vec<Row>>> {
        read_document(&self.table_path(table)?)
    }

    fn save_table(&self, table: &str, rows: &[Row]) -> PrimResult<()> {
        write_document(&self.table_path(table)?, rows)
    }

    fn remove_table(&self, table: &str) -> PrimResult<()> {
        let path = self.table_path(table)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PrimError::StorageWrite { path, source }),
        }
    }
}

fn create_dir(dir: &Path) -> PrimResult<()> {
    fs::create_dir_all(dir).map_err(|source| PrimError::StorageWrite {
        path: dir.to_path_buf(),
        source,
    })
}

/// Reads a JSON document, defaulting when it is missing or undecodable.
fn read_document<T>(path: &Path) -> PrimResult<Loaded<T>>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::clean(T::default())),
        Err(source) => {
            return Err(PrimError::StorageRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Loaded::clean(value)),
        Err(e) => Ok(Loaded::corrupt(T::default(), PrimError::corrupt(path, e))),
    }
}

/// Writes a JSON document via a temp file and rename.
fn write_document<T>(path: &Path, value: &T) -> PrimResult<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| PrimError::internal(format!("encoding {}: {e}", path.display())))?;

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, bytes).map_err(|source| PrimError::StorageWrite {
        path: tmp_path.clone(),
        source,
    })?;

    // Atomic rename
    fs::rename(&tmp_path, path).map_err(|source| PrimError::StorageWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}
