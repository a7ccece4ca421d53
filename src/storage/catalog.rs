//! Catalog
//!
//! Maps table names to their on-disk files.
//!
//! ## Responsibilities
//! - Create the data directory on startup
//! - Resolve per-table file paths
//! - Create and load table metadata
//! - Discover existing tables

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PicoError, Result};

use super::{HeapFile, TableMeta};

/// File layout rooted at the data directory
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Directory holding one sub-directory per table
    data_dir: PathBuf,
}

impl Catalog {
    const META_EXT: &'static str = "meta";
    const DATA_EXT: &'static str = "data";
    const HASH_INDEX_EXT: &'static str = "hashidx";
    const BPTREE_INDEX_EXT: &'static str = "bptidx";

    /// Open or create the data directory
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `{data_dir}/{table}`
    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.data_dir.join(table)
    }

    pub fn meta_path(&self, table: &str) -> PathBuf {
        self.table_file(table, Self::META_EXT)
    }

    pub fn data_path(&self, table: &str) -> PathBuf {
        self.table_file(table, Self::DATA_EXT)
    }

    pub fn hash_index_path(&self, table: &str) -> PathBuf {
        self.table_file(table, Self::HASH_INDEX_EXT)
    }

    pub fn bptree_index_path(&self, table: &str) -> PathBuf {
        self.table_file(table, Self::BPTREE_INDEX_EXT)
    }

    /// Heap file handle for a table
    pub fn heap(&self, table: &str) -> HeapFile {
        HeapFile::new(self.data_path(table))
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.meta_path(table).is_file()
    }

    /// Write metadata for a new table; fails if the table already exists
    pub fn create_table(&self, meta: &TableMeta) -> Result<()> {
        validate_table_name(&meta.name)?;
        if self.table_exists(&meta.name) {
            return Err(PicoError::TableExists(meta.name.clone()));
        }
        meta.write(&self.meta_path(&meta.name))
    }

    /// Load metadata; `TableNotFound` if the table was never created
    pub fn load_table(&self, table: &str) -> Result<TableMeta> {
        validate_table_name(table)?;
        TableMeta::read(table, &self.meta_path(table))
    }

    /// Names of all tables that have a metadata file, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.table_exists(&name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "student" + "data" → {data_dir}/student/student.data
    fn table_file(&self, table: &str, ext: &str) -> PathBuf {
        self.table_dir(table).join(format!("{}.{}", table, ext))
    }
}

/// Table names become directory names, so keep them to word characters
fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PicoError::InvalidSchema(format!(
            "invalid table name: {:?}",
            name
        )));
    }
    Ok(())
}
