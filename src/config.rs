//! Configuration for PicoDB
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PicoError, Result};

/// Main configuration for a PicoDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {table}/
    ///           ├── {table}.meta     (column list)
    ///           ├── {table}.data     (heap file)
    ///           ├── {table}.hashidx  (hash index)
    ///           └── {table}.bptidx   (B+Tree index)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Which secondary index backs every lookup for the whole process
    pub index_mode: IndexMode,
}

/// Secondary index variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Exact-match hash index (no range queries)
    Hash,

    /// Ordered B+Tree index over `column##value` keys
    BPlusTree,
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexMode::Hash => write!(f, "hash"),
            IndexMode::BPlusTree => write!(f, "B+Tree"),
        }
    }
}

impl FromStr for IndexMode {
    type Err = PicoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" | "hashing" | "1" => Ok(IndexMode::Hash),
            "bptree" | "btree" | "bplustree" | "b+tree" | "2" => Ok(IndexMode::BPlusTree),
            other => Err(PicoError::Parse(format!("unknown index mode: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            index_mode: IndexMode::Hash,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all tables)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the active index variant
    pub fn index_mode(mut self, mode: IndexMode) -> Self {
        self.config.index_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
