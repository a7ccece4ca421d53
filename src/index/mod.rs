//! Index Module
//!
//! Secondary indexes mapping column values to heap offsets.
//!
//! ## Variants
//! - [`HashIndex`]: column → value → offsets, exact match only
//! - [`BPlusTree`]: one ordered tree over `column##value` keys, supports
//!   `BETWEEN` range scans
//!
//! ## Lifecycle
//! An index is loaded from disk at the start of a command, mutated in memory,
//! and written back whole at the end. [`TableIndex`] is the handle that
//! carries it through one command.

pub mod bptree;
mod hash;

use std::path::PathBuf;

pub use bptree::{BPlusTree, MAX_KEYS, ORDER};
pub use hash::HashIndex;

use crate::config::IndexMode;
use crate::error::{PicoError, Result};
use crate::storage::Catalog;

/// Separator between column name and value in B+Tree keys
pub const KEY_SEPARATOR: &str = "##";

/// Build the composite B+Tree key `column##value`
pub fn composite_key(column: &str, value: &str) -> String {
    format!("{}{}{}", column, KEY_SEPARATOR, value)
}

/// The active index of one table, loaded for the duration of a command
#[derive(Debug)]
pub struct TableIndex {
    path: PathBuf,
    kind: IndexKind,
}

#[derive(Debug)]
enum IndexKind {
    Hash(HashIndex),
    BPlusTree(BPlusTree),
}

impl TableIndex {
    /// Load the index for `table` in the given mode.
    ///
    /// A missing index file is an empty index (first use of a table).
    pub fn open(catalog: &Catalog, table: &str, mode: IndexMode) -> Result<Self> {
        let (path, kind) = match mode {
            IndexMode::Hash => {
                let path = catalog.hash_index_path(table);
                let index = HashIndex::load(&path)?;
                (path, IndexKind::Hash(index))
            }
            IndexMode::BPlusTree => {
                let path = catalog.bptree_index_path(table);
                let tree = BPlusTree::load(&path)?;
                (path, IndexKind::BPlusTree(tree))
            }
        };
        Ok(Self { path, kind })
    }

    pub fn mode(&self) -> IndexMode {
        match self.kind {
            IndexKind::Hash(_) => IndexMode::Hash,
            IndexKind::BPlusTree(_) => IndexMode::BPlusTree,
        }
    }

    /// Offsets of rows whose `column` equals `value`
    pub fn lookup(&self, column: &str, value: &str) -> Vec<u64> {
        match &self.kind {
            IndexKind::Hash(index) => index.find(column, value),
            IndexKind::BPlusTree(tree) => tree.search(&composite_key(column, value)),
        }
    }

    /// Offsets of rows whose `column` lies in `[low, high]` (string order).
    ///
    /// Only the B+Tree supports ranges.
    pub fn range(&self, column: &str, low: &str, high: &str) -> Result<Vec<u64>> {
        match &self.kind {
            IndexKind::Hash(_) => Err(PicoError::UnsupportedOperator {
                operator: "BETWEEN".to_string(),
                mode: IndexMode::Hash.to_string(),
            }),
            IndexKind::BPlusTree(tree) => Ok(tree.range_search(
                &composite_key(column, low),
                &composite_key(column, high),
            )),
        }
    }

    pub fn insert(&mut self, column: &str, value: &str, offset: u64) {
        match &mut self.kind {
            IndexKind::Hash(index) => index.add(column, value, offset),
            IndexKind::BPlusTree(tree) => tree.insert(&composite_key(column, value), offset),
        }
    }

    /// Remove one `(column, value) → offset` entry
    pub fn remove(&mut self, column: &str, value: &str, offset: u64) -> bool {
        match &mut self.kind {
            IndexKind::Hash(index) => index.remove(column, value, offset),
            IndexKind::BPlusTree(tree) => tree.remove(&composite_key(column, value), offset),
        }
    }

    /// Write the whole index back to its file
    pub fn persist(&self) -> Result<()> {
        match &self.kind {
            IndexKind::Hash(index) => index.persist(&self.path),
            IndexKind::BPlusTree(tree) => tree.persist(&self.path),
        }
    }
}
