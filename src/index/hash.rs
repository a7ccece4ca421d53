//! Hash Index
//!
//! Two-level exact-match index: column → value → offsets.
//!
//! ## File Format
//! ```text
//! ┌──────────────┬─────────────┬───────────┬──────────────────────┐
//! │ column\0     │ value\0     │ count u64 │ offset u64 × count   │  × groups
//! └──────────────┴─────────────┴───────────┴──────────────────────┘
//! ```
//! Integers are little-endian. Groups carry no ordering on disk.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{PicoError, Result};

/// column → (value → offsets in insertion order)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HashIndex {
    columns: HashMap<String, HashMap<String, Vec<u64>>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `offset` under `(column, value)`; duplicates are kept
    pub fn add(&mut self, column: &str, value: &str, offset: u64) {
        self.columns
            .entry(column.trim().to_string())
            .or_default()
            .entry(value.trim().to_string())
            .or_default()
            .push(offset);
    }

    /// Offsets recorded under `(column, value)`, empty if either is unknown
    pub fn find(&self, column: &str, value: &str) -> Vec<u64> {
        self.columns
            .get(column.trim())
            .and_then(|values| values.get(value.trim()))
            .cloned()
            .unwrap_or_default()
    }

    /// Remove one occurrence of `offset`; returns whether one was found.
    ///
    /// Empty groups are dropped so they are not persisted.
    pub fn remove(&mut self, column: &str, value: &str, offset: u64) -> bool {
        let column = column.trim();
        let value = value.trim();

        let Some(values) = self.columns.get_mut(column) else {
            return false;
        };
        let Some(offsets) = values.get_mut(value) else {
            return false;
        };
        let Some(pos) = offsets.iter().position(|&o| o == offset) else {
            return false;
        };

        offsets.remove(pos);
        if offsets.is_empty() {
            values.remove(value);
            if values.is_empty() {
                self.columns.remove(column);
            }
        }
        true
    }

    /// Total number of `(column, value, offset)` entries
    pub fn len(&self) -> usize {
        self.columns
            .values()
            .flat_map(|values| values.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize to the flat on-disk form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        for (column, values) in &self.columns {
            for (value, offsets) in values {
                put_cstring(&mut buf, column)?;
                put_cstring(&mut buf, value)?;
                buf.put_u64_le(offsets.len() as u64);
                for &offset in offsets {
                    buf.put_u64_le(offset);
                }
            }
        }
        Ok(buf.to_vec())
    }

    /// Replace the in-memory state with the groups in `bytes`
    pub fn load_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        self.clear();

        while bytes.has_remaining() {
            let column = get_cstring(&mut bytes)?;
            let value = get_cstring(&mut bytes)?;

            if bytes.remaining() < 8 {
                return Err(corrupt("missing offset count"));
            }
            let count = bytes.get_u64_le();
            if count > (bytes.remaining() / 8) as u64 {
                return Err(corrupt(&format!(
                    "{} offsets declared for {}={} but only {} bytes left",
                    count,
                    column,
                    value,
                    bytes.remaining()
                )));
            }

            let offsets = (0..count).map(|_| bytes.get_u64_le()).collect();
            self.columns.entry(column).or_default().insert(value, offsets);
        }

        Ok(())
    }

    /// Write the whole index to `path`
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes()?)?;
        tracing::debug!("Persisted hash index ({} entries) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load the index from `path`; a missing file yields an empty index
    pub fn load(path: &Path) -> Result<Self> {
        let mut index = Self::new();
        match fs::read(path) {
            Ok(bytes) => index.load_bytes(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No hash index file at {}, starting empty", path.display());
            }
            Err(e) => return Err(e.into()),
        }
        Ok(index)
    }
}

fn corrupt(msg: &str) -> PicoError {
    PicoError::IndexCorruption(format!("hash index: {}", msg))
}

fn put_cstring(buf: &mut BytesMut, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(corrupt(&format!("key {:?} contains a NUL byte", s)));
    }
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
    Ok(())
}

fn get_cstring(bytes: &mut &[u8]) -> Result<String> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("unterminated string"))?;
    let s = String::from_utf8_lossy(&bytes[..nul]).into_owned();
    bytes.advance(nul + 1);
    Ok(s)
}
