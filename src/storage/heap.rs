//! Heap File
//!
//! Append-only record file addressed by byte offset. Deletion rewrites the
//! record header in place as a tombstone that spans exactly the bytes of the
//! original entry, so every other offset stays valid.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::error::{PicoError, Result};

use super::iterator::HeapScan;
use super::TOMBSTONE_TAG;

/// Handle to one table's heap file.
///
/// Holds only the path; every operation opens and closes the file itself.
#[derive(Debug, Clone)]
pub struct HeapFile {
    path: PathBuf,
}

impl HeapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length in bytes (0 if the file does not exist yet)
    pub fn len(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Append `varint(len) || payload` and return the entry's offset
    ///
    /// Empty payloads are rejected: a zero length byte is the tombstone tag.
    pub fn append(&self, payload: &[u8]) -> Result<u64> {
        if payload.is_empty() {
            return Err(PicoError::EmptyRecord);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let offset = file.metadata()?.len();

        let mut entry = Vec::with_capacity(MAX_VARINT_LEN + payload.len());
        varint::encode_into(payload.len() as u64, &mut entry);
        entry.extend_from_slice(payload);
        file.write_all(&entry)?;

        tracing::debug!(
            "Appended {} byte record at offset {} in {}",
            payload.len(),
            offset,
            self.path.display()
        );
        Ok(offset)
    }

    /// Read the payload stored at `offset`.
    ///
    /// Returns an empty payload when the file is missing, the offset lies past
    /// the end, or the entry is a tombstone. A payload cut short by the end of
    /// the file is returned as far as it goes.
    pub fn read(&self, offset: u64) -> Result<Vec<u8>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Data file not found: {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if offset >= file.metadata()?.len() {
            return Ok(Vec::new());
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let Some((length, _)) = varint::read_from(&mut reader)? else {
            return Ok(Vec::new());
        };
        if length == 0 {
            return Ok(Vec::new());
        }

        let mut payload = Vec::new();
        reader.take(length).read_to_end(&mut payload)?;
        if (payload.len() as u64) < length {
            tracing::warn!(
                "Record at offset {} truncated: expected {} bytes, found {}",
                offset,
                length,
                payload.len()
            );
        }
        Ok(payload)
    }

    /// Logically delete the entry at `offset`.
    ///
    /// The entry is rewritten as `0x00 || varint(skip) || stale bytes` with
    /// `1 + width(skip) + skip` equal to the original span. Returns `false`
    /// when there is nothing live to delete at that offset.
    pub fn tombstone(&self, offset: u64) -> Result<bool> {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let file_len = file.metadata()?.len();
        if offset >= file_len {
            return Ok(false);
        }

        file.seek(SeekFrom::Start(offset))?;
        let Some((record_length, read_bytes)) = varint::read_from(&mut file)? else {
            return Ok(false);
        };
        if record_length == 0 {
            return Ok(false);
        }

        let span = match (read_bytes as u64).checked_add(record_length) {
            Some(span) if span <= file_len - offset => span,
            _ => {
                tracing::warn!(
                    "Record at offset {} in {} declares {} bytes past end of file; not tombstoned",
                    offset,
                    self.path.display(),
                    record_length
                );
                return Ok(false);
            }
        };
        let header = tombstone_header(span);

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&header)?;
        file.flush()?;

        tracing::debug!(
            "Tombstoned record at offset {} (span {} bytes) in {}",
            offset,
            span,
            self.path.display()
        );
        Ok(true)
    }

    /// Sequential scan over live records in file order
    pub fn scan(&self) -> Result<HeapScan> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HeapScan::empty()),
            Err(e) => return Err(e.into()),
        };
        let end_offset = file.metadata()?.len();
        Ok(HeapScan::new(BufReader::new(file), end_offset))
    }
}

/// Build the tombstone header for an entry spanning `span` bytes (`span >= 2`).
///
/// Picks the narrowest skip width `w` whose value `span - 1 - w` fits in `w`
/// bytes, padding the varint when the canonical encoding is shorter. Without
/// padding some spans (e.g. 130) have no exact solution.
pub(crate) fn tombstone_header(span: u64) -> Vec<u8> {
    let mut header = vec![TOMBSTONE_TAG];
    for width in 1..=MAX_VARINT_LEN {
        let Some(skip) = span.checked_sub(1 + width as u64) else {
            break;
        };
        if let Some(encoded) = varint::encode_padded(skip, width) {
            header.extend_from_slice(&encoded);
            return header;
        }
    }
    // Only reachable for span < 2, which no live entry has.
    header
}
