//! Heap Scan
//!
//! Sequential iteration over the live entries of a heap file.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::codec::varint;
use crate::error::Result;

/// Iterator over `(offset, payload)` pairs of live records in file order.
///
/// Tombstones are skipped by their skip length. A truncated final entry ends
/// the scan instead of producing an error.
pub struct HeapScan {
    file: Option<BufReader<File>>,
    /// Stop reading when we reach this offset (file length at open time)
    end_offset: u64,
    /// Offset of the next entry header
    current_offset: u64,
}

impl HeapScan {
    pub(super) fn new(file: BufReader<File>, end_offset: u64) -> Self {
        Self {
            file: Some(file),
            end_offset,
            current_offset: 0,
        }
    }

    /// Scan over a heap file that does not exist yet
    pub(super) fn empty() -> Self {
        Self {
            file: None,
            end_offset: 0,
            current_offset: 0,
        }
    }

    fn read_entry(&mut self) -> Result<Option<(u64, Vec<u8>)>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        while self.current_offset < self.end_offset {
            let offset = self.current_offset;

            let Some((length, header_len)) = varint::read_from(file)? else {
                return Ok(None);
            };

            if length == 0 {
                // Tombstone: 0x00 || varint(skip) || skip stale bytes
                let Some((skip, skip_len)) = varint::read_from(file)? else {
                    return Ok(None);
                };
                let next = offset
                    .checked_add((header_len + skip_len) as u64)
                    .and_then(|n| n.checked_add(skip));
                match next {
                    Some(next) if next <= self.end_offset => {
                        file.seek(SeekFrom::Start(next))?;
                        self.current_offset = next;
                        continue;
                    }
                    _ => {
                        tracing::warn!(
                            "Tombstone at offset {} skips {} bytes past end of file",
                            offset,
                            skip
                        );
                        self.current_offset = self.end_offset;
                        return Ok(None);
                    }
                }
            }

            let entry_end = offset
                .checked_add(header_len as u64)
                .and_then(|end| end.checked_add(length));
            let entry_end = match entry_end {
                Some(end) if end <= self.end_offset => end,
                _ => {
                    tracing::warn!(
                        "Truncated heap entry at offset {}: declares {} bytes, file ends at {}",
                        offset,
                        length,
                        self.end_offset
                    );
                    self.current_offset = self.end_offset;
                    return Ok(None);
                }
            };

            let mut payload = vec![0u8; length as usize];
            file.read_exact(&mut payload)?;
            self.current_offset = entry_end;
            return Ok(Some((offset, payload)));
        }

        Ok(None)
    }
}

impl Iterator for HeapScan {
    type Item = Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.file = None;
                None
            }
            Err(e) => {
                self.file = None;
                Some(Err(e))
            }
        }
    }
}
