//! Storage Module
//!
//! Per-table files: metadata, heap file, and the layout that ties them
//! together.
//!
//! ## Heap File Format
//! ```text
//! ┌──────────────────┬─────────────────────────────┐
//! │ varint(len)      │ payload (len bytes)         │   live record
//! ├──────┬───────────┴──────┬──────────────────────┤
//! │ 0x00 │ varint(skip)     │ skip stale bytes     │   tombstone
//! └──────┴──────────────────┴──────────────────────┘
//! ```
//!
//! A tombstone occupies exactly the bytes of the record it replaced, so the
//! offset of every other record is unchanged.

mod catalog;
mod heap;
mod iterator;
mod meta;

pub use catalog::Catalog;
pub use heap::HeapFile;
pub use iterator::HeapScan;
pub use meta::{Column, TableMeta};

/// Length byte that marks a tombstoned entry
pub(crate) const TOMBSTONE_TAG: u8 = 0x00;
