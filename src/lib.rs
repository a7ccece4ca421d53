//! # PicoDB
//!
//! A single-user, file-backed table store with:
//! - An append-only heap file per table, with in-place tombstones for deletes
//! - A compact tagged record encoding built on LEB128 varints
//! - A choice of secondary index: exact-match hashing or an order-4 B+Tree
//!   with range scans
//! - A small statement language driven from a REPL
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      REPL (picodb)                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  parse_command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        (one command at a time, index loaded per command)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌────────────┐ ┌───────────┐     ┌─────────────────┐
//!   │  Catalog   │ │ HeapFile  │     │   TableIndex    │
//!   │  (.meta)   │ │  (.data)  │     │ Hash │ B+Tree   │
//!   └────────────┘ └─────┬─────┘     └─────────────────┘
//!                        │
//!                        ▼
//!                 ┌─────────────┐
//!                 │    Codec    │
//!                 │ varint/rec  │
//!                 └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod index;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PicoError, Result};
pub use config::{Config, IndexMode};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PicoDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
