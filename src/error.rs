//! Error types for PicoDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PicoError
pub type Result<T> = std::result::Result<T, PicoError>;

/// Unified error type for PicoDB operations
#[derive(Debug, Error)]
pub enum PicoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate entry for primary key: {column} = {value}")]
    DuplicateKey { column: String, value: String },

    #[error("Expected {expected} values, but got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("Cannot append an empty record")]
    EmptyRecord,

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("{operator} is not supported with the {mode} index")]
    UnsupportedOperator { operator: String, mode: String },

    #[error("Index corruption detected: {0}")]
    IndexCorruption(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Parse error: {0}")]
    Parse(String),
}
