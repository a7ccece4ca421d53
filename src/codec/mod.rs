//! Codec Module
//!
//! Byte-level encodings shared by the heap file and the indexes.
//!
//! ## Record Format
//! ```text
//! ┌────────┬──────────────────┬────────┬──────────────────┬─────┐
//! │ Tag(1) │ Field body       │ Tag(1) │ Field body       │ ... │
//! └────────┴──────────────────┴────────┴──────────────────┴─────┘
//!
//!   'I'  varint(u64)
//!   'F'  f32, 4 bytes little-endian
//!   'B'  1 byte (0 or 1)
//!   'S'  varint(len) + len raw bytes
//! ```
//!
//! Fields are positional: column names live in the table metadata, never in
//! the record itself.

pub mod varint;
mod record;

use std::fmt;

pub use record::{decode_record, encode_record, encode_values, DecodedRecord};

/// Tag byte for an integer field
pub const TAG_INT: u8 = b'I';
/// Tag byte for a float field
pub const TAG_FLOAT: u8 = b'F';
/// Tag byte for a boolean field
pub const TAG_BOOL: u8 = b'B';
/// Tag byte for a string field
pub const TAG_STR: u8 = b'S';

// =============================================================================
// Field Values
// =============================================================================

/// One decoded field of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(u64),
    Float(f32),
    Bool(bool),
    Str(String),
}

impl Value {
    /// On-disk tag byte for this variant
    pub fn tag(&self) -> u8 {
        match self {
            Value::Int(_) => TAG_INT,
            Value::Float(_) => TAG_FLOAT,
            Value::Bool(_) => TAG_BOOL,
            Value::Str(_) => TAG_STR,
        }
    }
}

/// The display form doubles as the index key text for a stored field.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Column Types
// =============================================================================

/// Declared type of a column.
///
/// Only `INT`, `FLOAT` and `BOOL` are recognized; every other type name is
/// stored as a string and keeps its declared (uppercased) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text(String),
}

impl ColumnType {
    /// Parse a declared type name (case-insensitive)
    pub fn parse(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "INT" => ColumnType::Int,
            "FLOAT" => ColumnType::Float,
            "BOOL" => ColumnType::Bool,
            _ => ColumnType::Text(upper),
        }
    }

    /// Type name as written to the metadata file
    pub fn name(&self) -> &str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::Bool => "BOOL",
            ColumnType::Text(name) => name,
        }
    }

    /// Empty/zero value used when a field is missing
    pub fn default_value(&self) -> Value {
        match self {
            ColumnType::Int => Value::Int(0),
            ColumnType::Float => Value::Float(0.0),
            ColumnType::Bool => Value::Bool(false),
            ColumnType::Text(_) => Value::Str(String::new()),
        }
    }

    /// Convert user-supplied text into the stored value.
    ///
    /// Unparseable or empty numbers become zero; booleans are true only for
    /// `"true"` and `"1"`.
    pub fn value_from_text(&self, text: &str) -> Value {
        match self {
            ColumnType::Int => Value::Int(text.trim().parse().unwrap_or(0)),
            ColumnType::Float => Value::Float(text.trim().parse().unwrap_or(0.0)),
            ColumnType::Bool => Value::Bool(matches!(text.trim(), "true" | "1")),
            ColumnType::Text(_) => Value::Str(text.to_string()),
        }
    }

    /// Canonical index text for a lookup value.
    ///
    /// Values that parse as this column's type are rendered the way the stored
    /// field renders; anything else is used verbatim (trimmed), so it can only
    /// match a string column.
    pub fn lookup_text(&self, text: &str) -> String {
        let trimmed = text.trim();
        match self {
            ColumnType::Int => trimmed
                .parse::<u64>()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| trimmed.to_string()),
            ColumnType::Float => trimmed
                .parse::<f32>()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| trimmed.to_string()),
            ColumnType::Bool => match trimmed {
                "true" | "1" => "true".to_string(),
                "false" | "0" => "false".to_string(),
                other => other.to_string(),
            },
            ColumnType::Text(_) => trimmed.to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
