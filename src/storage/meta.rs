//! Table metadata
//!
//! Plain-text column list stored next to the heap file:
//!
//! ```text
//! COLUMN: 2
//! id INT PRIMARY
//! name TEXT
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::codec::ColumnType;
use crate::error::{PicoError, Result};

const COLUMN_HEADER: &str = "COLUMN:";
const PRIMARY_MARKER: &str = "PRIMARY";

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Schema of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<String>,
}

impl TableMeta {
    /// Build and validate a schema.
    ///
    /// Rejects empty column lists, duplicate column names and a primary key
    /// that names no column.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        primary_key: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(PicoError::InvalidSchema(format!(
                "table {} has no columns",
                name
            )));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(PicoError::InvalidSchema(format!(
                    "duplicate column {} in table {}",
                    column.name, name
                )));
            }
        }

        if let Some(pk) = &primary_key {
            if !seen.contains(pk.as_str()) {
                return Err(PicoError::InvalidSchema(format!(
                    "primary key {} is not a column of {}",
                    pk, name
                )));
            }
        }

        Ok(Self {
            name,
            columns,
            primary_key,
        })
    }

    /// Column types in declaration order (what the record codec needs)
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.ty.clone()).collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of the primary key column, if the table has one
    pub fn primary_index(&self) -> Option<usize> {
        self.primary_key
            .as_deref()
            .and_then(|pk| self.column_index(pk))
    }

    /// Render the metadata file contents
    pub fn to_text(&self) -> String {
        let mut out = format!("{} {}\n", COLUMN_HEADER, self.columns.len());
        for column in &self.columns {
            let _ = write!(out, "{} {}", column.name, column.ty);
            if self.primary_key.as_deref() == Some(column.name.as_str()) {
                let _ = write!(out, " {}", PRIMARY_MARKER);
            }
            out.push('\n');
        }
        out
    }

    /// Parse metadata file contents for table `name`
    pub fn from_text(name: &str, text: &str) -> Result<Self> {
        let invalid = |msg: String| PicoError::InvalidSchema(format!("{}.meta: {}", name, msg));

        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines
            .next()
            .ok_or_else(|| invalid("empty metadata file".to_string()))?;
        let count: usize = header
            .strip_prefix(COLUMN_HEADER)
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| invalid(format!("bad header line: {}", header)))?;

        let mut columns = Vec::with_capacity(count);
        let mut primary_key = None;
        for line in lines.by_ref().take(count) {
            let mut parts = line.split_whitespace();
            let (Some(col_name), Some(type_name)) = (parts.next(), parts.next()) else {
                return Err(invalid(format!("bad column line: {}", line)));
            };
            match parts.next() {
                None => {}
                Some(marker) if marker.eq_ignore_ascii_case(PRIMARY_MARKER) => {
                    if primary_key.is_some() {
                        return Err(invalid("more than one PRIMARY column".to_string()));
                    }
                    primary_key = Some(col_name.to_string());
                }
                Some(other) => {
                    return Err(invalid(format!("unexpected token {} in: {}", other, line)));
                }
            }
            columns.push(Column::new(col_name, ColumnType::parse(type_name)));
        }

        if columns.len() != count {
            return Err(invalid(format!(
                "declares {} columns but lists {}",
                count,
                columns.len()
            )));
        }

        Self::new(name, columns, primary_key)
    }

    /// Write the metadata file, creating the table directory if needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Read the metadata file; a missing file means the table does not exist
    pub fn read(name: &str, path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PicoError::TableNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_text(name, &text)
    }
}
