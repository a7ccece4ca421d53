//! Command definitions
//!
//! Structured form of one statement, produced by the parser and consumed by
//! the engine.

use std::fmt;

/// One column in a `CREATE TABLE` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_name: String,
    pub primary: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

/// `WHERE` clause of a select or delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`
    Eq { column: String, value: String },

    /// `column BETWEEN low AND high` (inclusive, string order)
    Between {
        column: String,
        low: String,
        high: String,
    },
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Predicate::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Eq { column, .. } | Predicate::Between { column, .. } => column,
        }
    }

    /// Operator keyword, as used in error messages
    pub fn operator(&self) -> &'static str {
        match self {
            Predicate::Eq { .. } => "=",
            Predicate::Between { .. } => "BETWEEN",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq { column, value } => write!(f, "{} = {}", column, value),
            Predicate::Between { column, low, high } => {
                write!(f, "{} BETWEEN {} AND {}", column, low, high)
            }
        }
    }
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a table
    CreateTable {
        table: String,
        columns: Vec<ColumnSpec>,
    },

    /// Insert one row, values in column order
    Insert { table: String, values: Vec<String> },

    /// Select rows through the active index
    Select { table: String, predicate: Predicate },

    /// Delete rows found through the active index
    Delete { table: String, predicate: Predicate },

    /// Print every live row (full heap scan)
    Show { table: String },

    /// List all tables
    ListTables,
}

impl Command {
    /// Table the command targets, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Command::CreateTable { table, .. }
            | Command::Insert { table, .. }
            | Command::Select { table, .. }
            | Command::Delete { table, .. }
            | Command::Show { table } => Some(table),
            Command::ListTables => None,
        }
    }

    /// Statement keyword, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateTable { .. } => "CREATE",
            Command::Insert { .. } => "INSERT",
            Command::Select { .. } => "SELECT",
            Command::Delete { .. } => "DELETE",
            Command::Show { .. } => "SHOW",
            Command::ListTables => "SHOW TABLES",
        }
    }
}
