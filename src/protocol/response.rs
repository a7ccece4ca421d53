//! Response definitions
//!
//! Results of executed commands and their tabular text rendering.

use std::fmt;

use crate::codec::Value;

/// One decoded row and where it lives in the heap file
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub offset: u64,
    pub values: Vec<Value>,
}

/// Outcome of a successfully executed command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Table created
    Created {
        table: String,
        primary_key: Option<String>,
    },

    /// Row appended at this heap offset
    Inserted { offset: u64 },

    /// Matching rows with the table's column names
    Rows {
        columns: Vec<String>,
        rows: Vec<Row>,
    },

    /// Number of rows tombstoned
    Deleted { count: usize },

    /// Names of all tables
    Tables(Vec<String>),
}

impl Response {
    /// Rows carried by the response (empty for non-row responses)
    pub fn rows(&self) -> &[Row] {
        match self {
            Response::Rows { rows, .. } => rows,
            _ => &[],
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Created { table, primary_key } => {
                write!(f, "[OK] Table {} created successfully", table)?;
                if let Some(pk) = primary_key {
                    write!(f, "\n[INFO] Primary key -> {}", pk)?;
                }
                Ok(())
            }
            Response::Inserted { offset } => {
                write!(f, "[OK] Inserted successfully at offset {}", offset)
            }
            Response::Rows { columns, rows } => {
                if rows.is_empty() {
                    return write!(f, "[INFO] 0 matching records.");
                }
                write_table(f, columns, rows)
            }
            Response::Deleted { count: 0 } => {
                write!(f, "[INFO] No matching records found to delete.")
            }
            Response::Deleted { count } => write!(f, "[OK] Deleted {} record(s).", count),
            Response::Tables(tables) if tables.is_empty() => write!(f, "[INFO] No tables."),
            Response::Tables(tables) => write!(f, "{}", tables.join("\n")),
        }
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, columns: &[String], rows: &[Row]) -> fmt::Result {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values.iter().map(Value::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .chain(std::iter::once("+".to_string()))
        .collect();

    writeln!(f, "{}", rule)?;
    write_line(f, columns.iter().map(String::as_str), &widths)?;
    writeln!(f, "{}", rule)?;
    for row in &cells {
        write_line(f, row.iter().map(String::as_str), &widths)?;
    }
    write!(f, "{}", rule)?;
    write!(f, "\n({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" })
}

fn write_line<'a>(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    for (cell, width) in cells.zip(widths) {
        write!(f, "| {:<width$} ", cell, width = width)?;
    }
    writeln!(f, "|")
}
