//! Engine Module
//!
//! Executes commands against the table files.
//!
//! ## Responsibilities
//! - Create tables (metadata only)
//! - Insert: encode, append to the heap, index every column
//! - Select/Delete: find offsets through the active index, read and decode
//!   records, tombstone on delete
//! - Show: full heap scan
//!
//! Every command that touches an index loads it at the start and writes it
//! back whole at the end. Nothing is cached between commands.

use std::collections::HashSet;
use std::path::Path;

use crate::codec::{decode_record, encode_values, ColumnType, Value};
use crate::config::{Config, IndexMode};
use crate::error::{PicoError, Result};
use crate::index::TableIndex;
use crate::protocol::{ColumnSpec, Command, Predicate, Response, Row};
use crate::storage::{Catalog, Column, TableMeta};

/// The table store
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path layout of the data directory
    catalog: Catalog,
}

impl Engine {
    /// Open an engine rooted at `config.data_dir`, creating the directory
    pub fn open(config: Config) -> Result<Self> {
        let catalog = Catalog::open(&config.data_dir)?;
        tracing::debug!(
            "Engine opened at {} with {} index",
            config.data_dir.display(),
            config.index_mode
        );
        Ok(Self { config, catalog })
    }

    /// Open with a path (convenience method)
    pub fn open_path(path: &Path, index_mode: IndexMode) -> Result<Self> {
        let config = Config::builder()
            .data_dir(path)
            .index_mode(index_mode)
            .build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Response> {
        tracing::trace!("Executing {}", command.name());
        match command {
            Command::CreateTable { table, columns } => {
                let meta = self.create_table(&table, &columns)?;
                Ok(Response::Created {
                    table: meta.name,
                    primary_key: meta.primary_key,
                })
            }
            Command::Insert { table, values } => {
                let offset = self.insert(&table, &values)?;
                Ok(Response::Inserted { offset })
            }
            Command::Select { table, predicate } => {
                self.check_operator(&predicate)?;
                let meta = self.catalog.load_table(&table)?;
                let rows = self.select_rows(&meta, &predicate)?;
                Ok(Response::Rows {
                    columns: meta.column_names(),
                    rows,
                })
            }
            Command::Delete { table, predicate } => {
                let count = self.delete(&table, &predicate)?;
                Ok(Response::Deleted { count })
            }
            Command::Show { table } => {
                let meta = self.catalog.load_table(&table)?;
                let rows = self.scan_rows(&meta)?;
                Ok(Response::Rows {
                    columns: meta.column_names(),
                    rows,
                })
            }
            Command::ListTables => Ok(Response::Tables(self.catalog.tables()?)),
        }
    }

    /// Create a table from its column specs
    pub fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> Result<TableMeta> {
        let primaries: Vec<&ColumnSpec> = columns.iter().filter(|c| c.primary).collect();
        if primaries.len() > 1 {
            return Err(PicoError::InvalidSchema(format!(
                "table {} declares {} PRIMARY columns",
                table,
                primaries.len()
            )));
        }

        let meta = TableMeta::new(
            table,
            columns
                .iter()
                .map(|c| Column::new(&c.name, ColumnType::parse(&c.type_name)))
                .collect(),
            primaries.first().map(|c| c.name.clone()),
        )?;
        self.catalog.create_table(&meta)?;

        tracing::info!(
            "Created table {} with {} columns (primary key: {})",
            meta.name,
            meta.columns.len(),
            meta.primary_key.as_deref().unwrap_or("none")
        );
        Ok(meta)
    }

    /// Insert one row and return its heap offset
    ///
    /// Steps:
    /// 1. Check the value count against the schema
    /// 2. Reject a duplicate primary key (nothing is written)
    /// 3. Append the encoded record to the heap
    /// 4. Index every column and persist the index
    pub fn insert<S: AsRef<str>>(&self, table: &str, values: &[S]) -> Result<u64> {
        let meta = self.catalog.load_table(table)?;

        if values.len() != meta.columns.len() {
            return Err(PicoError::ValueCount {
                expected: meta.columns.len(),
                got: values.len(),
            });
        }
        if values.iter().any(|v| v.as_ref().contains('\0')) {
            return Err(PicoError::Parse("values must not contain NUL bytes".to_string()));
        }

        let stored: Vec<Value> = meta
            .columns
            .iter()
            .zip(values)
            .map(|(column, text)| column.ty.value_from_text(text.as_ref().trim()))
            .collect();

        let mut index = TableIndex::open(&self.catalog, table, self.config.index_mode)?;

        if let Some(pk) = meta.primary_index() {
            let column = &meta.columns[pk];
            let key = stored[pk].to_string();
            if !index.lookup(&column.name, &key).is_empty() {
                return Err(PicoError::DuplicateKey {
                    column: column.name.clone(),
                    value: key,
                });
            }
        }

        let offset = self.catalog.heap(table).append(&encode_values(&stored))?;

        for (column, value) in meta.columns.iter().zip(&stored) {
            index.insert(&column.name, &value.to_string(), offset);
        }
        index.persist()?;

        tracing::debug!("Inserted row into {} at offset {}", table, offset);
        Ok(offset)
    }

    /// Rows matching `predicate`, in index order
    pub fn select(&self, table: &str, predicate: &Predicate) -> Result<Vec<Row>> {
        self.check_operator(predicate)?;
        let meta = self.catalog.load_table(table)?;
        self.select_rows(&meta, predicate)
    }

    /// Delete rows matching `predicate`; returns how many were tombstoned
    ///
    /// Each matching record is decoded first so that every index entry it
    /// produced on insert can be removed.
    pub fn delete(&self, table: &str, predicate: &Predicate) -> Result<usize> {
        self.check_operator(predicate)?;
        let meta = self.catalog.load_table(table)?;

        let mut index = TableIndex::open(&self.catalog, table, self.config.index_mode)?;
        let offsets = find_offsets(&meta, &index, predicate)?;
        if offsets.is_empty() {
            return Ok(0);
        }

        let heap = self.catalog.heap(table);
        let types = meta.column_types();
        let mut deleted = 0;
        for offset in offsets {
            let payload = heap.read(offset)?;
            if payload.is_empty() {
                continue;
            }
            let row = decode_row(table, offset, &payload, &types);

            if !heap.tombstone(offset)? {
                continue;
            }
            for (column, value) in meta.columns.iter().zip(&row.values) {
                if !index.remove(&column.name, &value.to_string(), offset) {
                    tracing::warn!(
                        "No index entry {}={} for offset {} in {}",
                        column.name,
                        value,
                        offset,
                        table
                    );
                }
            }
            deleted += 1;
        }

        index.persist()?;
        tracing::info!("Deleted {} record(s) from {} where {}", deleted, table, predicate);
        Ok(deleted)
    }

    /// Every live row, in heap order
    pub fn scan(&self, table: &str) -> Result<Vec<Row>> {
        let meta = self.catalog.load_table(table)?;
        self.scan_rows(&meta)
    }

    /// Names of all tables
    pub fn tables(&self) -> Result<Vec<String>> {
        self.catalog.tables()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the file layout
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index_mode(&self) -> IndexMode {
        self.config.index_mode
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Range predicates need the B+Tree; reject them before any index is read
    fn check_operator(&self, predicate: &Predicate) -> Result<()> {
        if matches!(predicate, Predicate::Between { .. })
            && self.config.index_mode == IndexMode::Hash
        {
            return Err(PicoError::UnsupportedOperator {
                operator: predicate.operator().to_string(),
                mode: self.config.index_mode.to_string(),
            });
        }
        Ok(())
    }

    fn select_rows(&self, meta: &TableMeta, predicate: &Predicate) -> Result<Vec<Row>> {
        let table = meta.name.as_str();
        let index = TableIndex::open(&self.catalog, table, self.config.index_mode)?;
        let offsets = find_offsets(meta, &index, predicate)?;

        let heap = self.catalog.heap(table);
        let types = meta.column_types();
        let mut rows = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let payload = heap.read(offset)?;
            if payload.is_empty() {
                tracing::debug!("Index points at empty entry {} in {}", offset, table);
                continue;
            }
            rows.push(decode_row(table, offset, &payload, &types));
        }

        Ok(rows)
    }

    fn scan_rows(&self, meta: &TableMeta) -> Result<Vec<Row>> {
        let table = meta.name.as_str();
        let types = meta.column_types();

        let mut rows = Vec::new();
        for entry in self.catalog.heap(table).scan()? {
            let (offset, payload) = entry?;
            rows.push(decode_row(table, offset, &payload, &types));
        }
        Ok(rows)
    }
}

/// Offsets matching `predicate`, first occurrence order, no repeats
fn find_offsets(meta: &TableMeta, index: &TableIndex, predicate: &Predicate) -> Result<Vec<u64>> {
    let lookup_text = |value: &str| match meta.column(predicate.column()) {
        Some(column) => column.ty.lookup_text(value),
        None => value.trim().to_string(),
    };

    let offsets = match predicate {
        Predicate::Eq { column, value } => index.lookup(column, &lookup_text(value)),
        Predicate::Between { column, low, high } => {
            index.range(column, &lookup_text(low), &lookup_text(high))?
        }
    };

    let mut seen = HashSet::new();
    Ok(offsets.into_iter().filter(|o| seen.insert(*o)).collect())
}

fn decode_row(table: &str, offset: u64, payload: &[u8], types: &[ColumnType]) -> Row {
    let decoded = decode_record(payload, types);
    if !decoded.is_complete() {
        tracing::warn!(
            "Record at offset {} in {} is truncated: recovered {} of {} fields",
            offset,
            table,
            decoded.recovered,
            types.len()
        );
    }
    Row {
        offset,
        values: decoded.into_values(),
    }
}
