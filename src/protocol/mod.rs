//! Protocol Module
//!
//! The statement language spoken by the REPL.
//!
//! ## Statements
//! - `CREATE TABLE t (id INT PRIMARY, name TEXT)`
//! - `INSERT INTO t VALUES (1, "Ann")`
//! - `SELECT * FROM t WHERE id = 1`
//! - `SELECT * FROM t WHERE id BETWEEN 1 AND 5` (B+Tree index only)
//! - `DELETE FROM t WHERE name = "Ann"`
//! - `SHOW TABLE t` / `SHOW TABLES`
//!
//! Parsing yields a [`Command`]; the engine answers with a [`Response`].

mod command;
mod parser;
mod response;

pub use command::{ColumnSpec, Command, Predicate};
pub use parser::parse_command;
pub use response::{Response, Row};
