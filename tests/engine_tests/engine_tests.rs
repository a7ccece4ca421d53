//! Tests for Engine
//!
//! These tests verify:
//! - Table creation and schema errors
//! - Insert with value-count and primary-key checks
//! - Select through both index variants, including BETWEEN
//! - Delete tombstones records and cleans every index entry
//! - State survives reopening the engine

use picodb::codec::Value;
use picodb::engine::Engine;
use picodb::protocol::{parse_command, ColumnSpec, Predicate, Response};
use picodb::{Config, IndexMode, PicoError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine(mode: IndexMode) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path(), mode).unwrap();
    (temp_dir, engine)
}

fn run(engine: &Engine, statement: &str) -> Response {
    engine.execute(parse_command(statement).unwrap()).unwrap()
}

fn create_students(engine: &Engine) {
    run(
        engine,
        "CREATE TABLE student (id INT PRIMARY, name TEXT, age INT, gpa FLOAT)",
    );
}

fn insert_student(engine: &Engine, id: u64, name: &str, age: u64, gpa: &str) -> u64 {
    engine
        .insert(
            "student",
            &[id.to_string(), name.to_string(), age.to_string(), gpa.to_string()],
        )
        .unwrap()
}

fn ids(rows: &[picodb::protocol::Row]) -> Vec<u64> {
    rows.iter()
        .map(|row| match row.values[0] {
            Value::Int(id) => id,
            ref other => panic!("unexpected id value {:?}", other),
        })
        .collect()
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_open_creates_data_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("db");

    let config = Config::builder().data_dir(&data_dir).build();
    let engine = Engine::open(config).unwrap();

    assert!(data_dir.is_dir());
    assert_eq!(engine.data_dir(), data_dir.as_path());
    assert_eq!(engine.index_mode(), IndexMode::Hash);
}

#[test]
fn test_create_table_writes_metadata() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);

    let response = run(&engine, "CREATE TABLE student (id INT PRIMARY, name TEXT)");

    assert_eq!(
        response,
        Response::Created {
            table: "student".to_string(),
            primary_key: Some("id".to_string()),
        }
    );
    let meta_path = engine.catalog().meta_path("student");
    assert_eq!(
        std::fs::read_to_string(meta_path).unwrap(),
        "COLUMN: 2\nid INT PRIMARY\nname TEXT\n"
    );
    assert_eq!(engine.tables().unwrap(), vec!["student"]);
}

#[test]
fn test_create_table_twice_fails() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);

    let result = engine.create_table("student", &[ColumnSpec::new("x", "INT")]);

    assert!(matches!(result, Err(PicoError::TableExists(_))));
}

#[test]
fn test_create_table_with_two_primary_keys_fails() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);

    let result = engine.create_table(
        "t",
        &[
            ColumnSpec::new("a", "INT").primary(),
            ColumnSpec::new("b", "INT").primary(),
        ],
    );

    assert!(matches!(result, Err(PicoError::InvalidSchema(_))));
    assert!(!engine.catalog().table_exists("t"));
}

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_insert_unknown_table() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);

    let result = engine.insert("ghost", &["1"]);

    assert!(matches!(result, Err(PicoError::TableNotFound(_))));
    assert!(!engine.catalog().table_dir("ghost").exists());
}

#[test]
fn test_insert_wrong_value_count() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);

    let result = engine.insert("student", &["1", "Ann"]);

    assert!(matches!(
        result,
        Err(PicoError::ValueCount { expected: 4, got: 2 })
    ));
    assert_eq!(engine.catalog().heap("student").len().unwrap(), 0);
}

#[test]
fn test_insert_returns_increasing_offsets() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);

    let first = insert_student(&engine, 1, "Ann", 20, "3.5");
    let second = insert_student(&engine, 2, "Bob", 22, "3.1");

    assert_eq!(first, 0);
    assert!(second > first);
    assert!(engine.catalog().heap("student").len().unwrap() > second);
}

#[test]
fn test_duplicate_primary_key_is_rejected_without_writing() {
    for mode in [IndexMode::Hash, IndexMode::BPlusTree] {
        let (_temp, engine) = setup_temp_engine(mode);
        create_students(&engine);
        insert_student(&engine, 1, "Ann", 20, "3.5");
        let heap_len = engine.catalog().heap("student").len().unwrap();

        let result = engine.insert("student", &["1", "Other", "30", "2.0"]);

        assert!(
            matches!(result, Err(PicoError::DuplicateKey { ref column, ref value }) if column == "id" && value == "1"),
            "mode {}",
            mode
        );
        assert_eq!(engine.catalog().heap("student").len().unwrap(), heap_len);
    }
}

#[test]
fn test_duplicate_primary_key_uses_canonical_value() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 7, "Ann", 20, "3.5");

    let result = engine.insert("student", &[" 007 ", "Bob", "21", "3.0"]);

    assert!(matches!(result, Err(PicoError::DuplicateKey { .. })));
}

#[test]
fn test_table_without_primary_key_accepts_duplicates() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    run(&engine, "CREATE TABLE tags (tag TEXT)");

    engine.insert("tags", &["rust"]).unwrap();
    engine.insert("tags", &["rust"]).unwrap();

    let rows = engine.select("tags", &Predicate::eq("tag", "rust")).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_insert_rejects_nul_bytes() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    run(&engine, "CREATE TABLE tags (tag TEXT)");

    let result = engine.insert("tags", &["a\0b"]);

    assert!(matches!(result, Err(PicoError::Parse(_))));
    assert!(engine.catalog().heap("tags").is_empty().unwrap());
}

// =============================================================================
// Select Tests
// =============================================================================

#[test]
fn test_select_by_each_column() {
    for mode in [IndexMode::Hash, IndexMode::BPlusTree] {
        let (_temp, engine) = setup_temp_engine(mode);
        create_students(&engine);
        insert_student(&engine, 1, "Ann", 20, "3.5");
        insert_student(&engine, 2, "Bob", 22, "3.1");
        insert_student(&engine, 3, "Ann", 25, "3.9");

        assert_eq!(ids(&engine.select("student", &Predicate::eq("id", "2")).unwrap()), vec![2]);
        assert_eq!(
            ids(&engine.select("student", &Predicate::eq("name", "Ann")).unwrap()),
            vec![1, 3]
        );
        assert_eq!(ids(&engine.select("student", &Predicate::eq("gpa", "3.90")).unwrap()), vec![3]);
        assert!(engine
            .select("student", &Predicate::eq("name", "Zed"))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_select_returns_decoded_values() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    let offset = insert_student(&engine, 1, "Ann Lee", 20, "3.5");

    let rows = engine.select("student", &Predicate::eq("id", "1")).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].offset, offset);
    assert_eq!(
        rows[0].values,
        vec![
            Value::Int(1),
            Value::Str("Ann Lee".to_string()),
            Value::Int(20),
            Value::Float(3.5),
        ]
    );
}

#[test]
fn test_execute_select_reports_columns_and_rows() {
    for mode in [IndexMode::Hash, IndexMode::BPlusTree] {
        let (_temp, engine) = setup_temp_engine(mode);
        create_students(&engine);
        insert_student(&engine, 1, "Ann", 20, "3.5");
        let bo = insert_student(&engine, 2, "Bo", 21, "3.0");

        match run(&engine, "SELECT * FROM student WHERE name = Bo") {
            Response::Rows { columns, rows } => {
                assert_eq!(columns, vec!["id", "name", "age", "gpa"]);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].offset, bo);
                assert_eq!(ids(&rows), vec![2]);
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }
}

#[test]
fn test_execute_between_with_hash_checks_operator_before_table() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);

    let command = parse_command("SELECT * FROM nope WHERE id BETWEEN 1 AND 2").unwrap();
    let result = engine.execute(command);

    assert!(matches!(result, Err(PicoError::UnsupportedOperator { .. })));
}

#[test]
fn test_select_unknown_column_is_empty() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 20, "3.5");

    assert!(engine
        .select("student", &Predicate::eq("email", "x"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_between_with_hash_index_is_rejected() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 20, "3.5");

    let result = engine.select("student", &Predicate::between("age", "18", "25"));

    assert!(matches!(
        result,
        Err(PicoError::UnsupportedOperator { ref operator, ref mode }) if operator == "BETWEEN" && mode == "hash"
    ));
    // Nothing else touched: no B+Tree file appeared
    assert!(!engine.catalog().bptree_index_path("student").exists());
}

#[test]
fn test_between_with_bptree_index() {
    let (_temp, engine) = setup_temp_engine(IndexMode::BPlusTree);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 18, "3.5");
    insert_student(&engine, 2, "Bob", 21, "3.1");
    insert_student(&engine, 3, "Cid", 25, "3.9");
    insert_student(&engine, 4, "Dee", 30, "2.5");

    let rows = engine
        .select("student", &Predicate::between("age", "20", "25"))
        .unwrap();

    assert_eq!(ids(&rows), vec![2, 3]);
}

#[test]
fn test_between_uses_string_order() {
    let (_temp, engine) = setup_temp_engine(IndexMode::BPlusTree);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 9, "1.0");
    insert_student(&engine, 2, "Bob", 10, "1.0");
    insert_student(&engine, 3, "Cid", 100, "1.0");

    // "10" <= "100" <= "9"
    let rows = engine
        .select("student", &Predicate::between("age", "10", "9"))
        .unwrap();

    assert_eq!(ids(&rows), vec![2, 3, 1]);
}

#[test]
fn test_select_many_rows_with_bptree_splits() {
    let (_temp, engine) = setup_temp_engine(IndexMode::BPlusTree);
    create_students(&engine);
    for id in 0..60 {
        insert_student(&engine, id, if id % 2 == 0 { "even" } else { "odd" }, 20, "3.0");
    }

    let evens = engine.select("student", &Predicate::eq("name", "even")).unwrap();
    let all_twenty = engine.select("student", &Predicate::eq("age", "20")).unwrap();

    assert_eq!(ids(&evens), (0..60).step_by(2).collect::<Vec<u64>>());
    assert_eq!(all_twenty.len(), 60);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_rows_and_index_entries() {
    for mode in [IndexMode::Hash, IndexMode::BPlusTree] {
        let (_temp, engine) = setup_temp_engine(mode);
        create_students(&engine);
        insert_student(&engine, 1, "Ann", 20, "3.5");
        insert_student(&engine, 2, "Bob", 22, "3.1");
        let heap_len = engine.catalog().heap("student").len().unwrap();

        let deleted = engine.delete("student", &Predicate::eq("id", "1")).unwrap();

        assert_eq!(deleted, 1, "mode {}", mode);
        assert_eq!(engine.catalog().heap("student").len().unwrap(), heap_len);
        assert!(engine.select("student", &Predicate::eq("id", "1")).unwrap().is_empty());
        // Entries for the other columns of the deleted row are gone too
        assert!(engine.select("student", &Predicate::eq("name", "Ann")).unwrap().is_empty());
        assert!(engine.select("student", &Predicate::eq("gpa", "3.5")).unwrap().is_empty());
        assert_eq!(ids(&engine.select("student", &Predicate::eq("id", "2")).unwrap()), vec![2]);

        // The key is free again
        insert_student(&engine, 1, "Ann", 20, "3.5");
        assert_eq!(ids(&engine.select("student", &Predicate::eq("id", "1")).unwrap()), vec![1]);
    }
}

#[test]
fn test_delete_by_non_key_column() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 20, "3.5");
    insert_student(&engine, 2, "Ann", 22, "3.1");
    insert_student(&engine, 3, "Bob", 22, "3.1");

    assert_eq!(engine.delete("student", &Predicate::eq("name", "Ann")).unwrap(), 2);

    assert_eq!(ids(&engine.scan("student").unwrap()), vec![3]);
}

#[test]
fn test_delete_between_with_bptree() {
    let (_temp, engine) = setup_temp_engine(IndexMode::BPlusTree);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 18, "3.5");
    insert_student(&engine, 2, "Bob", 21, "3.1");
    insert_student(&engine, 3, "Cid", 25, "3.9");

    let deleted = engine
        .delete("student", &Predicate::between("age", "20", "29"))
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(ids(&engine.scan("student").unwrap()), vec![1]);
}

#[test]
fn test_delete_no_match() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 20, "3.5");

    let response = run(&engine, "DELETE FROM student WHERE id = 9");

    assert_eq!(response, Response::Deleted { count: 0 });
}

#[test]
fn test_delete_between_with_hash_is_rejected() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 1, "Ann", 20, "3.5");

    let result = engine.delete("student", &Predicate::between("age", "1", "99"));

    assert!(matches!(result, Err(PicoError::UnsupportedOperator { .. })));
    assert_eq!(engine.scan("student").unwrap().len(), 1);
}

// =============================================================================
// Scan / Persistence Tests
// =============================================================================

#[test]
fn test_show_lists_live_rows_in_heap_order() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    insert_student(&engine, 3, "Cid", 25, "3.9");
    insert_student(&engine, 1, "Ann", 20, "3.5");
    insert_student(&engine, 2, "Bob", 22, "3.1");
    engine.delete("student", &Predicate::eq("id", "1")).unwrap();

    let response = run(&engine, "SHOW TABLE student");

    match response {
        Response::Rows { columns, rows } => {
            assert_eq!(columns, vec!["id", "name", "age", "gpa"]);
            assert_eq!(ids(&rows), vec![3, 2]);
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_reopen_keeps_rows_and_index() {
    for mode in [IndexMode::Hash, IndexMode::BPlusTree] {
        let temp_dir = TempDir::new().unwrap();
        {
            let engine = Engine::open_path(temp_dir.path(), mode).unwrap();
            create_students(&engine);
            insert_student(&engine, 1, "Ann", 20, "3.5");
            insert_student(&engine, 2, "Bob", 22, "3.1");
        }

        let engine = Engine::open_path(temp_dir.path(), mode).unwrap();
        assert_eq!(ids(&engine.select("student", &Predicate::eq("name", "Bob")).unwrap()), vec![2]);
        assert!(matches!(
            engine.insert("student", &["2", "Dup", "1", "1.0"]),
            Err(PicoError::DuplicateKey { .. })
        ));
    }
}

#[test]
fn test_select_skips_stale_index_entries() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    create_students(&engine);
    let offset = insert_student(&engine, 1, "Ann", 20, "3.5");

    // Tombstone behind the index's back
    assert!(engine.catalog().heap("student").tombstone(offset).unwrap());

    assert!(engine.select("student", &Predicate::eq("id", "1")).unwrap().is_empty());
    assert_eq!(engine.delete("student", &Predicate::eq("id", "1")).unwrap(), 0);
}

#[test]
fn test_list_tables() {
    let (_temp, engine) = setup_temp_engine(IndexMode::Hash);
    assert_eq!(run(&engine, "SHOW TABLES"), Response::Tables(vec![]));

    run(&engine, "CREATE TABLE b (x INT)");
    run(&engine, "CREATE TABLE a (x INT)");

    assert_eq!(
        run(&engine, "SHOW TABLES"),
        Response::Tables(vec!["a".to_string(), "b".to_string()])
    );
}
