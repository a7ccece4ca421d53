//! Tests for the record codec
//!
//! These tests verify:
//! - Exact byte layout per field type
//! - Value conversion from text (unparseable numbers, booleans, missing values)
//! - Permissive decoding of truncated and garbled payloads
//! - Decoding by the tag present rather than the declared type

use picodb::codec::{decode_record, encode_record, encode_values, ColumnType, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn text() -> ColumnType {
    ColumnType::Text("TEXT".to_string())
}

fn student_columns() -> Vec<ColumnType> {
    vec![ColumnType::Int, text(), ColumnType::Float, ColumnType::Bool]
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_int_and_string() {
    let bytes = encode_record(&[ColumnType::Int, text()], &["5", "Ann"]);
    assert_eq!(bytes, vec![b'I', 0x05, b'S', 0x03, b'A', b'n', b'n']);
}

#[test]
fn test_encode_float_little_endian() {
    let bytes = encode_record(&[ColumnType::Float], &["1.5"]);
    let mut expected = vec![b'F'];
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn test_encode_bool_values() {
    let columns = [ColumnType::Bool, ColumnType::Bool, ColumnType::Bool, ColumnType::Bool];
    let bytes = encode_record(&columns, &["true", "1", "false", "yes"]);
    assert_eq!(bytes, vec![b'B', 1, b'B', 1, b'B', 0, b'B', 0]);
}

#[test]
fn test_encode_unparseable_int_is_zero() {
    let bytes = encode_record(&[ColumnType::Int, ColumnType::Int], &["abc", ""]);
    assert_eq!(bytes, vec![b'I', 0x00, b'I', 0x00]);
}

#[test]
fn test_encode_missing_values_use_defaults() {
    let bytes = encode_record(&[ColumnType::Int, text()], &["7"]);
    assert_eq!(bytes, vec![b'I', 0x07, b'S', 0x00]);
}

#[test]
fn test_encode_unknown_type_as_string() {
    let varchar = ColumnType::parse("varchar");
    assert_eq!(varchar, ColumnType::Text("VARCHAR".to_string()));

    let bytes = encode_record(&[varchar], &["42"]);
    assert_eq!(bytes, vec![b'S', 0x02, b'4', b'2']);
}

#[test]
fn test_encode_values_matches_encode_record() {
    let columns = student_columns();
    let from_text = encode_record(&columns, &["1", "Ann", "88.5", "true"]);
    let from_values = encode_values(&[
        Value::Int(1),
        Value::Str("Ann".to_string()),
        Value::Float(88.5),
        Value::Bool(true),
    ]);
    assert_eq!(from_text, from_values);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_full_record() {
    let columns = student_columns();
    let bytes = encode_record(&columns, &["12", "Ann Lee", "3.25", "1"]);

    let decoded = decode_record(&bytes, &columns);

    assert!(decoded.is_complete());
    assert_eq!(
        decoded.values,
        vec![
            Value::Int(12),
            Value::Str("Ann Lee".to_string()),
            Value::Float(3.25),
            Value::Bool(true),
        ]
    );
}

#[test]
fn test_decode_empty_payload_gives_defaults() {
    let columns = student_columns();
    let decoded = decode_record(&[], &columns);

    assert_eq!(decoded.recovered, 0);
    assert_eq!(
        decoded.values,
        vec![
            Value::Int(0),
            Value::Str(String::new()),
            Value::Float(0.0),
            Value::Bool(false),
        ]
    );
}

#[test]
fn test_decode_truncated_string_keeps_earlier_fields() {
    let columns = vec![ColumnType::Int, text()];
    let mut bytes = encode_record(&columns, &["9", "abcdef"]);
    bytes.truncate(bytes.len() - 3);

    let decoded = decode_record(&bytes, &columns);

    assert_eq!(decoded.recovered, 1);
    assert!(!decoded.is_complete());
    assert_eq!(decoded.values, vec![Value::Int(9), Value::Str(String::new())]);
}

#[test]
fn test_decode_truncated_float() {
    let columns = vec![ColumnType::Float, ColumnType::Int];
    let bytes = vec![b'F', 0x00, 0x00];

    let decoded = decode_record(&bytes, &columns);

    assert_eq!(decoded.recovered, 0);
    assert_eq!(decoded.values, vec![Value::Float(0.0), Value::Int(0)]);
}

#[test]
fn test_decode_unknown_tag_stops() {
    let columns = vec![ColumnType::Int, ColumnType::Int];
    let bytes = vec![b'I', 0x03, b'X', 0x04];

    let decoded = decode_record(&bytes, &columns);

    assert_eq!(decoded.recovered, 1);
    assert_eq!(decoded.values, vec![Value::Int(3), Value::Int(0)]);
}

#[test]
fn test_decode_uses_present_tag() {
    // Declared INT but stored as a string
    let bytes = encode_values(&[Value::Str("hi".to_string())]);
    let decoded = decode_record(&bytes, &[ColumnType::Int]);

    assert!(decoded.is_complete());
    assert_eq!(decoded.values, vec![Value::Str("hi".to_string())]);
}

#[test]
fn test_decode_ignores_extra_fields() {
    let bytes = encode_values(&[Value::Int(1), Value::Int(2)]);
    let decoded = decode_record(&bytes, &[ColumnType::Int]);

    assert!(decoded.is_complete());
    assert_eq!(decoded.into_values(), vec![Value::Int(1)]);
}

// =============================================================================
// Value Text Tests
// =============================================================================

#[test]
fn test_value_display_is_canonical() {
    assert_eq!(Value::Int(7).to_string(), "7");
    assert_eq!(Value::Float(88.5).to_string(), "88.5");
    assert_eq!(Value::Float(3.0).to_string(), "3");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Str("Ann".to_string()).to_string(), "Ann");
}

#[test]
fn test_lookup_text_matches_stored_form() {
    assert_eq!(ColumnType::Int.lookup_text(" 007 "), "7");
    assert_eq!(ColumnType::Float.lookup_text("3.0"), "3");
    assert_eq!(ColumnType::Bool.lookup_text("1"), "true");
    assert_eq!(ColumnType::Int.lookup_text("abc"), "abc");
    assert_eq!(text().lookup_text("  Ann "), "Ann");
}
