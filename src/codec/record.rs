//! Record codec
//!
//! Encodes one row as a tagged sequence of typed fields and decodes it back
//! permissively: short or garbled input never fails, it yields a partial
//! record instead.

use bytes::{BufMut, BytesMut};

use super::varint;
use super::{ColumnType, Value, TAG_BOOL, TAG_FLOAT, TAG_INT, TAG_STR};

/// Result of decoding a record against a column list
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// One value per column; unrecovered columns hold their type's default
    pub values: Vec<Value>,

    /// Number of leading columns that decoded completely
    pub recovered: usize,
}

impl DecodedRecord {
    /// True when every column was present in the bytes
    pub fn is_complete(&self) -> bool {
        self.recovered == self.values.len()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Encode textual values against the declared column types.
///
/// Missing trailing values encode as the column's empty/zero default.
pub fn encode_record<S: AsRef<str>>(columns: &[ColumnType], values: &[S]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for (i, column) in columns.iter().enumerate() {
        let text = values.get(i).map(|v| v.as_ref()).unwrap_or("");
        put_value(&mut buf, &column.value_from_text(text));
    }
    buf.to_vec()
}

/// Encode already-typed values
pub fn encode_values(values: &[Value]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for value in values {
        put_value(&mut buf, value);
    }
    buf.to_vec()
}

fn put_value(buf: &mut BytesMut, value: &Value) {
    buf.put_u8(value.tag());
    match value {
        Value::Int(v) => varint::encode_into(*v, buf),
        Value::Float(v) => buf.put_f32_le(*v),
        Value::Bool(v) => buf.put_u8(u8::from(*v)),
        Value::Str(s) => {
            varint::encode_into(s.len() as u64, buf);
            buf.put_slice(s.as_bytes());
        }
    }
}

/// Outcome of reading a single field
enum Field {
    Complete(Value),
    /// Tag was read but the body ran past the end of the buffer
    Truncated(Value),
    /// No bytes left, or an unknown tag
    Absent,
}

/// Decode a record.
///
/// Each field is decoded by the tag actually present in the bytes, not the
/// declared column type. Once a field is truncated or absent, it and every
/// following column fall back to defaults.
pub fn decode_record(bytes: &[u8], columns: &[ColumnType]) -> DecodedRecord {
    let mut values = Vec::with_capacity(columns.len());
    let mut recovered = 0;
    let mut pos = 0;
    let mut exhausted = false;

    for column in columns {
        if exhausted {
            values.push(column.default_value());
            continue;
        }

        match read_field(bytes, &mut pos) {
            Field::Complete(value) => {
                values.push(value);
                recovered += 1;
            }
            Field::Truncated(value) => {
                values.push(value);
                exhausted = true;
            }
            Field::Absent => {
                values.push(column.default_value());
                exhausted = true;
            }
        }
    }

    DecodedRecord { values, recovered }
}

fn read_field(bytes: &[u8], pos: &mut usize) -> Field {
    let Some(&tag) = bytes.get(*pos) else {
        return Field::Absent;
    };
    let body = *pos + 1;

    match tag {
        TAG_INT => match varint::try_decode(bytes, body) {
            Some((v, n)) => {
                *pos = body + n;
                Field::Complete(Value::Int(v))
            }
            None => Field::Truncated(Value::Int(0)),
        },
        TAG_FLOAT => match bytes.get(body..body + 4) {
            Some(raw) => {
                *pos = body + 4;
                let mut le = [0u8; 4];
                le.copy_from_slice(raw);
                Field::Complete(Value::Float(f32::from_le_bytes(le)))
            }
            None => Field::Truncated(Value::Float(0.0)),
        },
        TAG_BOOL => match bytes.get(body) {
            Some(&b) => {
                *pos = body + 1;
                Field::Complete(Value::Bool(b != 0))
            }
            None => Field::Truncated(Value::Bool(false)),
        },
        TAG_STR => {
            let Some((len, n)) = varint::try_decode(bytes, body) else {
                return Field::Truncated(Value::Str(String::new()));
            };
            let start = body + n;
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| start.checked_add(len));
            match end.and_then(|end| bytes.get(start..end).map(|s| (end, s))) {
                Some((end, raw)) => {
                    *pos = end;
                    Field::Complete(Value::Str(String::from_utf8_lossy(raw).into_owned()))
                }
                None => Field::Truncated(Value::Str(String::new())),
            }
        }
        _ => Field::Absent,
    }
}
