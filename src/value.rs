//! Dynamic cell values read from arbitrary tables.
//!
//! The browser knows nothing about a table's schema up front, so every cell
//! is read into [`Value`] and a row is simply the ordered list of its cells.

use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// One cell of a row, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A row as returned by `SELECT *`: cells in column order.
pub type Row = Vec<Value>;

impl Value {
    /// Literal-style rendering used in one-line row summaries:
    /// text is single-quoted and blobs are shown as `x'..'` hex.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => format!("x'{}'", hex(bytes)),
            other => other.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Text(s) => f.write_str(s),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// Format a whole row on one line, e.g. `(1, 'John Doe', NULL)`.
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(Value::to_literal).collect();
    format!("({})", cells.join(", "))
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
