//! The record type flowing between pipeline nodes.

use serde_json::Value;
use std::collections::HashMap;

/// A single data row: a mapping from field name to value.
///
/// Values are JSON values, so a field may hold a string, number,
/// boolean, null, or nested structure. Records flow between nodes as
/// ordered `Vec<Record>` lists.
pub type Record = HashMap<String, Value>;

/// Canonical string form of a value, used for group keys, distinct
/// counting, and join keys.
///
/// The form is type-prefixed so that e.g. the number `1` and the string
/// `"1"` never collide. Numbers are canonicalized through `f64` so that
/// `1` and `1.0` do collide, which is what grouping wants.
#[must_use]
pub fn value_key(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("b:{b}"),
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("n:{f}"),
            None => format!("n:{n}"),
        },
        Value::String(s) => format!("s:{s}"),
        other => format!("j:{other}"),
    }
}

/// Human string form of a value, used by string-building operations
/// (concatenate, split, extract). Null renders as the empty string.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric view of a value. Accepts numbers and numeric strings.
#[must_use]
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
