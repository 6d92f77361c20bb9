//! Field coercers over untrusted `serde_json::Value`s.
//!
//! Every function here is total: a value of the wrong shape degrades to the
//! target type's default instead of producing an error.

use std::collections::HashSet;

use serde_json::Value;

/// True for the values an upstream producer uses to mean "missing":
/// `null`, `false`, numeric zero, `""`, `[]` and `{}`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Plain string form of a value: strings verbatim, scalars as JSON text,
/// containers as compact JSON. `null` becomes `""`.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn string_or_default(value: Option<&Value>) -> String {
    match value {
        Some(v) if !is_blank(v) => scalar_text(v),
        _ => String::new(),
    }
}

/// Numeric cast truncating toward zero. Strings may be float-like (`"3.0"`).
pub fn int_or_default(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(truncate),
        Some(Value::Bool(b)) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.unwrap_or(0)
}

fn truncate(f: f64) -> i64 {
    // `as` saturates at the i64 bounds
    f.trunc() as i64
}

/// Only a genuine JSON boolean passes through; no truthy-string coercion.
pub fn bool_or_default(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// A list passes through untouched; a string is split on `delimiter` with
/// each part trimmed and empties dropped. Anything else is empty.
pub fn list_or_split(value: Option<&Value>, delimiter: char) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => s
            .split(delimiter)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Views a section value as a sequence of elements. A non-empty bare object is
/// treated as a one-element list; `{}` and anything that is neither object nor
/// list is empty.
pub fn scalar_or_wrap(value: Option<&Value>) -> &[Value] {
    match value {
        Some(v) if v.as_object().is_some_and(|map| !map.is_empty()) => std::slice::from_ref(v),
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Order-preserving, case-sensitive dedupe of trimmed, non-empty string forms.
pub fn dedupe<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let text = scalar_text(item);
        let key = text.trim();
        if !key.is_empty() && seen.insert(key.to_string()) {
            out.push(key.to_string());
        }
    }
    out
}

/// `list_or_split` followed by `dedupe`.
pub fn string_list(value: Option<&Value>, delimiter: char) -> Vec<String> {
    dedupe(&list_or_split(value, delimiter))
}
