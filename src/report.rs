//! Typed views over a generate report.
//!
//! The report itself stays a [`serde_json::Value`]; the helpers here do the
//! field lookups and loose presence checks that extraction needs without
//! assuming any particular shape.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Relative file path to file content, as found in the report.
///
/// Values are kept as raw JSON so content is never reinterpreted here; the
/// materializer decides what it can write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactMap(BTreeMap<String, Value>);

impl ArtifactMap {
    pub fn from_object(obj: Map<String, Value>) -> Self {
        Self(obj.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ArtifactMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One element of `result.logs`.
#[derive(Debug, Clone, Copy)]
pub enum LogEntry<'a> {
    Text(&'a str),
    Record(&'a Map<String, Value>),
    Other,
}

impl<'a> LogEntry<'a> {
    pub fn from_value(v: &'a Value) -> Self {
        match v {
            Value::String(s) => LogEntry::Text(s),
            Value::Object(o) => LogEntry::Record(o),
            _ => LogEntry::Other,
        }
    }

    /// The text to scan for an embedded JSON fragment.
    ///
    /// A record with a present `message` yields that message; anything else
    /// falls back to the entry itself. Only string text is returned.
    pub fn message(&self) -> Option<&'a str> {
        let text = match *self {
            LogEntry::Text(s) => Some(s),
            LogEntry::Record(o) => match o.get("message") {
                Some(m) if is_present(m) => m.as_str(),
                _ => None,
            },
            LogEntry::Other => None,
        };
        text.filter(|s| !s.is_empty())
    }
}

/// Loose presence check: `null`, `false`, `0` and `""` count as absent.
/// Objects and arrays are present even when empty.
pub fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field lookup that tolerates non-object parents and absent values.
pub fn field<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.as_object()?.get(key).filter(|f| is_present(f))
}

/// Nested lookup along `path`; every hop must be present.
pub fn field_path<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(v, |cur, key| field(cur, key))
}

/// Entries of `result.logs` when it is a non-empty array.
pub fn log_entries(report: &Value) -> &[Value] {
    field_path(report, &["result", "logs"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
