//! [`PathResult`]: what a path query hands back.

use std::fmt;

use dynrec_json_path::{delete_json, elements, query, set_json, Kind, Path, RawMatch};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{RecordError, Result};
use crate::value::Value;
use crate::Record;

/// Read-only view of one node of an encoded document.
///
/// The view owns a copy of the matched bytes. It is never refreshed:
/// [`PathResult::set`] and [`PathResult::delete`] return a new view over a
/// new document, and a record mutated after a `get` does not change results
/// already handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    raw: Vec<u8>,
    kind: Kind,
    index: Option<usize>,
    exists: bool,
}

impl PathResult {
    /// A result for a path that did not resolve.
    pub fn missing() -> Self {
        Self {
            raw: Vec::new(),
            kind: Kind::Null,
            index: None,
            exists: false,
        }
    }

    /// Wraps a value that was not read from a document.
    pub fn from_value(value: &Value) -> Self {
        match RawMatch::computed(&value.to_json()) {
            Some(m) => Self::from(m),
            None => Self::missing(),
        }
    }

    /// Runs `path` against the encoded document `json`.
    pub fn query(json: &[u8], path: &str) -> Self {
        let path = match Path::parse(path) {
            Ok(path) => path,
            Err(err) => {
                debug!(path, %err, "rejected path");
                return Self::missing();
            }
        };
        query(json, &path).map_or_else(Self::missing, Self::from)
    }

    /// A view of the whole document `json`.
    pub fn document(json: &[u8]) -> Self {
        Self::query(json, "")
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Encoded bytes of the node; empty when missing.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Byte offset of the node in the queried document; `None` for missing
    /// or computed results.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Decoded node. Missing results decode to [`Value::Null`].
    pub fn value(&self) -> Value {
        if !self.exists {
            return Value::Null;
        }
        serde_json::from_slice::<serde_json::Value>(&self.raw).map_or(Value::Null, Value::from)
    }

    /// Resolves `path` relative to this node.
    pub fn get(&self, path: &str) -> PathResult {
        if !self.exists {
            return Self::missing();
        }
        Self::query(&self.raw, path)
    }

    /// Returns a view of this node with `path` set to `value`.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<PathResult> {
        let value = value.into().to_json();
        let base = self.base();
        let json = set_json(&base, path, &value).map_err(|e| RecordError::mutation(path, e))?;
        Ok(Self::document(&json))
    }

    /// Returns a view of this node with `path` removed.
    pub fn delete(&self, path: &str) -> Result<PathResult> {
        let base = self.base();
        let json = delete_json(&base, path).map_err(|e| RecordError::mutation(path, e))?;
        Ok(Self::document(&json))
    }

    fn base(&self) -> Vec<u8> {
        if self.exists {
            self.raw.clone()
        } else {
            b"{}".to_vec()
        }
    }

    /// Visits object members as `(key, value)` or array elements as
    /// `(index, value)` until `f` returns false. Any other node is visited
    /// once with a `Null` key.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(Value, Value) -> bool,
    {
        match self.value() {
            _ if !self.exists => {}
            Value::Object(map) => {
                let mut members: Vec<_> = map.into_iter().collect();
                members.sort_by(|a, b| a.0.cmp(&b.0));
                for (k, v) in members {
                    if !f(Value::String(k), v) {
                        return;
                    }
                }
            }
            Value::Array(items) => {
                for (x, v) in items.into_iter().enumerate() {
                    if !f(Value::Int(x as i64), v) {
                        return;
                    }
                }
            }
            other => {
                f(Value::Null, other);
            }
        }
    }

    /// Deserializes the node; `None` when missing.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.exists {
            return Ok(None);
        }
        let value = serde_json::from_slice(&self.raw);
        value.map(Some).map_err(|err| {
            debug!(%err, kind = %self.kind, "decode failed");
            RecordError::Json(err)
        })
    }

    /// The node as a record when it is an object.
    pub fn to_record(&self) -> Option<Record> {
        match self.value() {
            Value::Object(map) => Some(Record::from_map(map)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<String> {
        match self.value() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value().as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().as_bool()
    }

    /// Elements of an array node. Any other existing node is a one-element
    /// list of itself.
    pub fn array(&self) -> Vec<PathResult> {
        if !self.exists {
            return Vec::new();
        }
        if self.kind != Kind::Array {
            return vec![self.clone()];
        }
        elements(&self.raw)
            .map(|items| items.into_iter().map(Self::from).collect())
            .unwrap_or_default()
    }
}

impl From<RawMatch> for PathResult {
    fn from(m: RawMatch) -> Self {
        Self {
            raw: m.raw,
            kind: m.kind,
            index: m.index,
            exists: true,
        }
    }
}

impl fmt::Display for PathResult {
    /// String nodes print their content, other nodes their encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(&s),
            None => f.write_str(&String::from_utf8_lossy(&self.raw)),
        }
    }
}
