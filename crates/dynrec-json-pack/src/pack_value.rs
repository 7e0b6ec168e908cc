//! [`PackValue`]: the value type shared by every codec in this crate.

use crate::binary;

/// Format-neutral value.
///
/// Objects keep their members as ordered pairs so encoders write them in a
/// stable order.
#[derive(Debug, Clone, PartialEq)]
pub enum PackValue {
    Null,
    Bool(bool),
    /// Any integer that fits in `i64`.
    Integer(i64),
    /// Unsigned integer above `i64::MAX`.
    UInteger(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<PackValue>),
    Object(Vec<(String, PackValue)>),
}

impl PackValue {
    /// Member lookup on objects; the first matching pair wins.
    pub fn get(&self, key: &str) -> Option<&PackValue> {
        match self {
            PackValue::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PackValue::Null)
    }
}

impl From<serde_json::Value> for PackValue {
    fn from(v: serde_json::Value) -> Self {
        binary::unwrap_binary(v)
    }
}

impl From<PackValue> for serde_json::Value {
    fn from(v: PackValue) -> Self {
        binary::wrap_binary(v)
    }
}

impl From<&str> for PackValue {
    fn from(s: &str) -> Self {
        PackValue::Str(s.to_string())
    }
}

impl From<i64> for PackValue {
    fn from(i: i64) -> Self {
        PackValue::Integer(i)
    }
}

impl From<f64> for PackValue {
    fn from(f: f64) -> Self {
        PackValue::Float(f)
    }
}

impl From<bool> for PackValue {
    fn from(b: bool) -> Self {
        PackValue::Bool(b)
    }
}

impl From<Vec<u8>> for PackValue {
    fn from(b: Vec<u8>) -> Self {
        PackValue::Bytes(b)
    }
}
