//! The dynamic [`Value`] stored in a [`Record`](crate::Record).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dynrec_json_pack::{binary, PackValue};
use dynrec_json_path::Node;
use serde_json::{Map, Number};

type NativeFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// A shared function stored as a record value.
#[derive(Clone)]
pub struct Callable {
    arity: Option<usize>,
    f: Arc<NativeFn>,
}

impl Callable {
    /// Wraps a function accepting any number of arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self { arity: None, f: Arc::new(f) }
    }

    /// Wraps a function that must be called with exactly `arity` arguments.
    pub fn with_arity<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self { arity: Some(arity), f: Arc::new(f) }
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, String> {
        (self.f)(args)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity {
            Some(n) => write!(f, "Callable({n})"),
            None => f.write_str("Callable(..)"),
        }
    }
}

/// Closed set of value shapes a record can hold.
///
/// Objects and arrays nest. Equality is structural except for callables,
/// which are equal only to clones of themselves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Object(HashMap<String, Value>),
    Array(Vec<Value>),
    Callable(Callable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Object,
    Array,
    Callable,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::Callable => "callable",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::Callable(_) => ValueKind::Callable,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integers, and floats without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// JSON form of the value.
    ///
    /// Bytes become data URI strings and non-finite floats become `null`.
    /// Strings that would read back as data URIs are escaped with a leading
    /// backslash.
    /// Callables have no JSON form: object members holding one are left out
    /// and array slots holding one become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Callable(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(binary::escape_str(s.clone())),
            Value::Bytes(b) => serde_json::Value::String(binary::to_data_uri(b)),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => serde_json::Value::Object(object_to_json(map)),
        }
    }
}

pub(crate) fn object_to_json(map: &HashMap<String, Value>) -> Map<String, serde_json::Value> {
    map.iter()
        .filter(|(_, v)| !matches!(v, Value::Callable(_)))
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

impl fmt::Display for Value {
    /// Strings print bare; containers print as JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Callable(_) => f.write_str("<callable>"),
            Value::Object(_) | Value::Array(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Numbers outside `i64` become floats; data URI strings become bytes and
/// escaped ones lose their escape.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => match binary::from_data_uri(&s) {
                Some(bytes) => Value::Bytes(bytes),
                None => Value::String(binary::unescape_str(s)),
            },
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for PackValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null | Value::Callable(_) => PackValue::Null,
            Value::Bool(b) => PackValue::Bool(*b),
            Value::Int(i) => PackValue::Integer(*i),
            Value::Float(f) => PackValue::Float(*f),
            Value::String(s) => PackValue::Str(s.clone()),
            Value::Bytes(b) => PackValue::Bytes(b.clone()),
            Value::Array(items) => PackValue::Array(items.iter().map(PackValue::from).collect()),
            Value::Object(map) => {
                let mut pairs: Vec<(String, PackValue)> = map
                    .iter()
                    .filter(|(_, v)| !matches!(v, Value::Callable(_)))
                    .map(|(k, v)| (k.clone(), PackValue::from(v)))
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                PackValue::Object(pairs)
            }
        }
    }
}

/// Unsigned integers above `i64::MAX` become floats.
impl From<PackValue> for Value {
    fn from(v: PackValue) -> Self {
        match v {
            PackValue::Null => Value::Null,
            PackValue::Bool(b) => Value::Bool(b),
            PackValue::Integer(i) => Value::Int(i),
            PackValue::UInteger(u) => Value::Float(u as f64),
            PackValue::Float(f) => Value::Float(f),
            PackValue::Bytes(b) => Value::Bytes(b),
            PackValue::Str(s) => Value::String(s),
            PackValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PackValue::Object(pairs) => Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

macro_rules! from_scalar {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

from_scalar! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => String as String,
    &str => String as String,
    Vec<u8> => Bytes as Vec<u8>,
    Vec<Value> => Array as Vec<Value>,
    HashMap<String, Value> => Object as HashMap<String, Value>,
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Node for Value {
    type Object = HashMap<String, Value>;

    fn null() -> Self {
        Value::Null
    }

    fn empty_object() -> Self {
        Value::Object(HashMap::new())
    }

    fn empty_array() -> Self {
        Value::Array(Vec::new())
    }

    fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    fn as_object_mut(&mut self) -> Option<&mut HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn as_array_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_conversion_keeps_shape() {
        let v = Value::from(json!({"a": 1, "b": [true, null, 2.5], "c": "x"}));
        let Value::Object(map) = &v else { panic!("not an object") };
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(map["b"], Value::Array(vec![Value::Bool(true), Value::Null, Value::Float(2.5)]));
        assert_eq!(v.to_json(), json!({"a": 1, "b": [true, null, 2.5], "c": "x"}));
    }

    #[test]
    fn bytes_travel_as_data_uri() {
        let v = Value::Bytes(vec![0, 1, 2, 255]);
        let encoded = v.to_json();
        assert!(encoded.as_str().unwrap().starts_with(binary::BIN_URI_START));
        assert_eq!(Value::from(encoded), v);
    }

    #[test]
    fn strings_shaped_like_data_uris_stay_strings() {
        let text = Value::from(binary::to_data_uri(b"hi"));
        let encoded = text.to_json();
        assert_eq!(encoded.as_str(), Some("\\data:application/octet-stream;base64,aGk="));
        assert_eq!(Value::from(encoded), text);
        let nested = Value::Array(vec![text.clone(), Value::Bytes(b"hi".to_vec())]);
        assert_eq!(Value::from(nested.to_json()), nested);
    }

    #[test]
    fn callables_have_no_json_form() {
        let f = Callable::new(|_| Ok(Value::Null));
        let mut map = HashMap::new();
        map.insert("f".to_string(), Value::from(f.clone()));
        map.insert("n".to_string(), Value::Int(1));
        assert_eq!(Value::Object(map).to_json(), json!({"n": 1}));
        assert_eq!(Value::Array(vec![f.into()]).to_json(), json!([null]));
    }

    #[test]
    fn callables_compare_by_identity() {
        let f = Callable::new(|_| Ok(Value::Null));
        let g = Callable::new(|_| Ok(Value::Null));
        assert_eq!(Value::from(f.clone()), Value::from(f.clone()));
        assert_ne!(Value::from(f), Value::from(g));
    }

    #[test]
    fn nan_is_null_in_json() {
        assert_eq!(Value::Float(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn pack_objects_are_sorted() {
        let v = Value::from(json!({"b": 1, "a": 2}));
        let PackValue::Object(pairs) = PackValue::from(&v) else { panic!("not an object") };
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn paths_write_through_values() {
        use dynrec_json_path::{delete_in, set_in, Path};

        let mut v = Value::from(json!({"a": {"b": 1}}));
        set_in(&mut v, &Path::parse("a.c.1").unwrap(), Value::from("x")).unwrap();
        assert_eq!(v, Value::from(json!({"a": {"b": 1, "c": [null, "x"]}})));
        assert_eq!(Node::as_object_mut(&mut v).map(|m| m.len()), Some(1));
        let removed = delete_in(&mut v, &Path::parse("a.b").unwrap()).unwrap();
        assert_eq!(removed, Some(Value::Int(1)));
    }

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Float(3.0).as_i64(), Some(3));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::from(Some(5)).as_i64(), Some(5));
        assert!(Value::from(None::<i64>).is_null());
    }
}
