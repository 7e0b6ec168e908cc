//! Byte strings inside JSON text.
//!
//! JSON has no binary type, so [`PackValue::Bytes`] travels as a data URI
//! string, `data:application/octet-stream;base64,<payload>`, and is turned
//! back into bytes when the JSON is read. A text string that would read
//! back as a data URI (with any number of leading backslashes) is written
//! with one more leading `\`, which the reader strips again.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::PackValue;

pub const BIN_URI_START: &str = "data:application/octet-stream;base64,";

/// Data URI for `bytes`.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("{BIN_URI_START}{}", STANDARD.encode(bytes))
}

/// Bytes carried by a data URI string, if `s` is one.
pub fn from_data_uri(s: &str) -> Option<Vec<u8>> {
    STANDARD.decode(s.strip_prefix(BIN_URI_START)?).ok()
}

const ESCAPE: char = '\\';

fn reads_as_uri(s: &str) -> bool {
    s.trim_start_matches(ESCAPE).starts_with(BIN_URI_START)
}

/// JSON form of the text string `s`.
pub fn escape_str(s: String) -> String {
    if reads_as_uri(&s) {
        format!("{ESCAPE}{s}")
    } else {
        s
    }
}

/// Text string carried by the JSON string `s` when it is not a data URI.
pub fn unescape_str(s: String) -> String {
    match s.strip_prefix(ESCAPE) {
        Some(rest) if reads_as_uri(rest) => rest.to_string(),
        _ => s,
    }
}

/// Converts to JSON, writing byte strings as data URIs. Non-finite floats
/// become `null`.
pub fn wrap_binary(value: PackValue) -> Value {
    match value {
        PackValue::Null => Value::Null,
        PackValue::Bool(b) => Value::Bool(b),
        PackValue::Integer(i) => Value::from(i),
        PackValue::UInteger(u) => Value::from(u),
        PackValue::Float(f) => Value::from(f),
        PackValue::Bytes(b) => Value::String(to_data_uri(&b)),
        PackValue::Str(s) => Value::String(escape_str(s)),
        PackValue::Array(items) => Value::Array(items.into_iter().map(wrap_binary).collect()),
        PackValue::Object(pairs) => Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k, wrap_binary(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Converts from JSON, restoring data URI strings to byte strings.
pub fn unwrap_binary(value: Value) -> PackValue {
    match value {
        Value::Null => PackValue::Null,
        Value::Bool(b) => PackValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                PackValue::Integer(i)
            } else if let Some(u) = n.as_u64() {
                PackValue::UInteger(u)
            } else {
                PackValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => match from_data_uri(&s) {
            Some(bytes) => PackValue::Bytes(bytes),
            None => PackValue::Str(unescape_str(s)),
        },
        Value::Array(items) => PackValue::Array(items.into_iter().map(unwrap_binary).collect()),
        Value::Object(map) => PackValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, unwrap_binary(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_uri() {
        assert_eq!(to_data_uri(b"hi"), "data:application/octet-stream;base64,aGk=");
        assert_eq!(from_data_uri("data:application/octet-stream;base64,aGk="), Some(b"hi".to_vec()));
        assert_eq!(from_data_uri("aGk="), None);
        assert_eq!(from_data_uri("data:application/octet-stream;base64,%%%"), None);
    }

    #[test]
    fn wrap_then_unwrap() {
        let v = PackValue::Object(vec![
            ("blob".into(), PackValue::Bytes(vec![0, 1, 255])),
            ("text".into(), "data:nope".into()),
        ]);
        let json = wrap_binary(v.clone());
        assert_eq!(
            json,
            json!({"blob": "data:application/octet-stream;base64,AAH/", "text": "data:nope"})
        );
        assert_eq!(unwrap_binary(json), v);
    }

    #[test]
    fn text_that_looks_like_a_data_uri() {
        let uri = to_data_uri(b"hi");
        for text in [uri.clone(), format!("\\{uri}"), format!("\\\\{uri}"), format!("{BIN_URI_START}%%%")] {
            let json = wrap_binary(PackValue::Str(text.clone()));
            assert_eq!(json, Value::String(format!("\\{text}")));
            assert_eq!(unwrap_binary(json), PackValue::Str(text));
        }
        assert_eq!(escape_str("\\plain".into()), "\\plain");
        assert_eq!(unescape_str("\\plain".into()), "\\plain");
        assert_eq!(unwrap_binary(Value::String(uri)), PackValue::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn empty_bytes() {
        let json = wrap_binary(PackValue::Bytes(Vec::new()));
        assert_eq!(json, json!(BIN_URI_START));
        assert_eq!(unwrap_binary(json), PackValue::Bytes(Vec::new()));
    }
}
