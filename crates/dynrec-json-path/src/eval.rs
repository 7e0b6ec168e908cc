//! Evaluation of path segments on decoded JSON.
//!
//! The byte scanner hands over to this module once a segment needs the
//! decoded node (`#`, `@keys`, `@values`), so every segment kind is
//! supported here.

use dynrec_util::glob;
use serde_json::Value;

use crate::types::{array_index, Modifier, Segment};

/// Applies `segments` to `value`. `None` when any step misses.
pub fn eval(value: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };
    match head {
        Segment::Key(key) => eval(child(value, key)?, rest),
        Segment::Pattern(pattern) => match value {
            Value::Object(map) => map
                .iter()
                .find(|(k, _)| glob::matches(k, pattern))
                .and_then(|(_, v)| eval(v, rest)),
            _ => None,
        },
        Segment::Count => match value {
            Value::Array(items) if rest.is_empty() => Some(Value::from(items.len())),
            Value::Array(items) => Some(Value::Array(
                items.iter().filter_map(|item| eval(item, rest)).collect(),
            )),
            _ => None,
        },
        Segment::Modifier(Modifier::This) => eval(value, rest),
        Segment::Modifier(Modifier::Keys) => match value {
            Value::Object(map) => {
                let keys = map.keys().map(|k| Value::String(k.clone())).collect();
                eval(&Value::Array(keys), rest)
            }
            _ => None,
        },
        Segment::Modifier(Modifier::Values) => match value {
            Value::Object(map) => eval(&Value::Array(map.values().cloned().collect()), rest),
            Value::Array(_) => eval(value, rest),
            _ => None,
        },
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(array_index(key)?),
        _ => None,
    }
}
