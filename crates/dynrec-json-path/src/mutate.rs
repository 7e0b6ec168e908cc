//! Path-based mutation of dynamic trees.
//!
//! Only plain member names and array indices can be written through;
//! `@this` is accepted as a no-op step. Writing creates missing
//! intermediate containers: an array (padded with nulls) when the step that
//! follows is an index or `-1`, an object otherwise. Scalars found on the
//! way are replaced by the container the next step needs. An index may
//! reach at most [`MAX_PADDING`] slots past the end of its array.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::{array_index, Path, Segment};
use crate::JsonPathError;

/// Object-like container inside a [`Node`] tree.
pub trait ObjectNode<V> {
    fn contains_key(&self, key: &str) -> bool;
    fn get_mut(&mut self, key: &str) -> Option<&mut V>;
    fn insert(&mut self, key: String, value: V);
    fn remove(&mut self, key: &str) -> Option<V>;
}

/// A tree that path mutations can walk and grow.
pub trait Node: Sized {
    type Object: ObjectNode<Self>;

    fn null() -> Self;
    fn empty_object() -> Self;
    fn empty_array() -> Self;
    fn is_object(&self) -> bool;
    fn is_array(&self) -> bool;
    fn as_object_mut(&mut self) -> Option<&mut Self::Object>;
    fn as_array_mut(&mut self) -> Option<&mut Vec<Self>>;
}

impl ObjectNode<Value> for Map<String, Value> {
    fn contains_key(&self, key: &str) -> bool {
        Map::contains_key(self, key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        Map::get_mut(self, key)
    }

    fn insert(&mut self, key: String, value: Value) {
        Map::insert(self, key, value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        Map::remove(self, key)
    }
}

impl<V> ObjectNode<V> for HashMap<String, V> {
    fn contains_key(&self, key: &str) -> bool {
        HashMap::contains_key(self, key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        HashMap::get_mut(self, key)
    }

    fn insert(&mut self, key: String, value: V) {
        HashMap::insert(self, key, value);
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        HashMap::remove(self, key)
    }
}

impl Node for Value {
    type Object = Map<String, Value>;

    fn null() -> Self {
        Value::Null
    }

    fn empty_object() -> Self {
        Value::Object(Map::new())
    }

    fn empty_array() -> Self {
        Value::Array(Vec::new())
    }

    fn is_object(&self) -> bool {
        Value::is_object(self)
    }

    fn is_array(&self) -> bool {
        Value::is_array(self)
    }

    fn as_object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        Value::as_object_mut(self)
    }

    fn as_array_mut(&mut self) -> Option<&mut Vec<Self>> {
        Value::as_array_mut(self)
    }
}

const APPEND: &str = "-1";

/// Most nulls a single write may pad an array with.
pub const MAX_PADDING: usize = 1 << 16;

/// Length of an array of `len` items once index `at` is written.
fn padded_len(step: &str, at: usize, len: usize) -> Result<usize, JsonPathError> {
    if at < len {
        return Ok(len);
    }
    let too_large = || JsonPathError::IndexTooLarge(step.to_string());
    if at - len > MAX_PADDING {
        return Err(too_large());
    }
    at.checked_add(1).ok_or_else(too_large)
}

/// Member names and indices of a writable path.
fn writable_steps(path: &Path) -> Result<Vec<&str>, JsonPathError> {
    let mut steps = Vec::new();
    for segment in path.segments() {
        match segment {
            Segment::Key(key) => steps.push(key.as_str()),
            s if s.is_writable() => {}
            s => return Err(JsonPathError::NotWritable(s.to_string())),
        }
    }
    Ok(steps)
}

fn container_for<N: Node>(step: &str) -> N {
    if step == APPEND || array_index(step).is_some() {
        N::empty_array()
    } else {
        N::empty_object()
    }
}

/// Returns the child of `node` named by `step`, creating it as null when
/// missing.
fn descend<'a, N: Node>(node: &'a mut N, step: &str) -> Result<&'a mut N, JsonPathError> {
    if !node.is_object() && !node.is_array() {
        *node = container_for(step);
    }
    if node.is_array() {
        let not_an_index = || JsonPathError::NotAnIndex(step.to_string());
        let items = node.as_array_mut().ok_or_else(not_an_index)?;
        let at = if step == APPEND {
            items.len()
        } else {
            array_index(step).ok_or_else(not_an_index)?
        };
        if at >= items.len() {
            let len = padded_len(step, at, items.len())?;
            items.resize_with(len, N::null);
        }
        return Ok(&mut items[at]);
    }
    let not_writable = || JsonPathError::NotWritable(step.to_string());
    let map = node.as_object_mut().ok_or_else(not_writable)?;
    if !map.contains_key(step) {
        map.insert(step.to_string(), N::null());
    }
    map.get_mut(step).ok_or_else(not_writable)
}

/// Stores `value` at `path` inside `root`.
///
/// Nothing is modified when the path cannot be written.
///
/// ```
/// use dynrec_json_path::{set_in, Path};
/// use serde_json::json;
///
/// let mut doc = json!({"a": 1});
/// set_in(&mut doc, &Path::parse("b.list.2").unwrap(), json!("x")).unwrap();
/// assert_eq!(doc, json!({"a": 1, "b": {"list": [null, null, "x"]}}));
/// ```
pub fn set_in<N: Node>(root: &mut N, path: &Path, value: N) -> Result<(), JsonPathError> {
    let steps = writable_steps(path)?;
    check_conflicts(root, &steps)?;
    let mut current = root;
    for step in &steps {
        current = descend(current, step)?;
    }
    *current = value;
    Ok(())
}

/// Dry run of the walk in [`set_in`] so a conflict is reported before the
/// first intermediate container gets created.
fn check_conflicts<N: Node>(root: &mut N, steps: &[&str]) -> Result<(), JsonPathError> {
    let mut current = Some(root);
    for step in steps {
        let Some(node) = current.take() else {
            // everything below a created node is created too, arrays empty
            if let Some(at) = array_index(step) {
                padded_len(step, at, 0)?;
            }
            continue;
        };
        if node.is_array() {
            if *step == APPEND {
                continue;
            }
            let not_an_index = || JsonPathError::NotAnIndex(step.to_string());
            let at = array_index(step).ok_or_else(not_an_index)?;
            let items = node.as_array_mut().ok_or_else(not_an_index)?;
            padded_len(step, at, items.len())?;
            current = items.get_mut(at);
        } else if node.is_object() {
            current = node.as_object_mut().and_then(|map| map.get_mut(step));
        } else if let Some(at) = array_index(step) {
            padded_len(step, at, 0)?;
        }
    }
    Ok(())
}

/// Removes the node at `path` and returns it. A path that does not resolve
/// removes nothing and returns `Ok(None)`.
pub fn delete_in<N: Node>(root: &mut N, path: &Path) -> Result<Option<N>, JsonPathError> {
    let steps = writable_steps(path)?;
    let Some((last, parents)) = steps.split_last() else {
        return Err(JsonPathError::RootDelete);
    };
    let mut current = root;
    for step in parents {
        current = match existing_child(current, step) {
            Some(child) => child,
            None => return Ok(None),
        };
    }
    if current.is_array() {
        let Some(items) = current.as_array_mut() else {
            return Ok(None);
        };
        return Ok(match array_index(last) {
            Some(at) if at < items.len() => Some(items.remove(at)),
            _ => None,
        });
    }
    Ok(current.as_object_mut().and_then(|map| map.remove(last)))
}

fn existing_child<'a, N: Node>(node: &'a mut N, step: &str) -> Option<&'a mut N> {
    if node.is_array() {
        return node.as_array_mut()?.get_mut(array_index(step)?);
    }
    node.as_object_mut()?.get_mut(step)
}

fn decode_document(json: &[u8]) -> Result<Value, JsonPathError> {
    serde_json::from_slice(json).map_err(|e| JsonPathError::InvalidDocument(e.to_string()))
}

fn encode_document(doc: &Value) -> Result<Vec<u8>, JsonPathError> {
    serde_json::to_vec(doc).map_err(|e| JsonPathError::InvalidDocument(e.to_string()))
}

/// Sets `path` in the encoded document `json` and returns the new encoding.
pub fn set_json(json: &[u8], path: &str, value: &Value) -> Result<Vec<u8>, JsonPathError> {
    let path = Path::parse(path)?;
    let mut doc = decode_document(json)?;
    set_in(&mut doc, &path, value.clone())?;
    encode_document(&doc)
}

/// Deletes `path` from the encoded document `json` and returns the new
/// encoding. Missing paths leave the document as it was.
pub fn delete_json(json: &[u8], path: &str) -> Result<Vec<u8>, JsonPathError> {
    let path = Path::parse(path)?;
    let mut doc = decode_document(json)?;
    delete_in(&mut doc, &path)?;
    encode_document(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(doc: &mut Value, path: &str, value: Value) -> Result<(), JsonPathError> {
        set_in(doc, &Path::parse(path).unwrap(), value)
    }

    fn del(doc: &mut Value, path: &str) -> Result<Option<Value>, JsonPathError> {
        delete_in(doc, &Path::parse(path).unwrap())
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = json!({});
        set(&mut doc, "a.b.c", json!(1)).unwrap();
        set(&mut doc, "list.1.name", json!("x")).unwrap();
        assert_eq!(
            doc,
            json!({"a": {"b": {"c": 1}}, "list": [null, {"name": "x"}]})
        );
    }

    #[test]
    fn test_set_replaces_scalars_on_the_way() {
        let mut doc = json!({"a": 5});
        set(&mut doc, "a.b", json!(true)).unwrap();
        assert_eq!(doc, json!({"a": {"b": true}}));
        set(&mut doc, "a.b.0", json!(1)).unwrap();
        assert_eq!(doc, json!({"a": {"b": [1]}}));
    }

    #[test]
    fn test_set_append() {
        let mut doc = json!({"xs": [1]});
        set(&mut doc, "xs.-1", json!(2)).unwrap();
        set(&mut doc, "ys.-1", json!(3)).unwrap();
        assert_eq!(doc, json!({"xs": [1, 2], "ys": [3]}));
    }

    #[test]
    fn test_set_numeric_key_on_object() {
        let mut doc = json!({"m": {}});
        set(&mut doc, "m.7", json!("seven")).unwrap();
        assert_eq!(doc, json!({"m": {"7": "seven"}}));
    }

    #[test]
    fn test_set_conflict_leaves_document_untouched() {
        let mut doc = json!({"xs": [1, 2]});
        let err = set(&mut doc, "xs.name", json!(1)).unwrap_err();
        assert_eq!(err, JsonPathError::NotAnIndex("name".into()));
        let err = set(&mut doc, "fresh.xs.0.name", json!(1));
        assert!(err.is_ok());
        let before = doc.clone();
        assert!(set(&mut doc, "fresh.xs.name", json!(1)).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_rejects_runaway_indices() {
        let mut doc = json!({"xs": [1, 2], "n": 5});
        let before = doc.clone();
        for path in [
            "xs.18446744073709551615",
            "xs.4000000000000",
            "n.4000000000000",
            "fresh.4000000000000",
            "fresh.0.deeper.18446744073709551615",
        ] {
            let step = path.rsplit('.').next().unwrap();
            assert_eq!(
                set(&mut doc, path, json!(0)),
                Err(JsonPathError::IndexTooLarge(step.into())),
                "{path}"
            );
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_pads_up_to_the_limit() {
        let mut doc = json!({"xs": [1]});
        let edge = (1 + MAX_PADDING).to_string();
        set(&mut doc, &format!("xs.{edge}"), json!(2)).unwrap();
        assert_eq!(doc["xs"].as_array().unwrap().len(), MAX_PADDING + 2);
        assert_eq!(doc["xs"][MAX_PADDING + 1], json!(2));

        let mut root: Value = json!([]);
        assert!(matches!(
            set(&mut root, &(MAX_PADDING + 1).to_string(), json!(0)),
            Err(JsonPathError::IndexTooLarge(_))
        ));
        assert_eq!(root, json!([]));
    }

    #[test]
    fn test_set_rejects_computed_segments() {
        let mut doc = json!({"a": [1]});
        for path in ["a.#", "a|@keys", "a*"] {
            assert!(matches!(
                set(&mut doc, path, json!(0)),
                Err(JsonPathError::NotWritable(_))
            ));
        }
        assert_eq!(doc, json!({"a": [1]}));
    }

    #[test]
    fn test_set_root() {
        let mut doc = json!({"a": 1});
        set(&mut doc, "", json!([1])).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn test_delete() {
        let mut doc = json!({"a": 1, "b": {"c": 2, "d": [1, 2, 3]}});
        assert_eq!(del(&mut doc, "b.c").unwrap(), Some(json!(2)));
        assert_eq!(del(&mut doc, "b.d.1").unwrap(), Some(json!(2)));
        assert_eq!(doc, json!({"a": 1, "b": {"d": [1, 3]}}));
        assert_eq!(del(&mut doc, "b.missing.deep").unwrap(), None);
        assert_eq!(del(&mut doc, "b.d.9").unwrap(), None);
        assert_eq!(del(&mut doc, "a.x").unwrap(), None);
        assert_eq!(del(&mut doc, ""), Err(JsonPathError::RootDelete));
    }

    #[test]
    fn test_hashmap_objects() {
        #[derive(Debug, PartialEq)]
        enum Tree {
            Leaf(i32),
            Null,
            Map(HashMap<String, Tree>),
            List(Vec<Tree>),
        }

        impl Node for Tree {
            type Object = HashMap<String, Tree>;

            fn null() -> Self {
                Tree::Null
            }
            fn empty_object() -> Self {
                Tree::Map(HashMap::new())
            }
            fn empty_array() -> Self {
                Tree::List(Vec::new())
            }
            fn is_object(&self) -> bool {
                matches!(self, Tree::Map(_))
            }
            fn is_array(&self) -> bool {
                matches!(self, Tree::List(_))
            }
            fn as_object_mut(&mut self) -> Option<&mut Self::Object> {
                match self {
                    Tree::Map(m) => Some(m),
                    _ => None,
                }
            }
            fn as_array_mut(&mut self) -> Option<&mut Vec<Self>> {
                match self {
                    Tree::List(l) => Some(l),
                    _ => None,
                }
            }
        }

        let mut tree = Tree::empty_object();
        set_in(&mut tree, &Path::parse("a.0").unwrap(), Tree::Leaf(4)).unwrap();
        let removed = delete_in(&mut tree, &Path::parse("a.0").unwrap()).unwrap();
        assert_eq!(removed, Some(Tree::Leaf(4)));
        let mut expected = HashMap::new();
        expected.insert("a".to_string(), Tree::List(Vec::new()));
        assert_eq!(tree, Tree::Map(expected));
    }

    #[test]
    fn test_encoded_documents() {
        let doc = br#"{"a":{"b":1}}"#;
        let out = set_json(doc, "a.c", &json!([1])).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, json!({"a": {"b": 1, "c": [1]}}));
        let out = delete_json(&out, "a.b").unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, json!({"a": {"c": [1]}}));
        assert!(matches!(
            set_json(b"{nope", "a", &json!(1)),
            Err(JsonPathError::InvalidDocument(_))
        ));
        assert!(set_json(doc, "a..b", &json!(1)).is_err());
    }
}
