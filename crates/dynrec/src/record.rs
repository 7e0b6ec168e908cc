//! [`Record`]: the dynamic string-keyed container.

use std::collections::{HashMap, HashSet};
use std::fmt;

use dynrec_buffers::byte_size;
use dynrec_json_path::{delete_in, set_in, JsonPathError, Path};
use dynrec_util::{glob, Sequence};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::codec::{CborCodec, Codec, JsonCodec, MsgPackCodec};
use crate::error::{RecordError, Result};
use crate::lock::{LockMode, ReadGuard, WriteGuard};
use crate::result::PathResult;
use crate::store::FileStore;
use crate::value::{object_to_json, Value, ValueKind};

type Fields = HashMap<String, Value>;

/// A string-keyed map of [`Value`]s behind a reader/writer lock.
///
/// Reads resolve dotted paths (see [`dynrec_json_path`]) against the
/// record's JSON form and hand back [`PathResult`] views. Writes edit the
/// tree in place under the write lock.
///
/// Locks are not re-entrant. A callback passed to [`Record::each`],
/// [`Record::for_each`], [`Record::by_key_order`] or
/// [`Record::matches_key`] runs while the record is read-locked and must
/// not write to the same record.
///
/// ```
/// use dynrec::Record;
///
/// let record = Record::from_json(r#"{"a":1,"b":{"c":2}}"#).unwrap();
/// assert_eq!(record.get("b.c").as_i64(), Some(2));
///
/// record.set("b.d", 3).unwrap();
/// assert_eq!(record.get("b.d").as_i64(), Some(3));
///
/// record.del("b.c").unwrap();
/// assert!(!record.get("b.c").exists());
/// ```
#[derive(Default)]
pub struct Record {
    data: RwLock<Fields>,
    mode: LockMode,
}

fn encode_fields(fields: &Fields) -> Vec<u8> {
    serde_json::Value::Object(object_to_json(fields)).to_string().into_bytes()
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self {
            data: RwLock::new(map),
            mode: LockMode::default(),
        }
    }

    /// Fails with [`RecordError::NotAnObject`] unless `value` is an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(RecordError::NotAnObject(other.kind())),
        }
    }

    pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
        Self::decode_with(&JsonCodec::new(), json.as_ref())
    }

    /// Switches the lock discipline.
    pub fn with_lock_mode(mut self, mode: LockMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn lock_mode(&self) -> LockMode {
        self.mode
    }

    fn read(&self) -> ReadGuard<'_, Fields> {
        self.mode.read(&self.data)
    }

    fn write(&self) -> WriteGuard<'_, Fields> {
        self.mode.write(&self.data)
    }

    /// A copy of the current fields.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.read().clone()
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.data.into_inner()
    }

    fn encoded(&self) -> Vec<u8> {
        encode_fields(&self.read())
    }

    fn rejected(&self, path: &str, err: JsonPathError) -> RecordError {
        debug!(path, %err, "mutation rejected");
        RecordError::mutation(path, err)
    }

    // reads

    /// Resolves `path`. A path that does not resolve, or does not parse,
    /// gives a result with `exists() == false`. The empty path is the whole
    /// record.
    pub fn get(&self, path: &str) -> PathResult {
        PathResult::query(&self.encoded(), path)
    }

    /// [`Record::get`], with `default` standing in for a missing node.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> PathResult {
        let found = self.get(path);
        if found.exists() {
            found
        } else {
            PathResult::from_value(&default.into())
        }
    }

    /// Resolves every path against one encoding of the record.
    pub fn get_many(&self, paths: &[&str]) -> Vec<PathResult> {
        let json = self.encoded();
        paths.iter().map(|path| PathResult::query(&json, path)).collect()
    }

    /// Top-level field by exact key, callables included.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Elements of the array at `path`.
    pub fn sequence(&self, path: &str) -> Option<Sequence<Value>> {
        match self.get(path).value() {
            Value::Array(items) => Some(Sequence::from(items)),
            _ => None,
        }
    }

    /// Element `index` of the array at `path`.
    pub fn element(&self, path: &str, index: usize) -> Result<Value> {
        let node = self.get(path);
        if !node.exists() {
            return Err(RecordError::PathNotFound(path.to_string()));
        }
        let items = match node.value() {
            Value::Array(items) => Sequence::from(items),
            other => return Err(RecordError::Conversion(format!("{} at `{path}` to a sequence", other.kind()))),
        };
        Ok(items.get(index)?.clone())
    }

    /// String content of the node, the encoded form of any other node, or
    /// `""` when missing.
    pub fn string(&self, path: &str) -> String {
        self.get(path).to_string()
    }

    /// Numeric node as an integer, truncating floats; `-1` for anything
    /// else.
    pub fn int(&self, path: &str) -> i64 {
        match self.get(path).value() {
            Value::Int(i) => i,
            Value::Float(f) => f as i64,
            _ => -1,
        }
    }

    /// `false` unless the node is the boolean `true`.
    pub fn bool(&self, path: &str) -> bool {
        self.get(path).as_bool().unwrap_or(false)
    }

    /// The object at `path` as a record of its own.
    pub fn map(&self, path: &str) -> Option<Record> {
        self.get(path).to_record().map(|r| r.with_lock_mode(self.mode))
    }

    /// The object elements of the array at `path`.
    pub fn get_as_array(&self, path: &str) -> Vec<Record> {
        self.get(path)
            .array()
            .iter()
            .filter_map(PathResult::to_record)
            .map(|r| r.with_lock_mode(self.mode))
            .collect()
    }

    /// Deserializes the node at `path`; `None` when missing.
    pub fn decode<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.get(path).decode()
    }

    // writes

    /// Stores `value` at `path`, creating missing objects and arrays on the
    /// way. A numeric step creates an array padded with nulls, `-1` appends,
    /// and scalars in the way are replaced.
    ///
    /// Invalid paths, computed segments and non-numeric steps into an array
    /// fail without changing the record. Setting the root requires an
    /// object and replaces every field.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<&Self> {
        let parsed = Path::parse(path).map_err(|e| self.rejected(path, e))?;
        let value = value.into();
        let mut fields = self.write();
        if parsed.is_root() {
            match value {
                Value::Object(map) => *fields = map,
                other => {
                    debug!(path, kind = %other.kind(), "root must be an object");
                    return Err(RecordError::NotAnObject(other.kind()));
                }
            }
            return Ok(self);
        }
        let mut root = Value::Object(std::mem::take(&mut *fields));
        let outcome = set_in(&mut root, &parsed, value);
        // a non-root path always starts inside the object
        if let Value::Object(map) = root {
            *fields = map;
        }
        outcome.map_err(|e| self.rejected(path, e))?;
        Ok(self)
    }

    /// Removes the node at `path` and returns a view of the resulting
    /// record. Missing paths change nothing.
    pub fn del(&self, path: &str) -> Result<PathResult> {
        let parsed = Path::parse(path).map_err(|e| self.rejected(path, e))?;
        let mut fields = self.write();
        let mut root = Value::Object(std::mem::take(&mut *fields));
        let outcome = delete_in(&mut root, &parsed);
        if let Value::Object(map) = root {
            *fields = map;
        }
        outcome.map_err(|e| self.rejected(path, e))?;
        Ok(PathResult::document(&encode_fields(&fields)))
    }

    /// Copies every field of `others` into the record, later records
    /// overwriting earlier ones.
    pub fn merge(&self, others: &[&Record]) -> &Self {
        let snapshots: Vec<Fields> = others.iter().map(|other| other.snapshot()).collect();
        let mut fields = self.write();
        for snapshot in snapshots {
            fields.extend(snapshot);
        }
        self
    }

    /// [`Record::merge`] that skips every key found as a substring of the
    /// space-joined `excludes`. A key that is only part of an excluded name
    /// is skipped too.
    pub fn merge_strict(&self, other: &Record, excludes: &[&str]) -> &Self {
        let restricted = excludes.join(" ");
        let snapshot = other.snapshot();
        let mut fields = self.write();
        for (key, value) in snapshot {
            if restricted.contains(key.as_str()) {
                warn!(key = %key, "field is restricted");
                continue;
            }
            fields.insert(key, value);
        }
        self
    }

    // keys and values

    /// Whether every key is a top-level field.
    pub fn has(&self, keys: &[&str]) -> bool {
        let fields = self.read();
        keys.iter().all(|k| fields.contains_key(*k))
    }

    pub fn keys(&self) -> HashSet<String> {
        self.read().keys().cloned().collect()
    }

    pub fn values(&self) -> Sequence<Value> {
        self.read().values().cloned().collect()
    }

    pub fn values_string(&self) -> Vec<String> {
        self.read().values().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Field names and kinds, ordered by name.
    pub fn describe_fields(&self) -> Vec<(String, ValueKind)> {
        let mut fields: Vec<_> = self.read().iter().map(|(k, v)| (k.clone(), v.kind())).collect();
        fields.sort();
        fields
    }

    /// Every key of this record is also a key of `other`.
    pub fn equal_keys(&self, other: &Record) -> bool {
        let keys = self.keys();
        let theirs = other.read();
        keys.iter().all(|k| theirs.contains_key(k))
    }

    /// Keys present in exactly one of the two records, sorted.
    pub fn diffs(&self, other: &Record) -> Vec<String> {
        let mine = self.keys();
        let theirs = other.keys();
        let mut out: Vec<String> = mine.symmetric_difference(&theirs).cloned().collect();
        out.sort();
        out
    }

    // iteration

    /// Visits every field, counting from 0, and returns the values `f`
    /// accepted.
    pub fn each<F>(&self, mut f: F) -> Vec<Value>
    where
        F: FnMut(usize, &str, &Value) -> bool,
    {
        let fields = self.read();
        fields
            .iter()
            .enumerate()
            .filter(|(x, (k, v))| f(*x, k, v))
            .map(|(_, (_, v))| v.clone())
            .collect()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &str, &Value),
    {
        for (x, (k, v)) in self.read().iter().enumerate() {
            f(x, k, v);
        }
    }

    /// Visits `keys` in the given order, skipping absent ones. The index is
    /// the position in `keys`.
    pub fn by_key_order<F>(&self, keys: &[&str], mut f: F)
    where
        F: FnMut(usize, &str, &Value),
    {
        let fields = self.read();
        for (x, key) in keys.iter().enumerate() {
            if let Some(value) = fields.get(*key) {
                f(x, key, value);
            }
        }
    }

    /// Walks the members (or elements) of the node at `from` while `f`
    /// returns true and collects the visited ones. Array elements are keyed
    /// by their index.
    pub fn iterate<F>(&self, from: &str, mut f: F) -> Record
    where
        F: FnMut(&str, &PathResult) -> bool,
    {
        let mut out = Fields::new();
        self.get(from).each(|key, value| {
            let key = match key {
                Value::String(s) => s,
                other => other.to_string(),
            };
            if !f(&key, &PathResult::from_value(&value)) {
                return false;
            }
            out.insert(key, value);
            true
        });
        Record::from_map(out).with_lock_mode(self.mode)
    }

    /// A new record holding only those of `keys` that are present.
    pub fn selective(&self, keys: &[&str]) -> Record {
        let fields = self.read();
        let picked = keys
            .iter()
            .filter_map(|k| fields.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        Record::from_map(picked).with_lock_mode(self.mode)
    }

    fn first_match(fields: &Fields, pattern: &str) -> Option<String> {
        let mut keys: Vec<&String> = fields.keys().filter(|k| glob::matches(k, pattern)).collect();
        keys.sort();
        keys.first().map(|k| k.to_string())
    }

    /// First key, in name order, matching the glob `pattern`.
    pub fn key_match(&self, pattern: &str) -> Option<(String, Value)> {
        let fields = self.read();
        let key = Self::first_match(&fields, pattern)?;
        let value = fields.get(&key)?.clone();
        Some((key, value))
    }

    /// Calls `f` with the first field whose key matches `pattern` and
    /// reports whether there was one.
    pub fn matches_key<F>(&self, pattern: &str, f: F) -> bool
    where
        F: FnOnce(&str, &Value),
    {
        let fields = self.read();
        let Some(key) = Self::first_match(&fields, pattern) else {
            return false;
        };
        match fields.get(&key) {
            Some(value) => {
                f(&key, value);
                true
            }
            None => false,
        }
    }

    // calls

    /// Whether the field `key` holds a callable.
    pub fn can_call(&self, key: &str) -> bool {
        matches!(self.read().get(key), Some(Value::Callable(_)))
    }

    /// Invokes the callable stored at `key`. The record is not locked while
    /// the function runs.
    pub fn call(&self, key: &str, args: &[Value]) -> Result<Value> {
        let callable = match self.read().get(key) {
            Some(Value::Callable(c)) => c.clone(),
            Some(_) => return Err(RecordError::NotCallable(key.to_string())),
            None => return Err(RecordError::PathNotFound(key.to_string())),
        };
        if let Some(expected) = callable.arity() {
            if expected != args.len() {
                return Err(RecordError::ArityMismatch {
                    key: key.to_string(),
                    expected,
                    actual: args.len(),
                });
            }
        }
        callable.invoke(args).map_err(|message| RecordError::CallFailed {
            key: key.to_string(),
            message,
        })
    }

    // encodings

    pub fn encode_with<C: Codec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>> {
        let value = Value::Object(self.snapshot());
        codec.encode(&value).map_err(|err| {
            debug!(codec = codec.name(), %err, "encode failed");
            RecordError::from(err)
        })
    }

    /// Decodes a record; the payload must hold an object.
    pub fn decode_with<C: Codec + ?Sized>(codec: &C, bytes: &[u8]) -> Result<Record> {
        Self::from_value(codec.decode(bytes)?)
    }

    /// CBOR snapshot of the whole record.
    pub fn encode_binary(&self) -> Result<Vec<u8>> {
        self.encode_with(&CborCodec)
    }

    pub fn decode_binary(bytes: &[u8]) -> Result<Record> {
        Self::decode_with(&CborCodec, bytes)
    }

    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        self.encode_with(&MsgPackCodec)
    }

    pub fn decode_msgpack(bytes: &[u8]) -> Result<Record> {
        Self::decode_with(&MsgPackCodec, bytes)
    }

    /// Compact JSON text with keys in name order.
    pub fn to_json(&self) -> String {
        serde_json::Value::Object(object_to_json(&self.read())).to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", serde_json::Value::Object(object_to_json(&self.read())))
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.encoded()
    }

    /// Human readable size of the JSON form, e.g. `1.5KB`.
    pub fn size(&self) -> String {
        byte_size(self.encoded().len() as u64)
    }

    // files

    /// Reads a JSON record from `store`.
    pub fn load<S: FileStore + ?Sized>(store: &S, path: &str) -> Result<Record> {
        let bytes = store.read(path)?;
        Self::from_json(bytes)
    }

    /// Writes the record to `store` as JSON.
    pub fn save<S: FileStore + ?Sized>(&self, store: &S, path: &str) -> Result<()> {
        store.write(path, &self.encoded())?;
        Ok(())
    }
}

impl Clone for Record {
    fn clone(&self) -> Self {
        Self::from_map(self.snapshot()).with_lock_mode(self.mode)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("data", &*self.read())
            .field("mode", &self.mode)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(map: HashMap<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}
