//! Pluggable wire formats for [`Value`]s.
//!
//! | codec | format | use |
//! |---|---|---|
//! | [`JsonCodec`] | JSON text | default text form, path queries on encoded bytes |
//! | [`CborCodec`] | CBOR | whole-record binary snapshots |
//! | [`MsgPackCodec`] | MessagePack | compact alternate binary form |
//!
//! Every codec carries byte strings natively except JSON, which writes them
//! as `data:application/octet-stream;base64,…` strings and restores them on
//! decode. Callables are never encoded.

use dynrec_json_pack::{decode_cbor, encode_cbor, msgpack, PackValue};
use dynrec_json_path::{delete_json, set_json};
use tracing::debug;

use crate::error::{CodecError, RecordError};
use crate::result::PathResult;
use crate::value::Value;

pub trait Codec {
    /// Short format name used in log records.
    fn name(&self) -> &'static str;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// JSON text codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Whether `bytes` is one well-formed JSON document.
    pub fn valid(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<serde::de::IgnoredAny>(bytes).is_ok()
    }

    /// Path lookup on encoded bytes without decoding the whole document.
    pub fn query(&self, bytes: &[u8], path: &str) -> PathResult {
        PathResult::query(bytes, path)
    }

    /// Returns `bytes` with `path` set to `value`.
    pub fn set_path(&self, bytes: &[u8], path: &str, value: &Value) -> Result<Vec<u8>, RecordError> {
        set_json(bytes, path, &value.to_json()).map_err(|e| RecordError::mutation(path, e))
    }

    /// Returns `bytes` with `path` removed.
    pub fn delete_path(&self, bytes: &[u8], path: &str) -> Result<Vec<u8>, RecordError> {
        delete_json(bytes, path).map_err(|e| RecordError::mutation(path, e))
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let json = value.to_json();
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&json)?
        } else {
            serde_json::to_vec(&json)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let json: serde_json::Value = serde_json::from_slice(bytes).inspect_err(|err| {
            debug!(codec = self.name(), %err, "decode failed");
        })?;
        Ok(Value::from(json))
    }
}

/// CBOR object codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn name(&self) -> &'static str {
        "cbor"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(encode_cbor(&PackValue::from(value))?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let pack = decode_cbor(bytes).inspect_err(|err| {
            debug!(codec = self.name(), %err, "decode failed");
        })?;
        Ok(Value::from(pack))
    }
}

/// MessagePack codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(msgpack::encode(&PackValue::from(value)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let pack = msgpack::decode(bytes).inspect_err(|err| {
            debug!(codec = self.name(), %err, "decode failed");
        })?;
        Ok(Value::from(pack))
    }
}
