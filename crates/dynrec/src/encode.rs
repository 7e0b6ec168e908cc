//! Single values to raw bytes.

use dynrec_buffers::ByteBuffer;

use crate::codec::{Codec, JsonCodec, MsgPackCodec};
use crate::error::{RecordError, Result};
use crate::value::Value;

/// Format used by [`encode_as`] for values without a native byte form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// JSON text.
    #[default]
    Auto,
    Json,
    MsgPack,
}

/// Encodes a scalar or an object:
///
/// - objects become JSON text;
/// - strings become their UTF-8 bytes;
/// - integers use the minimal variable-width form of [`dynrec_buffers::Int`];
/// - floats use the 8-byte form of [`dynrec_buffers::Float`];
/// - bytes pass through.
///
/// ```
/// use dynrec::{encode, Value};
///
/// assert_eq!(encode(&Value::from("hi")).unwrap().as_slice(), b"hi");
/// assert_eq!(encode(&Value::Int(-1)).unwrap().as_slice(), [0xff]);
/// assert!(encode(&Value::Bool(true)).is_err());
/// ```
pub fn encode(value: &Value) -> Result<ByteBuffer> {
    match value {
        Value::Object(_) => structured(value, Encoding::Json),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Callable(_) => {
            Err(RecordError::Conversion(format!("{} value to bytes", value.kind())))
        }
        _ => scalar(value),
    }
}

/// Like [`encode`], but also accepts booleans (one byte, `1` or `0`) and
/// sends null, arrays and objects through `encoding`.
pub fn encode_as(value: &Value, encoding: Encoding) -> Result<ByteBuffer> {
    match value {
        Value::Bool(b) => Ok(ByteBuffer::from(vec![u8::from(*b)])),
        Value::Null | Value::Array(_) | Value::Object(_) => structured(value, encoding),
        Value::Callable(_) => Err(RecordError::Conversion(format!("{} value to bytes", value.kind()))),
        _ => scalar(value),
    }
}

fn scalar(value: &Value) -> Result<ByteBuffer> {
    Ok(match value {
        Value::String(s) => ByteBuffer::from(s.as_str()),
        Value::Int(i) => ByteBuffer::from_int(*i),
        Value::Float(f) => ByteBuffer::from_f64(*f),
        Value::Bytes(b) => ByteBuffer::from(b.as_slice()),
        other => return Err(RecordError::Conversion(format!("{} value to bytes", other.kind()))),
    })
}

fn structured(value: &Value, encoding: Encoding) -> Result<ByteBuffer> {
    let bytes = match encoding {
        Encoding::Auto | Encoding::Json => JsonCodec::new().encode(value)?,
        Encoding::MsgPack => MsgPackCodec.encode(value)?,
    };
    Ok(ByteBuffer::from(bytes))
}
