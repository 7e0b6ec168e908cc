//! CBOR codec for [`PackValue`], backed by `ciborium`.

use ciborium::value::{Integer, Value as CborValue};
use thiserror::Error;

use crate::PackValue;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("invalid cbor payload: {0}")]
    InvalidPayload(String),
    #[error("cbor encoding failed: {0}")]
    Encode(String),
    #[error("unsupported cbor feature: {0}")]
    Unsupported(&'static str),
}

pub fn pack_to_cbor(value: &PackValue) -> CborValue {
    match value {
        PackValue::Null => CborValue::Null,
        PackValue::Bool(b) => CborValue::Bool(*b),
        PackValue::Integer(i) => CborValue::Integer((*i).into()),
        PackValue::UInteger(u) => CborValue::Integer((*u).into()),
        PackValue::Float(f) => CborValue::Float(*f),
        PackValue::Bytes(b) => CborValue::Bytes(b.clone()),
        PackValue::Str(s) => CborValue::Text(s.clone()),
        PackValue::Array(items) => CborValue::Array(items.iter().map(pack_to_cbor).collect()),
        PackValue::Object(pairs) => CborValue::Map(
            pairs
                .iter()
                .map(|(k, v)| (CborValue::Text(k.clone()), pack_to_cbor(v)))
                .collect(),
        ),
    }
}

fn integer_to_pack(i: Integer) -> Result<PackValue, CborError> {
    if let Ok(signed) = i64::try_from(i) {
        return Ok(PackValue::Integer(signed));
    }
    u64::try_from(i)
        .map(PackValue::UInteger)
        .map_err(|_| CborError::Unsupported("integer wider than 64 bits"))
}

pub fn cbor_to_pack(value: CborValue) -> Result<PackValue, CborError> {
    Ok(match value {
        CborValue::Null => PackValue::Null,
        CborValue::Bool(b) => PackValue::Bool(b),
        CborValue::Integer(i) => integer_to_pack(i)?,
        CborValue::Float(f) => PackValue::Float(f),
        CborValue::Bytes(b) => PackValue::Bytes(b),
        CborValue::Text(s) => PackValue::Str(s),
        CborValue::Array(items) => PackValue::Array(
            items
                .into_iter()
                .map(cbor_to_pack)
                .collect::<Result<_, _>>()?,
        ),
        CborValue::Map(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let key = match k {
                    CborValue::Text(s) => s,
                    _ => return Err(CborError::Unsupported("non-text map key")),
                };
                pairs.push((key, cbor_to_pack(v)?));
            }
            PackValue::Object(pairs)
        }
        CborValue::Tag(_, _) => return Err(CborError::Unsupported("tagged value")),
        _ => return Err(CborError::Unsupported("unknown cbor value")),
    })
}

/// Encodes `value` as CBOR.
pub fn encode_cbor(value: &PackValue) -> Result<Vec<u8>, CborError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(&pack_to_cbor(value), &mut out)
        .map_err(|e| CborError::Encode(e.to_string()))?;
    Ok(out)
}

/// Decodes one CBOR item from `data`.
pub fn decode_cbor(data: &[u8]) -> Result<PackValue, CborError> {
    let value: CborValue =
        ciborium::de::from_reader(data).map_err(|e| CborError::InvalidPayload(e.to_string()))?;
    cbor_to_pack(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cbor_roundtrip_matrix() {
        let cases = vec![
            PackValue::Null,
            PackValue::Bool(true),
            PackValue::Integer(-1),
            PackValue::Integer(i64::MIN),
            PackValue::UInteger(u64::MAX),
            PackValue::Float(2.5),
            PackValue::Bytes(vec![0, 1, 2]),
            PackValue::from(json!({"a": [1, "two", null], "b": {"c": false}})),
        ];
        for case in cases {
            let bytes = encode_cbor(&case).unwrap();
            assert_eq!(decode_cbor(&bytes).unwrap(), case);
        }
    }

    #[test]
    fn test_known_bytes() {
        assert_eq!(encode_cbor(&PackValue::Integer(10)).unwrap(), [0x0a]);
        assert_eq!(encode_cbor(&"a".into()).unwrap(), [0x61, b'a']);
        assert_eq!(decode_cbor(&[0xf5]).unwrap(), PackValue::Bool(true));
    }

    #[test]
    fn test_rejects() {
        assert!(matches!(decode_cbor(&[]), Err(CborError::InvalidPayload(_))));
        // {1: 2}
        assert_eq!(
            decode_cbor(&[0xa1, 0x01, 0x02]),
            Err(CborError::Unsupported("non-text map key"))
        );
        // tag 1 (epoch time) around 0
        assert_eq!(
            decode_cbor(&[0xc1, 0x00]),
            Err(CborError::Unsupported("tagged value"))
        );
    }
}
