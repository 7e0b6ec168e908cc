use dynrec_json_pack::{cbor, decode_cbor, encode_cbor, msgpack, PackValue};
use proptest::prelude::*;
use serde_json::json;

fn leaf() -> impl Strategy<Value = PackValue> {
    prop_oneof![
        Just(PackValue::Null),
        any::<bool>().prop_map(PackValue::Bool),
        any::<i64>().prop_map(PackValue::Integer),
        ((i64::MAX as u64 + 1)..=u64::MAX).prop_map(PackValue::UInteger),
        any::<f64>()
            .prop_filter("NaN never equals itself", |f| !f.is_nan())
            .prop_map(PackValue::Float),
        prop::collection::vec(any::<u8>(), 0..40).prop_map(PackValue::Bytes),
        ".{0,40}".prop_map(PackValue::Str),
    ]
}

fn pack_value() -> impl Strategy<Value = PackValue> {
    leaf().prop_recursive(3, 48, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(PackValue::Array),
            prop::collection::vec(("[a-z]{0,8}", inner), 0..8).prop_map(PackValue::Object),
        ]
    })
}

#[test]
fn document_matrix() {
    let doc = PackValue::from(json!({
        "name": "dynrec",
        "version": 3,
        "ratio": -0.25,
        "tags": ["a", "b"],
        "nested": {"deep": {"deeper": [null, true, 1e300]}},
        "wide": 4_294_967_296i64,
        "neg": -2_147_483_649i64
    }));
    assert_eq!(msgpack::decode(&msgpack::encode(&doc)).unwrap(), doc);
    assert_eq!(decode_cbor(&encode_cbor(&doc).unwrap()).unwrap(), doc);
}

#[test]
fn byte_string_headers() {
    let value = PackValue::Bytes(vec![9; 300]);
    let mp = msgpack::encode(&value);
    let cb = encode_cbor(&value).unwrap();
    assert_eq!(&mp[..3], &[0xc5, 0x01, 0x2c]);
    assert_eq!(&cb[..3], &[0x59, 0x01, 0x2c]);
    assert_eq!(msgpack::decode(&mp).unwrap(), cbor::cbor_to_pack(cbor::pack_to_cbor(&value)).unwrap());
}

proptest! {
    #[test]
    fn msgpack_roundtrip(value in pack_value()) {
        prop_assert_eq!(msgpack::decode(&msgpack::encode(&value)).unwrap(), value);
    }

    #[test]
    fn cbor_roundtrip(value in pack_value()) {
        prop_assert_eq!(decode_cbor(&encode_cbor(&value).unwrap()).unwrap(), value);
    }

    #[test]
    fn msgpack_never_panics_on_garbage(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = msgpack::decode(&bytes);
    }
}
