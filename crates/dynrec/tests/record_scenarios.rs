use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use dynrec::{CodecError, Kind, LockMode, MemoryFileStore, OsFileStore, Record, RecordError, Value};
use dynrec_json_pack::binary::BIN_URI_START;
use dynrec_json_pack::msgpack::MsgPackError;
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    Record::from_value(Value::from(value)).unwrap()
}

#[test]
fn nested_get_set_del() {
    let r = record(json!({"a": 1, "b": {"c": 2}}));

    let c = r.get("b.c");
    assert_eq!(c.value(), Value::Int(2));
    assert_eq!(c.kind(), Kind::Number);

    r.set("b.d", 3).unwrap();
    assert_eq!(r.get("b.d").value(), Value::Int(3));
    assert_eq!(r.get("b.c").value(), Value::Int(2));
    assert_eq!(r.get("a").value(), Value::Int(1));

    r.del("b.c").unwrap();
    assert!(!r.get("b.c").exists());
    assert_eq!(r.get("b").value(), Value::from(json!({"d": 3})));
}

#[test]
fn views_are_not_refreshed() {
    let r = record(json!({"a": 1}));
    let before = r.get("a");
    r.set("a", 2).unwrap();
    assert_eq!(before.value(), Value::Int(1));
    assert_eq!(r.get("a").value(), Value::Int(2));
}

#[test]
fn path_grammar_through_records() {
    let r = record(json!({
        "a.b": "dotted",
        "friends": [{"name": "ann", "age": 30}, {"name": "bo", "age": 41}],
        "meta": {"k1": 1, "k2": 2}
    }));
    assert_eq!(r.string(r"a\.b"), "dotted");
    assert_eq!(r.get("friends.#").as_i64(), Some(2));
    assert_eq!(r.get("friends.#.name").value(), Value::from(json!(["ann", "bo"])));
    assert_eq!(r.string("friends|1|name"), "bo");
    assert_eq!(r.int("meta.k?"), 1);

    let keys = r.get("meta|@keys");
    assert_eq!(keys.index(), None);
    let mut keys: Vec<String> = keys.decode::<Vec<String>>().unwrap().unwrap();
    keys.sort();
    assert_eq!(keys, ["k1", "k2"]);

    assert!(!r.get("friends..name").exists());
    assert!(!r.get("@nope").exists());
}

#[test]
fn decode_into_structs() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Friend {
        name: String,
        age: u32,
    }

    let r = record(json!({"friends": [{"name": "ann", "age": 30}]}));
    let friend: Option<Friend> = r.decode("friends.0").unwrap();
    assert_eq!(
        friend,
        Some(Friend {
            name: "ann".to_string(),
            age: 30
        })
    );
    assert_eq!(r.decode::<Friend>("friends.1").unwrap(), None);
    assert!(matches!(r.decode::<u32>("friends"), Err(RecordError::Json(_))));

    let arrays = r.get_as_array("friends");
    assert_eq!(arrays.len(), 1);
    assert_eq!(arrays[0].string("name"), "ann");
}

#[test]
fn disjoint_merge_sums_lengths() {
    let a = record(json!({"a": 1, "b": 2}));
    let b = record(json!({"c": 3}));
    a.merge(&[&b]);
    assert_eq!(a.len(), 3);
    assert!(a.has(&["a", "b", "c"]));
}

#[test]
fn overlapping_merge_takes_right_value() {
    let a = record(json!({"k": "left", "only_a": true}));
    let b = record(json!({"k": "right"}));
    a.merge(&[&b]);
    assert_eq!(a.string("k"), "right");
    assert!(a.bool("only_a"));
}

#[test]
fn binary_round_trips() {
    let r = record(json!({
        "s": "text",
        "i": -42,
        "f": 2.5,
        "b": false,
        "n": null,
        "list": [1, "two", [3]],
        "nested": {"deeper": {"x": 1}}
    }));
    r.set("raw", vec![0u8, 1, 2, 254, 255]).unwrap();

    let cbor = Record::decode_binary(&r.encode_binary().unwrap()).unwrap();
    assert_eq!(cbor.snapshot(), r.snapshot());

    let packed = Record::decode_msgpack(&r.encode_msgpack().unwrap()).unwrap();
    assert_eq!(packed.snapshot(), r.snapshot());

    let text = Record::from_json(r.to_json()).unwrap();
    assert_eq!(text.snapshot(), r.snapshot());
    assert_eq!(text.get_value("raw"), Some(Value::Bytes(vec![0, 1, 2, 254, 255])));
}

#[test]
fn strings_shaped_like_data_uris_survive() {
    let text = format!("{BIN_URI_START}aGk=");
    let r = Record::new();
    r.set("k", text.as_str()).unwrap();
    r.set("blob", vec![104u8, 105]).unwrap();
    assert_eq!(r.get("k").value(), Value::from(text.as_str()));
    assert_eq!(r.get("blob").value(), Value::Bytes(b"hi".to_vec()));

    let back = Record::from_json(r.to_json()).unwrap();
    assert_eq!(back.snapshot(), r.snapshot());
    let back = Record::decode_binary(&r.encode_binary().unwrap()).unwrap();
    assert_eq!(back.get_value("k"), Some(Value::from(text.as_str())));
}

#[test]
fn deeply_nested_msgpack_is_an_error() {
    let mut payload = vec![0x81, 0xa1, b'k'];
    payload.extend(std::iter::repeat(0x91).take(1_000_000));
    payload.push(0xc0);
    assert!(matches!(
        Record::decode_msgpack(&payload),
        Err(RecordError::Codec(CodecError::MsgPack(MsgPackError::TooDeep(_))))
    ));
}

#[test]
fn binary_decode_rejects_non_objects() {
    let list = dynrec::CborCodec;
    let bytes = dynrec::Codec::encode(&list, &Value::from(json!([1, 2]))).unwrap();
    assert!(matches!(Record::decode_binary(&bytes), Err(RecordError::NotAnObject(_))));
    assert!(matches!(Record::decode_msgpack(&[0xc1]), Err(RecordError::Codec(_))));
}

#[test]
fn concurrent_writers_and_readers() {
    let r = Arc::new(Record::new());
    let writers: Vec<_> = (0..8)
        .map(|t| {
            let r = Arc::clone(&r);
            thread::spawn(move || {
                for x in 0..50 {
                    r.set(&format!("t{t}.k{x}"), x).unwrap();
                    assert!(r.get(&format!("t{t}.k{x}")).exists());
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    assert_eq!(r.len(), 8);
    for t in 0..8 {
        assert_eq!(r.get(&format!("t{t}")).to_record().unwrap().len(), 50);
    }
}

#[test]
fn global_lock_mode_still_works_across_threads() {
    let records: Vec<_> = (0..4)
        .map(|_| Arc::new(Record::new().with_lock_mode(LockMode::Global)))
        .collect();
    let handles: Vec<_> = records
        .iter()
        .cloned()
        .enumerate()
        .map(|(t, r)| {
            thread::spawn(move || {
                for x in 0..25 {
                    r.set(&format!("k{x}"), t as i64).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    for (t, r) in records.iter().enumerate() {
        assert_eq!(r.len(), 25);
        assert_eq!(r.int("k0"), t as i64);
    }
}

#[test]
fn save_and_load_through_the_file_system() {
    let dir = tempfile::tempdir().unwrap();
    let store = OsFileStore::rooted(dir.path());
    let r = record(json!({"name": "cfg", "ports": [80, 443]}));
    r.save(&store, "file:cfg.json").unwrap();

    let loaded = Record::load(&store, "cfg.json").unwrap();
    assert_eq!(loaded.snapshot(), r.snapshot());
    assert!(matches!(Record::load(&store, "absent.json"), Err(RecordError::Io(_))));
}

#[test]
fn save_and_load_in_memory() {
    let store = MemoryFileStore::new();
    record(json!({"a": 1})).save(&store, "a").unwrap();
    assert_eq!(Record::load(&store, "a").unwrap().int("a"), 1);
}

#[test]
fn diffs_are_symmetric() {
    let a = record(json!({"a": 1, "b": 2}));
    let b = record(json!({"b": 1, "c": 2}));
    assert_eq!(a.diffs(&b), ["a", "c"]);
    assert_eq!(b.diffs(&a), ["a", "c"]);
}

fn key() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[ -~]{0,12}".prop_map(Value::from),
        ("\\\\{0,2}", "[A-Za-z0-9+/]{0,8}={0,2}")
            .prop_map(|(escape, tail)| Value::from(format!("{escape}{BIN_URI_START}{tail}"))),
    ]
}

proptest! {
    #[test]
    fn set_then_get(keys in prop::collection::vec(key(), 1..4), value in scalar()) {
        let r = record(json!({"seed": {"x": 1}}));
        let path = keys.join(".");
        r.set(&path, value.clone()).unwrap();
        prop_assert_eq!(r.get(&path).value(), value);
    }

    #[test]
    fn del_then_get(keys in prop::collection::vec(key(), 1..4), value in scalar()) {
        let r = Record::new();
        let path = keys.join(".");
        r.set(&path, value).unwrap();
        r.del(&path).unwrap();
        prop_assert!(!r.get(&path).exists());
    }

    #[test]
    fn unrelated_keys_keep_has(extra in key()) {
        let r = record(json!({"k1": 1, "k2": 2}));
        prop_assume!(extra != "k1" && extra != "k2");
        r.set(&extra, 3).unwrap();
        prop_assert!(r.has(&["k1", "k2"]));
        let expected: HashSet<String> = ["k1", "k2", extra.as_str()].iter().map(|s| s.to_string()).collect();
        prop_assert_eq!(r.keys(), expected);
    }
}
