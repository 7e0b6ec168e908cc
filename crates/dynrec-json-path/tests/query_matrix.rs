use dynrec_json_path::{get, query, Kind, Path};

const DOC: &str = r#"{
  "name": {"first": "Tom", "last": "Anderson"},
  "age": 37,
  "children": ["Sara", "Alex", "Jack"],
  "fav.movie": "Deer Hunter",
  "friends": [
    {"first": "Dale", "last": "Murphy", "age": 44, "nets": ["ig", "fb", "tw"]},
    {"first": "Roger", "last": "Craig", "age": 68, "nets": ["fb", "tw"]},
    {"first": "Jane", "last": "Murphy", "age": 47, "nets": ["ig", "tw"]}
  ],
  "active": true,
  "spouse": null
}"#;

fn raw(path: &str) -> Option<String> {
    get(DOC.as_bytes(), path).map(|m| String::from_utf8(m.raw).unwrap())
}

fn kind(path: &str) -> Option<Kind> {
    get(DOC.as_bytes(), path).map(|m| m.kind)
}

#[test]
fn member_and_index_matrix() {
    assert_eq!(raw("name.last").as_deref(), Some(r#""Anderson""#));
    assert_eq!(raw("age").as_deref(), Some("37"));
    assert_eq!(raw("children.1").as_deref(), Some(r#""Alex""#));
    assert_eq!(raw(r"fav\.movie").as_deref(), Some(r#""Deer Hunter""#));
    assert_eq!(raw("friends.1.first").as_deref(), Some(r#""Roger""#));
    assert_eq!(raw("friends.2.nets.0").as_deref(), Some(r#""ig""#));
    assert_eq!(raw("friends|1|age").as_deref(), Some("68"));
}

#[test]
fn kind_matrix() {
    assert_eq!(kind("name"), Some(Kind::Object));
    assert_eq!(kind("children"), Some(Kind::Array));
    assert_eq!(kind("age"), Some(Kind::Number));
    assert_eq!(kind("active"), Some(Kind::Bool));
    assert_eq!(kind("spouse"), Some(Kind::Null));
    assert_eq!(kind("name.first"), Some(Kind::String));
}

#[test]
fn missing_matrix() {
    for path in ["nope", "name.middle", "children.3", "age.value", "friends.x", "a..b", "@bogus"] {
        assert!(get(DOC.as_bytes(), path).is_none(), "path {path}");
    }
}

#[test]
fn computed_matrix() {
    assert_eq!(raw("children.#").as_deref(), Some("3"));
    assert_eq!(raw("friends.#.first").as_deref(), Some(r#"["Dale","Roger","Jane"]"#));
    assert_eq!(raw("friends.#.nets.#").as_deref(), Some("[3,2,2]"));
    assert_eq!(raw("name|@keys.#").as_deref(), Some("2"));
    assert_eq!(kind("name|@values"), Some(Kind::Array));
    assert_eq!(get(DOC.as_bytes(), "children.#").unwrap().index, None);
}

#[test]
fn pattern_matrix() {
    assert_eq!(raw("child*.0").as_deref(), Some(r#""Sara""#));
    assert_eq!(raw("a?e").as_deref(), Some("37"));
    assert_eq!(raw("name.l*").as_deref(), Some(r#""Anderson""#));
}

#[test]
fn offsets_point_into_the_document() {
    for path in ["age", "children.2", "friends.0.nets", "name"] {
        let hit = get(DOC.as_bytes(), path).unwrap();
        let at = hit.index.unwrap();
        assert_eq!(&DOC.as_bytes()[at..at + hit.raw.len()], hit.raw.as_slice());
    }
}

#[test]
fn parsed_path_reuse() {
    let path = Path::parse("friends.0.age").unwrap();
    let other = br#"{"friends":[{"age":1}]}"#;
    assert_eq!(query(DOC.as_bytes(), &path).unwrap().raw, b"44");
    assert_eq!(query(other, &path).unwrap().raw, b"1");
}
