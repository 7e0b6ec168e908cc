//! Dotted path queries and mutations.
//!
//! Paths address object members and array elements with `.`-separated
//! segments (`|` works as a separator too):
//!
//! - `name` selects an object member, a numeric segment selects an array
//!   element (`friends.0.name`);
//! - `\` escapes the next character, so `a\.b` is the single key `a.b`;
//! - a segment with an unescaped `*` or `?` is a glob selecting the first
//!   matching member;
//! - `#` yields an array's length, or maps the rest of the path over every
//!   element when more segments follow;
//! - `@this`, `@keys` and `@values` are modifiers.
//!
//! Reads run directly on encoded JSON bytes ([`query`]), so a lookup does not
//! need to decode the whole document. Writes go through the [`Node`] trait
//! and work on any tree that can expose its objects and arrays mutably.
//!
//! # Example
//!
//! ```
//! use dynrec_json_path::{get, set_json, Kind};
//!
//! let doc = br#"{"a":1,"b":{"c":2}}"#;
//! let hit = get(doc, "b.c").unwrap();
//! assert_eq!(hit.raw, b"2");
//! assert_eq!(hit.kind, Kind::Number);
//!
//! let updated = set_json(doc, "b.d", &serde_json::json!(3)).unwrap();
//! assert_eq!(get(&updated, "b.d").unwrap().raw, b"3");
//! ```

use thiserror::Error;

mod types;
pub use types::{array_index, escape_key, Kind, Modifier, Path, Segment};

mod parser;
pub use parser::PathParser;

mod scan;
pub use scan::{elements, query, RawMatch};

mod eval;
pub use eval::eval;

mod mutate;
pub use mutate::{delete_in, delete_json, set_in, set_json, Node, ObjectNode, MAX_PADDING};

/// Parses `path` and runs it against `json`. Invalid paths and malformed
/// documents both yield `None`.
pub fn get(json: &[u8], path: &str) -> Option<RawMatch> {
    let path = Path::parse(path).ok()?;
    query(json, &path)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPathError {
    #[error("empty path segment at offset {position}")]
    EmptySegment { position: usize },
    #[error("path ends with a dangling escape")]
    DanglingEscape,
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("segment `{0}` cannot be written")]
    NotWritable(String),
    #[error("cannot index an array with `{0}`")]
    NotAnIndex(String),
    #[error("array index `{0}` is too far past the end")]
    IndexTooLarge(String),
    #[error("cannot delete the document root")]
    RootDelete,
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
