//! Path and result types.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{JsonPathError, PathParser};

/// Built-in `@` modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `@this`: the current node.
    This,
    /// `@keys`: member names of an object.
    Keys,
    /// `@values`: member values of an object.
    Values,
}

impl Modifier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "this" => Some(Modifier::This),
            "keys" => Some(Modifier::Keys),
            "values" => Some(Modifier::Values),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modifier::This => "this",
            Modifier::Keys => "keys",
            Modifier::Values => "values",
        }
    }
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member name, or array index when numeric.
    Key(String),
    /// Glob over member names, written as in the path so `\*` and `\?`
    /// stay literal.
    Pattern(String),
    /// `#`
    Count,
    Modifier(Modifier),
}

impl Segment {
    /// Whether a mutation can pass through this segment.
    pub fn is_writable(&self) -> bool {
        matches!(self, Segment::Key(_) | Segment::Modifier(Modifier::This))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(&escape_key(key)),
            Segment::Pattern(pattern) => f.write_str(pattern),
            Segment::Count => f.write_str("#"),
            Segment::Modifier(m) => write!(f, "@{}", m.name()),
        }
    }
}

/// A parsed path.
///
/// ```
/// use dynrec_json_path::{Path, Segment};
///
/// let path: Path = r"user.first\.name".parse().unwrap();
/// assert_eq!(
///     path.segments(),
///     &[Segment::Key("user".into()), Segment::Key("first.name".into())]
/// );
/// assert_eq!(path.to_string(), r"user.first\.name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn parse(input: &str) -> Result<Self, JsonPathError> {
        PathParser::parse(input)
    }

    /// A path of plain member names, no parsing involved.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: keys.into_iter().map(|k| Segment::Key(k.into())).collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path selects the node it is applied to.
    pub fn is_root(&self) -> bool {
        self.segments
            .iter()
            .all(|s| *s == Segment::Modifier(Modifier::This))
    }

    /// A new path with `other` appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }
}

impl FromStr for Path {
    type Err = JsonPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (x, segment) in self.segments.iter().enumerate() {
            if x > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Escapes a member name so it parses back as a single plain key.
///
/// ```
/// use dynrec_json_path::escape_key;
///
/// assert_eq!(escape_key("a.b"), r"a\.b");
/// assert_eq!(escape_key("@keys"), r"\@keys");
/// assert_eq!(escape_key("plain"), "plain");
/// ```
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    if key.starts_with('@') || key == "#" {
        out.push('\\');
    }
    for c in key.chars() {
        if matches!(c, '.' | '|' | '\\' | '*' | '?') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Array index named by a path step: a non-empty run of ASCII digits.
pub fn array_index(step: &str) -> Option<usize> {
    if step.is_empty() || !step.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    step.parse().ok()
}

/// Category of a matched node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl Kind {
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Kind of an encoded JSON value, judged by its first byte.
    pub fn from_lead_byte(b: u8) -> Kind {
        match b {
            b'{' => Kind::Object,
            b'[' => Kind::Array,
            b'"' => Kind::String,
            b't' | b'f' => Kind::Bool,
            b'n' => Kind::Null,
            _ => Kind::Number,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Array => "array",
        })
    }
}
