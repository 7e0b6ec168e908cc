//! Path lookups directly on encoded JSON bytes.
//!
//! Member names and array positions are resolved by skipping over the
//! encoded text, so only the matched value is copied out. Segments that need
//! a decoded node are handed to [`eval`](crate::eval) from the point where
//! they start. Malformed input never panics; it just fails to match.

use serde_json::Value;

use dynrec_util::glob;

use crate::eval::eval;
use crate::types::{array_index, Kind, Modifier, Path, Segment};

/// A value located by [`query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Encoded bytes of the matched value.
    pub raw: Vec<u8>,
    pub kind: Kind,
    /// Byte offset of `raw` inside the queried document; `None` for values
    /// computed by `#` or a modifier.
    pub index: Option<usize>,
}

impl RawMatch {
    /// Wraps an already decoded value.
    pub fn computed(value: &Value) -> Option<RawMatch> {
        Some(RawMatch {
            raw: serde_json::to_vec(value).ok()?,
            kind: Kind::of(value),
            index: None,
        })
    }

    /// Decodes the matched bytes.
    pub fn value(&self) -> Option<Value> {
        serde_json::from_slice(&self.raw).ok()
    }
}

/// Runs `path` against the encoded document `json`.
pub fn query(json: &[u8], path: &Path) -> Option<RawMatch> {
    let start = skip_ws(json, 0);
    let mut span = (start, skip_value(json, start)?);
    let segments = path.segments();

    for (x, segment) in segments.iter().enumerate() {
        span = match segment {
            Segment::Modifier(Modifier::This) => span,
            Segment::Key(key) => match json[span.0] {
                b'{' => select_member(json, span.0, |k| k == key.as_str())?,
                b'[' => select_element(json, span.0, array_index(key)?)?,
                _ => return None,
            },
            Segment::Pattern(pattern) => select_member(json, span.0, |k| glob::matches(k, pattern))?,
            Segment::Count | Segment::Modifier(_) => {
                let node: Value = serde_json::from_slice(&json[span.0..span.1]).ok()?;
                return RawMatch::computed(&eval(&node, &segments[x..])?);
            }
        };
    }

    let (start, end) = span;
    Some(RawMatch {
        raw: json[start..end].to_vec(),
        kind: Kind::from_lead_byte(json[start]),
        index: Some(start),
    })
}

fn skip_ws(json: &[u8], mut pos: usize) -> usize {
    while matches!(json.get(pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        pos += 1;
    }
    pos
}

/// End offset (exclusive) of the value starting at `pos`.
fn skip_value(json: &[u8], pos: usize) -> Option<usize> {
    match *json.get(pos)? {
        b'{' | b'[' => skip_container(json, pos),
        b'"' => skip_string(json, pos),
        b't' => skip_literal(json, pos, b"true"),
        b'f' => skip_literal(json, pos, b"false"),
        b'n' => skip_literal(json, pos, b"null"),
        b'-' | b'0'..=b'9' => {
            let len = json[pos..]
                .iter()
                .take_while(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
                .count();
            Some(pos + len)
        }
        _ => None,
    }
}

fn skip_literal(json: &[u8], pos: usize, literal: &[u8]) -> Option<usize> {
    json[pos..].starts_with(literal).then_some(pos + literal.len())
}

fn skip_string(json: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos + 1;
    loop {
        match *json.get(i)? {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
}

fn skip_container(json: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = pos;
    loop {
        match *json.get(i)? {
            b'"' => {
                i = skip_string(json, i)?;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
}

/// Compares an encoded member name (quotes included) through `pred`.
fn key_matches(raw: &[u8], pred: &impl Fn(&str) -> bool) -> bool {
    let inner = &raw[1..raw.len() - 1];
    if inner.contains(&b'\\') {
        serde_json::from_slice::<String>(raw).is_ok_and(|k| pred(&k))
    } else {
        std::str::from_utf8(inner).is_ok_and(pred)
    }
}

/// Span of the first member of the object at `start` whose name satisfies
/// `pred`.
fn select_member(json: &[u8], start: usize, pred: impl Fn(&str) -> bool) -> Option<(usize, usize)> {
    if json.get(start) != Some(&b'{') {
        return None;
    }
    let mut i = skip_ws(json, start + 1);
    if json.get(i)? == &b'}' {
        return None;
    }
    loop {
        if json.get(i)? != &b'"' {
            return None;
        }
        let key_end = skip_string(json, i)?;
        let key = &json[i..key_end];
        i = skip_ws(json, key_end);
        if json.get(i)? != &b':' {
            return None;
        }
        let value_start = skip_ws(json, i + 1);
        let value_end = skip_value(json, value_start)?;
        if key_matches(key, &pred) {
            return Some((value_start, value_end));
        }
        i = skip_ws(json, value_end);
        match json.get(i)? {
            b',' => i = skip_ws(json, i + 1),
            _ => return None,
        }
    }
}

/// Spans of the elements of an encoded array, in order. Malformed input
/// ends the iteration early.
struct Elements<'a> {
    json: &'a [u8],
    next: Option<usize>,
}

fn elements_at(json: &[u8], start: usize) -> Option<Elements<'_>> {
    if json.get(start) != Some(&b'[') {
        return None;
    }
    let first = skip_ws(json, start + 1);
    Some(Elements {
        json,
        next: (json.get(first) != Some(&b']')).then_some(first),
    })
}

impl Iterator for Elements<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let start = self.next.take()?;
        let end = skip_value(self.json, start)?;
        let after = skip_ws(self.json, end);
        if self.json.get(after) == Some(&b',') {
            self.next = Some(skip_ws(self.json, after + 1));
        }
        Some((start, end))
    }
}

fn select_element(json: &[u8], start: usize, index: usize) -> Option<(usize, usize)> {
    elements_at(json, start)?.nth(index)
}

/// Every element of the encoded array `json`, found in a single pass.
/// `None` when `json` is not an array.
pub fn elements(json: &[u8]) -> Option<Vec<RawMatch>> {
    let start = skip_ws(json, 0);
    let items = elements_at(json, start)?
        .map(|(start, end)| RawMatch {
            raw: json[start..end].to_vec(),
            kind: Kind::from_lead_byte(json[start]),
            index: Some(start),
        })
        .collect();
    Some(items)
}
