//! Path parser.

use dynrec_util::glob;

use crate::types::{Modifier, Path, Segment};
use crate::JsonPathError;

/// Parser for dotted paths.
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    /// Parses a path. The empty string is `@this`.
    pub fn parse(input: &'a str) -> Result<Path, JsonPathError> {
        if input.is_empty() {
            return Ok(Path::new(vec![Segment::Modifier(Modifier::This)]));
        }
        let mut parser = Self { input, pos: 0 };
        let mut segments = Vec::new();
        loop {
            segments.push(parser.parse_segment()?);
            if parser.is_at_end() {
                break;
            }
            // separator
            parser.advance();
        }
        Ok(Path::new(segments))
    }

    fn parse_segment(&mut self) -> Result<Segment, JsonPathError> {
        let start = self.pos;
        let mut key = String::new();
        while let Some(c) = self.peek() {
            match c {
                '.' | '|' => break,
                '\\' => {
                    self.advance();
                    let escaped = self.peek().ok_or(JsonPathError::DanglingEscape)?;
                    key.push(escaped);
                }
                _ => key.push(c),
            }
            self.advance();
        }

        let raw = &self.input[start..self.pos];
        if raw.is_empty() {
            return Err(JsonPathError::EmptySegment { position: start });
        }
        if let Some(name) = raw.strip_prefix('@') {
            return Modifier::from_name(name)
                .map(Segment::Modifier)
                .ok_or_else(|| JsonPathError::UnknownModifier(raw.to_string()));
        }
        if raw == "#" {
            return Ok(Segment::Count);
        }
        // globs keep the raw text so escaped wildcards stay literal
        Ok(if glob::is_pattern(raw) {
            Segment::Pattern(raw.to_string())
        } else {
            Segment::Key(key)
        })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(path: &str) -> Vec<Segment> {
        PathParser::parse(path).unwrap().segments().to_vec()
    }

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_string())
    }

    #[test]
    fn test_parse_dotted() {
        assert_eq!(keys("a"), vec![key("a")]);
        assert_eq!(keys("a.b.0"), vec![key("a"), key("b"), key("0")]);
        assert_eq!(keys("a|b"), vec![key("a"), key("b")]);
        assert_eq!(keys("ключ.значение"), vec![key("ключ"), key("значение")]);
    }

    #[test]
    fn test_parse_empty_is_this() {
        assert_eq!(keys(""), vec![Segment::Modifier(Modifier::This)]);
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(keys(r"a\.b"), vec![key("a.b")]);
        assert_eq!(keys(r"a\\b"), vec![key(r"a\b")]);
        assert_eq!(keys(r"\*"), vec![key("*")]);
        assert_eq!(keys(r"\#"), vec![key("#")]);
        assert_eq!(keys(r"\@keys"), vec![key("@keys")]);
    }

    #[test]
    fn test_parse_special_segments() {
        assert_eq!(
            keys("items.#.id"),
            vec![key("items"), Segment::Count, key("id")]
        );
        assert_eq!(
            keys("a|@keys"),
            vec![key("a"), Segment::Modifier(Modifier::Keys)]
        );
        assert_eq!(keys("us*r"), vec![Segment::Pattern("us*r".into())]);
        assert_eq!(keys("c?t"), vec![Segment::Pattern("c?t".into())]);
    }

    #[test]
    fn test_escapes_inside_patterns_stay_literal() {
        let path = PathParser::parse(r"a\*b*").unwrap();
        assert_eq!(path.segments(), &[Segment::Pattern(r"a\*b*".into())]);
        assert_eq!(path.to_string(), r"a\*b*");
        assert_eq!(keys(r"x\.y?"), vec![Segment::Pattern(r"x\.y?".into())]);
        assert_eq!(keys(r"a\*\?"), vec![key("a*?")]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathParser::parse("a..b"),
            Err(JsonPathError::EmptySegment { position: 2 })
        );
        assert_eq!(
            PathParser::parse(".a"),
            Err(JsonPathError::EmptySegment { position: 0 })
        );
        assert!(PathParser::parse("a.").is_err());
        assert_eq!(PathParser::parse(r"a\"), Err(JsonPathError::DanglingEscape));
        assert_eq!(
            PathParser::parse("@nope"),
            Err(JsonPathError::UnknownModifier("@nope".into()))
        );
    }
}
