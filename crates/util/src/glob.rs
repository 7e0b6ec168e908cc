//! Wildcard matching.
//!
//! `*` matches any run of characters (including none) and `?` matches exactly
//! one character. `\` makes the character after it literal, so `\*` only
//! matches a star. Everything else matches itself. Matching works on `char`s,
//! so `?` consumes a whole multi-byte character.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Any,
    One,
    Literal(char),
}

fn tokens(pattern: &str) -> Vec<Token> {
    let mut out = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        out.push(match c {
            '*' => Token::Any,
            '?' => Token::One,
            // a trailing backslash stands for itself
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        });
    }
    out
}

/// Whether `pattern` contains an unescaped wildcard.
pub fn is_pattern(pattern: &str) -> bool {
    tokens(pattern).iter().any(|t| !matches!(t, Token::Literal(_)))
}

/// Matches `text` against `pattern`.
///
/// ```
/// use dynrec_util::glob::matches;
///
/// assert!(matches("user_name", "user_*"));
/// assert!(matches("cat", "c?t"));
/// assert!(!matches("cart", "c?t"));
/// assert!(matches("a*", r"a\*"));
/// assert!(!matches("ab", r"a\*"));
/// ```
pub fn matches(text: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let text: Vec<char> = text.chars().collect();
    let pattern = tokens(pattern);
    let (mut ti, mut pi) = (0, 0);
    // last `*` seen and the text position it currently absorbs up to
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some(Token::Any) => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(Token::One) => {
                ti += 1;
                pi += 1;
            }
            Some(&Token::Literal(c)) if c == text[ti] => {
                ti += 1;
                pi += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    pi = star + 1;
                    ti = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }
    pattern[pi..].iter().all(|&t| t == Token::Any)
}
