//! SQL-style LIKE patterns compiled to regular expressions.
//!
//! Supported syntax:
//!
//! | Pattern   | Matches                                   |
//! |-----------|-------------------------------------------|
//! | `%`       | any run of characters, including none     |
//! | `_`       | exactly one character                     |
//! | `[abc]`   | one of the listed characters              |
//! | `[a-f]`   | one character in the range                |
//! | `[^abc]`  | one character not listed                  |
//!
//! Everything else is literal. Matching is anchored at both ends and
//! case-insensitive. An unterminated `[` is taken literally.

use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// A compiled LIKE pattern.
#[derive(Debug, Clone)]
pub struct LikePattern {
    source: String,
    regex: Regex,
}

impl LikePattern {
    /// Compiles a LIKE pattern.
    ///
    /// Fails with [`SpecificationError::InvalidPattern`](crate::SpecificationError::InvalidPattern)
    /// when a character class is malformed, e.g. a reversed range `[z-a]`.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&translate(pattern))
            .case_insensitive(true)
            .build()?;
        Ok(LikePattern {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for LikePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    class.push(inner);
                }
                if closed && !class.is_empty() {
                    push_class(&mut out, &class);
                } else {
                    push_literal(&mut out, '[');
                    for inner in class.chars() {
                        push_literal(&mut out, inner);
                    }
                    if closed {
                        push_literal(&mut out, ']');
                    }
                }
            }
            other => push_literal(&mut out, other),
        }
    }

    out.push('$');
    out
}

fn push_class(out: &mut String, class: &str) {
    out.push('[');
    let mut prev = None;
    for (i, ch) in class.chars().enumerate() {
        match ch {
            '^' if i == 0 => out.push('^'),
            // "--" would be class subtraction in regex syntax
            '-' if prev == Some('-') => out.push_str("\\-"),
            '\\' | '[' | '&' | '~' | '^' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
    out.push(']');
}
