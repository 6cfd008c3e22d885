//! Token codec for the line-oriented Item format
//!
//! The server returns Items one per line, each component rendered as a
//! token. Tokens are separated by whitespace (`' \r\n\t\v\f'`). Strings
//! are the only tokens that can contain whitespace, so a token that starts
//! with `"` runs to the matching unescaped `"` instead of to the next
//! whitespace. Inside a string a backslash takes the next character
//! literally.

use crate::component::{parse_primitive, Component};
use crate::error::{CoreError, Result};
use crate::item::Item;

const WHITESPACE: &[char] = &[' ', '\r', '\n', '\t', '\u{0b}', '\u{0c}'];

fn is_separator(c: char) -> bool {
    WHITESPACE.contains(&c)
}

/// Quote a string for the token format.
///
/// Backslashes are doubled and embedded quotes escaped, so the result
/// always parses back to `s`.
pub fn encode_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Parse a quoted string starting at byte offset `start`.
///
/// Returns `Ok(None)` when there is no `"` at `start`, otherwise the
/// string content and the offset just past the closing quote.
pub fn parse_quoted(text: &str, start: usize) -> Result<Option<(String, usize)>> {
    let rest = match text.get(start..) {
        Some(rest) if rest.starts_with('"') => &rest[1..],
        _ => return Ok(None),
    };
    let mut content = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok(Some((content, start + 1 + i + 1))),
            '\\' => match chars.next() {
                Some((_, escaped)) => content.push(escaped),
                None => return Err(CoreError::unterminated(text)),
            },
            _ => content.push(c),
        }
    }
    Err(CoreError::unterminated(text))
}

/// Split one line into its components.
///
/// Surrounding whitespace is ignored and a blank line yields no components.
pub fn parse_components(line: &str) -> Result<Vec<Component>> {
    let mut components = Vec::new();
    let mut i = skip_separators(line, 0);
    while i < line.len() {
        if let Some((content, after)) = parse_quoted(line, i)? {
            components.push(Component::String(content));
            i = after;
        } else {
            let end = line[i..]
                .find(is_separator)
                .map_or(line.len(), |offset| i + offset);
            components.push(parse_primitive(&line[i..end])?);
            i = end;
        }
        i = skip_separators(line, i);
    }
    Ok(components)
}

/// Parse a multi-line response body into Items, one per non-blank line.
pub fn parse_lines(text: &str) -> Result<Vec<Item>> {
    text.lines()
        .filter(|line| !line.trim_matches(is_separator).is_empty())
        .map(|line| parse_components(line).map(Item::from))
        .collect()
}

fn skip_separators(line: &str, from: usize) -> usize {
    line[from..]
        .find(|c: char| !is_separator(c))
        .map_or(line.len(), |offset| from + offset)
}
