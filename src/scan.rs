//! Low-level text scanning for the INI grammar.
//!
//! This module owns the character-level rules: which characters are
//! reserved, how values are quoted and escaped, and how quoted runs and
//! inline arrays are extracted from a source line. The document parser in
//! [`crate::document`] drives these primitives one line at a time.
//!
//! All structural characters are ASCII, so scanning works on raw bytes;
//! multi-byte UTF-8 sequences can never collide with a delimiter.

use crate::error::{Error, Result};

/// Separates a key from its value.
pub const KEY_VALUE_SEPARATOR: char = '=';
/// Separates items inside an inline array.
pub const ARRAY_DELIMITER: char = ',';
/// Opens an inline array.
pub const ARRAY_START: char = '{';
/// Closes an inline array.
pub const ARRAY_END: char = '}';
/// Quotes a value that contains structural characters.
pub const QUOTE: char = '"';
/// Opens a section header.
pub const SECTION_START: char = '[';
/// Closes a section header.
pub const SECTION_END: char = ']';
/// Standard comment marker.
pub const COMMENT: char = '#';
/// Alternate comment marker.
pub const ALT_COMMENT: char = ';';
/// Escapes a quote inside quoted text.
pub const ESCAPE: char = '\\';

/// Characters that may not appear in names and force quoting in values.
pub const RESERVED: [char; 8] = [
    QUOTE,
    COMMENT,
    ALT_COMMENT,
    KEY_VALUE_SEPARATOR,
    ARRAY_START,
    ARRAY_END,
    SECTION_START,
    SECTION_END,
];

/// Whether `c` is one of the reserved structural characters.
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Escape a raw value for output.
///
/// A value needs quoting if it contains any reserved character or has
/// leading or trailing whitespace; it needs internal escaping if it contains
/// a `"`. Returns `None` when the value can be written as-is.
pub fn escape_value(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let needs_escaping = value.contains(QUOTE);
    let edge_whitespace = value
        .chars()
        .next()
        .is_some_and(char::is_whitespace)
        || value.chars().next_back().is_some_and(char::is_whitespace);
    let needs_quotes = value.chars().any(is_reserved) || edge_whitespace;

    if !needs_escaping && !needs_quotes {
        return None;
    }

    let mut escaped = if needs_escaping {
        value.replace('"', "\\\"")
    } else {
        value.to_string()
    };
    if needs_quotes {
        escaped.insert(0, QUOTE);
        escaped.push(QUOTE);
    }

    Some(escaped)
}

/// Escape one inline-array item.
///
/// Same rules as [`escape_value`], except the array delimiter also forces
/// quoting; a bare comma inside an item would split it on re-parse.
pub fn escape_array_item(value: &str) -> Option<String> {
    match escape_value(value) {
        Some(escaped) => Some(escaped),
        None if value.contains(ARRAY_DELIMITER) => Some(format!("{}{}{}", QUOTE, value, QUOTE)),
        None => None,
    }
}

/// Strip one layer of surrounding quotes and un-escape `\"`.
///
/// Returns `None` when the value carries no quoting or escape markers and no
/// trim was requested, i.e. when nothing would change.
pub fn unescape_value(value: &str, trim: bool) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let value = if trim { value.trim() } else { value };
    let needs_unescaping = value.contains(ESCAPE);
    let needs_unquoting = value.starts_with(QUOTE);

    if !needs_unescaping && !needs_unquoting && !trim {
        return None;
    }

    let mut unescaped = value.to_string();
    if needs_unquoting && unescaped.len() >= 2 {
        unescaped.pop();
        unescaped.remove(0);
    }
    if needs_unescaping {
        unescaped = unescaped.replace("\\\"", "\"");
    }
    if trim {
        unescaped = unescaped.trim().to_string();
    }

    Some(unescaped)
}

/// Find the first occurrence of `target` at or after `from` that is not
/// preceded by the escape character.
pub(crate) fn find_unescaped(source: &str, from: usize, target: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    (from..bytes.len())
        .find(|&i| bytes[i] == target && (i == 0 || bytes[i - 1] != ESCAPE as u8))
}

/// Find the first comment marker at or after `from`.
pub(crate) fn find_comment(source: &str, from: usize, markers: &[char]) -> Option<usize> {
    source[from..]
        .char_indices()
        .find(|(_, c)| markers.contains(c))
        .map(|(i, _)| i + from)
}

/// Extract the inner text of a quoted run.
///
/// `start` must point at the opening quote. Returns the text between the
/// quotes (escapes untouched) and the index just past the closing quote.
pub(crate) fn scan_quoted(source: &str, start: usize) -> Result<(&str, usize)> {
    debug_assert_eq!(source.as_bytes()[start], QUOTE as u8);

    match find_unescaped(source, start + 1, QUOTE as u8) {
        Some(end) => Ok((&source[start + 1..end], end + 1)),
        None => Err(Error::format("quoted string end not found")),
    }
}

/// Split an inline array into its raw items.
///
/// `start` must point at the opening `{`. Returns the raw item slices
/// (whitespace and quoting intact) and the index just past the closing `}`.
/// An empty array `{ }` yields no items; explicit delimiters always yield an
/// item per slot, even when blank.
pub(crate) fn scan_array(source: &str, start: usize) -> Result<(Vec<&str>, usize)> {
    let bytes = source.as_bytes();
    debug_assert_eq!(bytes[start], ARRAY_START as u8);

    let mut items: Vec<&str> = Vec::new();
    let mut item_start = start + 1;
    let mut in_quotes = false;
    let mut expect_delimiter = false;

    for i in (start + 1)..bytes.len() {
        let b = bytes[i];
        let unescaped_quote = b == QUOTE as u8 && bytes[i - 1] != ESCAPE as u8;

        if in_quotes {
            if unescaped_quote {
                in_quotes = false;
                expect_delimiter = true;
            }
            continue;
        }
        if b.is_ascii_whitespace() {
            continue;
        }

        if b == ARRAY_END as u8 {
            let item = &source[item_start..i];
            if !items.is_empty() || !item.trim().is_empty() {
                items.push(item);
            }
            return Ok((items, i + 1));
        }
        if b == ARRAY_DELIMITER as u8 {
            items.push(&source[item_start..i]);
            item_start = i + 1;
            expect_delimiter = false;
            continue;
        }
        // only whitespace, a delimiter, or the closing brace may follow a
        // quoted item
        if expect_delimiter {
            return Err(Error::format(format!(
                "array item delimiter expected at offset {}, found {:?}",
                i, b as char
            )));
        }
        if unescaped_quote {
            in_quotes = true;
            continue;
        }
        if b == COMMENT as u8 || b == ALT_COMMENT as u8 {
            return Err(Error::format(format!(
                "unexpected comment start before array closure at offset {}",
                i
            )));
        }
    }

    Err(Error::format("array end not found"))
}
