// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Cursor and offset utilities
//!
//! Conversions between LSP positions, character offsets and byte offsets,
//! and word-boundary scanning around the cursor.
//!
//! All offsets exposed by this crate are character offsets (Unicode scalar
//! values). LSP positions are interpreted with `character` counted the same
//! way, which matches UTF-16 for the ASCII identifiers SQL is written in.

use std::ops::Range;

use lsp_types::Position;

/// Identifier characters plus `.`, so `schema.tab` is one word
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
}

/// Convert a character offset to a byte offset, clamping to the text end
///
/// # Examples
///
/// ```
/// use warehouse_sql_lsp_context::cursor::char_to_byte;
///
/// assert_eq!(char_to_byte("é.x", 1), 2);
/// assert_eq!(char_to_byte("abc", 99), 3);
/// ```
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Convert a byte offset to a character offset
///
/// A byte offset inside a multi-byte character counts that character.
pub fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    text.char_indices()
        .take_while(|(b, _)| *b < byte_offset)
        .count()
}

/// Convert an LSP position to a character offset
///
/// # Arguments
///
/// * `text` - Document text
/// * `position` - LSP position (line, character)
///
/// # Returns
///
/// Character offset; a position past the end of its line clamps to the line
/// end, a line past the end of the text clamps to the text end.
///
/// # Examples
///
/// ```
/// use lsp_types::Position;
/// use warehouse_sql_lsp_context::cursor::position_to_offset;
///
/// let text = "SELECT *\nFROM orders";
/// assert_eq!(position_to_offset(text, Position::new(1, 5)), 14);
/// ```
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let mut offset = 0;
    for (i, line) in text.split('\n').enumerate() {
        let len = line.chars().count();
        if i == position.line as usize {
            return offset + len.min(position.character as usize);
        }
        offset += len + 1; // +1 for newline character
    }
    text.chars().count()
}

/// Convert a character offset to an LSP position
pub fn offset_to_position(text: &str, char_offset: usize) -> Position {
    let mut line = 0u32;
    let mut character = 0u32;
    for c in text.chars().take(char_offset) {
        if c == '\n' {
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }
    Position::new(line, character)
}

/// Convert a character range to an LSP range
pub fn offset_range_to_lsp(text: &str, range: &Range<usize>) -> lsp_types::Range {
    lsp_types::Range::new(
        offset_to_position(text, range.start),
        offset_to_position(text, range.end),
    )
}

/// Byte bounds of the word surrounding `byte_offset`
///
/// Scans backward and forward across [`is_word_char`]; returns an empty
/// range at the cursor when it is not touching a word.
pub fn word_bounds(text: &str, byte_offset: usize) -> Range<usize> {
    let byte_offset = byte_offset.min(text.len());
    let start = text[..byte_offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(b, _)| b)
        .unwrap_or(byte_offset);
    let end = text[byte_offset..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(b, _)| byte_offset + b)
        .unwrap_or(text.len());
    start..end
}
