//! Conversions between protocol positions and byte offsets.
//!
//! Positions are zero-indexed and their `character` counts UTF-16 code units,
//! the default LSP position encoding. Every conversion clamps instead of
//! failing:
//!
//! - a line past the last line resolves to the end of the content
//! - a character past the end of its line resolves to the end of that line
//!   (before the `\n`; a trailing `\r` stays part of the line)
//! - a character inside a surrogate pair resolves to the start of that char
//! - a range whose end resolves before its start collapses to the start

use tower_lsp_server::ls_types::{Position, Range};

/// Returns true for characters that may appear in an identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Converts a UTF-16 column into a byte index within `line`.
pub fn column_to_byte(line: &str, character: u32) -> usize {
    let mut units: u32 = 0;
    for (idx, ch) in line.char_indices() {
        let next = units + ch.len_utf16() as u32;
        if next > character {
            return idx;
        }
        units = next;
    }
    line.len()
}

/// Converts a position into a byte offset within `content`.
///
/// # Examples
///
/// ```
/// use hms_core::position::position_to_offset;
/// use tower_lsp_server::ls_types::Position;
///
/// let content = "let a = 1;\r\nlet b = 2;";
/// assert_eq!(position_to_offset(content, Position::new(1, 4)), 16);
/// assert_eq!(position_to_offset(content, Position::new(7, 0)), content.len());
/// ```
pub fn position_to_offset(content: &str, position: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..position.line {
        match content[line_start..].find('\n') {
            Some(idx) => line_start += idx + 1,
            None => return content.len(),
        }
    }

    let line_end = content[line_start..]
        .find('\n')
        .map_or(content.len(), |idx| line_start + idx);

    line_start + column_to_byte(&content[line_start..line_end], position.character)
}

/// Resolves both ends of a range to byte offsets, with `start <= end`.
pub fn range_to_offsets(content: &str, range: Range) -> (usize, usize) {
    let start = position_to_offset(content, range.start);
    let end = position_to_offset(content, range.end).max(start);
    (start, end)
}

/// Returns the identifier containing the character at `character`.
///
/// Empty if that character is not an identifier character or the cursor is
/// at the end of the line.
pub fn word_at(line: &str, character: u32) -> &str {
    let cursor = column_to_byte(line, character);

    match line[cursor..].chars().next() {
        Some(c) if is_identifier_char(c) => {}
        _ => return "",
    }

    let start = line[..cursor]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_identifier_char(c))
        .last()
        .map_or(cursor, |(idx, _)| idx);

    let end = line[cursor..]
        .char_indices()
        .find(|&(_, c)| !is_identifier_char(c))
        .map_or(line.len(), |(idx, _)| cursor + idx);

    &line[start..end]
}

/// Returns up to `length` characters immediately before `character`.
pub fn look_behind(line: &str, character: u32, length: usize) -> &str {
    let cursor = column_to_byte(line, character);
    let start = line[..cursor]
        .char_indices()
        .rev()
        .take(length)
        .last()
        .map_or(cursor, |(idx, _)| idx);
    &line[start..cursor]
}

/// Returns up to `length` characters starting at `character`.
pub fn look_forward(line: &str, character: u32, length: usize) -> &str {
    let cursor = column_to_byte(line, character);
    let end = line[cursor..]
        .char_indices()
        .nth(length)
        .map_or(line.len(), |(idx, _)| cursor + idx);
    &line[cursor..end]
}
