use ropey::Rope;
use tower_lsp::lsp_types::Position;

/// Convert a UTF-16 column offset (from LSP Position.character) to a byte
/// offset within the given line. Columns past the end of the line clamp to
/// the end of its content, before any line terminator.
pub fn utf16_column_to_byte_offset(line: &str, utf16_col: u32) -> usize {
    let content = line.trim_end_matches(['\n', '\r']);
    let mut utf16_count = 0;
    for (byte_idx, ch) in content.char_indices() {
        if utf16_count >= utf16_col as usize {
            return byte_idx;
        }
        utf16_count += ch.len_utf16();
    }
    content.len()
}

/// Convert an LSP position into a byte offset into `rope`.
///
/// Returns `None` when the line does not exist.
pub fn position_to_byte(rope: &Rope, position: Position) -> Option<usize> {
    let line_idx = position.line as usize;
    if line_idx > rope.len_lines() {
        return None;
    }
    if line_idx == rope.len_lines() {
        // One past the last line is only addressable at column 0 (end of buffer).
        return (position.character == 0).then(|| rope.len_bytes());
    }
    let line = rope.line(line_idx).to_string();
    Some(rope.line_to_byte(line_idx) + utf16_column_to_byte_offset(&line, position.character))
}

/// Convert a byte offset into `rope` into an LSP position.
pub fn byte_to_position(rope: &Rope, byte: usize) -> Position {
    let byte = byte.min(rope.len_bytes());
    let line_idx = rope.byte_to_line(byte);
    let line_start = rope.line_to_byte(line_idx);
    let column = rope.byte_slice(line_start..byte).len_utf16_cu();
    Position::new(line_idx as u32, column as u32)
}
