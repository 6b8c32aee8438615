use crate::core::text::width::visible_width;

/// Zero-width marker a component embeds in its rendered output where the caret sits.
pub const CURSOR_MARKER: &str = "\x1b_sl:c\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// Finds the last cursor marker inside the visible viewport, strips it and returns its cell.
pub(crate) fn extract_cursor_marker(lines: &mut [String], height: usize) -> Option<CursorPos> {
    if lines.is_empty() {
        return None;
    }
    let viewport_top = lines.len().saturating_sub(height);
    for row in (viewport_top..lines.len()).rev() {
        let line = &lines[row];
        if let Some(index) = line.find(CURSOR_MARKER) {
            let col = visible_width(&line[..index]);
            let marker_end = index + CURSOR_MARKER.len();
            let mut updated = String::with_capacity(line.len().saturating_sub(CURSOR_MARKER.len()));
            updated.push_str(&line[..index]);
            updated.push_str(&line[marker_end..]);
            lines[row] = updated;
            return Some(CursorPos { row, col });
        }
    }
    None
}
