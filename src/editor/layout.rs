//! Soft-row splitting and word wrap for line rendering.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::text::width::visible_width;

/// A chunk of a soft row after word wrap. Indices are byte offsets into the soft row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Split a line into word-wrapped chunks.
///
/// Breaks after whitespace when possible and inside a word otherwise. Chunks cover the whole
/// line without gaps.
pub fn word_wrap_line(line: &str, max_width: usize) -> Vec<TextChunk> {
    if line.is_empty() || max_width == 0 {
        return vec![TextChunk {
            text: line.to_string(),
            start_index: 0,
            end_index: line.len(),
        }];
    }

    if visible_width(line) <= max_width {
        return vec![TextChunk {
            text: line.to_string(),
            start_index: 0,
            end_index: line.len(),
        }];
    }

    let mut chunks = Vec::new();
    let segments: Vec<(usize, &str)> = line.grapheme_indices(true).collect();

    let mut current_width = 0usize;
    let mut chunk_start = 0usize;
    let mut break_at: Option<usize> = None;
    let mut break_width = 0usize;

    for (idx, (byte_index, grapheme)) in segments.iter().enumerate() {
        let width = visible_width(grapheme);

        if current_width + width > max_width {
            if let Some(at) = break_at {
                chunks.push(TextChunk {
                    text: line[chunk_start..at].to_string(),
                    start_index: chunk_start,
                    end_index: at,
                });
                chunk_start = at;
                current_width = current_width.saturating_sub(break_width);
            } else if chunk_start < *byte_index {
                chunks.push(TextChunk {
                    text: line[chunk_start..*byte_index].to_string(),
                    start_index: chunk_start,
                    end_index: *byte_index,
                });
                chunk_start = *byte_index;
                current_width = 0;
            }
            break_at = None;
        }

        current_width = current_width.saturating_add(width);

        if is_whitespace_segment(grapheme) {
            if let Some((next_index, next)) = segments.get(idx + 1) {
                if !is_whitespace_segment(next) {
                    break_at = Some(*next_index);
                    break_width = current_width;
                }
            }
        }
    }

    chunks.push(TextChunk {
        text: line[chunk_start..].to_string(),
        start_index: chunk_start,
        end_index: line.len(),
    });

    chunks
}

fn is_whitespace_segment(segment: &str) -> bool {
    segment.chars().any(char::is_whitespace)
}

/// One visual row of a line, with char offsets into the full line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualRow {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Last wrapped row of its soft row.
    pub closes_soft_row: bool,
}

/// Splits `text` on soft breaks and wraps each soft row to `width` columns.
pub fn visual_rows(text: &str, width: usize) -> Vec<VisualRow> {
    let mut rows = Vec::new();
    let mut soft_start = 0usize;
    for soft_row in text.split('\n') {
        let chunks = word_wrap_line(soft_row, width);
        let last = chunks.len().saturating_sub(1);
        for (index, chunk) in chunks.into_iter().enumerate() {
            let start = soft_start + soft_row[..chunk.start_index].chars().count();
            let end = soft_start + soft_row[..chunk.end_index].chars().count();
            rows.push(VisualRow {
                text: chunk.text,
                start,
                end,
                closes_soft_row: index == last,
            });
        }
        soft_start += soft_row.chars().count() + 1;
    }
    rows
}

/// Visual row holding the caret at char offset `caret`.
///
/// A caret on a wrap boundary belongs to the row that starts there.
pub fn caret_row(rows: &[VisualRow], caret: usize) -> Option<usize> {
    rows.iter().position(|row| {
        caret >= row.start && (caret < row.end || (caret == row.end && row.closes_soft_row))
    })
}

#[cfg(test)]
mod tests {
    use super::{caret_row, visual_rows, word_wrap_line};

    #[test]
    fn wrap_breaks_long_words() {
        let texts: Vec<String> = word_wrap_line("abcdefgh", 3)
            .into_iter()
            .map(|chunk| chunk.text)
            .collect();
        assert_eq!(texts, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn wrap_prefers_whitespace() {
        let chunks = word_wrap_line("hello world", 8);
        assert_eq!(chunks[0].text, "hello ");
        assert_eq!(chunks[1].text, "world");
        assert_eq!(chunks[1].end_index, "hello world".len());
    }

    #[test]
    fn visual_rows_track_char_offsets_across_soft_breaks() {
        let rows = visual_rows("ab\ncdé f", 4);
        let spans: Vec<(usize, usize, bool)> = rows
            .iter()
            .map(|row| (row.start, row.end, row.closes_soft_row))
            .collect();
        assert_eq!(spans, vec![(0, 2, true), (3, 7, false), (7, 8, true)]);
    }

    #[test]
    fn caret_on_wrap_boundary_moves_to_next_row() {
        let rows = visual_rows("abcdef", 3);
        assert_eq!(caret_row(&rows, 2), Some(0));
        assert_eq!(caret_row(&rows, 3), Some(1));
        assert_eq!(caret_row(&rows, 6), Some(1));
    }

    #[test]
    fn empty_text_has_one_row() {
        let rows = visual_rows("", 10);
        assert_eq!(rows.len(), 1);
        assert_eq!(caret_row(&rows, 0), Some(0));
    }
}
