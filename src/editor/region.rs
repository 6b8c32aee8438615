//! Editable text surface.
//!
//! An [`EditableRegion`] stands in for a focusable, directly-editable text widget: a tree of
//! text-bearing nodes, a selection made of boundary points, and a native focus flag. Edits
//! that behave like structural insertions (soft breaks, pastes) create new text nodes, so the
//! same linear text can be spread over several nodes; the offset mapper in
//! [`crate::editor::offset`] converts between the two views.
//!
//! Linear offsets everywhere in this module count Unicode scalar values.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::core::keybindings::EditorAction;
use crate::editor::offset::point_for_offset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionNode {
    Text(String),
    Element(Vec<RegionNode>),
}

impl RegionNode {
    pub fn text(text: impl Into<String>) -> Self {
        RegionNode::Text(text.into())
    }

    pub fn element(children: Vec<RegionNode>) -> Self {
        RegionNode::Element(children)
    }

    pub fn char_len(&self) -> usize {
        match self {
            RegionNode::Text(text) => text.chars().count(),
            RegionNode::Element(children) => children.iter().map(RegionNode::char_len).sum(),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RegionNode::Text(text) => out.push_str(text),
            RegionNode::Element(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// A position in the content tree.
///
/// `path` is the child-index path from the region root to the container node (empty for the
/// region itself). Inside a text node `offset` counts chars; inside an element it counts
/// children, as a DOM boundary point does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundaryPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// A point directly inside the region root.
    pub fn root(offset: usize) -> Self {
        Self {
            path: Vec::new(),
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor: BoundaryPoint,
    pub focus: BoundaryPoint,
}

impl Selection {
    pub fn collapsed(point: BoundaryPoint) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditableRegion {
    nodes: Vec<RegionNode>,
    selection: Option<Selection>,
    native_focus: bool,
    preedit: Option<Range<usize>>,
}

impl EditableRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: Vec<RegionNode>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[RegionNode] {
        &self.nodes
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }

    pub fn char_len(&self) -> usize {
        self.nodes.iter().map(RegionNode::char_len).sum()
    }

    /// Replaces all content with a single text node (or nothing, for empty text).
    ///
    /// A live selection collapses onto the region start, the way a selection inside removed
    /// nodes does.
    pub fn set_text_content(&mut self, text: &str) {
        self.nodes = if text.is_empty() {
            Vec::new()
        } else {
            vec![RegionNode::text(text)]
        };
        if self.selection.is_some() {
            self.selection = Some(Selection::collapsed(BoundaryPoint::root(0)));
        }
        self.preedit = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn collapse_to(&mut self, point: BoundaryPoint) {
        self.selection = Some(Selection::collapsed(point));
    }

    pub fn has_native_focus(&self) -> bool {
        self.native_focus
    }

    /// Gives the region native focus. Returns `false` if it already had it.
    ///
    /// A region gaining focus without a selection gets a caret at its start.
    pub fn focus(&mut self) -> bool {
        if self.native_focus {
            return false;
        }
        self.native_focus = true;
        if self.selection.is_none() {
            self.collapse_to(BoundaryPoint::root(0));
        }
        true
    }

    /// Drops native focus; the selection goes with it.
    pub fn blur(&mut self) {
        self.native_focus = false;
        self.selection = None;
        self.preedit = None;
    }

    /// Linear offset of a boundary point, or `None` when the path does not exist.
    pub fn resolve(&self, point: &BoundaryPoint) -> Option<usize> {
        let Some((last, parents)) = point.path.split_last() else {
            return Some(chars_before(&self.nodes, point.offset));
        };

        let mut children: &[RegionNode] = &self.nodes;
        let mut total = 0;
        for &index in parents {
            total += chars_before(children, index);
            match children.get(index)? {
                RegionNode::Element(inner) => children = inner,
                RegionNode::Text(_) => return None,
            }
        }

        total += chars_before(children, *last);
        match children.get(*last)? {
            RegionNode::Text(text) => Some(total + point.offset.min(text.chars().count())),
            RegionNode::Element(inner) => Some(total + chars_before(inner, point.offset)),
        }
    }

    /// Ordered linear range covered by the selection.
    pub fn selection_range(&self) -> Option<Range<usize>> {
        let selection = self.selection.as_ref()?;
        let anchor = self.resolve(&selection.anchor)?;
        let focus = self.resolve(&selection.focus)?;
        Some(anchor.min(focus)..anchor.max(focus))
    }

    pub fn is_selection_collapsed(&self) -> bool {
        self.selection.as_ref().map_or(true, Selection::is_collapsed)
    }

    pub fn preedit(&self) -> Option<Range<usize>> {
        self.preedit.clone()
    }

    /// Caret offset used for native edits: the focus end of the selection.
    fn caret(&self) -> usize {
        self.selection
            .as_ref()
            .and_then(|selection| self.resolve(&selection.focus))
            .unwrap_or(0)
    }

    fn collapse_to_offset(&mut self, offset: usize) {
        let point = point_for_offset(self, offset);
        self.collapse_to(point);
    }

    /// Replaces `range` with text typed into the text node at its start.
    fn splice_typed(&mut self, range: Range<usize>, text: &str) {
        delete_chars(&mut self.nodes, &range);
        if text.is_empty() {
            self.collapse_to_offset(range.start);
            return;
        }

        let inserted = text.chars().count();
        let target = locate(&self.nodes, range.start);
        if let Some(point) = target {
            if let Some((index, parent)) = point.path.split_last() {
                if let Some(RegionNode::Text(node)) =
                    children_mut(&mut self.nodes, parent).and_then(|nodes| nodes.get_mut(*index))
                {
                    let at = byte_index(node, point.offset);
                    node.insert_str(at, text);
                    self.collapse_to(BoundaryPoint::new(point.path, point.offset + inserted));
                    return;
                }
            }
        }

        self.nodes.push(RegionNode::text(text));
        let path = vec![self.nodes.len() - 1];
        self.collapse_to(BoundaryPoint::new(path, inserted));
    }

    /// Replaces `range` with a new text node and leaves the caret right after that node.
    fn splice_node(&mut self, range: Range<usize>, text: &str) {
        delete_chars(&mut self.nodes, &range);

        if let Some(point) = locate(&self.nodes, range.start) {
            if let Some((index, parent)) = point.path.split_last() {
                if let Some(siblings) = children_mut(&mut self.nodes, parent) {
                    let new_index = split_and_insert(siblings, *index, point.offset, text);
                    self.collapse_to(BoundaryPoint::new(parent.to_vec(), new_index + 1));
                    return;
                }
            }
        }

        self.nodes.push(RegionNode::text(text));
        self.collapse_to(BoundaryPoint::root(self.nodes.len()));
    }

    fn replacement_range(&self) -> Range<usize> {
        self.selection_range().unwrap_or_else(|| {
            let caret = self.caret();
            caret..caret
        })
    }

    /// Native typing: replaces the selection with `text`.
    pub fn insert_text(&mut self, text: &str) {
        let range = self.replacement_range();
        self.splice_typed(range, text);
    }

    /// Structural insertion: deletes the selection and inserts `text` as its own node.
    ///
    /// Returns `false` (and does nothing) when there is no selection to insert at.
    pub fn insert_node_at_selection(&mut self, text: &str) -> bool {
        let Some(range) = self.selection_range() else {
            return false;
        };
        self.splice_node(range, text);
        true
    }

    /// Native backspace. Returns whether the content changed.
    pub fn delete_backward(&mut self) -> bool {
        let range = self.replacement_range();
        if !range.is_empty() {
            self.splice_typed(range, "");
            return true;
        }
        if range.start == 0 {
            return false;
        }
        let start = self.previous_boundary(range.start);
        self.splice_typed(start..range.start, "");
        true
    }

    /// Native forward delete. Returns whether the content changed.
    pub fn delete_forward(&mut self) -> bool {
        let range = self.replacement_range();
        if !range.is_empty() {
            self.splice_typed(range, "");
            return true;
        }
        if range.start >= self.char_len() {
            return false;
        }
        let end = self.next_boundary(range.start);
        self.splice_typed(range.start..end, "");
        true
    }

    /// Moves the caret (or the selection focus when `extend` is set) to a linear offset.
    pub fn move_caret_to(&mut self, offset: usize, extend: bool) {
        let offset = offset.min(self.char_len());
        let point = point_for_offset(self, offset);
        match (&mut self.selection, extend) {
            (Some(selection), true) => selection.focus = point,
            _ => self.collapse_to(point),
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        if !extend {
            if let Some(range) = self.selection_range().filter(|range| !range.is_empty()) {
                self.move_caret_to(range.start, false);
                return;
            }
        }
        let target = self.previous_boundary(self.caret());
        self.move_caret_to(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend {
            if let Some(range) = self.selection_range().filter(|range| !range.is_empty()) {
                self.move_caret_to(range.end, false);
                return;
            }
        }
        let target = self.next_boundary(self.caret());
        self.move_caret_to(target, extend);
    }

    /// Moves to the previous soft row, or to the start when already on the first one.
    pub fn move_up(&mut self) {
        let text = self.text_content();
        let (row, col) = soft_row_col(&text, self.caret());
        let target = if row == 0 {
            0
        } else {
            offset_for_row_col(&text, row - 1, col)
        };
        self.move_caret_to(target, false);
    }

    /// Moves to the next soft row, or to the end when already on the last one.
    pub fn move_down(&mut self) {
        let text = self.text_content();
        let (row, col) = soft_row_col(&text, self.caret());
        let rows = text.split('\n').count();
        let target = if row + 1 >= rows {
            self.char_len()
        } else {
            offset_for_row_col(&text, row + 1, col)
        };
        self.move_caret_to(target, false);
    }

    pub fn move_row_start(&mut self, extend: bool) {
        let text = self.text_content();
        let (row, _) = soft_row_col(&text, self.caret());
        self.move_caret_to(offset_for_row_col(&text, row, 0), extend);
    }

    pub fn move_row_end(&mut self, extend: bool) {
        let text = self.text_content();
        let (row, _) = soft_row_col(&text, self.caret());
        self.move_caret_to(offset_for_row_col(&text, row, usize::MAX), extend);
    }

    /// Default behaviour for an editing key the line editor did not claim.
    ///
    /// Returns `true` when the content changed, which raises an input event.
    pub fn apply_native_key(&mut self, action: EditorAction) -> bool {
        match action {
            EditorAction::CursorLeft => self.move_left(false),
            EditorAction::CursorRight => self.move_right(false),
            EditorAction::SelectLeft => self.move_left(true),
            EditorAction::SelectRight => self.move_right(true),
            EditorAction::CursorUp => self.move_up(),
            EditorAction::CursorDown => self.move_down(),
            EditorAction::CursorLineStart => self.move_row_start(false),
            EditorAction::CursorLineEnd => self.move_row_end(false),
            EditorAction::SelectLineStart => self.move_row_start(true),
            EditorAction::SelectLineEnd => self.move_row_end(true),
            EditorAction::DeleteCharBackward => return self.delete_backward(),
            EditorAction::DeleteCharForward => return self.delete_forward(),
            EditorAction::Format(_) | EditorAction::Quit => {}
        }
        false
    }

    /// Starts an input-method preedit at the selection.
    pub fn begin_composition(&mut self) {
        let range = self.replacement_range();
        self.preedit = Some(range);
    }

    /// Replaces the current preedit text.
    pub fn update_composition(&mut self, text: &str) {
        let range = self
            .preedit
            .clone()
            .unwrap_or_else(|| self.replacement_range());
        let start = range.start;
        self.splice_typed(range, text);
        self.preedit = Some(start..start + text.chars().count());
    }

    /// Commits the final preedit text and ends the preedit.
    pub fn commit_composition(&mut self, text: &str) {
        self.update_composition(text);
        self.preedit = None;
    }

    fn previous_boundary(&self, offset: usize) -> usize {
        let text = self.text_content();
        let byte = byte_index(&text, offset);
        text[..byte]
            .grapheme_indices(true)
            .next_back()
            .map(|(index, _)| text[..index].chars().count())
            .unwrap_or(0)
    }

    fn next_boundary(&self, offset: usize) -> usize {
        let text = self.text_content();
        let byte = byte_index(&text, offset);
        text[byte..]
            .graphemes(true)
            .next()
            .map(|grapheme| offset + grapheme.chars().count())
            .unwrap_or(offset)
    }
}

fn chars_before(nodes: &[RegionNode], index: usize) -> usize {
    nodes.iter().take(index).map(RegionNode::char_len).sum()
}

fn collect_text_nodes<'a>(
    nodes: &'a [RegionNode],
    path: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, &'a str)>,
) {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        match node {
            RegionNode::Text(text) => out.push((path.clone(), text.as_str())),
            RegionNode::Element(children) => collect_text_nodes(children, path, out),
        }
        path.pop();
    }
}

/// First text node whose cumulative length reaches `offset`, with the offset inside it.
pub(crate) fn locate(nodes: &[RegionNode], offset: usize) -> Option<BoundaryPoint> {
    let mut paths = Vec::new();
    collect_text_nodes(nodes, &mut Vec::new(), &mut paths);
    let mut count = 0;
    for (path, text) in paths {
        let next = count + text.chars().count();
        if next >= offset {
            return Some(BoundaryPoint::new(path, offset - count));
        }
        count = next;
    }
    None
}

fn children_mut<'a>(
    nodes: &'a mut Vec<RegionNode>,
    parent: &[usize],
) -> Option<&'a mut Vec<RegionNode>> {
    match parent.split_first() {
        None => Some(nodes),
        Some((&index, rest)) => match nodes.get_mut(index)? {
            RegionNode::Element(children) => children_mut(children, rest),
            RegionNode::Text(_) => None,
        },
    }
}

/// Splits the text node at `index` at char `offset` and inserts a new text node between the
/// halves. Returns the index of the new node.
fn split_and_insert(siblings: &mut Vec<RegionNode>, index: usize, offset: usize, text: &str) -> usize {
    let Some(RegionNode::Text(existing)) = siblings.get(index) else {
        siblings.insert(index, RegionNode::text(text));
        return index;
    };

    let len = existing.chars().count();
    if offset == 0 {
        siblings.insert(index, RegionNode::text(text));
        return index;
    }
    if offset >= len {
        siblings.insert(index + 1, RegionNode::text(text));
        return index + 1;
    }

    let at = byte_index(existing, offset);
    let tail = existing[at..].to_string();
    let head = existing[..at].to_string();
    siblings[index] = RegionNode::Text(head);
    siblings.insert(index + 1, RegionNode::text(text));
    siblings.insert(index + 2, RegionNode::Text(tail));
    index + 1
}

fn delete_chars(nodes: &mut Vec<RegionNode>, range: &Range<usize>) {
    if range.is_empty() {
        return;
    }
    let mut position = 0;
    delete_in(nodes, &mut position, range);
}

fn delete_in(nodes: &mut Vec<RegionNode>, position: &mut usize, range: &Range<usize>) {
    for node in nodes.iter_mut() {
        match node {
            RegionNode::Text(text) => {
                let start = *position;
                let end = start + text.chars().count();
                let cut_start = range.start.max(start);
                let cut_end = range.end.min(end);
                if cut_start < cut_end {
                    let from = byte_index(text, cut_start - start);
                    let to = byte_index(text, cut_end - start);
                    text.replace_range(from..to, "");
                }
                *position = end;
            }
            RegionNode::Element(children) => delete_in(children, position, range),
        }
    }
    nodes.retain(|node| !matches!(node, RegionNode::Text(text) if text.is_empty()));
}

/// Byte index of the `char_offset`-th char, clamped to the string end.
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Soft row (split on `'\n'`) and char column of a linear offset.
pub(crate) fn soft_row_col(text: &str, offset: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

fn offset_for_row_col(text: &str, row: usize, col: usize) -> usize {
    let mut offset = 0;
    for (index, line) in text.split('\n').enumerate() {
        let len = line.chars().count();
        if index == row {
            return offset + col.min(len);
        }
        offset += len + 1;
    }
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::{BoundaryPoint, EditableRegion, RegionNode, Selection};

    fn region_with_caret(text: &str, offset: usize) -> EditableRegion {
        let mut region = EditableRegion::new();
        region.set_text_content(text);
        region.focus();
        region.move_caret_to(offset, false);
        region
    }

    #[test]
    fn text_content_concatenates_nested_nodes() {
        let region = EditableRegion::with_nodes(vec![
            RegionNode::text("INT. "),
            RegionNode::element(vec![RegionNode::text("HOUSE"), RegionNode::element(vec![])]),
            RegionNode::text(" - DAY"),
        ]);
        assert_eq!(region.text_content(), "INT. HOUSE - DAY");
        assert_eq!(region.char_len(), 16);
    }

    #[test]
    fn resolve_handles_text_and_element_points() {
        let region = EditableRegion::with_nodes(vec![
            RegionNode::text("ab"),
            RegionNode::element(vec![RegionNode::text("cd"), RegionNode::text("ef")]),
        ]);
        assert_eq!(region.resolve(&BoundaryPoint::new(vec![1, 1], 1)), Some(5));
        assert_eq!(region.resolve(&BoundaryPoint::new(vec![1], 1)), Some(4));
        assert_eq!(region.resolve(&BoundaryPoint::root(2)), Some(6));
        assert_eq!(region.resolve(&BoundaryPoint::new(vec![0, 0], 0)), None);
        assert_eq!(region.resolve(&BoundaryPoint::new(vec![7], 0)), None);
    }

    #[test]
    fn typing_extends_the_current_text_node() {
        let mut region = region_with_caret("AB", 1);
        region.insert_text("x");
        assert_eq!(region.text_content(), "AxB");
        assert_eq!(region.nodes().len(), 1);
        assert_eq!(region.selection_range(), Some(2..2));
    }

    #[test]
    fn typing_into_empty_region_creates_a_node() {
        let mut region = EditableRegion::new();
        region.focus();
        region.insert_text("日本");
        assert_eq!(region.text_content(), "日本");
        assert_eq!(region.selection_range(), Some(2..2));
    }

    #[test]
    fn node_insertion_splits_text_and_places_caret_after() {
        let mut region = region_with_caret("AB", 1);
        assert!(region.insert_node_at_selection("\n"));
        assert_eq!(region.text_content(), "A\nB");
        assert_eq!(
            region.nodes(),
            &[
                RegionNode::text("A"),
                RegionNode::text("\n"),
                RegionNode::text("B")
            ]
        );
        assert_eq!(
            region.selection(),
            Some(&Selection::collapsed(BoundaryPoint::root(2)))
        );
        assert_eq!(region.selection_range(), Some(2..2));
    }

    #[test]
    fn node_insertion_replaces_selected_text() {
        let mut region = region_with_caret("ABCD", 1);
        region.move_caret_to(3, true);
        assert!(region.insert_node_at_selection("\n"));
        assert_eq!(region.text_content(), "A\nD");
    }

    #[test]
    fn node_insertion_without_selection_is_refused() {
        let mut region = EditableRegion::new();
        region.set_text_content("AB");
        assert!(!region.insert_node_at_selection("\n"));
        assert_eq!(region.text_content(), "AB");
    }

    #[test]
    fn backspace_deletes_graphemes_across_nodes() {
        let mut region = EditableRegion::with_nodes(vec![
            RegionNode::text("e\u{301}"),
            RegionNode::text("x"),
        ]);
        region.focus();
        region.move_caret_to(2, false);
        assert!(region.delete_backward());
        assert_eq!(region.text_content(), "x");
        assert_eq!(region.selection_range(), Some(0..0));
        assert!(!region.delete_backward());
    }

    #[test]
    fn deleting_everything_leaves_no_nodes() {
        let mut region = region_with_caret("a", 1);
        assert!(region.delete_backward());
        assert!(region.nodes().is_empty());
        assert_eq!(region.char_len(), 0);
    }

    #[test]
    fn forward_delete_stops_at_end() {
        let mut region = region_with_caret("ab", 1);
        assert!(region.delete_forward());
        assert_eq!(region.text_content(), "a");
        assert!(!region.delete_forward());
    }

    #[test]
    fn left_right_collapse_selection_first() {
        let mut region = region_with_caret("abcd", 1);
        region.move_caret_to(3, true);
        assert!(!region.is_selection_collapsed());
        region.move_left(false);
        assert_eq!(region.selection_range(), Some(1..1));
        region.move_right(true);
        region.move_right(true);
        assert_eq!(region.selection_range(), Some(1..3));
        region.move_right(false);
        assert_eq!(region.selection_range(), Some(3..3));
    }

    #[test]
    fn vertical_motion_follows_soft_rows() {
        let mut region = region_with_caret("abc\nde\nfghi", 10);
        region.move_up();
        assert_eq!(region.selection_range(), Some(6..6));
        region.move_up();
        assert_eq!(region.selection_range(), Some(2..2));
        region.move_up();
        assert_eq!(region.selection_range(), Some(0..0));
        region.move_down();
        assert_eq!(region.selection_range(), Some(4..4));
        region.move_down();
        region.move_down();
        assert_eq!(region.selection_range(), Some(11..11));
    }

    #[test]
    fn row_start_and_end() {
        let mut region = region_with_caret("abc\ndef", 5);
        region.move_row_start(false);
        assert_eq!(region.selection_range(), Some(4..4));
        region.move_row_end(false);
        assert_eq!(region.selection_range(), Some(7..7));
    }

    #[test]
    fn composition_replaces_preedit_in_place() {
        let mut region = region_with_caret("ab", 1);
        region.begin_composition();
        region.update_composition("n");
        region.update_composition("に");
        assert_eq!(region.text_content(), "aにb");
        assert_eq!(region.preedit(), Some(1..2));
        region.commit_composition("日本");
        assert_eq!(region.text_content(), "a日本b");
        assert_eq!(region.preedit(), None);
        assert_eq!(region.selection_range(), Some(3..3));
    }

    #[test]
    fn blur_drops_selection() {
        let mut region = region_with_caret("ab", 1);
        region.blur();
        assert!(!region.has_native_focus());
        assert!(region.selection().is_none());
        assert!(region.focus());
        assert_eq!(region.selection_range(), Some(0..0));
        assert!(!region.focus());
    }

    #[test]
    fn set_text_content_collapses_live_selection() {
        let mut region = region_with_caret("abc", 2);
        region.set_text_content("xyz!");
        assert_eq!(region.selection_range(), Some(0..0));
        region.set_text_content("");
        assert!(region.nodes().is_empty());
    }
}
