//! Editor for a single screenplay line.
//!
//! A [`LineEditor`] renders one [`Line`] into an [`EditableRegion`] and turns key and input
//! events into [`LineIntent`]s. It never touches the store; whoever owns the store drains the
//! intents and applies them in order.

use line_store::{Line, LineId, LineType};
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::cursor::CURSOR_MARKER;
use crate::core::input::{Key, KeyPress, Modifiers};
use crate::core::keybindings::EditorKeybindings;
use crate::core::text::width::visible_width;
use crate::editor::composition::CompositionGuard;
use crate::editor::layout::{caret_row, visual_rows};
use crate::editor::offset::{capture_offset, caret_at_end, restore_offset};
use crate::editor::region::{byte_index, EditableRegion};
use crate::editor::style::{classify, Align, LineStyle};

/// A request from a line editor to whoever owns the line store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineIntent {
    Update { id: LineId, text: String },
    Enter { id: LineId },
    ShiftEnter { id: LineId },
    Backspace { id: LineId },
    Focus { id: LineId },
    ArrowUp { id: LineId },
    ArrowDown { id: LineId },
}

impl LineIntent {
    pub fn id(&self) -> &LineId {
        match self {
            LineIntent::Update { id, .. }
            | LineIntent::Enter { id }
            | LineIntent::ShiftEnter { id }
            | LineIntent::Backspace { id }
            | LineIntent::Focus { id }
            | LineIntent::ArrowUp { id }
            | LineIntent::ArrowDown { id } => id,
        }
    }
}

pub trait IntentSink {
    fn emit(&mut self, intent: LineIntent);
}

impl IntentSink for Vec<LineIntent> {
    fn emit(&mut self, intent: LineIntent) {
        self.push(intent);
    }
}

/// Whether a key press was consumed (default behaviour suppressed) or left to the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    PassThrough,
}

#[derive(Debug)]
pub struct LineEditor {
    id: LineId,
    line_type: LineType,
    region: EditableRegion,
    composition: CompositionGuard,
    last_focused: Option<bool>,
}

impl LineEditor {
    pub fn new(line: &Line) -> Self {
        Self {
            id: line.id.clone(),
            line_type: line.line_type,
            region: EditableRegion::new(),
            composition: CompositionGuard::new(),
            last_focused: None,
        }
    }

    pub fn id(&self) -> &LineId {
        &self.id
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn style(&self) -> LineStyle {
        classify(self.line_type)
    }

    pub fn region(&self) -> &EditableRegion {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut EditableRegion {
        &mut self.region
    }

    /// Text currently shown in the region.
    pub fn text(&self) -> String {
        self.region.text_content()
    }

    pub fn caret_offset(&self) -> usize {
        capture_offset(&self.region)
    }

    pub fn is_composing(&self) -> bool {
        self.composition.is_active()
    }

    pub fn has_native_focus(&self) -> bool {
        self.region.has_native_focus()
    }

    /// Brings the region in line with `line` before a paint.
    ///
    /// Text is only overwritten while the region does not hold native focus, so an edit in
    /// flight is never clobbered. Native focus is requested when `focused` flips on.
    pub fn layout(&mut self, line: &Line, focused: bool, sink: &mut dyn IntentSink) {
        self.line_type = line.line_type;
        self.sync_text(&line.text, focused);
        self.sync_focus(focused, sink);
    }

    fn sync_text(&mut self, text: &str, focused: bool) {
        if self.region.has_native_focus() {
            return;
        }
        if self.region.text_content() == text {
            return;
        }

        let offset = capture_offset(&self.region);
        self.region.set_text_content(text);
        if focused {
            restore_offset(&mut self.region, offset);
        }
        trace!(id = %self.id, offset, "region text replaced");
    }

    fn sync_focus(&mut self, focused: bool, sink: &mut dyn IntentSink) {
        if self.last_focused == Some(focused) {
            return;
        }
        self.last_focused = Some(focused);
        if focused && !self.region.has_native_focus() {
            self.focus(sink);
        }
    }

    /// Gives the region native focus. Emits [`LineIntent::Focus`] when focus was gained.
    pub fn focus(&mut self, sink: &mut dyn IntentSink) -> bool {
        if !self.region.focus() {
            return false;
        }
        sink.emit(LineIntent::Focus {
            id: self.id.clone(),
        });
        true
    }

    pub fn blur(&mut self) {
        self.region.blur();
        self.composition.end();
    }

    pub fn place_caret_at_end(&mut self) {
        let caret = caret_at_end(&self.region);
        self.region.set_selection(Some(caret));
    }

    fn is_caret_at_start(&self) -> bool {
        match self.region.selection() {
            None => true,
            Some(selection) => selection.is_collapsed() && capture_offset(&self.region) == 0,
        }
    }

    fn is_caret_at_end(&self) -> bool {
        match self.region.selection() {
            None => true,
            Some(selection) => {
                selection.is_collapsed()
                    && capture_offset(&self.region) == self.region.char_len()
            }
        }
    }

    /// Key-down handling. Claimed keys return [`KeyOutcome::Handled`]; anything else runs
    /// the region's native behaviour for the bound action, if there is one.
    pub fn handle_key(
        &mut self,
        press: &KeyPress,
        keys: &EditorKeybindings,
        sink: &mut dyn IntentSink,
    ) -> KeyOutcome {
        if self.key_down(press, sink) == KeyOutcome::Handled {
            return KeyOutcome::Handled;
        }

        if let Some(action) = keys.action_for(press) {
            if self.region.apply_native_key(action) {
                self.on_input(sink);
            }
        } else if let Key::Char(ch) = press.key {
            if press.modifiers.is_empty() || press.modifiers == Modifiers::SHIFT {
                self.handle_text(&ch.to_string(), sink);
            }
        }
        KeyOutcome::PassThrough
    }

    fn key_down(&mut self, press: &KeyPress, sink: &mut dyn IntentSink) -> KeyOutcome {
        let id = self.id.clone();
        match press.key {
            Key::Enter if press.modifiers.shift => {
                if self.region.insert_node_at_selection("\n") {
                    sink.emit(LineIntent::Update {
                        id: id.clone(),
                        text: self.region.text_content(),
                    });
                }
                sink.emit(LineIntent::ShiftEnter { id });
                KeyOutcome::Handled
            }
            Key::Enter => {
                sink.emit(LineIntent::Enter { id });
                KeyOutcome::Handled
            }
            Key::Backspace if self.region.char_len() == 0 => {
                sink.emit(LineIntent::Backspace { id });
                KeyOutcome::Handled
            }
            Key::Up if self.is_caret_at_start() => {
                sink.emit(LineIntent::ArrowUp { id });
                KeyOutcome::Handled
            }
            Key::Down if self.is_caret_at_end() => {
                sink.emit(LineIntent::ArrowDown { id });
                KeyOutcome::Handled
            }
            _ => KeyOutcome::PassThrough,
        }
    }

    /// Native text insertion (typing).
    pub fn handle_text(&mut self, text: &str, sink: &mut dyn IntentSink) {
        if text.is_empty() {
            return;
        }
        self.region.insert_text(text);
        self.on_input(sink);
    }

    /// Native paste: the pasted text lands in its own node.
    pub fn handle_paste(&mut self, text: &str, sink: &mut dyn IntentSink) {
        if text.is_empty() {
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if !self.region.insert_node_at_selection(&text) {
            self.region.insert_text(&text);
        }
        self.on_input(sink);
    }

    pub fn composition_start(&mut self) {
        self.composition.begin();
        self.region.begin_composition();
    }

    pub fn composition_update(&mut self, text: &str, sink: &mut dyn IntentSink) {
        self.region.update_composition(text);
        self.on_input(sink);
    }

    /// Commits the final composed text with exactly one update.
    pub fn composition_end(&mut self, text: &str, sink: &mut dyn IntentSink) {
        self.composition.end();
        self.region.commit_composition(text);
        sink.emit(LineIntent::Update {
            id: self.id.clone(),
            text: self.region.text_content(),
        });
    }

    fn on_input(&mut self, sink: &mut dyn IntentSink) {
        if self.composition.is_active() {
            trace!(id = %self.id, "input suppressed during composition");
            return;
        }
        sink.emit(LineIntent::Update {
            id: self.id.clone(),
            text: self.region.text_content(),
        });
    }

    /// Rows for a page `width` columns wide. The caret shows only while the region holds
    /// native focus.
    pub fn render(&self, width: usize) -> Vec<String> {
        let style = self.style();
        let (indent, column) = style.fit(width);
        let column = column.min(width.saturating_sub(indent)).max(1);

        let text = self.region.text_content();
        let rows = visual_rows(&text, column);
        let caret = if self.region.has_native_focus() {
            let offset = self
                .region
                .selection()
                .and_then(|selection| self.region.resolve(&selection.focus))
                .unwrap_or(0);
            caret_row(&rows, offset).map(|row| (row, offset))
        } else {
            None
        };

        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                let (body, body_width) = match caret {
                    Some((caret_index, offset)) if caret_index == index => {
                        render_with_caret(&style, &row.text, offset - row.start)
                    }
                    _ => {
                        let shown = style.transform(&row.text);
                        let width = visible_width(&shown);
                        (shown, width)
                    }
                };
                let pad = match style.align {
                    Align::Left => indent,
                    Align::Right => indent + column.saturating_sub(body_width),
                };
                format!("{}{}", " ".repeat(pad), body)
            })
            .collect()
    }
}

/// Splits a row at the caret and draws the caret cell in reverse video.
fn render_with_caret(style: &LineStyle, row: &str, caret: usize) -> (String, usize) {
    let at = byte_index(row, caret);
    let (before, after) = row.split_at(at);
    let before = style.transform(before);
    let mut width = visible_width(&before);

    let cursor = match after.graphemes(true).next() {
        Some(first) => {
            let rest = style.transform(&after[first.len()..]);
            let first = style.transform(first);
            width += visible_width(&first) + visible_width(&rest);
            format!("\x1b[7m{first}\x1b[0m{rest}")
        }
        None => {
            width += 1;
            "\x1b[7m \x1b[0m".to_string()
        }
    };

    (format!("{before}{CURSOR_MARKER}{cursor}"), width)
}
