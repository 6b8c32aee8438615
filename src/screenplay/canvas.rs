//! The screenplay canvas: the line store, one editor per line, and the rules that turn
//! line intents into store mutations.

use line_store::{LineId, LineStore, LineType};
use tracing::{debug, trace, warn};

use crate::core::input::KeyPress;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::EditorKeybindings;
use crate::editor::{KeyOutcome, LineEditor, LineIntent};
use crate::screenplay::focus::FocusState;
use crate::screenplay::frame_queue::{FrameQueue, FrameTask};

pub const PLACEHOLDER: &str = "Start typing your screenplay...";

/// Layout passes can raise focus intents that need another pass; this bounds the loop.
const MAX_SYNC_PASSES: usize = 4;

#[derive(Debug)]
pub struct EditorCanvas {
    store: LineStore,
    editors: Vec<LineEditor>,
    focus: FocusState,
    frames: FrameQueue,
    intents: Vec<LineIntent>,
}

impl Default for EditorCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorCanvas {
    pub fn new() -> Self {
        Self::with_store(LineStore::new())
    }

    pub fn with_store(store: LineStore) -> Self {
        Self {
            store,
            editors: Vec::new(),
            focus: FocusState::new(),
            frames: FrameQueue::new(),
            intents: Vec::new(),
        }
    }

    /// Creates the bootstrap line if the store is empty and mounts the editors.
    pub fn initialize(&mut self) {
        if let Some(id) = self.store.initialize() {
            debug!(line = %id, "canvas bootstrapped");
        }
        self.commit();
    }

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn editors(&self) -> &[LineEditor] {
        &self.editors
    }

    pub fn editor(&self, id: &LineId) -> Option<&LineEditor> {
        self.editors.iter().find(|editor| editor.id() == id)
    }

    /// Line whose editor holds native focus.
    pub fn native_focus(&self) -> Option<&LineId> {
        self.focus.focused()
    }

    pub fn schedule(&mut self, task: FrameTask) {
        self.frames.schedule(task);
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    fn editor_index(&self, id: &LineId) -> Option<usize> {
        self.editors.iter().position(|editor| editor.id() == id)
    }

    fn native_index(&self) -> Option<usize> {
        self.editors.iter().position(LineEditor::has_native_focus)
    }

    /// Routes an input event to the editor holding native focus, then applies what it
    /// asked for.
    pub fn dispatch(&mut self, event: &InputEvent, keys: &EditorKeybindings) -> KeyOutcome {
        let Some(index) = self.native_index() else {
            trace!(?event, "no line holds native focus");
            return KeyOutcome::PassThrough;
        };

        let editor = &mut self.editors[index];
        let outcome = match event {
            InputEvent::Key(press) => editor.handle_key(press, keys, &mut self.intents),
            InputEvent::Text { text } => {
                editor.handle_text(text, &mut self.intents);
                KeyOutcome::Handled
            }
            InputEvent::Paste { text } => {
                editor.handle_paste(text, &mut self.intents);
                KeyOutcome::Handled
            }
            InputEvent::CompositionStart => {
                editor.composition_start();
                KeyOutcome::Handled
            }
            InputEvent::CompositionUpdate { text } => {
                editor.composition_update(text, &mut self.intents);
                KeyOutcome::Handled
            }
            InputEvent::CompositionEnd { text } => {
                editor.composition_end(text, &mut self.intents);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::PassThrough,
        };

        self.commit();
        outcome
    }

    /// Key-press shorthand for [`EditorCanvas::dispatch`].
    pub fn press(&mut self, press: KeyPress, keys: &EditorKeybindings) -> KeyOutcome {
        self.dispatch(&InputEvent::Key(press), keys)
    }

    /// Gives a line native focus, as a click on it would.
    pub fn focus_line(&mut self, id: &LineId) -> bool {
        let Some(index) = self.editor_index(id) else {
            debug!(line = %id, "focus request for unknown line");
            return false;
        };
        let gained = self.editors[index].focus(&mut self.intents);
        if gained {
            self.focus.set_focus(Some(id.clone()), &mut self.editors);
        }
        self.commit();
        gained
    }

    /// Retypes a line; its text is kept.
    pub fn retype_line(&mut self, id: &LineId, line_type: LineType) {
        self.store.change_line_type(id, line_type);
        self.commit();
    }

    /// Applies pending intents, reconciles editors with the store and runs layout sync
    /// until no more intents are raised.
    pub fn commit(&mut self) {
        let mut passes = 0;
        loop {
            self.apply_intents();
            self.reconcile();
            self.layout();
            if self.intents.is_empty() {
                break;
            }
            passes += 1;
            if passes >= MAX_SYNC_PASSES {
                warn!(pending = self.intents.len(), "layout sync did not settle");
                break;
            }
        }
    }

    /// Runs the work deferred to this frame, then syncs again.
    pub fn run_frame(&mut self) {
        for task in self.frames.take() {
            match task {
                FrameTask::FocusLineAtEnd { id } => {
                    let Some(index) = self.editor_index(&id) else {
                        debug!(line = %id, "deferred focus target no longer exists");
                        continue;
                    };
                    let editor = &mut self.editors[index];
                    editor.focus(&mut self.intents);
                    editor.place_caret_at_end();
                    self.focus.set_focus(Some(id), &mut self.editors);
                }
            }
        }
        self.commit();
    }

    fn apply_intents(&mut self) {
        for intent in std::mem::take(&mut self.intents) {
            self.apply(intent);
        }
    }

    fn apply(&mut self, intent: LineIntent) {
        trace!(?intent, "applying line intent");
        match intent {
            LineIntent::Update { id, text } => self.store.update_line(&id, text),
            LineIntent::Enter { id } => self.split_line(&id),
            LineIntent::ShiftEnter { id } => debug!(line = %id, "soft break inserted"),
            LineIntent::Backspace { id } => self.remove_empty_line(&id),
            LineIntent::Focus { id } => self.store.set_focus(Some(id)),
            LineIntent::ArrowUp { id } => self.focus_previous(&id),
            LineIntent::ArrowDown { id } => self.focus_next_or_append(&id),
        }
    }

    fn split_line(&mut self, id: &LineId) {
        let Some(line) = self.store.get(id) else {
            debug!(line = %id, "split of unknown line ignored");
            return;
        };
        let next = line.line_type.next_on_split();
        self.store.add_line(next, Some(id));
    }

    fn remove_empty_line(&mut self, id: &LineId) {
        let Some(line) = self.store.get(id) else {
            return;
        };
        if !line.text.trim().is_empty() || self.store.len() <= 1 {
            trace!(line = %id, "backspace kept line");
            return;
        }
        if let Some(target) = self.store.delete_line(id) {
            self.frames.schedule(FrameTask::FocusLineAtEnd { id: target });
        }
    }

    fn focus_previous(&mut self, id: &LineId) {
        let Some(index) = self.store.index_of(id) else {
            return;
        };
        if index == 0 {
            return;
        }
        let previous = self.store.lines()[index - 1].id.clone();
        self.store.set_focus(Some(previous));
    }

    fn focus_next_or_append(&mut self, id: &LineId) {
        let Some(index) = self.store.index_of(id) else {
            return;
        };
        match self.store.lines().get(index + 1) {
            Some(next) => {
                let next = next.id.clone();
                self.store.set_focus(Some(next));
            }
            None => {
                self.store.add_line(LineType::Action, Some(id));
            }
        }
    }

    /// Keeps exactly one editor per store line, in store order, reusing editors by id.
    fn reconcile(&mut self) {
        let mut previous = std::mem::take(&mut self.editors);
        let mut editors = Vec::with_capacity(self.store.len());
        for line in self.store.lines() {
            match previous.iter().position(|editor| editor.id() == &line.id) {
                Some(index) => editors.push(previous.swap_remove(index)),
                None => editors.push(LineEditor::new(line)),
            }
        }
        for removed in previous {
            trace!(line = %removed.id(), "editor unmounted");
            self.focus.forget(removed.id());
        }
        self.editors = editors;
    }

    fn layout(&mut self) {
        let focused = self.store.focused().cloned();
        for (editor, line) in self.editors.iter_mut().zip(self.store.lines()) {
            let is_focused = focused.as_ref() == Some(&line.id);
            editor.layout(line, is_focused, &mut self.intents);
        }

        let holder = self.focus.focused().cloned();
        let claimant = self
            .editors
            .iter()
            .find(|editor| editor.has_native_focus() && Some(editor.id()) != holder.as_ref())
            .map(|editor| editor.id().clone());
        if let Some(id) = claimant {
            self.focus.set_focus(Some(id), &mut self.editors);
        }
    }

    /// Rows for every line, with screenplay spacing between elements.
    pub fn render(&self, width: usize) -> Vec<String> {
        if self.store.is_empty() {
            return vec![PLACEHOLDER.to_string()];
        }

        let mut rows = Vec::new();
        for (index, editor) in self.editors.iter().enumerate() {
            let joined = matches!(
                editor.line_type(),
                LineType::Dialogue | LineType::Parenthetical
            );
            if index > 0 && !joined {
                rows.push(String::new());
            }
            rows.extend(editor.render(width));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorCanvas, PLACEHOLDER};
    use crate::core::input::{Key, KeyPress};
    use crate::core::input_event::InputEvent;
    use crate::core::keybindings::EditorKeybindings;
    use crate::screenplay::frame_queue::FrameTask;
    use line_store::{LineId, LineStore, LineType};

    fn canvas() -> (EditorCanvas, EditorKeybindings) {
        let mut canvas = EditorCanvas::new();
        canvas.initialize();
        (canvas, EditorKeybindings::default())
    }

    fn type_text(canvas: &mut EditorCanvas, keys: &EditorKeybindings, text: &str) {
        canvas.dispatch(&InputEvent::text(text), keys);
    }

    fn focused(canvas: &EditorCanvas) -> LineId {
        canvas.store().focused().cloned().expect("a line is focused")
    }

    #[test]
    fn initialize_mounts_and_focuses_bootstrap_line() {
        let (canvas, _) = canvas();
        assert_eq!(canvas.editors().len(), 1);
        let id = focused(&canvas);
        assert_eq!(canvas.native_focus(), Some(&id));
        assert!(canvas.editors()[0].has_native_focus());
    }

    #[test]
    fn typing_updates_store() {
        let (mut canvas, keys) = canvas();
        type_text(&mut canvas, &keys, "FADE IN:");
        assert_eq!(canvas.store().lines()[0].text, "FADE IN:");
        assert_eq!(canvas.store().lines()[0].metadata.word_count, 2);
    }

    #[test]
    fn enter_creates_next_type_and_moves_focus() {
        let cases = [
            (LineType::SceneHeading, LineType::Action),
            (LineType::Character, LineType::Dialogue),
            (LineType::Dialogue, LineType::Character),
            (LineType::Parenthetical, LineType::Dialogue),
            (LineType::Action, LineType::Action),
            (LineType::Transition, LineType::SceneHeading),
        ];
        for (current, expected) in cases {
            let (mut canvas, keys) = canvas();
            let first = focused(&canvas);
            canvas.retype_line(&first, current);
            canvas.press(KeyPress::plain(Key::Enter), &keys);

            assert_eq!(canvas.store().len(), 2);
            let second = &canvas.store().lines()[1];
            assert_eq!(second.line_type, expected, "after {current}");
            assert_eq!(canvas.store().focused(), Some(&second.id));
            assert_eq!(canvas.native_focus(), Some(&second.id));
            assert!(!canvas.editors()[0].has_native_focus());
        }
    }

    #[test]
    fn enter_in_middle_inserts_after_current() {
        let (mut canvas, keys) = canvas();
        let first = focused(&canvas);
        canvas.press(KeyPress::plain(Key::Enter), &keys);
        let last = focused(&canvas);
        canvas.focus_line(&first);
        canvas.press(KeyPress::plain(Key::Enter), &keys);

        let ids: Vec<&LineId> = canvas.store().lines().iter().map(|line| &line.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], &first);
        assert_eq!(ids[2], &last);
        assert_eq!(canvas.store().focused(), Some(ids[1]));
    }

    #[test]
    fn backspace_on_empty_line_deletes_and_defers_caret() {
        let (mut canvas, keys) = canvas();
        type_text(&mut canvas, &keys, "JOHN");
        let first = focused(&canvas);
        canvas.press(KeyPress::plain(Key::Enter), &keys);
        assert_eq!(canvas.store().len(), 2);

        canvas.press(KeyPress::plain(Key::Backspace), &keys);
        assert_eq!(canvas.store().len(), 1);
        assert_eq!(canvas.store().focused(), Some(&first));
        assert_eq!(canvas.pending_frames(), 1);

        canvas.run_frame();
        let editor = canvas.editor(&first).expect("editor mounted");
        assert!(editor.has_native_focus());
        assert_eq!(editor.caret_offset(), 4);
        assert_eq!(canvas.pending_frames(), 0);
    }

    #[test]
    fn backspace_never_removes_the_only_line() {
        let (mut canvas, keys) = canvas();
        canvas.press(KeyPress::plain(Key::Backspace), &keys);
        assert_eq!(canvas.store().len(), 1);
        assert_eq!(canvas.pending_frames(), 0);
    }

    #[test]
    fn arrows_move_between_lines_and_append_at_end() {
        let (mut canvas, keys) = canvas();
        let first = focused(&canvas);
        canvas.press(KeyPress::plain(Key::Enter), &keys);
        let second = focused(&canvas);
        canvas.press(KeyPress::plain(Key::Enter), &keys);
        let third = focused(&canvas);

        canvas.press(KeyPress::plain(Key::Up), &keys);
        assert_eq!(canvas.store().focused(), Some(&second));
        canvas.press(KeyPress::plain(Key::Up), &keys);
        assert_eq!(canvas.store().focused(), Some(&first));
        canvas.press(KeyPress::plain(Key::Up), &keys);
        assert_eq!(canvas.store().focused(), Some(&first));
        assert_eq!(canvas.store().len(), 3);

        canvas.focus_line(&third);
        canvas.press(KeyPress::plain(Key::Down), &keys);
        assert_eq!(canvas.store().len(), 4);
        let appended = &canvas.store().lines()[3];
        assert_eq!(appended.line_type, LineType::Action);
        assert_eq!(canvas.store().focused(), Some(&appended.id));
    }

    #[test]
    fn deferred_focus_for_missing_line_is_a_noop() {
        let (mut canvas, _) = canvas();
        canvas.schedule(FrameTask::FocusLineAtEnd {
            id: LineId::from_raw("gone"),
        });
        canvas.run_frame();
        assert_eq!(canvas.store().len(), 1);
        assert!(canvas.editors()[0].has_native_focus());
    }

    #[test]
    fn render_shows_placeholder_for_empty_store() {
        let canvas = EditorCanvas::with_store(LineStore::new());
        assert_eq!(canvas.render(60), vec![PLACEHOLDER.to_string()]);
    }

    #[test]
    fn dialogue_follows_character_without_gap() {
        let (mut canvas, keys) = canvas();
        let first = focused(&canvas);
        canvas.retype_line(&first, LineType::Character);
        type_text(&mut canvas, &keys, "mary");
        canvas.press(KeyPress::plain(Key::Enter), &keys);
        type_text(&mut canvas, &keys, "Hi.");

        let rows: Vec<String> = canvas
            .render(60)
            .into_iter()
            .map(|row| crate::core::text::ansi::strip_ansi(&row))
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], format!("{}MARY", " ".repeat(22)));
        assert!(rows[1].starts_with(&format!("{}Hi.", " ".repeat(10))));
    }
}
