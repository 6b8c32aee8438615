//! The editor view: toolbar, canvas and the shortcut scope that lives with them.

use line_store::{LineStore, LineType};
use tracing::{debug, trace};

use crate::core::component::{Component, Focusable};
use crate::core::cursor::CURSOR_MARKER;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{EditorAction, EditorKeybindings};
use crate::editor::style::PAGE_WIDTH;
use crate::screenplay::canvas::EditorCanvas;
use crate::screenplay::format::FormatController;

pub struct ScreenplaySession {
    canvas: EditorCanvas,
    format: FormatController,
    keys: EditorKeybindings,
    page_width: usize,
    focused: bool,
    exit_requested: bool,
}

impl Default for ScreenplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenplaySession {
    pub fn new() -> Self {
        Self::with_keybindings(EditorKeybindings::default())
    }

    pub fn with_keybindings(keys: EditorKeybindings) -> Self {
        let mut canvas = EditorCanvas::new();
        canvas.initialize();
        Self {
            canvas,
            format: FormatController::new(),
            keys,
            page_width: PAGE_WIDTH,
            focused: true,
            exit_requested: false,
        }
    }

    /// Narrows (or widens) the page; never below 20 columns.
    pub fn with_page_width(mut self, page_width: usize) -> Self {
        self.page_width = page_width.max(20);
        self
    }

    pub fn canvas(&self) -> &EditorCanvas {
        &self.canvas
    }

    pub fn store(&self) -> &LineStore {
        self.canvas.store()
    }

    pub fn keybindings(&self) -> &EditorKeybindings {
        &self.keys
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// A toolbar button press.
    pub fn select_format(&mut self, line_type: LineType) -> bool {
        self.format.apply(&mut self.canvas, line_type)
    }

    /// Runs deferred work ahead of a paint.
    pub fn flush_frame(&mut self) {
        self.canvas.run_frame();
    }
}

impl Component for ScreenplaySession {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.flush_frame();

        let page = width.min(self.page_width).max(1);
        let margin = " ".repeat(width.saturating_sub(page) / 2);

        let mut rows = self.format.render_toolbar(self.canvas.store(), page);
        rows.push(format!("\x1b[2m{}\x1b[0m", "─".repeat(page)));
        rows.extend(self.canvas.render(page));

        rows.into_iter()
            .map(|row| {
                let row = if self.focused {
                    row
                } else {
                    row.replace(CURSOR_MARKER, "")
                };
                format!("{margin}{row}")
            })
            .collect()
    }

    fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(press) => {
                if self.keys.matches(press, EditorAction::Quit) {
                    debug!("quit requested");
                    self.exit_requested = true;
                    return;
                }
                if self.format.handle_key(press, &self.keys, &mut self.canvas) {
                    return;
                }
                self.canvas.dispatch(event, &self.keys);
            }
            InputEvent::FocusGained => self.set_focused(true),
            InputEvent::FocusLost => self.set_focused(false),
            InputEvent::Resize { columns, rows } => {
                trace!(columns, rows, "resize");
            }
            InputEvent::UnknownRaw { raw } => {
                trace!(?raw, "unrecognized input ignored");
            }
            _ => {
                self.canvas.dispatch(event, &self.keys);
            }
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for ScreenplaySession {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenplaySession;
    use crate::core::component::{Component, Focusable};
    use crate::core::cursor::CURSOR_MARKER;
    use crate::core::input::{parse_key, Key, KeyPress};
    use crate::core::input_event::InputEvent;
    use line_store::LineType;

    #[test]
    fn quit_shortcut_sets_exit_flag() {
        let mut session = ScreenplaySession::new();
        let ctrl_c = parse_key("\x03").expect("ctrl+c");
        session.handle_event(&InputEvent::Key(ctrl_c));
        assert!(session.exit_requested());
    }

    #[test]
    fn render_centers_page_and_shows_caret() {
        let mut session = ScreenplaySession::new().with_page_width(40);
        let rows = session.render(60);
        assert!(rows.iter().all(|row| row.starts_with("          ")));
        assert!(rows.iter().any(|row| row.contains(CURSOR_MARKER)));

        session.set_focused(false);
        let rows = session.render(60);
        assert!(!rows.iter().any(|row| row.contains(CURSOR_MARKER)));
    }

    #[test]
    fn toolbar_click_retypes_focused_line() {
        let mut session = ScreenplaySession::new();
        session.handle_event(&InputEvent::text("ext. roof"));
        assert!(session.select_format(LineType::SceneHeading));
        session.flush_frame();

        let line = &session.store().lines()[0];
        assert_eq!(line.line_type, LineType::SceneHeading);
        assert_eq!(line.text, "ext. roof");
        let editor = session.canvas().editor(&line.id).expect("editor");
        assert_eq!(editor.caret_offset(), 9);
    }

    #[test]
    fn keys_reach_the_focused_line() {
        let mut session = ScreenplaySession::new();
        session.handle_event(&InputEvent::text("ab"));
        session.handle_event(&InputEvent::Key(KeyPress::plain(Key::Backspace)));
        assert_eq!(session.store().lines()[0].text, "a");
    }
}
