//! Line-type commands: the toolbar and the Ctrl/Cmd+digit shortcuts.

use line_store::{LineStore, LineType};
use tracing::debug;

use crate::core::input::KeyPress;
use crate::core::keybindings::{EditorAction, EditorKeybindings};
use crate::core::text::width::visible_width;
use crate::screenplay::canvas::EditorCanvas;
use crate::screenplay::frame_queue::FrameTask;

pub const SHORTCUT_HINT: &str = "Use Ctrl/Cmd+1-6 for shortcuts";

#[derive(Debug, Default, Clone, Copy)]
pub struct FormatController;

impl FormatController {
    pub fn new() -> Self {
        Self
    }

    /// Line type bound to shortcut digit `slot` (1..=6).
    pub fn type_for_slot(slot: u8) -> Option<LineType> {
        let index = usize::from(slot).checked_sub(1)?;
        LineType::ALL.get(index).copied()
    }

    pub fn slot_for(line_type: LineType) -> u8 {
        LineType::ALL
            .iter()
            .position(|candidate| *candidate == line_type)
            .map_or(0, |index| index as u8 + 1)
    }

    /// Handles a format shortcut. Returns `true` when the key retyped the focused line.
    pub fn handle_key(
        &self,
        press: &KeyPress,
        keys: &EditorKeybindings,
        canvas: &mut EditorCanvas,
    ) -> bool {
        let Some(EditorAction::Format(slot)) = keys.action_for(press) else {
            return false;
        };
        let Some(line_type) = Self::type_for_slot(slot) else {
            return false;
        };
        self.apply(canvas, line_type)
    }

    /// Retypes the focused line and puts its caret at the end on the next frame.
    ///
    /// Does nothing while no line is focused.
    pub fn apply(&self, canvas: &mut EditorCanvas, line_type: LineType) -> bool {
        let Some(id) = canvas.store().focused().cloned() else {
            debug!(%line_type, "format command without a focused line");
            return false;
        };
        canvas.retype_line(&id, line_type);
        canvas.schedule(FrameTask::FocusLineAtEnd { id });
        true
    }

    /// Toolbar rows: one button per type (packed to `width`), the selection hint and the
    /// document counters.
    pub fn render_toolbar(&self, store: &LineStore, width: usize) -> Vec<String> {
        let current = store.focused_line().map(|line| line.line_type);
        let highlighted = current.unwrap_or(LineType::Action);

        let mut rows = Vec::new();
        let mut row = String::new();
        let mut row_width = 0;
        for line_type in LineType::ALL {
            let label = format!("[{} {}]", Self::slot_for(line_type), line_type.label());
            let label_width = visible_width(&label);
            let button = if highlighted == line_type {
                format!("\x1b[7m{label}\x1b[0m")
            } else {
                label
            };

            let gap = usize::from(row_width > 0);
            if row_width > 0 && row_width + gap + label_width > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            if row_width > 0 {
                row.push(' ');
                row_width += 1;
            }
            row.push_str(&button);
            row_width += label_width;
        }
        if !row.is_empty() {
            rows.push(row);
        }

        if let Some(line_type) = current {
            rows.push(format!(
                "Selected: {} | {SHORTCUT_HINT}",
                line_type.label().to_uppercase()
            ));
        }

        rows.push(format!(
            "\x1b[2m{} lines | {} words\x1b[0m",
            store.len(),
            store.total_words()
        ));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatController, SHORTCUT_HINT};
    use crate::core::input::parse_key;
    use crate::core::keybindings::EditorKeybindings;
    use crate::core::text::ansi::strip_ansi;
    use crate::screenplay::canvas::EditorCanvas;
    use line_store::{LineStore, LineType};

    #[test]
    fn slots_follow_toolbar_order() {
        let expected = [
            LineType::SceneHeading,
            LineType::Action,
            LineType::Character,
            LineType::Dialogue,
            LineType::Parenthetical,
            LineType::Transition,
        ];
        for (index, line_type) in expected.into_iter().enumerate() {
            let slot = index as u8 + 1;
            assert_eq!(FormatController::type_for_slot(slot), Some(line_type));
            assert_eq!(FormatController::slot_for(line_type), slot);
        }
        assert_eq!(FormatController::type_for_slot(0), None);
        assert_eq!(FormatController::type_for_slot(7), None);
    }

    #[test]
    fn shortcut_retypes_focused_line_and_schedules_caret() {
        let mut canvas = EditorCanvas::new();
        canvas.initialize();
        let keys = EditorKeybindings::default();
        let controller = FormatController::new();

        let ctrl_three = parse_key("\x1b[51;5u").expect("ctrl+3");
        assert!(controller.handle_key(&ctrl_three, &keys, &mut canvas));
        assert_eq!(canvas.store().lines()[0].line_type, LineType::Character);
        assert_eq!(canvas.pending_frames(), 1);
    }

    #[test]
    fn shortcut_without_focus_does_nothing() {
        let mut canvas = EditorCanvas::with_store(LineStore::new());
        let keys = EditorKeybindings::default();
        let ctrl_one = parse_key("\x1b[49;5u").expect("ctrl+1");
        assert!(!FormatController::new().handle_key(&ctrl_one, &keys, &mut canvas));
        assert_eq!(canvas.pending_frames(), 0);
    }

    #[test]
    fn non_format_keys_are_ignored() {
        let mut canvas = EditorCanvas::new();
        canvas.initialize();
        let keys = EditorKeybindings::default();
        let left = parse_key("\x1b[D").expect("left");
        assert!(!FormatController::new().handle_key(&left, &keys, &mut canvas));
    }

    #[test]
    fn toolbar_shows_selection_and_counts() {
        let mut canvas = EditorCanvas::new();
        canvas.initialize();
        let controller = FormatController::new();
        controller.apply(&mut canvas, LineType::SceneHeading);

        let rows: Vec<String> = controller
            .render_toolbar(canvas.store(), 200)
            .iter()
            .map(|row| strip_ansi(row))
            .collect();
        assert_eq!(
            rows,
            vec![
                "[1 Scene Heading] [2 Action] [3 Character] [4 Dialogue] [5 Parenthetical] [6 Transition]"
                    .to_string(),
                format!("Selected: SCENE HEADING | {SHORTCUT_HINT}"),
                "1 lines | 0 words".to_string(),
            ]
        );
    }

    #[test]
    fn toolbar_highlights_action_without_focus() {
        let store = LineStore::new();
        let rows = FormatController::new().render_toolbar(&store, 200);
        assert!(rows[0].contains("\x1b[7m[2 Action]\x1b[0m"));
        assert!(!rows[0].contains("\x1b[7m[1 Scene Heading]"));
        assert!(!rows.iter().any(|row| row.starts_with("Selected:")));
        assert_eq!(strip_ansi(&rows[1]), "0 lines | 0 words");
    }

    #[test]
    fn toolbar_wraps_buttons_to_width() {
        let store = LineStore::new();
        let rows = FormatController::new().render_toolbar(&store, 40);
        assert_eq!(strip_ansi(&rows[0]), "[1 Scene Heading] [2 Action]");
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| crate::core::text::width::visible_width(row) <= 40));
    }
}
