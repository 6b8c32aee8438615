//! IME hardware cursor positioning.
//!
//! Input methods anchor their candidate window at the hardware cursor, so it follows the caret
//! even while hidden.

use crate::core::cursor::CursorPos;
use crate::core::output::TerminalCmd;

/// Commands that park the hardware cursor on the caret cell of the visible window.
///
/// `cursor` is in frame rows; `scroll` is the first frame row on screen.
pub fn position_hardware_cursor(
    cursor: Option<CursorPos>,
    scroll: usize,
    height: usize,
    show_hardware_cursor: bool,
) -> Vec<TerminalCmd> {
    let Some(cursor) = cursor else {
        return vec![TerminalCmd::HideCursor];
    };
    if cursor.row < scroll || cursor.row >= scroll + height {
        return vec![TerminalCmd::HideCursor];
    }

    let visibility = if show_hardware_cursor {
        TerminalCmd::ShowCursor
    } else {
        TerminalCmd::HideCursor
    };
    vec![
        TerminalCmd::MoveTo {
            row: cursor.row - scroll,
            col: cursor.col,
        },
        visibility,
    ]
}

#[cfg(test)]
mod tests {
    use super::position_hardware_cursor;
    use crate::core::cursor::CursorPos;
    use crate::core::output::TerminalCmd;

    #[test]
    fn moves_to_caret_relative_to_scroll() {
        let cmds = position_hardware_cursor(Some(CursorPos { row: 12, col: 7 }), 10, 5, true);
        assert_eq!(
            cmds,
            vec![TerminalCmd::MoveTo { row: 2, col: 7 }, TerminalCmd::ShowCursor]
        );
    }

    #[test]
    fn parks_hidden_cursor_when_not_shown() {
        let cmds = position_hardware_cursor(Some(CursorPos { row: 0, col: 3 }), 0, 5, false);
        assert_eq!(
            cmds,
            vec![TerminalCmd::MoveTo { row: 0, col: 3 }, TerminalCmd::HideCursor]
        );
    }

    #[test]
    fn hides_cursor_outside_the_window() {
        assert_eq!(
            position_hardware_cursor(Some(CursorPos { row: 9, col: 0 }), 0, 5, true),
            vec![TerminalCmd::HideCursor]
        );
        assert_eq!(
            position_hardware_cursor(None, 0, 5, true),
            vec![TerminalCmd::HideCursor]
        );
    }
}
