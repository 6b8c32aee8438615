//! Terminal output commands and the single write gate.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    Bytes(String),

    /// Cursor visibility and placement.
    HideCursor,
    ShowCursor,
    MoveTo { row: usize, col: usize },

    /// Screen management.
    ClearScreen,
    AltScreenEnter,
    AltScreenLeave,

    /// Protocol toggles.
    BracketedPasteEnable,
    BracketedPasteDisable,
    FocusReportingEnable,
    FocusReportingDisable,
    KittyEnable,
    KittyDisable,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Flush buffered commands to the terminal as one write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let mut out = String::new();
        for cmd in self.cmds.drain(..) {
            match cmd {
                TerminalCmd::Bytes(data) => out.push_str(&data),
                TerminalCmd::HideCursor => out.push_str("\x1b[?25l"),
                TerminalCmd::ShowCursor => out.push_str("\x1b[?25h"),
                TerminalCmd::MoveTo { row, col } => {
                    out.push_str(&format!("\x1b[{};{}H", row + 1, col + 1))
                }
                TerminalCmd::ClearScreen => out.push_str("\x1b[2J\x1b[H"),
                TerminalCmd::AltScreenEnter => out.push_str("\x1b[?1049h"),
                TerminalCmd::AltScreenLeave => out.push_str("\x1b[?1049l"),
                TerminalCmd::BracketedPasteEnable => out.push_str("\x1b[?2004h"),
                TerminalCmd::BracketedPasteDisable => out.push_str("\x1b[?2004l"),
                TerminalCmd::FocusReportingEnable => out.push_str("\x1b[?1004h"),
                TerminalCmd::FocusReportingDisable => out.push_str("\x1b[?1004l"),
                TerminalCmd::KittyEnable => out.push_str("\x1b[>7u"),
                TerminalCmd::KittyDisable => out.push_str("\x1b[<u"),
            }
        }
        term.write(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, TerminalCmd};
    use crate::core::terminal::Terminal;

    #[derive(Default)]
    struct RecordingTerminal {
        writes: Vec<String>,
    }

    impl Terminal for RecordingTerminal {
        fn start(
            &mut self,
            _on_input: Box<dyn FnMut(String) + Send>,
            _on_resize: Box<dyn FnMut() + Send>,
        ) -> std::io::Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn write(&mut self, data: &str) {
            self.writes.push(data.to_string());
        }

        fn columns(&self) -> u16 {
            80
        }

        fn rows(&self) -> u16 {
            24
        }
    }

    #[test]
    fn flush_writes_once_and_drains() {
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::HideCursor);
        gate.push(TerminalCmd::bytes("hello"));
        gate.push(TerminalCmd::MoveTo { row: 2, col: 4 });
        let mut term = RecordingTerminal::default();
        gate.flush(&mut term);
        assert_eq!(term.writes, vec!["\x1b[?25lhello\x1b[3;5H".to_string()]);
        assert!(gate.is_empty());

        gate.flush(&mut term);
        assert_eq!(term.writes.len(), 1);
    }
}
