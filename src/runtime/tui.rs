//! Event loop that drives a [`ScreenplaySession`] on a [`Terminal`].

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::config::EnvConfig;
use crate::core::component::Component;
use crate::core::cursor::{extract_cursor_marker, CursorPos, CURSOR_MARKER};
use crate::core::input_event::{parse_input_events, InputEvent};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::runtime::ime::position_hardware_cursor;
use crate::screenplay::ScreenplaySession;

/// Upper bound on how long the loop sleeps without input before repainting.
const IDLE_TICK_MS: u64 = 250;

pub struct TuiRuntime<T: Terminal> {
    terminal: T,
    output: OutputGate,
    inputs: Option<Receiver<String>>,
    resized: Arc<AtomicBool>,
    kitty_keyboard: bool,
    show_hardware_cursor: bool,
    previous: Vec<String>,
    previous_cursor: Option<CursorPos>,
    full_redraw: bool,
    scroll: usize,
    stopped: bool,
}

impl<T: Terminal> TuiRuntime<T> {
    pub fn new(terminal: T, config: &EnvConfig) -> Self {
        Self {
            terminal,
            output: OutputGate::new(),
            inputs: None,
            resized: Arc::new(AtomicBool::new(false)),
            kitty_keyboard: config.kitty_keyboard,
            show_hardware_cursor: config.hardware_cursor,
            previous: Vec::new(),
            previous_cursor: None,
            full_redraw: true,
            scroll: 0,
            stopped: true,
        }
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn start(&mut self) -> io::Result<()> {
        let (sender, receiver) = mpsc::channel();
        let resized = Arc::clone(&self.resized);
        self.terminal.start(
            Box::new(move |data| {
                let _ = sender.send(data);
            }),
            Box::new(move || {
                resized.store(true, Ordering::SeqCst);
            }),
        )?;
        self.inputs = Some(receiver);
        self.stopped = false;
        self.full_redraw = true;

        self.output.push(TerminalCmd::AltScreenEnter);
        self.output.push(TerminalCmd::HideCursor);
        self.output.push(TerminalCmd::BracketedPasteEnable);
        self.output.push(TerminalCmd::FocusReportingEnable);
        if self.kitty_keyboard {
            self.output.push(TerminalCmd::KittyEnable);
        }
        self.output.flush(&mut self.terminal);
        info!(
            columns = self.terminal.columns(),
            rows = self.terminal.rows(),
            "runtime started"
        );
        Ok(())
    }

    /// Runs until the session asks to exit or the terminal stops delivering input.
    pub fn run(&mut self, session: &mut ScreenplaySession) -> io::Result<()> {
        let Some(inputs) = self.inputs.take() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "runtime not started",
            ));
        };
        let result = self.run_loop(&inputs, session);
        self.inputs = Some(inputs);
        result
    }

    fn run_loop(
        &mut self,
        inputs: &Receiver<String>,
        session: &mut ScreenplaySession,
    ) -> io::Result<()> {
        self.render(session);
        loop {
            match inputs.recv_timeout(Duration::from_millis(IDLE_TICK_MS)) {
                Ok(data) => {
                    self.handle_input(session, &data);
                    while let Ok(more) = inputs.try_recv() {
                        if session.exit_requested() {
                            break;
                        }
                        self.handle_input(session, &more);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input channel closed");
                    return Ok(());
                }
            }

            if session.exit_requested() {
                return Ok(());
            }
            if self.resized.swap(false, Ordering::SeqCst) {
                let columns = self.terminal.columns();
                let rows = self.terminal.rows();
                debug!(columns, rows, "terminal resized");
                session.handle_event(&InputEvent::Resize { columns, rows });
                self.full_redraw = true;
            }
            self.render(session);
        }
    }

    fn handle_input(&mut self, session: &mut ScreenplaySession, data: &str) {
        for event in parse_input_events(data) {
            trace!(?event, "input");
            session.handle_event(&event);
            if session.exit_requested() {
                return;
            }
        }
    }

    /// Paints one frame, rewriting only the rows that changed since the last paint.
    pub fn render(&mut self, session: &mut ScreenplaySession) {
        let width = self.terminal.columns() as usize;
        let height = (self.terminal.rows() as usize).max(1);

        let mut lines = session.render(width);
        let total = lines.len();
        let cursor = extract_cursor_marker(&mut lines, total);
        for line in lines.iter_mut() {
            if line.contains(CURSOR_MARKER) {
                *line = line.replace(CURSOR_MARKER, "");
            }
        }

        self.scroll_to(cursor, total, height);
        let visible: Vec<String> = (0..height)
            .map(|row| lines.get(self.scroll + row).cloned().unwrap_or_default())
            .collect();

        if !self.full_redraw && visible == self.previous && cursor == self.previous_cursor {
            return;
        }

        self.output.push(TerminalCmd::HideCursor);
        if self.full_redraw {
            self.output.push(TerminalCmd::ClearScreen);
        }
        for (row, line) in visible.iter().enumerate() {
            if !self.full_redraw && self.previous.get(row) == Some(line) {
                continue;
            }
            self.output.push(TerminalCmd::MoveTo { row, col: 0 });
            self.output.push(TerminalCmd::bytes(format!("{line}\x1b[0m\x1b[K")));
        }
        self.output.extend(position_hardware_cursor(
            cursor,
            self.scroll,
            height,
            self.show_hardware_cursor,
        ));
        self.output.flush(&mut self.terminal);

        self.previous = visible;
        self.previous_cursor = cursor;
        self.full_redraw = false;
    }

    fn scroll_to(&mut self, cursor: Option<CursorPos>, total: usize, height: usize) {
        if let Some(cursor) = cursor {
            if cursor.row < self.scroll {
                self.scroll = cursor.row;
            } else if cursor.row >= self.scroll + height {
                self.scroll = cursor.row + 1 - height;
            }
        }
        self.scroll = self.scroll.min(total.saturating_sub(height));
    }

    pub fn stop(&mut self) -> io::Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        if self.kitty_keyboard {
            self.output.push(TerminalCmd::KittyDisable);
        }
        self.output.push(TerminalCmd::FocusReportingDisable);
        self.output.push(TerminalCmd::BracketedPasteDisable);
        self.output.push(TerminalCmd::ShowCursor);
        self.output.push(TerminalCmd::AltScreenLeave);
        self.output.flush(&mut self.terminal);
        self.inputs = None;
        info!("runtime stopped");
        self.terminal.stop()
    }
}

impl<T: Terminal> Drop for TuiRuntime<T> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = self.stop();
        }));
    }
}
