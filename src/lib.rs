//! Terminal screenplay editor.
//!
//! A document is a list of typed lines held by [`line_store::LineStore`]. Each line is edited
//! through its own [`LineEditor`], an editable region with native-style caret, selection and
//! composition handling. The [`EditorCanvas`] owns the store and the editors, applies the intents
//! editors emit and keeps a single line natively focused.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.

#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod config;
pub mod logging;

pub mod core;
pub mod editor;
pub mod platform;
pub mod runtime;
pub mod screenplay;

pub use line_store::{Line, LineId, LineStore, LineType};

/// Runtime component traits and cursor marker helper.
pub use crate::core::component::{Component, Focusable};
pub use crate::core::cursor::CURSOR_MARKER;

/// Keyboard input parsing and keybindings.
pub use crate::core::input::{parse_key, Key, KeyPress, Modifiers};
pub use crate::core::input_event::{parse_input_events, InputEvent};
pub use crate::core::keybindings::{EditorAction, EditorKeybindings};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;
pub use crate::platform::stdin_buffer::StdinBuffer;

pub use crate::config::EnvConfig;
pub use crate::editor::{IntentSink, KeyOutcome, LineEditor, LineIntent};
pub use crate::runtime::TuiRuntime;
pub use crate::screenplay::{EditorCanvas, FormatController, ScreenplaySession};

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
