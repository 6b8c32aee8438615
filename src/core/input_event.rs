//! Structured input events delivered to the editor.

use crate::core::input::{parse_key, parse_text, KeyEventType, KeyPress};

/// Input event delivered to components.
///
/// Notes:
/// - Terminal input only ever produces `Key`, `Text`, `Paste` and `UnknownRaw`.
/// - Composition events come from hosts with an input method bridge; the editor treats the
///   `CompositionUpdate`/`CompositionEnd` text as the full current preedit string.
/// - `FocusGained`/`FocusLost` mirror native focus changes of the whole editor surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyPress),
    Text { text: String },
    Paste { text: String },
    CompositionStart,
    CompositionUpdate { text: String },
    CompositionEnd { text: String },
    FocusGained,
    FocusLost,
    Resize { columns: u16, rows: u16 },
    UnknownRaw { raw: String },
}

impl InputEvent {
    pub fn text(text: impl Into<String>) -> Self {
        InputEvent::Text { text: text.into() }
    }

    pub fn paste(text: impl Into<String>) -> Self {
        InputEvent::Paste { text: text.into() }
    }
}

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";
const FOCUS_IN: &str = "\x1b[I";
const FOCUS_OUT: &str = "\x1b[O";

fn parse_non_paste(data: &str) -> Vec<InputEvent> {
    if data.is_empty() {
        return Vec::new();
    }

    match data {
        FOCUS_IN => return vec![InputEvent::FocusGained],
        FOCUS_OUT => return vec![InputEvent::FocusLost],
        _ => {}
    }

    if let Some(text) = parse_text(data) {
        return vec![InputEvent::Text { text }];
    }

    if let Some(press) = parse_key(data) {
        if press.event_type == KeyEventType::Release {
            return Vec::new();
        }
        return vec![InputEvent::Key(press)];
    }

    vec![InputEvent::UnknownRaw {
        raw: data.to_string(),
    }]
}

/// Converts one complete terminal sequence (or a bracketed paste wrapper) into events.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut remaining = data;
    loop {
        let Some(start) = remaining.find(PASTE_START) else {
            events.extend(parse_non_paste(remaining));
            break;
        };

        events.extend(parse_non_paste(&remaining[..start]));

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end_rel) = after_start.find(PASTE_END) else {
            events.push(InputEvent::UnknownRaw {
                raw: remaining.to_string(),
            });
            break;
        };

        events.push(InputEvent::Paste {
            text: after_start[..end_rel].to_string(),
        });

        remaining = &after_start[end_rel + PASTE_END.len()..];
        if remaining.is_empty() {
            break;
        }
    }

    events
}
