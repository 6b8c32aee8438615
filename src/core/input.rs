//! Key decoding for raw terminal input.
//!
//! Decodes legacy VT sequences, xterm `modifyOtherKeys` and the kitty keyboard protocol
//! (CSI u) into structured [`KeyPress`] values. Plain printable input is reported as text by
//! [`parse_text`] instead.

const MOD_SHIFT: u8 = 1;
const MOD_ALT: u8 = 2;
const MOD_CTRL: u8 = 4;
const MOD_SUPER: u8 = 8;
const LOCK_MASK: u8 = 64 + 128;

const CODEPOINT_BACKSPACE_CTRL_H: u32 = 8;
const CODEPOINT_TAB: u32 = 9;
const CODEPOINT_ENTER: u32 = 13;
const CODEPOINT_ESCAPE: u32 = 27;
const CODEPOINT_BACKSPACE: u32 = 127;
const CODEPOINT_KP_ENTER: u32 = 57414;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    fn name(self) -> String {
        match self {
            Key::Char(' ') => "space".to_string(),
            Key::Char(ch) => ch.to_string(),
            Key::Enter => "enter".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Delete => "delete".to_string(),
            Key::Tab => "tab".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Up => "up".to_string(),
            Key::Down => "down".to_string(),
            Key::Left => "left".to_string(),
            Key::Right => "right".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::PageUp => "pageUp".to_string(),
            Key::PageDown => "pageDown".to_string(),
        }
    }

    fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "space" => Key::Char(' '),
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "delete" => Key::Delete,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageUp" => Key::PageUp,
            "pageDown" => Key::PageDown,
            other => {
                let mut chars = other.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Char(ch.to_ascii_lowercase())
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    fn from_bits(bits: u8) -> Self {
        let bits = bits & !LOCK_MASK;
        Self {
            shift: bits & MOD_SHIFT != 0,
            ctrl: bits & MOD_CTRL != 0,
            alt: bits & MOD_ALT != 0,
            meta: bits & MOD_SUPER != 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventType {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A decoded key event: key name plus modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    pub event_type: KeyEventType,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            event_type: KeyEventType::Press,
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn shifted(key: Key) -> Self {
        Self::new(key, Modifiers::SHIFT)
    }

    /// Normalized identifier such as `ctrl+1` or `shift+enter`.
    pub fn key_id(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.shift {
            parts.push("shift".to_string());
        }
        if self.modifiers.ctrl {
            parts.push("ctrl".to_string());
        }
        if self.modifiers.alt {
            parts.push("alt".to_string());
        }
        if self.modifiers.meta {
            parts.push("meta".to_string());
        }
        parts.push(self.key.name());
        parts.join("+")
    }

    /// Parses a key id (`ctrl+shift+up`) back into a key press.
    pub fn from_key_id(key_id: &str) -> Option<Self> {
        let mut modifiers = Modifiers::NONE;
        let mut parts = key_id.trim().split('+').peekable();
        let mut key = None;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                key = Key::from_name(part);
                break;
            }
            match part.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "meta" | "super" | "cmd" => modifiers.meta = true,
                _ => return None,
            }
        }
        key.map(|key| Self::new(key, modifiers))
    }

    pub fn matches(&self, key_id: &str) -> bool {
        match Self::from_key_id(key_id) {
            Some(expected) => expected.key == self.key && expected.modifiers == self.modifiers,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ParsedKittySequence {
    codepoint: u32,
    shifted_key: Option<u32>,
    base_layout_key: Option<u32>,
    modifier: u8,
    event_type: KeyEventType,
}

fn parse_event_type(event_type: Option<&str>) -> KeyEventType {
    match event_type.and_then(|value| value.parse::<u8>().ok()) {
        Some(2) => KeyEventType::Repeat,
        Some(3) => KeyEventType::Release,
        _ => KeyEventType::Press,
    }
}

fn split_modifier(mod_part: Option<&str>) -> (u8, KeyEventType) {
    let Some(mod_part) = mod_part else {
        return (0, KeyEventType::Press);
    };
    let (mod_value, event_value) = match mod_part.split_once(':') {
        Some((left, right)) => (left, Some(right)),
        None => (mod_part, None),
    };
    let mod_value = mod_value.parse::<u8>().unwrap_or(1);
    (mod_value.saturating_sub(1), parse_event_type(event_value))
}

fn parse_kitty_u(data: &str) -> Option<ParsedKittySequence> {
    let body = data.strip_prefix("\x1b[")?.strip_suffix('u')?;
    let (code_part, mod_part) = match body.split_once(';') {
        Some((left, right)) => (left, Some(right)),
        None => (body, None),
    };

    let mut code_iter = code_part.split(':');
    let codepoint = code_iter.next()?.parse::<u32>().ok()?;
    let shifted_key = code_iter
        .next()
        .and_then(|value| if value.is_empty() { None } else { value.parse().ok() });
    let base_layout_key = code_iter.next().and_then(|value| value.parse().ok());
    if code_iter.next().is_some() {
        return None;
    }

    let (modifier, event_type) = split_modifier(mod_part);
    Some(ParsedKittySequence {
        codepoint,
        shifted_key,
        base_layout_key,
        modifier,
        event_type,
    })
}

fn key_for_codepoint(codepoint: u32, base_layout_key: Option<u32>) -> Option<Key> {
    let key = match codepoint {
        CODEPOINT_ENTER | CODEPOINT_KP_ENTER => Key::Enter,
        CODEPOINT_TAB => Key::Tab,
        CODEPOINT_ESCAPE => Key::Escape,
        CODEPOINT_BACKSPACE | CODEPOINT_BACKSPACE_CTRL_H => Key::Backspace,
        cp => {
            let ch = char::from_u32(cp)?;
            if ch.is_ascii_graphic() || ch == ' ' {
                Key::Char(ch.to_ascii_lowercase())
            } else if let Some(base) = base_layout_key.and_then(char::from_u32) {
                // Non-latin layouts report the latin key in the base-layout field.
                Key::Char(base.to_ascii_lowercase())
            } else if !ch.is_control() {
                Key::Char(ch)
            } else {
                return None;
            }
        }
    };
    Some(key)
}

/// `CSI 1;<mod>X` and `CSI <n>;<mod>~` forms for navigation keys.
fn parse_csi_navigation(data: &str) -> Option<KeyPress> {
    let body = data.strip_prefix("\x1b[")?;
    let final_char = body.chars().last()?;
    let params = &body[..body.len() - final_char.len_utf8()];

    let (key, mod_part) = match final_char {
        'A' | 'B' | 'C' | 'D' | 'H' | 'F' => {
            let mod_part = match params {
                "" => None,
                other => Some(other.strip_prefix("1;")?),
            };
            let key = match final_char {
                'A' => Key::Up,
                'B' => Key::Down,
                'C' => Key::Right,
                'D' => Key::Left,
                'H' => Key::Home,
                _ => Key::End,
            };
            (key, mod_part)
        }
        '~' => {
            let mut parts = params.split(';');
            let number = parts.next()?.parse::<u32>().ok()?;
            let mod_part = parts.next();
            if parts.next().is_some() {
                return None;
            }
            let key = match number {
                1 | 7 => Key::Home,
                3 => Key::Delete,
                4 | 8 => Key::End,
                5 => Key::PageUp,
                6 => Key::PageDown,
                _ => return None,
            };
            (key, mod_part)
        }
        _ => return None,
    };

    let (modifier, event_type) = split_modifier(mod_part);
    Some(KeyPress {
        key,
        modifiers: Modifiers::from_bits(modifier),
        event_type,
    })
}

/// xterm `modifyOtherKeys`: `CSI 27;<mod>;<keycode>~`.
fn parse_modify_other_keys(data: &str) -> Option<KeyPress> {
    let body = data.strip_prefix("\x1b[27;")?.strip_suffix('~')?;
    let mut parts = body.split(';');
    let mod_value = parts.next()?.parse::<u8>().ok()?;
    let keycode = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let key = key_for_codepoint(keycode, None)?;
    Some(KeyPress::new(
        key,
        Modifiers::from_bits(mod_value.saturating_sub(1)),
    ))
}

fn legacy_key(data: &str) -> Option<KeyPress> {
    let press = match data {
        "\r" => KeyPress::plain(Key::Enter),
        // Ctrl+J, and what most terminals can be configured to send for Shift+Enter.
        "\n" => KeyPress::shifted(Key::Enter),
        "\x1b\r" => KeyPress::new(
            Key::Enter,
            Modifiers {
                alt: true,
                ..Modifiers::NONE
            },
        ),
        "\x7f" | "\x08" => KeyPress::plain(Key::Backspace),
        "\t" => KeyPress::plain(Key::Tab),
        "\x1b[Z" => KeyPress::shifted(Key::Tab),
        "\x1b" => KeyPress::plain(Key::Escape),
        "\x1bOA" => KeyPress::plain(Key::Up),
        "\x1bOB" => KeyPress::plain(Key::Down),
        "\x1bOC" => KeyPress::plain(Key::Right),
        "\x1bOD" => KeyPress::plain(Key::Left),
        "\x1bOH" => KeyPress::plain(Key::Home),
        "\x1bOF" => KeyPress::plain(Key::End),
        "\x1b[a" => KeyPress::shifted(Key::Up),
        "\x1b[b" => KeyPress::shifted(Key::Down),
        "\x1b[c" => KeyPress::shifted(Key::Right),
        "\x1b[d" => KeyPress::shifted(Key::Left),
        "\x00" => KeyPress::new(
            Key::Char(' '),
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        ),
        _ => return None,
    };
    Some(press)
}

/// Decodes one complete input sequence into a key press.
///
/// Returns `None` for plain printable text (see [`parse_text`]) and for unknown sequences.
pub fn parse_key(data: &str) -> Option<KeyPress> {
    if data.is_empty() {
        return None;
    }

    if let Some(kitty) = parse_kitty_u(data) {
        let key = key_for_codepoint(kitty.codepoint, kitty.base_layout_key)?;
        return Some(KeyPress {
            key,
            modifiers: Modifiers::from_bits(kitty.modifier),
            event_type: kitty.event_type,
        });
    }

    if let Some(press) = parse_modify_other_keys(data) {
        return Some(press);
    }

    if let Some(press) = legacy_key(data) {
        return Some(press);
    }

    if let Some(press) = parse_csi_navigation(data) {
        return Some(press);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let rest: Vec<char> = chars.collect();

    // Raw control bytes: Ctrl+A .. Ctrl+Z.
    if rest.is_empty() && ('\x01'..='\x1a').contains(&first) {
        let letter = char::from(b'a' + (first as u8 - 1));
        return Some(KeyPress::new(
            Key::Char(letter),
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        ));
    }

    // ESC-prefixed printable: Alt/Meta + key on legacy terminals.
    if first == '\x1b' && rest.len() == 1 && !rest[0].is_control() {
        let ch = rest[0];
        return Some(KeyPress::new(
            Key::Char(ch.to_ascii_lowercase()),
            Modifiers {
                alt: true,
                shift: ch.is_ascii_uppercase(),
                ..Modifiers::NONE
            },
        ));
    }

    None
}

/// Decodes printable text, including kitty-encoded printable keys without command modifiers.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    if let Some(kitty) = parse_kitty_u(data) {
        if kitty.event_type == KeyEventType::Release {
            return None;
        }
        let modifier = kitty.modifier & !LOCK_MASK;
        if modifier & !MOD_SHIFT != 0 {
            return None;
        }
        let codepoint = if modifier & MOD_SHIFT != 0 {
            kitty.shifted_key.unwrap_or(kitty.codepoint)
        } else {
            kitty.codepoint
        };
        let ch = char::from_u32(codepoint)?;
        if ch.is_control() || codepoint >= 57344 {
            return None;
        }
        let ch = if modifier & MOD_SHIFT != 0 && kitty.shifted_key.is_none() {
            ch.to_ascii_uppercase()
        } else {
            ch
        };
        return Some(ch.to_string());
    }

    if data.chars().any(|ch| ch.is_control()) {
        return None;
    }
    Some(data.to_string())
}
