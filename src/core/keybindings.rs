//! Editor keybindings.
//!
//! Bindings are owned by the editor session that uses them; there is no process-wide
//! keymap.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::input::KeyPress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorLineStart,
    CursorLineEnd,
    SelectLeft,
    SelectRight,
    SelectLineStart,
    SelectLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    /// Retype the focused line to the type in the given shortcut slot (1..=6).
    Format(u8),
    Quit,
}

impl EditorAction {
    /// Resolution order when several actions share a key.
    const PRIORITY: [EditorAction; 19] = [
        EditorAction::Quit,
        EditorAction::Format(1),
        EditorAction::Format(2),
        EditorAction::Format(3),
        EditorAction::Format(4),
        EditorAction::Format(5),
        EditorAction::Format(6),
        EditorAction::SelectLeft,
        EditorAction::SelectRight,
        EditorAction::SelectLineStart,
        EditorAction::SelectLineEnd,
        EditorAction::CursorLeft,
        EditorAction::CursorRight,
        EditorAction::CursorUp,
        EditorAction::CursorDown,
        EditorAction::CursorLineStart,
        EditorAction::CursorLineEnd,
        EditorAction::DeleteCharBackward,
        EditorAction::DeleteCharForward,
    ];
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyBinding {
    fn from(value: Vec<String>) -> Self {
        KeyBinding::Multiple(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorKeybindingsConfig {
    entries: HashMap<EditorAction, KeyBinding>,
}

impl EditorKeybindingsConfig {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: EditorAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

fn format_keys(slot: u8) -> Vec<KeyId> {
    // Legacy terminals cannot encode ctrl+digit; they report the meta key as alt.
    vec![
        format!("ctrl+{slot}"),
        format!("meta+{slot}"),
        format!("alt+{slot}"),
    ]
}

pub static DEFAULT_EDITOR_KEYBINDINGS: LazyLock<HashMap<EditorAction, Vec<KeyId>>> =
    LazyLock::new(|| {
        use EditorAction::*;

        let mut map = HashMap::new();
        map.insert(CursorLeft, vec!["left".to_string(), "ctrl+b".to_string()]);
        map.insert(CursorRight, vec!["right".to_string(), "ctrl+f".to_string()]);
        map.insert(CursorUp, vec!["up".to_string()]);
        map.insert(CursorDown, vec!["down".to_string()]);
        map.insert(CursorLineStart, vec!["home".to_string(), "ctrl+a".to_string()]);
        map.insert(CursorLineEnd, vec!["end".to_string(), "ctrl+e".to_string()]);
        map.insert(SelectLeft, vec!["shift+left".to_string()]);
        map.insert(SelectRight, vec!["shift+right".to_string()]);
        map.insert(SelectLineStart, vec!["shift+home".to_string()]);
        map.insert(SelectLineEnd, vec!["shift+end".to_string()]);
        map.insert(DeleteCharBackward, vec!["backspace".to_string()]);
        map.insert(
            DeleteCharForward,
            vec!["delete".to_string(), "ctrl+d".to_string()],
        );
        for slot in 1..=6 {
            map.insert(Format(slot), format_keys(slot));
        }
        map.insert(Quit, vec!["ctrl+c".to_string(), "ctrl+q".to_string()]);

        map
    });

#[derive(Debug, Clone)]
pub struct EditorKeybindings {
    action_to_keys: HashMap<EditorAction, Vec<KeyId>>,
}

impl Default for EditorKeybindings {
    fn default() -> Self {
        Self::new(EditorKeybindingsConfig::default())
    }
}

impl EditorKeybindings {
    pub fn new(config: EditorKeybindingsConfig) -> Self {
        let mut manager = Self {
            action_to_keys: HashMap::new(),
        };
        manager.build_maps(&config);
        manager
    }

    fn build_maps(&mut self, config: &EditorKeybindingsConfig) {
        self.action_to_keys.clear();

        for (action, keys) in DEFAULT_EDITOR_KEYBINDINGS.iter() {
            self.action_to_keys.insert(*action, keys.clone());
        }

        for (action, binding) in config.entries.iter() {
            let key_list = match binding {
                KeyBinding::Single(key) => vec![key.clone()],
                KeyBinding::Multiple(keys) => keys.clone(),
            };
            self.action_to_keys.insert(*action, key_list);
        }
    }

    pub fn matches(&self, press: &KeyPress, action: EditorAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| press.matches(key)))
    }

    /// First bound action for a key press, in [`EditorAction::PRIORITY`] order.
    pub fn action_for(&self, press: &KeyPress) -> Option<EditorAction> {
        EditorAction::PRIORITY
            .into_iter()
            .find(|action| self.matches(press, *action))
    }

    pub fn get_keys(&self, action: EditorAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorAction, EditorKeybindings, EditorKeybindingsConfig, KeyBinding};
    use crate::core::input::{parse_key, Key, KeyPress};

    #[test]
    fn defaults_match_expected_keys() {
        let keys = EditorKeybindings::default();
        let ctrl_one = parse_key("\x1b[49;5u").expect("ctrl+1");
        assert_eq!(keys.action_for(&ctrl_one), Some(EditorAction::Format(1)));
        let alt_six = parse_key("\x1b6").expect("alt+6");
        assert_eq!(keys.action_for(&alt_six), Some(EditorAction::Format(6)));
        assert_eq!(
            keys.action_for(&KeyPress::plain(Key::Left)),
            Some(EditorAction::CursorLeft)
        );
        assert_eq!(
            keys.action_for(&KeyPress::shifted(Key::Left)),
            Some(EditorAction::SelectLeft)
        );
        assert_eq!(keys.action_for(&KeyPress::plain(Key::Char('1'))), None);
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut config = EditorKeybindingsConfig::default();
        config.set(EditorAction::Quit, KeyBinding::Single("ctrl+x".to_string()));
        let keys = EditorKeybindings::new(config);
        let ctrl_x = parse_key("\x18").expect("ctrl+x");
        let ctrl_c = parse_key("\x03").expect("ctrl+c");
        assert!(keys.matches(&ctrl_x, EditorAction::Quit));
        assert!(!keys.matches(&ctrl_c, EditorAction::Quit));
        assert_eq!(keys.get_keys(EditorAction::Quit), vec!["ctrl+x".to_string()]);
    }
}
