use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::LineStoreError;

/// Opaque line identifier. Stable for the lifetime of the line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(String);

impl LineId {
    /// Allocates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Screenplay element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
}

impl LineType {
    /// All types in format-shortcut order (digit 1 through 6).
    pub const ALL: [LineType; 6] = [
        LineType::SceneHeading,
        LineType::Action,
        LineType::Character,
        LineType::Dialogue,
        LineType::Parenthetical,
        LineType::Transition,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LineType::SceneHeading => "scene_heading",
            LineType::Action => "action",
            LineType::Character => "character",
            LineType::Dialogue => "dialogue",
            LineType::Parenthetical => "parenthetical",
            LineType::Transition => "transition",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LineType::SceneHeading => "Scene Heading",
            LineType::Action => "Action",
            LineType::Character => "Character",
            LineType::Dialogue => "Dialogue",
            LineType::Parenthetical => "Parenthetical",
            LineType::Transition => "Transition",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, LineStoreError> {
        LineType::ALL
            .into_iter()
            .find(|line_type| line_type.name() == name)
            .ok_or_else(|| LineStoreError::unknown_line_type(name))
    }

    /// Type assigned to the line created by a hard split after a line of this type.
    #[must_use]
    pub fn next_on_split(self) -> Self {
        match self {
            LineType::SceneHeading => LineType::Action,
            LineType::Character => LineType::Dialogue,
            LineType::Dialogue => LineType::Character,
            LineType::Parenthetical => LineType::Dialogue,
            LineType::Action => LineType::Action,
            LineType::Transition => LineType::SceneHeading,
        }
    }
}

impl Default for LineType {
    fn default() -> Self {
        LineType::Action
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived counters, recomputed on every text mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetadata {
    pub character_count: usize,
    pub word_count: usize,
    pub timestamp: OffsetDateTime,
}

impl LineMetadata {
    /// Soft breaks count as characters and separate words.
    #[must_use]
    pub fn for_text(text: &str, timestamp: OffsetDateTime) -> Self {
        Self {
            character_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub line_type: LineType,
    pub text: String,
    pub metadata: LineMetadata,
}

impl Line {
    #[must_use]
    pub fn empty(id: LineId, line_type: LineType) -> Self {
        Self {
            id,
            line_type,
            text: String::new(),
            metadata: LineMetadata::for_text("", OffsetDateTime::now_utc()),
        }
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.metadata = LineMetadata::for_text(&text, OffsetDateTime::now_utc());
        self.text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::{LineMetadata, LineType};
    use time::OffsetDateTime;

    #[test]
    fn metadata_counts_words_and_chars() {
        let meta = LineMetadata::for_text("  INT. HOUSE  - DAY ", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(meta.character_count, 20);
        assert_eq!(meta.word_count, 4);
    }

    #[test]
    fn soft_breaks_are_counted_as_characters() {
        let meta = LineMetadata::for_text("A\nB", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(meta.character_count, 3);
        assert_eq!(meta.word_count, 2);
    }

    #[test]
    fn character_count_uses_scalar_values() {
        let meta = LineMetadata::for_text("日本語", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(meta.character_count, 3);
        assert_eq!(meta.word_count, 1);
    }

    #[test]
    fn split_rules_follow_screenplay_conventions() {
        assert_eq!(LineType::SceneHeading.next_on_split(), LineType::Action);
        assert_eq!(LineType::Character.next_on_split(), LineType::Dialogue);
        assert_eq!(LineType::Dialogue.next_on_split(), LineType::Character);
        assert_eq!(LineType::Parenthetical.next_on_split(), LineType::Dialogue);
        assert_eq!(LineType::Action.next_on_split(), LineType::Action);
        assert_eq!(LineType::Transition.next_on_split(), LineType::SceneHeading);
    }

    #[test]
    fn names_round_trip() {
        for line_type in LineType::ALL {
            assert_eq!(LineType::from_name(line_type.name()), Ok(line_type));
        }
        assert!(LineType::from_name("montage").is_err());
    }
}
