use thiserror::Error;

use crate::schema::LineId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineStoreError {
    #[error("no line with id '{id}' in the store")]
    UnknownLine { id: LineId },

    #[error("unknown line type '{name}'; expected one of scene_heading, character, dialogue, action, parenthetical, transition")]
    UnknownLineType { name: String },
}

impl LineStoreError {
    #[must_use]
    pub fn unknown_line(id: &LineId) -> Self {
        Self::UnknownLine { id: id.clone() }
    }

    #[must_use]
    pub fn unknown_line_type(name: impl Into<String>) -> Self {
        Self::UnknownLineType { name: name.into() }
    }
}
