use tracing::{debug, trace};

use crate::error::LineStoreError;
use crate::schema::{Line, LineId, LineType};

/// Ordered collection of screenplay lines plus the globally focused line.
///
/// The store is the single writer of line state. Operations that reference an
/// unknown id are no-ops.
#[derive(Debug, Default)]
pub struct LineStore {
    lines: Vec<Line>,
    focused: Option<LineId>,
}

impl LineStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the bootstrap `action` line when the store is empty.
    ///
    /// Returns the id of the created line, or `None` if the store already had lines.
    pub fn initialize(&mut self) -> Option<LineId> {
        if !self.lines.is_empty() {
            return None;
        }
        let line = Line::empty(LineId::generate(), LineType::Action);
        let id = line.id.clone();
        self.lines.push(line);
        self.focused = Some(id.clone());
        debug!(line = %id, "initialized screenplay with bootstrap line");
        Some(id)
    }

    /// Inserts an empty line after `after` (or at the end) and focuses it.
    pub fn add_line(&mut self, line_type: LineType, after: Option<&LineId>) -> LineId {
        let line = Line::empty(LineId::generate(), line_type);
        let id = line.id.clone();
        let position = after
            .and_then(|after| self.index_of(after))
            .map(|index| index + 1)
            .unwrap_or(self.lines.len());
        self.lines.insert(position, line);
        self.focused = Some(id.clone());
        debug!(line = %id, %line_type, position, "added line");
        id
    }

    pub fn update_line(&mut self, id: &LineId, text: impl Into<String>) {
        let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) else {
            trace!(line = %id, "update for unknown line ignored");
            return;
        };
        line.set_text(text.into());
    }

    /// Removes a line and moves focus to its neighbour (previous first).
    ///
    /// Returns the new focus target. Unknown ids leave the store untouched and return `None`.
    pub fn delete_line(&mut self, id: &LineId) -> Option<LineId> {
        let Some(index) = self.index_of(id) else {
            trace!(line = %id, "delete for unknown line ignored");
            return None;
        };

        let focus = index
            .checked_sub(1)
            .and_then(|prev| self.lines.get(prev))
            .or_else(|| self.lines.get(index + 1))
            .map(|line| line.id.clone());

        self.lines.remove(index);
        self.focused = focus.clone();
        debug!(line = %id, focus = ?focus.as_ref().map(LineId::as_str), "deleted line");
        focus
    }

    /// Retypes a line, keeping its text, and keeps it focused.
    pub fn change_line_type(&mut self, id: &LineId, line_type: LineType) {
        let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) else {
            trace!(line = %id, "retype for unknown line ignored");
            return;
        };
        line.line_type = line_type;
        self.focused = Some(id.clone());
        debug!(line = %id, %line_type, "changed line type");
    }

    pub fn set_focus(&mut self, id: Option<LineId>) {
        self.focused = id;
    }

    #[must_use]
    pub fn focused(&self) -> Option<&LineId> {
        self.focused.as_ref()
    }

    #[must_use]
    pub fn focused_line(&self) -> Option<&Line> {
        self.focused.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: &LineId) -> Option<&Line> {
        self.lines.iter().find(|line| &line.id == id)
    }

    pub fn try_get(&self, id: &LineId) -> Result<&Line, LineStoreError> {
        self.get(id).ok_or_else(|| LineStoreError::unknown_line(id))
    }

    #[must_use]
    pub fn index_of(&self, id: &LineId) -> Option<usize> {
        self.lines.iter().position(|line| &line.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn total_words(&self) -> usize {
        self.lines.iter().map(|line| line.metadata.word_count).sum()
    }

    #[must_use]
    pub fn total_characters(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.metadata.character_count)
            .sum()
    }
}
