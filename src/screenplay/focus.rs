//! Native focus bookkeeping across line editors.

use line_store::LineId;

use crate::editor::LineEditor;

/// Which line editor currently holds native focus. At most one does.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<LineId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `target` as the holder and blurs the previous one.
    pub fn set_focus(&mut self, target: Option<LineId>, editors: &mut [LineEditor]) {
        if self.focused == target {
            return;
        }

        if let Some(prev) = self.focused.take() {
            if let Some(editor) = editors.iter_mut().find(|editor| editor.id() == &prev) {
                editor.blur();
            }
        }

        self.focused = target;
    }

    /// Drops the holder without blurring it, for an editor that no longer exists.
    pub fn forget(&mut self, id: &LineId) {
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
    }

    pub fn focused(&self) -> Option<&LineId> {
        self.focused.as_ref()
    }
}
