//! Line-level editing: the editable region, caret offsets, composition and rendering.

pub mod composition;
pub mod layout;
pub mod line_editor;
pub mod offset;
pub mod region;
pub mod style;

pub use line_editor::{IntentSink, KeyOutcome, LineEditor, LineIntent};
