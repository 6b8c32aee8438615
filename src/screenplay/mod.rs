//! Screenplay document: canvas, format commands, deferred frame work and the session view.

pub mod canvas;
pub mod focus;
pub mod format;
pub mod frame_queue;
pub mod session;

pub use canvas::EditorCanvas;
pub use format::FormatController;
pub use session::ScreenplaySession;
