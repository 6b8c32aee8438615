//! Text helpers (ANSI skipping and display width).
//!
//! These helpers are pure (string in/string out) so the editor layout and the toolbar can
//! measure styled strings without importing anything from the runtime.

pub mod ansi;
pub mod width;
