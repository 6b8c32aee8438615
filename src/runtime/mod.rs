//! Terminal event loop.

pub mod ime;
pub mod tui;

pub use tui::TuiRuntime;
