//! Environment configuration.

use std::env;

/// Narrowest page the editor will lay out.
pub const MIN_PAGE_WIDTH: usize = 20;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_file: Option<String>,
    pub debug: bool,
    pub hardware_cursor: bool,
    pub kitty_keyboard: bool,
    pub page_width: Option<usize>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_file: env_string_opt("SLUGLINE_LOG_FILE"),
            debug: env_flag("SLUGLINE_DEBUG"),
            hardware_cursor: env_flag("SLUGLINE_HARDWARE_CURSOR"),
            kitty_keyboard: !env_flag("SLUGLINE_NO_KITTY"),
            page_width: env_string_opt("SLUGLINE_WIDTH")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .map(|width| width.max(MIN_PAGE_WIDTH)),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
