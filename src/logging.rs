//! File logging for the `slugline` binary.
//!
//! Stdout is the editor surface, so logs only ever go to a file.
//!
//! Filter priority: `SLUGLINE_LOG` > `RUST_LOG` > default (`warn` globally, `info` for the
//! slugline crates, `debug` with `SLUGLINE_DEBUG=1`).
//!
//! Default file: `<temp_dir>/slugline-<pid>.log`. Override with `SLUGLINE_LOG_FILE`.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::EnvConfig;

const CRATES: [&str; 2] = ["slugline", "line_store"];

/// Must be held for the lifetime of the program; dropping it flushes the file writer.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

pub fn init(config: &EnvConfig) -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let (dir, filename) = resolve_log_path(config.log_file.as_deref().map(Path::new));
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, &filename);
    let (writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let directives = filter_directives(
        env::var("SLUGLINE_LOG").ok().as_deref(),
        env::var("RUST_LOG").ok().as_deref(),
        config.debug,
    );
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(EnvFilter::try_new(directives)?);

    tracing_subscriber::registry().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: dir.join(filename),
    })
}

fn resolve_log_path(override_path: Option<&Path>) -> (PathBuf, String) {
    let filename = format!("slugline-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path.to_path_buf(), filename);
    }

    (env::temp_dir(), filename)
}

fn filter_directives(slugline_log: Option<&str>, rust_log: Option<&str>, debug: bool) -> String {
    if let Some(level) = slugline_log.filter(|value| !value.trim().is_empty()) {
        // Module syntax is passed through untouched.
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }
        return expand(level);
    }
    if let Some(rust_log) = rust_log.filter(|value| !value.trim().is_empty()) {
        return rust_log.to_string();
    }
    expand(if debug { "debug" } else { "info" })
}

fn expand(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|name| format!("{name}={level}")));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::{filter_directives, resolve_log_path};
    use std::path::{Path, PathBuf};

    #[test]
    fn default_filter_is_info_for_own_crates() {
        assert_eq!(
            filter_directives(None, None, false),
            "warn,slugline=info,line_store=info"
        );
        assert_eq!(
            filter_directives(None, None, true),
            "warn,slugline=debug,line_store=debug"
        );
    }

    #[test]
    fn slugline_log_wins_over_rust_log() {
        assert_eq!(
            filter_directives(Some("trace"), Some("error"), false),
            "warn,slugline=trace,line_store=trace"
        );
        assert_eq!(
            filter_directives(Some("line_store=debug"), Some("error"), false),
            "line_store=debug"
        );
        assert_eq!(filter_directives(None, Some("error"), true), "error");
    }

    #[test]
    fn log_path_override_accepts_file_or_dir() {
        let (dir, name) = resolve_log_path(Some(Path::new("/tmp/logs/editor.log")));
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert_eq!(name, "editor.log");

        let (dir, name) = resolve_log_path(Some(Path::new("/tmp/logs")));
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert!(name.starts_with("slugline-"));
    }
}
