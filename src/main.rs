use std::io;

use slugline::editor::style::PAGE_WIDTH;
use slugline::{logging, EnvConfig, ProcessTerminal, ScreenplaySession, TuiRuntime};
use tracing::info;

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("slugline: logging disabled: {err}");
            None
        }
    };

    let mut session =
        ScreenplaySession::new().with_page_width(config.page_width.unwrap_or(PAGE_WIDTH));
    let mut runtime = TuiRuntime::new(ProcessTerminal::new(), &config);

    runtime.start()?;
    let result = runtime.run(&mut session);
    runtime.stop()?;

    let store = session.store();
    info!(
        lines = store.len(),
        words = store.total_words(),
        "session closed"
    );
    result
}
