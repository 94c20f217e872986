use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::domain::Verbosity;

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// `RUST_LOG` still wins over the level picked from `--debug`/`--quiet`.
pub fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(verbosity.level().into())
        .from_env_lossy()
}

pub fn init(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}
