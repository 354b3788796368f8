//! Logging initialization for the schedwatch binary.

use std::sync::OnceLock;

/// Environment variable selecting the log level
pub const LOG_ENV_VAR: &str = "SCHEDWATCH_LOG";

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(raw: Option<&str>) -> tracing::Level {
    match raw.unwrap_or("warn").to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    }
}

/// Level selected by `SCHEDWATCH_LOG`, `warn` when unset or unrecognized
pub fn level_from_env() -> tracing::Level {
    parse_level(std::env::var(LOG_ENV_VAR).ok().as_deref())
}

/// Initialize tracing output on stderr from `SCHEDWATCH_LOG`.
///
/// Stdout is reserved for the report. Safe to call more than once; only the
/// first call installs the subscriber.
pub fn init() {
    if INIT.get().is_some() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_from_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    let _ = INIT.set(());
}
