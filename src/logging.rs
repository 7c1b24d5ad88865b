use std::env;

use log::LevelFilter;

/// Environment variable holding the log level (`error` .. `trace`).
pub const LOG_ENV: &str = "BROADSIDE_LOG";

/// Initialize logging with a level taken from the `BROADSIDE_LOG` environment variable.
/// Defaults to `info` if the variable is not set or invalid. Output goes to
/// stderr so it stays apart from the board drawn on stdout.
pub fn init_logging() {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .try_init();
}
