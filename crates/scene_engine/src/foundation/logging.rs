//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, falling back to `filter` when `RUST_LOG` is unset
///
/// Returns an error if a global logger was already installed (e.g. by a test harness).
pub fn try_init_with_filter(filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
}
