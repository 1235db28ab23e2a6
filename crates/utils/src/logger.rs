use serde::Deserialize;
use tracing_subscriber::{
    fmt::{self},
    prelude::*,
    EnvFilter,
};

/// Format for log output.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty-printed format.
    Pretty,
    /// JSON format for structured logging.
    Json,
    /// Minimal format with only essential information.
    Minimal,
}

/// Initializes the logging system.
///
/// Filters out crate dependencies to reduce noise.
///
/// # Panics
///
/// Panics if any of the log filter directives fail to parse.
pub fn init_logger(log_format: LogFormat) {
    // Set default log level to info if RUST_LOG is not set.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    let filter = EnvFilter::from_default_env()
        .add_directive("alloy_signer=warn".parse().unwrap())
        .add_directive("alloy_signer_local=warn".parse().unwrap())
        .add_directive("config=warn".parse().unwrap());
    let base = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Pretty => base
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(false)
                    .with_target(false)
                    .with_line_number(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init(),
        LogFormat::Json => base.with(fmt::layer().json()).init(),
        LogFormat::Minimal => base.with(fmt::layer().with_level(true).compact()).init(),
    }
}
