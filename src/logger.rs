//! Logger initialization.
//!
//! Configures tracing-based logging with pretty (human-readable) or JSON
//! output and log levels from config or the RUST_LOG env var (RUST_LOG
//! takes precedence).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggerConfig};

/// Initialize the global logger with the given configuration.
///
/// If neither RUST_LOG nor the config level is set, defaults to
/// `sandgraph_engine=info`.
pub fn initialize_logger(logger_config: &LoggerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logger_config.level));

    match logger_config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}
