//! Logging setup
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `pivate=info`)
//! - `PIVATE_LOG_FORMAT`: `pretty` (default) or `json`
//! - `PIVATE_LOG_DIR`: also write JSON logs to a daily rolling file there
//!
//! Logs go to stderr; stdout belongs to the console output channels.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "pivate=info";
const LOG_FILE_PREFIX: &str = "pivate-eye.log";

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive until exit.
pub fn init() -> Option<WorkerGuard> {
    let log_format = std::env::var("PIVATE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match std::env::var_os("PIVATE_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    guard
}
