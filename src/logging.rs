//! Logging setup
//!
//! Console output through `tracing_subscriber::fmt`, filtered by `RUST_LOG`
//! or the configured directives, plus an optional non-blocking file writer.

use crate::config::LoggingConfig;
use crate::error::{FlowError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Returns the file writer's guard when a log file is configured; keep it
/// alive until exit or buffered lines are lost. Fails if a global subscriber
/// is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| FlowError::Config(format!("Invalid log filter '{}': {}", config.filter, e)))?;

    let console = fmt::layer()
        .with_ansi(config.ansi)
        .with_thread_names(config.thread_names);

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| {
                FlowError::Config(format!("Log file path {:?} has no file name", path))
            })?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| FlowError::Config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}
