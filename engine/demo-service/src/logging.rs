//! Logging and tracing setup

use anyhow::{anyhow, Result};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Initialize logging and tracing.
///
/// `RUST_LOG` wins over the configured level. When a log file is configured the returned
/// guard must be held until shutdown so buffered lines get flushed.
pub fn initialize_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Log file path has no file name: {:?}", path))?;
            let appender = tracing_appender::rolling::never(
                directory.unwrap_or_else(|| std::path::Path::new(".")),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let ansi = config.file.is_none();

    let fmt_layer = format_layer(&config.format, ansi, writer)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

/// Build the fmt layer for `format` (pretty, json or compact)
fn format_layer<S>(
    format: &str,
    ansi: bool,
    writer: BoxMakeWriter,
) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let layer = match format {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_writer(writer)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        other => return Err(anyhow!("Invalid log format: {}", other)),
    };
    Ok(layer)
}
