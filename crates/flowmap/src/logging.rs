//! Tracing subscriber setup

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use flowmap_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber
///
/// `level_override` (from the command line) wins over the configured level.
/// An unparsable level falls back to `info`.
pub fn init(config: &LogConfig, level_override: Option<&str>) -> Result<()> {
    let filter = build_filter(level_override.unwrap_or(config.level.as_str()))?;

    let (writer, ansi) = match &config.output {
        LogOutput::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogOutput::Stdout => (BoxMakeWriter::new(io::stdout), true),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_writer(writer);

    match config.format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json())
            .with(filter)
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))
}
