//! flowmap - Flow aggregation pipeline
//!
//! Reads flow records as JSON lines, aggregates them into metric documents
//! and writes the documents to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: read stdin, JSON documents on stdout, logs on stderr
//! flowmap < flows.jsonl
//!
//! # With a config file and an input file
//! flowmap --config configs/flowmap.toml --input flows.jsonl
//! ```

mod app;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flowmap_config::Config;
use tokio_util::sync::CancellationToken;

/// flowmap - Flow aggregation pipeline
#[derive(Parser, Debug)]
#[command(name = "flowmap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flow record file, overrides `[source] path`
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides `[log] level`
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(input) = cli.input {
        config.source.path = Some(input);
    }

    logging::init(&config.log, cli.log_level.as_deref())?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, shutting down");
            signal_cancel.cancel();
        }
    });

    let summary = app::run(config, cancel).await?;
    summary.log();

    Ok(())
}
