//! Flowmap Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid configuration.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use flowmap_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[pipeline]\ndocs_in_buffer = 64").unwrap();
//! assert_eq!(config.pipeline.docs_in_buffer, 64);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [metrics]
//! interval = "60s"
//!
//! [pipeline]
//! docs_in_buffer = 8192
//! queue_batch_size = 1024
//! window_margin = "2m"
//!
//! [source]
//! path = "flows.jsonl"
//!
//! [output]
//! type = "stdout"
//! ```

mod error;
mod logging;
mod metrics;
mod output;
mod pipeline;
mod source;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use output::{OutputConfig, OutputFormat, OutputType};
pub use pipeline::{
    DEFAULT_DOCS_IN_BUFFER, DEFAULT_IDLE_FLUSH_THRESHOLD, DEFAULT_INPUT_QUEUE_SIZE,
    DEFAULT_QUEUE_BATCH_SIZE, DEFAULT_TICK_INTERVAL, DEFAULT_WINDOW_MARGIN, DEFAULT_WINDOW_SIZE,
    PipelineConfig,
};
pub use source::SourceConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Stats reporting configuration
    pub metrics: MetricsConfig,

    /// Stash sizing, batching and timing
    pub pipeline: PipelineConfig,

    /// Flow record input
    pub source: SourceConfig,

    /// Document output
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
