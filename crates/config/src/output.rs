//! Output configuration
//!
//! Selects the consumer of the pipeline's output queue.

use serde::Deserialize;

/// Built-in output sink types
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// One JSON document per line on stdout (default)
    #[default]
    Stdout,
    /// Discard documents, count only
    Null,
}

impl OutputType {
    /// Sink name used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Null => "null",
        }
    }
}

/// Line format of the stdout sink
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per document (default)
    #[default]
    Json,
    /// `timestamp tags meters` on one line, for terminals
    Text,
}

/// Output configuration
///
/// # Example
///
/// ```toml
/// [output]
/// type = "stdout"
/// format = "json"
/// queue_size = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Sink consuming document batches
    #[serde(rename = "type")]
    pub output_type: OutputType,

    /// Line format for the stdout sink
    pub format: OutputFormat,

    /// Capacity of the document batch channel (in batches)
    pub queue_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_type: OutputType::Stdout,
            format: OutputFormat::Json,
            queue_size: 1000,
        }
    }
}
