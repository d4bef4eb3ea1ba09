//! Stats reporting configuration
//!
//! Controls how often the stats reporter polls the pipeline's countable
//! sources and in which format it logs them.

use serde::Deserialize;
use std::time::Duration;

/// Metrics output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON structured output
    Json,
}

/// Metrics configuration
///
/// # Example
///
/// ```toml
/// [metrics]
/// enabled = true
/// interval = "60s"
/// format = "human"
/// include_pipeline = true
/// include_processors = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable stats reporting
    /// Default: true
    pub enabled: bool,

    /// Polling interval
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Output format (human, json)
    /// Default: human
    pub format: MetricsFormat,

    /// Include pipeline-wide counters (flows, drops, flushes)
    pub include_pipeline: bool,

    /// Include per-processor emit counters
    pub include_processors: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            format: MetricsFormat::Human,
            include_pipeline: true,
            include_processors: true,
        }
    }
}
