//! Flow pipeline configuration
//!
//! Buffer sizing, batch granularity and the timing constants that drive flow
//! validation and idle flushing.
//!
//! # Defaults
//!
//! - `docs_in_buffer`: 8192 documents per processor stash
//! - `window_size`: 60s per stash window
//! - `queue_batch_size`: 1024 documents per output put
//! - `window_margin`: 2m tolerance for flow timestamps
//! - `idle_flush_threshold`: 1m without activity before a tick flushes
//! - `tick_interval`: 1m between idle-flush checks
//! - `input_queue_size`: 10000 flow records

use serde::Deserialize;
use std::time::Duration;

/// Default stash capacity per processor
pub const DEFAULT_DOCS_IN_BUFFER: usize = 8192;

/// Default stash window
pub const DEFAULT_WINDOW_SIZE: Duration = Duration::from_secs(60);

/// Default number of documents per output put
pub const DEFAULT_QUEUE_BATCH_SIZE: usize = 1024;

/// Default tolerance between a flow's end and its activity timestamps
pub const DEFAULT_WINDOW_MARGIN: Duration = Duration::from_secs(2 * 60);

/// Default idle time before a tick forces a flush
pub const DEFAULT_IDLE_FLUSH_THRESHOLD: Duration = Duration::from_secs(60);

/// Default interval between idle-flush checks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Default input channel capacity
pub const DEFAULT_INPUT_QUEUE_SIZE: usize = 10_000;

/// Pipeline configuration
///
/// # Example
///
/// ```toml
/// [pipeline]
/// docs_in_buffer = 8192
/// window_size = "60s"
/// queue_batch_size = 1024
/// window_margin = "2m"
/// idle_flush_threshold = "1m"
/// tick_interval = "1m"
/// input_queue_size = 10000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum documents a processor stash holds before it overflows
    pub docs_in_buffer: usize,

    /// Maximum time span covered by the documents in one stash
    #[serde(with = "humantime_serde")]
    pub window_size: Duration,

    /// Documents per write to the output queue
    pub queue_batch_size: usize,

    /// Clock-skew tolerance applied when validating flow timestamps
    #[serde(with = "humantime_serde")]
    pub window_margin: Duration,

    /// Idle time after which a tick flushes partially filled stashes
    #[serde(with = "humantime_serde")]
    pub idle_flush_threshold: Duration,

    /// How often the ingestion loop checks for an idle flush
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,

    /// Capacity of the flow record channel feeding the pipeline
    pub input_queue_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            docs_in_buffer: DEFAULT_DOCS_IN_BUFFER,
            window_size: DEFAULT_WINDOW_SIZE,
            queue_batch_size: DEFAULT_QUEUE_BATCH_SIZE,
            window_margin: DEFAULT_WINDOW_MARGIN,
            idle_flush_threshold: DEFAULT_IDLE_FLUSH_THRESHOLD,
            tick_interval: DEFAULT_TICK_INTERVAL,
            input_queue_size: DEFAULT_INPUT_QUEUE_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Longest flow lifetime accepted by validation
    #[inline]
    pub fn max_flow_duration(&self) -> Duration {
        self.window_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.docs_in_buffer, 8192);
        assert_eq!(config.window_size, Duration::from_secs(60));
        assert_eq!(config.queue_batch_size, 1024);
        assert_eq!(config.window_margin, Duration::from_secs(120));
        assert_eq!(config.idle_flush_threshold, Duration::from_secs(60));
        assert_eq!(config.tick_interval, Duration::from_secs(60));
        assert_eq!(config.input_queue_size, 10_000);
    }

    #[test]
    fn test_max_flow_duration_matches_margin() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_flow_duration(), Duration::from_secs(120));
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
docs_in_buffer = 16
window_margin = "30s"
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.docs_in_buffer, 16);
        assert_eq!(config.window_margin, Duration::from_secs(30));
        assert_eq!(config.queue_batch_size, DEFAULT_QUEUE_BATCH_SIZE);
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
docs_in_buffer = 100
window_size = "10s"
queue_batch_size = 32
window_margin = "1m"
idle_flush_threshold = "5s"
tick_interval = "1s"
input_queue_size = 64
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.docs_in_buffer, 100);
        assert_eq!(config.window_size, Duration::from_secs(10));
        assert_eq!(config.queue_batch_size, 32);
        assert_eq!(config.window_margin, Duration::from_secs(60));
        assert_eq!(config.idle_flush_threshold, Duration::from_secs(5));
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.input_queue_size, 64);
    }
}
