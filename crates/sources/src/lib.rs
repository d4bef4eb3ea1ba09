//! flowmap - Sources
//!
//! Sources that read flow records and feed them to the pipeline's input queue.
//!
//! # Available Sources
//!
//! - **JSONL** - newline-delimited JSON flow records from a file or stdin
//!
//! # Example
//!
//! ```ignore
//! use flowmap_config::SourceConfig;
//! use flowmap_sources::JsonlFlowSource;
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! let (flow_tx, flow_rx) = mpsc::channel(10_000);
//! let source = JsonlFlowSource::new(SourceConfig::default(), flow_tx);
//! source.run(CancellationToken::new()).await?;
//! ```

pub mod jsonl;

mod common;
mod error;

pub use common::{MetricsSnapshot, SourceMetrics, SourceMetricsHandle};
pub use error::{Result, SourceError};
pub use jsonl::{JsonlFlowSource, MAX_JSON_DEPTH, MAX_LINE_BYTES};
