//! flowmap - Sinks
//!
//! Consumers of the pipeline's output queue.
//!
//! # Architecture
//!
//! Each sink receives `DocumentBatch` values over a tokio channel and writes
//! them to its destination.
//!
//! ```text
//! [FlowHandler] --DocumentBatch--> [Output Channel] --> [Sink Task] --> [Destination]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `null` | Benchmarking (discard all) |
//! | `stdout` | JSON or text lines |
//!
//! # Example
//!
//! ```ignore
//! use flowmap_sinks::StdoutSink;
//! use flowmap_pipeline::OutputHandle;
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1000);
//! let output = OutputHandle::new("stdout", tx);
//! tokio::spawn(StdoutSink::new(rx).run());
//! ```

/// Null sink - discards all documents
pub mod null;

/// Stdout sink - one line per document
pub mod stdout;

/// Common types shared by all sinks (errors, metrics)
mod common;

pub use common::{MetricsSnapshot, Result, SinkError, SinkMetrics, SinkMetricsHandle};
pub use null::NullSink;
pub use stdout::{StdoutConfig, StdoutSink};
