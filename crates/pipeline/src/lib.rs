//! flowmap - Pipeline
//!
//! The flow handler that turns flow records into batched metric documents.
//!
//! # Architecture
//!
//! ```text
//!                              ┌─→ processor 0 ─→ stash 0 ─┐
//! mpsc<FlowRecord> ─→ validate ┼─→ processor 1 ─→ stash 1 ─┼─→ flush ─→ mpsc<DocumentBatch>
//!                              └─→ processor N ─→ stash N ─┘   (queue_batch_size)
//! ```
//!
//! # Key Design
//!
//! - **Single writer**: the ingestion task owns the `FlowHandler`; stashes are
//!   never shared
//! - **Overflow flush**: a stash that cannot absorb a processor's output
//!   triggers a flush of every stash, then the residual is retried
//! - **Idle flush**: a timer in the ingestion `select!` flushes stashes once
//!   nothing has been processed for `idle_flush_threshold`
//! - **Non-blocking output**: `try_send`; full or closed queues drop and count
//! - **Explicit stats handles**: `counter_handle()` and `metrics_handle()` are
//!   registered with the stats reporter by the caller
//!
//! # Example
//!
//! ```ignore
//! use flowmap_config::PipelineConfig;
//! use flowmap_pipeline::{FlowHandler, IngestLoop, OutputHandle, default_processors};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = PipelineConfig::default();
//! let (out_tx, out_rx) = mpsc::channel(1000);
//! let handler = FlowHandler::new(default_processors(), OutputHandle::new("stdout", out_tx), &config);
//!
//! let (flow_tx, flow_rx) = mpsc::channel(config.input_queue_size);
//! let ingest = IngestLoop::new(handler, config.tick_interval);
//! tokio::spawn(ingest.run(flow_rx, CancellationToken::new()));
//! ```

mod counter;
mod error;
mod handler;
mod ingest;
mod metrics;
mod output;
mod processor;
mod stash;
mod validator;

pub use counter::{EMIT_COUNTER_MODULE, EmitCounter, EmitCounterHandle};
pub use error::{PipelineError, Result};
pub use handler::FlowHandler;
pub use ingest::IngestLoop;
pub use metrics::{BackpressureTracker, PipelineMetrics, PipelineMetricsHandle};
pub use output::{OutputHandle, PutSummary};
pub use processor::{
    FlowCountProcessor, MetricProcessor, ServiceTrafficProcessor, default_processors,
};
pub use stash::Stash;
pub use validator::{FlowValidator, Rejection};
