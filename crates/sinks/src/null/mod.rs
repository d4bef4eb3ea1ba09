//! Null sink - discards all documents
//!
//! Drains the output queue, updates metrics, and drops every batch. Used to
//! measure the pipeline without output cost.
//!
//! # Example
//!
//! ```ignore
//! use flowmap_sinks::NullSink;
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1000);
//! let sink = NullSink::new(rx);
//!
//! // Hand tx to the flow handler's OutputHandle, then run the sink
//! sink.run().await;
//! ```

use std::sync::Arc;

use flowmap_protocol::{Document, DocumentBatch};
use tokio::sync::mpsc;

use crate::common::{MetricsSnapshot, SinkMetrics, SinkMetricsHandle};

/// Null sink that discards all received batches
pub struct NullSink {
    /// Sink name for logs and metrics
    name: String,

    /// Channel receiver for incoming batches
    receiver: mpsc::Receiver<DocumentBatch>,

    /// Metrics for this sink (Arc for sharing with metrics handle)
    metrics: Arc<SinkMetrics>,
}

impl NullSink {
    /// Create a new null sink with the given receiver
    pub fn new(receiver: mpsc::Receiver<DocumentBatch>) -> Self {
        Self::with_name(receiver, "null")
    }

    /// Create a new null sink with a custom name
    pub fn with_name(receiver: mpsc::Receiver<DocumentBatch>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Get reference to metrics
    #[inline]
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> SinkMetricsHandle {
        SinkMetricsHandle::new(&self.name, Arc::clone(&self.metrics))
    }

    /// Get the sink name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the sink, consuming batches until the channel closes
    ///
    /// Returns the final metrics snapshot.
    pub async fn run(self) -> MetricsSnapshot {
        self.run_with_callback(|_| {}).await
    }

    /// Run the sink with a callback for each batch
    ///
    /// Useful for testing or custom processing before discard.
    pub async fn run_with_callback<F>(mut self, mut callback: F) -> MetricsSnapshot
    where
        F: FnMut(&[Document]),
    {
        tracing::info!(sink = %self.name, "null sink starting");

        while let Some(batch) = self.receiver.recv().await {
            callback(&batch);
            self.metrics.batch_written(batch.len() as u64, 0);
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            batches = snapshot.batches_received,
            documents = snapshot.documents_written,
            "null sink shutting down"
        );

        snapshot
    }
}
