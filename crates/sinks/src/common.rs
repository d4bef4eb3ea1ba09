//! Common types shared by all sinks
//!
//! Errors and the metrics every sink keeps about the batches it drains.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flowmap_metrics::{CountableProvider, Counter, StatItem};
use thiserror::Error;

/// Common sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Metrics shared by all sink types
///
/// Cumulative totals are atomics; the interval counters back the
/// `CountableProvider` view and reset each time the stats reporter polls.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total batches received
    batches_received: AtomicU64,

    /// Total documents written
    documents_written: AtomicU64,

    /// Total bytes written
    bytes_written: AtomicU64,

    /// Write errors encountered
    write_errors: AtomicU64,

    interval_documents: Counter,
    interval_bytes: Counter,
    interval_errors: Counter,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch written in full
    #[inline]
    pub fn batch_written(&self, document_count: u64, bytes: u64) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
        self.documents_written
            .fetch_add(document_count, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.interval_documents.add(document_count);
        self.interval_bytes.add(bytes);
    }

    /// Record a batch that failed to write
    #[inline]
    pub fn write_error(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
        self.write_errors.fetch_add(1, Ordering::Relaxed);
        self.interval_errors.inc();
    }

    /// Get snapshot of cumulative metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            documents_written: self.documents_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }

    fn take_interval(&self) -> Vec<StatItem> {
        vec![
            StatItem::new("documents", self.interval_documents.take()),
            StatItem::new("bytes", self.interval_bytes.take()),
            StatItem::new("write_errors", self.interval_errors.take()),
        ]
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_received: u64,
    pub documents_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
}

/// Handle for reporting sink metrics
///
/// Holds an Arc to the metrics, so it remains valid after `run()` consumes
/// the sink. Reported under the module `sink:<name>`.
#[derive(Debug, Clone)]
pub struct SinkMetricsHandle {
    module: String,
    metrics: Arc<SinkMetrics>,
}

impl SinkMetricsHandle {
    pub(crate) fn new(name: &str, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            module: format!("sink:{}", name),
            metrics,
        }
    }

    /// Cumulative metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl CountableProvider for SinkMetricsHandle {
    fn module(&self) -> &str {
        &self.module
    }

    fn get_counter(&self) -> Vec<StatItem> {
        self.metrics.take_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_batch_written() {
        let metrics = SinkMetrics::new();

        metrics.batch_written(100, 5000);
        metrics.batch_written(200, 10000);
        metrics.write_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_received, 3);
        assert_eq!(snapshot.documents_written, 300);
        assert_eq!(snapshot.bytes_written, 15000);
        assert_eq!(snapshot.write_errors, 1);
    }

    #[test]
    fn test_handle_reports_interval_counts() {
        let metrics = Arc::new(SinkMetrics::new());
        let handle = SinkMetricsHandle::new("stdout", Arc::clone(&metrics));
        assert_eq!(handle.module(), "sink:stdout");

        metrics.batch_written(3, 90);
        let items = handle.get_counter();
        assert_eq!(items[0], StatItem::new("documents", 3));
        assert_eq!(items[1], StatItem::new("bytes", 90));
        assert_eq!(items[2], StatItem::new("write_errors", 0));

        // Interval resets, totals do not
        assert_eq!(handle.get_counter()[0].value, 0);
        assert_eq!(handle.snapshot().documents_written, 3);
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::from(std::io::Error::other("broken pipe"));
        assert!(err.to_string().contains("broken pipe"));
    }
}
