//! Source metrics
//!
//! Cumulative totals plus interval counters that reset when the stats
//! reporter polls the handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flowmap_metrics::{CountableProvider, Counter, StatItem};

/// Metrics shared by all source types
#[derive(Debug, Default)]
pub struct SourceMetrics {
    /// Non-empty lines read
    lines_read: AtomicU64,

    /// Bytes read, newlines included
    bytes_read: AtomicU64,

    /// Flow records handed to the pipeline
    flows_sent: AtomicU64,

    /// Lines that failed to parse
    parse_errors: AtomicU64,

    interval_flows: Counter,
    interval_errors: Counter,
}

impl SourceMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line read
    #[inline]
    pub fn line_read(&self, bytes: u64) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a flow sent to the pipeline
    #[inline]
    pub fn flow_sent(&self) {
        self.flows_sent.fetch_add(1, Ordering::Relaxed);
        self.interval_flows.inc();
    }

    /// Record a malformed line
    #[inline]
    pub fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        self.interval_errors.inc();
    }

    /// Get snapshot of cumulative metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            flows_sent: self.flows_sent.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of source metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub bytes_read: u64,
    pub flows_sent: u64,
    pub parse_errors: u64,
}

/// Handle for reporting source metrics under the module `source:<name>`
#[derive(Debug, Clone)]
pub struct SourceMetricsHandle {
    module: String,
    metrics: Arc<SourceMetrics>,
}

impl SourceMetricsHandle {
    pub(crate) fn new(name: &str, metrics: Arc<SourceMetrics>) -> Self {
        Self {
            module: format!("source:{}", name),
            metrics,
        }
    }

    /// Cumulative metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl CountableProvider for SourceMetricsHandle {
    fn module(&self) -> &str {
        &self.module
    }

    fn get_counter(&self) -> Vec<StatItem> {
        vec![
            StatItem::new("flows", self.metrics.interval_flows.take()),
            StatItem::new("parse_errors", self.metrics.interval_errors.take()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = SourceMetrics::new();
        metrics.line_read(100);
        metrics.line_read(50);
        metrics.flow_sent();
        metrics.parse_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.lines_read, 2);
        assert_eq!(snapshot.bytes_read, 150);
        assert_eq!(snapshot.flows_sent, 1);
        assert_eq!(snapshot.parse_errors, 1);
    }

    #[test]
    fn test_handle_interval_counts() {
        let metrics = Arc::new(SourceMetrics::new());
        let handle = SourceMetricsHandle::new("jsonl", Arc::clone(&metrics));
        assert_eq!(handle.module(), "source:jsonl");

        metrics.flow_sent();
        metrics.flow_sent();
        assert_eq!(handle.get_counter()[0], StatItem::new("flows", 2));
        assert_eq!(handle.get_counter()[0].value, 0);
        assert_eq!(handle.snapshot().flows_sent, 2);
    }
}
