//! Flow handler metrics
//!
//! Atomic counters for tracking pipeline throughput and drops.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flowmap_metrics::{PipelineMetricsProvider, PipelineSnapshot};

use crate::output::PutSummary;

/// Cumulative counters for the flow handler
///
/// Written by the ingestion task, read by the stats reporter through a
/// [`PipelineMetricsHandle`].
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Flow records handed to `process`
    flows_received: AtomicU64,

    /// Flow records that passed validation
    flows_processed: AtomicU64,

    /// Flow records rejected by validation
    flows_invalid: AtomicU64,

    /// Documents accepted by the output queue
    documents_emitted: AtomicU64,

    /// Documents lost to a full or closed output queue
    documents_dropped: AtomicU64,

    /// Batches accepted by the output queue
    batches_written: AtomicU64,

    /// Batches lost to a full or closed output queue
    batches_dropped: AtomicU64,

    /// Full flushes of every stash
    flushes: AtomicU64,

    /// Flushes forced by a stash that could not absorb a processor's output
    overflow_flushes: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            flows_received: AtomicU64::new(0),
            flows_processed: AtomicU64::new(0),
            flows_invalid: AtomicU64::new(0),
            documents_emitted: AtomicU64::new(0),
            documents_dropped: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            overflow_flushes: AtomicU64::new(0),
        }
    }

    /// Record a flow entering `process`
    #[inline]
    pub fn record_received(&self) {
        self.flows_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flow that passed validation
    #[inline]
    pub fn record_processed(&self) {
        self.flows_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flow rejected by validation
    #[inline]
    pub fn record_invalid(&self) {
        self.flows_invalid.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of writing one stash to the output queue
    #[inline]
    pub fn record_put(&self, summary: &PutSummary) {
        self.documents_emitted
            .fetch_add(summary.documents_written, Ordering::Relaxed);
        self.batches_written
            .fetch_add(summary.batches_written, Ordering::Relaxed);
        self.documents_dropped
            .fetch_add(summary.documents_dropped, Ordering::Relaxed);
        self.batches_dropped
            .fetch_add(summary.batches_dropped, Ordering::Relaxed);
    }

    /// Record a full flush
    #[inline]
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flush forced by stash overflow
    #[inline]
    pub fn record_overflow_flush(&self) {
        self.overflow_flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    #[inline]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            flows_received: self.flows_received.load(Ordering::Relaxed),
            flows_processed: self.flows_processed.load(Ordering::Relaxed),
            flows_invalid: self.flows_invalid.load(Ordering::Relaxed),
            documents_emitted: self.documents_emitted.load(Ordering::Relaxed),
            documents_dropped: self.documents_dropped.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            overflow_flushes: self.overflow_flushes.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable handle exposing [`PipelineMetrics`] to the stats reporter
#[derive(Debug, Clone)]
pub struct PipelineMetricsHandle {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMetricsHandle {
    pub(crate) fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    /// Get a snapshot of the pipeline counters
    #[inline]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}

impl PipelineMetricsProvider for PipelineMetricsHandle {
    fn pipeline_snapshot(&self) -> PipelineSnapshot {
        self.metrics.snapshot()
    }
}

// ============================================================================
// Backpressure Tracker - Rate-limited logging for production visibility
// ============================================================================

/// Rate-limited logging of output queue drops
///
/// Aggregates drop events and logs a summary at most once per second instead
/// of once per dropped batch.
///
/// # Thresholds
///
/// - >0 drops/sec: WARN level
/// - >100 drops/sec: ERROR level (the sink cannot keep up)
pub struct BackpressureTracker {
    /// Batches dropped in current interval
    interval_drops: AtomicU64,
    /// Documents dropped in current interval
    interval_documents: AtomicU64,
    /// Last log time (epoch milliseconds)
    last_log_ms: AtomicU64,
}

/// Log interval in milliseconds
const LOG_INTERVAL_MS: u64 = 1000;
/// Critical threshold - drops/sec that triggers ERROR level
const CRITICAL_DROP_THRESHOLD: u64 = 100;

impl BackpressureTracker {
    /// Create a new tracker
    pub fn new() -> Self {
        Self {
            interval_drops: AtomicU64::new(0),
            interval_documents: AtomicU64::new(0),
            last_log_ms: AtomicU64::new(Self::now_ms()),
        }
    }

    /// Record dropped batches and log if the interval elapsed
    ///
    /// Returns true if a log was emitted.
    pub fn record_drop(&self, batches: u64, documents: u64) -> bool {
        self.interval_drops.fetch_add(batches, Ordering::Relaxed);
        self.interval_documents
            .fetch_add(documents, Ordering::Relaxed);

        self.maybe_log()
    }

    fn maybe_log(&self) -> bool {
        let now = Self::now_ms();
        let last = self.last_log_ms.load(Ordering::Relaxed);

        if now.saturating_sub(last) < LOG_INTERVAL_MS {
            return false;
        }

        if self
            .last_log_ms
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        let drops = self.interval_drops.swap(0, Ordering::Relaxed);
        let documents = self.interval_documents.swap(0, Ordering::Relaxed);

        if drops == 0 {
            return false;
        }

        if drops > CRITICAL_DROP_THRESHOLD {
            tracing::error!(
                dropped_batches = drops,
                dropped_documents = documents,
                threshold = CRITICAL_DROP_THRESHOLD,
                "CRITICAL: high backpressure - output queue cannot keep up"
            );
        } else {
            tracing::warn!(
                dropped_batches = drops,
                dropped_documents = documents,
                "backpressure: document batches dropped in last second"
            );
        }

        true
    }

    #[inline]
    fn now_ms() -> u64 {
        flowmap_protocol::unix_now().as_millis() as u64
    }

    /// Get the current drop count (for testing)
    #[cfg(test)]
    pub fn current_drops(&self) -> u64 {
        self.interval_drops.load(Ordering::Relaxed)
    }
}

impl Default for BackpressureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BackpressureTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackpressureTracker")
            .field(
                "interval_drops",
                &self.interval_drops.load(Ordering::Relaxed),
            )
            .field(
                "interval_documents",
                &self.interval_documents.load(Ordering::Relaxed),
            )
            .finish()
    }
}
