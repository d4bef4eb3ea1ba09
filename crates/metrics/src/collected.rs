//! Collected stats snapshot and rate calculations
//!
//! Holds everything one reporter tick gathered, plus rate calculation
//! against the previous tick.

use crate::StatItem;
use std::time::Instant;

/// Cumulative pipeline counters
///
/// Matches the fields of the flow handler's `PipelineMetrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineSnapshot {
    /// Flow records handed to the pipeline
    pub flows_received: u64,
    /// Flow records fanned out to the processors
    pub flows_processed: u64,
    /// Flow records rejected by timestamp validation
    pub flows_invalid: u64,
    /// Documents written to the output queue
    pub documents_emitted: u64,
    /// Documents lost to a full or closed output queue
    pub documents_dropped: u64,
    /// Batches written to the output queue
    pub batches_written: u64,
    /// Batches lost to a full or closed output queue
    pub batches_dropped: u64,
    /// Flushes of all stashes
    pub flushes: u64,
    /// Flushes forced by a stash overflow
    pub overflow_flushes: u64,
}

impl PipelineSnapshot {
    /// Counter differences against an earlier snapshot
    pub fn diff(&self, previous: &PipelineSnapshot) -> PipelineSnapshot {
        PipelineSnapshot {
            flows_received: self.flows_received.saturating_sub(previous.flows_received),
            flows_processed: self.flows_processed.saturating_sub(previous.flows_processed),
            flows_invalid: self.flows_invalid.saturating_sub(previous.flows_invalid),
            documents_emitted: self
                .documents_emitted
                .saturating_sub(previous.documents_emitted),
            documents_dropped: self
                .documents_dropped
                .saturating_sub(previous.documents_dropped),
            batches_written: self.batches_written.saturating_sub(previous.batches_written),
            batches_dropped: self.batches_dropped.saturating_sub(previous.batches_dropped),
            flushes: self.flushes.saturating_sub(previous.flushes),
            overflow_flushes: self
                .overflow_flushes
                .saturating_sub(previous.overflow_flushes),
        }
    }
}

/// Counters returned by one countable provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedCountable {
    /// Provider module name
    pub module: String,
    /// Per-interval counter values
    pub items: Vec<StatItem>,
}

impl CollectedCountable {
    /// Sum of all counter values
    pub fn total(&self) -> u64 {
        self.items.iter().map(|i| i.value).sum()
    }
}

/// Everything collected in one reporter tick
#[derive(Debug, Clone, Default)]
pub struct CollectedStats {
    /// When this collection was taken
    pub timestamp: Option<Instant>,

    /// Pipeline-wide counters
    pub pipeline: Option<PipelineSnapshot>,

    /// Per-interval counters from every countable provider
    pub countables: Vec<CollectedCountable>,
}

/// Pipeline throughput between two collections
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineRates {
    /// Flow records per second
    pub flows_per_sec: f64,
    /// Documents emitted per second
    pub documents_per_sec: f64,
    /// Counter changes over the interval
    pub delta: PipelineSnapshot,
}

impl CollectedStats {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self {
            timestamp: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Calculate pipeline rates by comparing with a previous collection
    ///
    /// Returns None if either side lacks a timestamp or pipeline snapshot, or
    /// no time has elapsed.
    pub fn rates(&self, previous: &CollectedStats) -> Option<PipelineRates> {
        let current_ts = self.timestamp?;
        let previous_ts = previous.timestamp?;

        let elapsed = current_ts.duration_since(previous_ts);
        if elapsed.is_zero() {
            return None;
        }
        let elapsed_secs = elapsed.as_secs_f64();

        let current = self.pipeline.as_ref()?;
        let prev = previous.pipeline.as_ref()?;
        let delta = current.diff(prev);

        Some(PipelineRates {
            flows_per_sec: delta.flows_received as f64 / elapsed_secs,
            documents_per_sec: delta.documents_emitted as f64 / elapsed_secs,
            delta,
        })
    }
}
