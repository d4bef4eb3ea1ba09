//! Flowmap - Metrics
//!
//! Internal statistics collection and reporting.
//!
//! # Overview
//!
//! This crate provides:
//! - An atomic `Counter` for lock-free metric updates
//! - `CountableProvider`, the contract for named sources of per-interval
//!   counters (the flow handler's per-processor emit counts)
//! - `PipelineMetricsProvider`, cumulative pipeline-wide counters
//! - `StatsReporter`, a task that polls all registered providers on an
//!   interval and logs them as human-readable text or JSON
//!
//! # Handle Pattern
//!
//! Components keep their counters behind an `Arc` and hand out cloneable
//! handles implementing the provider traits. Registration is explicit: the
//! caller decides which handles the reporter polls.
//!
//! ```text
//! FlowHandler (owns Arc<EmitCounter>, Arc<PipelineMetrics>)
//!     │
//!     ├──► counter_handle() → CountableProvider
//!     ├──► metrics_handle() → PipelineMetricsProvider
//!     │
//!     └──► moved into the ingestion task [Arcs keep counters alive]
//!
//! StatsReporter::builder().countable(..).pipeline(..).build().run(cancel)
//! ```

mod collected;
pub mod format;
mod reporter;
mod traits;

pub use collected::{CollectedCountable, CollectedStats, PipelineRates, PipelineSnapshot};
pub use format::{HumanFormatter, JsonFormatter, StatsFormatter};
pub use reporter::{PipelineMetricsProvider, StatsReporter, StatsReporterBuilder};
pub use traits::{CountableProvider, StatItem};

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter wrapper for convenient metric operations
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment the counter by `val` (relaxed ordering for performance)
    #[inline]
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Increment the counter by 1
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Get the current value (relaxed ordering)
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Reset the counter to 0 and return the previous value
    #[inline]
    pub fn take(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}
