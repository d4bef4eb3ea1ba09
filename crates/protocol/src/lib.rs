//! Flowmap Protocol - Core types for the flow aggregation pipeline
//!
//! This crate provides the values exchanged between the pipeline and its
//! collaborators:
//! - `FlowRecord` - A bidirectional flow observation handed in by the capture layer
//! - `FlowPeer` - Per-direction counters and activity timestamps
//! - `Document` - An output unit produced by a metric processor
//! - `DocumentBatch` - A slice of documents written to the output queue in one put
//!
//! # Time Representation
//!
//! Flow timestamps are `Duration`s since the UNIX epoch with nanosecond
//! precision. On the JSON wire they are plain integer nanoseconds, see
//! [`nanos`]. A zero `end_time` means the flow is still open.

mod document;
mod flow;
pub mod nanos;

pub use document::{Document, DocumentBatch};
pub use flow::{FlowPeer, FlowRecord};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall clock as a duration since the UNIX epoch
///
/// Returns zero if the system clock is set before the epoch.
#[inline]
pub fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
