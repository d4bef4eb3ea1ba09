//! Output document types
//!
//! A `Document` is what a metric processor emits for a flow. The pipeline
//! never looks inside one except to merge documents of the same series while
//! they sit in a stash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Documents written to the output queue in a single put
pub type DocumentBatch = Vec<Document>;

/// A tagged set of meters at a point in time
///
/// Two documents belong to the same series when their timestamp and tags are
/// equal. Documents of the same series can be merged by summing their meters.
///
/// # Example
///
/// ```
/// use flowmap_protocol::Document;
///
/// let mut a = Document::new(60).with_tag("proto", "tcp").with_meter("bytes", 100);
/// let b = Document::new(60).with_tag("proto", "tcp").with_meter("bytes", 50);
///
/// assert!(a.same_series(&b));
/// a.merge(&b);
/// assert_eq!(a.meter("bytes"), Some(150));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Seconds since the UNIX epoch
    pub timestamp: u32,

    /// Series identity
    pub tags: BTreeMap<String, String>,

    /// Counters accumulated for the series
    pub meters: BTreeMap<String, u64>,
}

impl Document {
    /// Create an empty document at `timestamp` (seconds)
    pub fn new(timestamp: u32) -> Self {
        Self {
            timestamp,
            tags: BTreeMap::new(),
            meters: BTreeMap::new(),
        }
    }

    /// Add or replace a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add or replace a meter
    pub fn with_meter(mut self, key: impl Into<String>, value: u64) -> Self {
        self.meters.insert(key.into(), value);
        self
    }

    /// Get a tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Get a meter value
    pub fn meter(&self, key: &str) -> Option<u64> {
        self.meters.get(key).copied()
    }

    /// Whether `other` describes the same series at the same time
    #[inline]
    pub fn same_series(&self, other: &Document) -> bool {
        self.timestamp == other.timestamp && self.tags == other.tags
    }

    /// Fold `other`'s meters into this document
    ///
    /// Meters missing here are inserted; existing ones are summed, saturating
    /// at `u64::MAX`. Tags and timestamp are left untouched, so callers should
    /// check [`same_series`](Self::same_series) first.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in &other.meters {
            let slot = self.meters.entry(key.clone()).or_insert(0);
            *slot = slot.saturating_add(*value);
        }
    }
}
