//! Countable provider contract
//!
//! A countable source exposes a fixed list of named counters. Each call to
//! `get_counter()` returns the values accumulated since the previous call and
//! starts a new interval, so a provider must be polled by a single reporter.

use serde::Serialize;

/// One named counter value in a countable report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatItem {
    /// Counter label, e.g. the metric processor name
    pub name: String,
    /// Count accumulated during the reported interval
    pub value: u64,
}

impl StatItem {
    /// Create a stat item
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Trait for components exposing per-interval counters
///
/// Implementations must keep the item order stable between calls so reports
/// line up across intervals.
pub trait CountableProvider: Send + Sync {
    /// Module name under which the counters are reported
    fn module(&self) -> &str;

    /// Counts since the previous call, then reset for the next interval
    fn get_counter(&self) -> Vec<StatItem>;
}
