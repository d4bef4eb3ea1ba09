//! Human-readable stats formatter
//!
//! # Example Output
//!
//! ```text
//! [stats] pipeline: 1.2K flows/s | 3.4K docs/s | invalid: 3 | dropped: 0 | flushes: 2 (1 overflow)
//! [stats] flow_mapper: flow_count=120 | perf=40
//! ```

use super::{StatsFormatter, format_count, format_rate};
use crate::{CollectedCountable, CollectedStats, PipelineRates, PipelineSnapshot};
use std::fmt::Write;

/// Human-readable stats formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }

    fn format_pipeline(&self, snapshot: &PipelineSnapshot, rates: Option<&PipelineRates>) -> String {
        match rates {
            Some(rates) => format!(
                "[stats] pipeline: {} flows | {} docs | invalid: {} | dropped: {} | flushes: {} ({} overflow)",
                format_rate(rates.flows_per_sec),
                format_rate(rates.documents_per_sec),
                rates.delta.flows_invalid,
                rates.delta.documents_dropped,
                rates.delta.flushes,
                rates.delta.overflow_flushes,
            ),
            None => format!(
                "[stats] pipeline: {} flows | {} docs | invalid: {} | dropped: {} (collecting baseline)",
                format_count(snapshot.flows_received),
                format_count(snapshot.documents_emitted),
                snapshot.flows_invalid,
                snapshot.documents_dropped,
            ),
        }
    }

    fn format_countable(&self, countable: &CollectedCountable) -> String {
        let mut output = format!("[stats] {}:", countable.module);

        if countable.items.is_empty() {
            output.push_str(" (none)");
            return output;
        }

        for (i, item) in countable.items.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }
            let _ = write!(output, " {}={}", item.name, item.value);
        }

        output
    }
}

impl StatsFormatter for HumanFormatter {
    fn format_stats(&self, stats: &CollectedStats, rates: Option<&PipelineRates>) -> String {
        let mut lines = Vec::with_capacity(1 + stats.countables.len());

        if let Some(ref snapshot) = stats.pipeline {
            lines.push(self.format_pipeline(snapshot, rates));
        }

        for countable in &stats.countables {
            lines.push(self.format_countable(countable));
        }

        lines.join("\n")
    }
}
