//! JSON stats formatter
//!
//! # Example Output
//!
//! ```json
//! {
//!   "type": "stats",
//!   "pipeline": {"flows_received": 1200, "flows_per_sec": 20, ...},
//!   "countables": [{"module": "flow_mapper", "counters": [{"name": "flow_count", "value": 120}]}]
//! }
//! ```

use super::StatsFormatter;
use crate::{CollectedStats, PipelineRates, PipelineSnapshot, StatItem};
use serde::Serialize;

/// JSON stats formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct StatsJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<PipelineJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    countables: Vec<CountableJson<'a>>,
}

#[derive(Serialize)]
struct PipelineJson<'a> {
    #[serde(flatten)]
    totals: &'a PipelineSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    flows_per_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents_per_sec: Option<u64>,
}

#[derive(Serialize)]
struct CountableJson<'a> {
    module: &'a str,
    counters: &'a [StatItem],
}

impl StatsFormatter for JsonFormatter {
    fn format_stats(&self, stats: &CollectedStats, rates: Option<&PipelineRates>) -> String {
        let json = StatsJson {
            report_type: "stats",
            pipeline: stats.pipeline.as_ref().map(|totals| PipelineJson {
                totals,
                flows_per_sec: rates.map(|r| r.flows_per_sec as u64),
                documents_per_sec: rates.map(|r| r.documents_per_sec as u64),
            }),
            countables: stats
                .countables
                .iter()
                .map(|c| CountableJson {
                    module: &c.module,
                    counters: &c.items,
                })
                .collect(),
        };

        serde_json::to_string(&json)
            .unwrap_or_else(|e| format!(r#"{{"type":"stats","error":"{}"}}"#, e))
    }
}
