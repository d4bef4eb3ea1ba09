//! Flow count processor
//!
//! Emits one document per flow, tagged by protocol, counting flows, bytes and
//! packets. Documents for the same protocol and second merge in the stash.

use flowmap_protocol::{Document, FlowRecord};

use super::{MetricProcessor, flow_timestamp, protocol_name};

#[cfg(test)]
#[path = "flow_count_test.rs"]
mod flow_count_test;

/// Per-protocol flow, byte and packet counts
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowCountProcessor {
    flows_seen: u64,
}

impl FlowCountProcessor {
    /// Create a new flow count processor
    #[inline]
    pub const fn new() -> Self {
        Self { flows_seen: 0 }
    }

    /// Flows seen since `prepare`
    #[inline]
    pub fn flows_seen(&self) -> u64 {
        self.flows_seen
    }
}

impl MetricProcessor for FlowCountProcessor {
    fn prepare(&mut self) {
        self.flows_seen = 0;
    }

    fn process(&mut self, flow: &FlowRecord, _force_flush: bool) -> Vec<Document> {
        self.flows_seen += 1;

        let doc = Document::new(flow_timestamp(flow))
            .with_tag("protocol", protocol_name(flow.protocol))
            .with_meter("flows", 1)
            .with_meter("closed_flows", u64::from(flow.is_closed()))
            .with_meter("bytes", flow.total_bytes())
            .with_meter("packets", flow.total_packets());

        vec![doc]
    }

    fn name(&self) -> &str {
        "flow_count"
    }
}
