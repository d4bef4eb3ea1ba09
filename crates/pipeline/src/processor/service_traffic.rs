//! Service traffic processor
//!
//! Emits one document per flow direction keyed by the responder's service
//! (destination address, port and protocol), so request and response volume
//! can be charted separately.

use flowmap_protocol::{Document, FlowPeer, FlowRecord};

use super::{MetricProcessor, flow_timestamp, protocol_name};

#[cfg(test)]
#[path = "service_traffic_test.rs"]
mod service_traffic_test;

/// Per-service, per-direction byte and packet volume
#[derive(Debug, Clone, Default)]
pub struct ServiceTrafficProcessor {
    skip_empty: bool,
}

impl ServiceTrafficProcessor {
    /// Create a processor that skips directions with no packets
    #[inline]
    pub const fn new() -> Self {
        Self { skip_empty: true }
    }

    /// Also emit documents for directions with no packets
    #[inline]
    pub const fn with_empty_directions(mut self) -> Self {
        self.skip_empty = false;
        self
    }

    fn direction(
        &self,
        flow: &FlowRecord,
        direction: &'static str,
        peer: &FlowPeer,
    ) -> Option<Document> {
        if self.skip_empty && peer.packet_count == 0 {
            return None;
        }

        Some(
            Document::new(flow_timestamp(flow))
                .with_tag("service_ip", flow.ip_dst.to_string())
                .with_tag("service_port", flow.port_dst.to_string())
                .with_tag("protocol", protocol_name(flow.protocol))
                .with_tag("direction", direction)
                .with_meter("bytes", peer.byte_count)
                .with_meter("packets", peer.packet_count),
        )
    }
}

impl MetricProcessor for ServiceTrafficProcessor {
    fn process(&mut self, flow: &FlowRecord, _force_flush: bool) -> Vec<Document> {
        [
            self.direction(flow, "request", &flow.peer_src),
            self.direction(flow, "response", &flow.peer_dst),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn name(&self) -> &str {
        "service_traffic"
    }
}
