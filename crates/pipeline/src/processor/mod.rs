//! Metric processors
//!
//! A metric processor turns one flow record into zero or more documents. The
//! flow handler calls every registered processor for every valid flow, in
//! registration order, and buffers the output in that processor's stash.
//!
//! Processors own their aggregation state and are only ever driven by the
//! ingestion task, so they need `Send` but not `Sync`.

mod flow_count;
mod service_traffic;

pub use flow_count::FlowCountProcessor;
pub use service_traffic::ServiceTrafficProcessor;

use std::time::Duration;

use flowmap_protocol::{Document, FlowRecord};

/// Trait for flow-to-document processors
pub trait MetricProcessor: Send {
    /// Reset internal state before the first `process` call
    ///
    /// Called once by the flow handler at construction.
    fn prepare(&mut self) {}

    /// Produce documents for `flow`
    ///
    /// `force_flush` asks a processor that aggregates across calls to return
    /// whatever it is holding.
    fn process(&mut self, flow: &FlowRecord, force_flush: bool) -> Vec<Document>;

    /// Name used for emit counters and logs
    fn name(&self) -> &str;
}

/// Built-in processor set used by the `flowmap` binary
pub fn default_processors() -> Vec<Box<dyn MetricProcessor>> {
    vec![
        Box::new(FlowCountProcessor::new()),
        Box::new(ServiceTrafficProcessor::new()),
    ]
}

/// Document timestamp for `flow`, in seconds
///
/// Uses the current window start when the capture layer set one.
pub(crate) fn flow_timestamp(flow: &FlowRecord) -> u32 {
    let at = if flow.cur_start_time.is_zero() {
        flow.start_time
    } else {
        flow.cur_start_time
    };
    secs_u32(at)
}

#[inline]
fn secs_u32(at: Duration) -> u32 {
    u32::try_from(at.as_secs()).unwrap_or(u32::MAX)
}

/// Common IANA protocol names, falling back to the number
pub(crate) fn protocol_name(protocol: u8) -> String {
    match protocol {
        1 => "icmp".into(),
        6 => "tcp".into(),
        17 => "udp".into(),
        58 => "icmpv6".into(),
        132 => "sctp".into(),
        other => other.to_string(),
    }
}
