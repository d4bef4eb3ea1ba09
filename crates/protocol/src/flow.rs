//! Flow record types
//!
//! A `FlowRecord` summarizes one bidirectional conversation as observed by the
//! capture layer. The pipeline only inspects its timestamps; the remaining
//! fields are carried for the metric processors.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-direction flow statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowPeer {
    /// Arrival time of the last packet seen in this direction
    #[serde(with = "crate::nanos")]
    pub arr_time_last: Duration,

    /// Bytes sent in this direction
    pub byte_count: u64,

    /// Packets sent in this direction
    pub packet_count: u64,
}

/// A completed or in-progress bidirectional flow observation
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use flowmap_protocol::FlowRecord;
///
/// let flow = FlowRecord {
///     start_time: Duration::from_secs(10),
///     end_time: Duration::from_secs(11),
///     ..Default::default()
/// };
/// assert!(flow.is_closed());
/// assert_eq!(flow.duration(), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowRecord {
    /// Capture-layer identifier of the flow
    pub flow_id: u64,

    /// Source address (initiator side)
    pub ip_src: IpAddr,

    /// Destination address (responder side)
    pub ip_dst: IpAddr,

    /// Source port, zero for portless protocols
    pub port_src: u16,

    /// Destination port, zero for portless protocols
    pub port_dst: u16,

    /// IP protocol number (6 = TCP, 17 = UDP, ...)
    pub protocol: u8,

    /// When the flow started
    #[serde(with = "crate::nanos")]
    pub start_time: Duration,

    /// When the flow ended, zero while the flow is still open
    #[serde(with = "crate::nanos")]
    pub end_time: Duration,

    /// Start of the aggregation window this record covers
    #[serde(with = "crate::nanos")]
    pub cur_start_time: Duration,

    /// Source-to-destination direction
    pub peer_src: FlowPeer,

    /// Destination-to-source direction
    pub peer_dst: FlowPeer,
}

impl Default for FlowRecord {
    fn default() -> Self {
        Self {
            flow_id: 0,
            ip_src: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            ip_dst: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port_src: 0,
            port_dst: 0,
            protocol: 0,
            start_time: Duration::ZERO,
            end_time: Duration::ZERO,
            cur_start_time: Duration::ZERO,
            peer_src: FlowPeer::default(),
            peer_dst: FlowPeer::default(),
        }
    }
}

impl FlowRecord {
    /// Whether the capture layer has closed this flow
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.end_time.is_zero()
    }

    /// Flow lifetime, `None` while open or when the interval is reversed
    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        if !self.is_closed() {
            return None;
        }
        self.end_time.checked_sub(self.start_time)
    }

    /// Bytes in both directions
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.peer_src
            .byte_count
            .saturating_add(self.peer_dst.byte_count)
    }

    /// Packets in both directions
    #[inline]
    pub fn total_packets(&self) -> u64 {
        self.peer_src
            .packet_count
            .saturating_add(self.peer_dst.packet_count)
    }

    /// Latest activity timestamp in either direction
    #[inline]
    pub fn last_arrival(&self) -> Duration {
        self.peer_src.arr_time_last.max(self.peer_dst.arr_time_last)
    }
}
