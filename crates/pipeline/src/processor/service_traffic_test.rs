//! Tests for ServiceTrafficProcessor

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use super::*;

fn dns_flow(response_packets: u64) -> FlowRecord {
    FlowRecord {
        ip_src: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
        ip_dst: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 53)),
        port_src: 40_000,
        port_dst: 53,
        protocol: 17,
        start_time: Duration::from_secs(2_000),
        end_time: Duration::from_secs(2_001),
        peer_src: FlowPeer {
            byte_count: 64,
            packet_count: 1,
            ..Default::default()
        },
        peer_dst: FlowPeer {
            byte_count: 128 * response_packets,
            packet_count: response_packets,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_emits_both_directions() {
    let mut processor = ServiceTrafficProcessor::new();
    let docs = processor.process(&dns_flow(1), false);

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].tag("direction"), Some("request"));
    assert_eq!(docs[0].tag("service_ip"), Some("10.0.0.53"));
    assert_eq!(docs[0].tag("service_port"), Some("53"));
    assert_eq!(docs[0].tag("protocol"), Some("udp"));
    assert_eq!(docs[0].meter("bytes"), Some(64));

    assert_eq!(docs[1].tag("direction"), Some("response"));
    assert_eq!(docs[1].meter("bytes"), Some(128));
    assert_eq!(docs[1].meter("packets"), Some(1));
}

#[test]
fn test_skips_silent_direction() {
    let mut processor = ServiceTrafficProcessor::new();
    let docs = processor.process(&dns_flow(0), false);

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].tag("direction"), Some("request"));
}

#[test]
fn test_with_empty_directions() {
    let mut processor = ServiceTrafficProcessor::new().with_empty_directions();
    let docs = processor.process(&dns_flow(0), false);

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].meter("packets"), Some(0));
}

#[test]
fn test_service_traffic_name() {
    assert_eq!(ServiceTrafficProcessor::new().name(), "service_traffic");
}
