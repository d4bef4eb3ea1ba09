//! JSONL source tests

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use flowmap_config::SourceConfig;
use flowmap_metrics::CountableProvider;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::*;

const DNS_LINE: &str = r#"{"flow_id":1,"ip_src":"10.0.0.7","ip_dst":"10.0.0.53","port_src":40000,"port_dst":53,"protocol":17,"start_time":1700000000000000000,"end_time":1700000001000000000,"peer_src":{"arr_time_last":1700000000500000000,"byte_count":64,"packet_count":1}}"#;

fn source(continue_on_error: bool, capacity: usize) -> (JsonlFlowSource, mpsc::Receiver<FlowRecord>) {
    let (tx, rx) = mpsc::channel(capacity);
    let config = SourceConfig {
        path: None,
        continue_on_error,
    };
    (JsonlFlowSource::new(config, tx), rx)
}

fn received(rx: &mut mpsc::Receiver<FlowRecord>) -> Vec<FlowRecord> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_flow_fields() {
    let flow = parse_flow(DNS_LINE).unwrap();

    assert_eq!(flow.flow_id, 1);
    assert_eq!(flow.ip_dst, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 53)));
    assert_eq!(flow.port_dst, 53);
    assert_eq!(flow.protocol, 17);
    assert_eq!(flow.end_time, Duration::from_secs(1_700_000_001));
    assert_eq!(flow.peer_src.byte_count, 64);
    assert_eq!(flow.peer_dst, Default::default());
}

#[test]
fn test_parse_flow_rejects_garbage() {
    assert!(parse_flow("not json").is_err());
    assert!(parse_flow(r#"{"port_dst": "fifty-three"}"#).is_err());
}

#[test]
fn test_parse_flow_rejects_deep_nesting() {
    let deep = format!("{}{}", "[".repeat(MAX_JSON_DEPTH + 1), "]".repeat(MAX_JSON_DEPTH + 1));
    let err = parse_flow(&deep).unwrap_err();
    assert!(err.contains("depth"));
}

#[test]
fn test_depth_check_ignores_brackets_in_strings() {
    let line = format!(r#"{{"note":"{}"}}"#, "[".repeat(100));
    assert!(!exceeds_json_depth(line.as_bytes(), 2));
}

#[test]
fn test_parse_flow_rejects_oversized_line() {
    let line = format!(r#"{{"pad":"{}"}}"#, "x".repeat(MAX_LINE_BYTES));
    assert!(parse_flow(&line).unwrap_err().contains("exceeds"));
}

// ============================================================================
// Reading
// ============================================================================

#[tokio::test]
async fn test_reads_all_records() {
    let (source, mut rx) = source(true, 16);
    let handle = source.metrics_handle();
    let input = format!("{}\n\n{}\n", DNS_LINE, DNS_LINE);

    let snapshot = source
        .run_reader(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.lines_read, 2);
    assert_eq!(snapshot.flows_sent, 2);
    assert_eq!(received(&mut rx).len(), 2);
    assert_eq!(handle.get_counter()[0].value, 2);
}

#[tokio::test]
async fn test_skips_malformed_lines_when_continuing() {
    let (source, mut rx) = source(true, 16);
    let input = format!("{}\n{{broken\n{}\n", DNS_LINE, DNS_LINE);

    let snapshot = source
        .run_reader(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.flows_sent, 2);
    assert_eq!(snapshot.parse_errors, 1);
    assert_eq!(received(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_stops_on_malformed_line_when_strict() {
    let (source, mut rx) = source(false, 16);
    let input = format!("{}\n{{broken\n{}\n", DNS_LINE, DNS_LINE);

    let err = source
        .run_reader(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Parse { line: 2, .. }));
    assert_eq!(received(&mut rx).len(), 1);
}

#[tokio::test]
async fn test_skips_invalid_utf8_when_continuing() {
    let (source, mut rx) = source(true, 16);
    let mut input = format!("{}\n", DNS_LINE).into_bytes();
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(format!("{}\n", DNS_LINE).as_bytes());

    let snapshot = source
        .run_reader(input.as_slice(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.flows_sent, 2);
    assert_eq!(snapshot.parse_errors, 1);
    assert_eq!(received(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_invalid_utf8_is_a_parse_error_when_strict() {
    let (source, _rx) = source(false, 16);
    let mut input = format!("{}\n", DNS_LINE).into_bytes();
    input.extend_from_slice(b"\xff\xfe\n");

    let err = source
        .run_reader(input.as_slice(), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        SourceError::Parse { line, message } => {
            assert_eq!(line, 2);
            assert!(message.contains("UTF-8"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_skips_oversized_line() {
    let (source, mut rx) = source(true, 16);
    let input = format!("{}\n{}\n", "x".repeat(MAX_LINE_BYTES * 4), DNS_LINE);

    let snapshot = source
        .run_reader(input.as_bytes(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.flows_sent, 1);
    assert_eq!(snapshot.parse_errors, 1);
    assert_eq!(received(&mut rx).len(), 1);
}

#[tokio::test]
async fn test_read_line_caps_buffered_bytes() {
    let input = format!("{}\nnext\n", "y".repeat(MAX_LINE_BYTES * 3));
    let mut reader = tokio::io::BufReader::with_capacity(512, input.as_bytes());
    let mut buf = Vec::new();

    let len = read_line_capped(&mut reader, &mut buf).await.unwrap();
    assert_eq!(len, Some(MAX_LINE_BYTES * 3 + 1));
    assert_eq!(buf.len(), MAX_LINE_BYTES + 1);

    let len = read_line_capped(&mut reader, &mut buf).await.unwrap();
    assert_eq!(len, Some(5));
    assert_eq!(buf, b"next");

    assert_eq!(read_line_capped(&mut reader, &mut buf).await.unwrap(), None);
}

#[tokio::test]
async fn test_read_line_without_trailing_newline() {
    let mut reader: &[u8] = b"tail";
    let mut buf = Vec::new();

    assert_eq!(read_line_capped(&mut reader, &mut buf).await.unwrap(), Some(4));
    assert_eq!(buf, b"tail");
    assert_eq!(read_line_capped(&mut reader, &mut buf).await.unwrap(), None);
}

#[tokio::test]
async fn test_closed_channel_is_an_error() {
    let (source, rx) = source(true, 16);
    drop(rx);

    let err = source
        .run_reader(DNS_LINE.as_bytes(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::ChannelClosed));
}

#[tokio::test]
async fn test_cancel_stops_blocked_reader() {
    let (source, _rx) = source(true, 16);
    let (_writer, reader) = tokio::io::duplex(64);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(source.run_reader(tokio::io::BufReader::new(reader), cancel.clone()));
    cancel.cancel();

    let snapshot = timeout(Duration::from_secs(1), task)
        .await
        .expect("source should stop on cancel")
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.flows_sent, 0);
}

#[tokio::test]
async fn test_run_reads_configured_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", DNS_LINE).unwrap();
    writeln!(file, "{}", DNS_LINE).unwrap();
    file.flush().unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let config = SourceConfig {
        path: Some(file.path().to_path_buf()),
        continue_on_error: true,
    };

    let snapshot = JsonlFlowSource::new(config, tx)
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.flows_sent, 2);
    assert_eq!(received(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_run_missing_file() {
    let (tx, _rx) = mpsc::channel(16);
    let config = SourceConfig {
        path: Some(PathBuf::from("/nonexistent/flows.jsonl")),
        continue_on_error: true,
    };

    let err = JsonlFlowSource::new(config, tx)
        .run(CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Open { .. }));
}
