//! Smoke tests for the flowmap pipeline
//!
//! These tests wire a real source, pipeline and sink together and check what
//! comes out the other end.

use std::time::Duration;

use flowmap_config::PipelineConfig;
use flowmap_metrics::PipelineSnapshot;
use flowmap_pipeline::{FlowHandler, IngestLoop, OutputHandle, default_processors};
use flowmap_protocol::{Document, unix_now};
use flowmap_sinks::NullSink;
use flowmap_sources::JsonlFlowSource;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// One closed TCP flow to 10.0.0.1:`port`, starting `age` ago
fn flow_line(id: u64, port: u16, age: Duration) -> String {
    let start_ns = (unix_now() - age).as_nanos() as u64;
    let end_ns = start_ns + 500_000_000;
    format!(
        r#"{{"flow_id":{id},"ip_src":"10.0.0.9","ip_dst":"10.0.0.1","port_src":50000,"port_dst":{port},"protocol":6,"start_time":{start_ns},"end_time":{end_ns},"peer_src":{{"arr_time_last":{end_ns},"byte_count":40,"packet_count":1}},"peer_dst":{{"arr_time_last":{end_ns},"byte_count":60,"packet_count":1}}}}"#
    )
}

/// Push `input` through source, pipeline and a collecting null sink
async fn run_pipeline(input: String) -> (PipelineSnapshot, Vec<Document>) {
    let config = PipelineConfig::default();
    let (flow_tx, flow_rx) = mpsc::channel(64);
    let (doc_tx, doc_rx) = mpsc::channel(64);

    let handler = FlowHandler::new(
        default_processors(),
        OutputHandle::new("test", doc_tx),
        &config,
    );
    let ingest = tokio::spawn(
        IngestLoop::new(handler, config.tick_interval).run(flow_rx, CancellationToken::new()),
    );
    let sink = tokio::spawn(async move {
        let mut docs = Vec::new();
        NullSink::new(doc_rx)
            .run_with_callback(|batch| docs.extend_from_slice(batch))
            .await;
        docs
    });

    JsonlFlowSource::new(Default::default(), flow_tx)
        .run_reader(input.as_bytes(), CancellationToken::new())
        .await
        .expect("source should read all lines");

    let handler = timeout(Duration::from_secs(2), ingest)
        .await
        .expect("ingest should stop when the source closes")
        .unwrap();
    let snapshot = handler.metrics_handle().snapshot();
    drop(handler);

    let docs = timeout(Duration::from_secs(2), sink)
        .await
        .expect("sink should stop when the handler is dropped")
        .unwrap();

    (snapshot, docs)
}

#[tokio::test]
async fn test_flows_become_merged_documents() {
    let age = Duration::from_secs(30);
    let input = [flow_line(1, 443, age), flow_line(2, 443, age), flow_line(3, 22, age)]
        .iter()
        .map(|l| format!("{}\n", l))
        .collect();

    let (pipeline, docs) = run_pipeline(input).await;

    assert_eq!(pipeline.flows_processed, 3);
    assert_eq!(pipeline.documents_dropped, 0);
    assert_eq!(docs.len() as u64, pipeline.documents_emitted);

    // All three TCP flows fold into one flow_count document
    let tcp: Vec<_> = docs
        .iter()
        .filter(|d| d.tag("protocol") == Some("tcp") && d.meter("flows").is_some())
        .collect();
    assert_eq!(tcp.len(), 1);
    assert_eq!(tcp[0].meter("flows"), Some(3));
    assert_eq!(tcp[0].meter("bytes"), Some(300));

    // service_traffic keeps the two services apart
    let https_requests = docs
        .iter()
        .find(|d| d.tag("service_port") == Some("443") && d.tag("direction") == Some("request"))
        .expect("request document for port 443");
    assert_eq!(https_requests.meter("bytes"), Some(80));
}

#[tokio::test]
async fn test_window_rollover_and_malformed_lines() {
    let input = format!(
        "{}\nnot json\n{}\n",
        flow_line(1, 443, Duration::from_secs(3600)),
        flow_line(2, 443, Duration::from_secs(10)),
    );

    let (pipeline, docs) = run_pipeline(input).await;

    assert_eq!(pipeline.flows_received, 2);
    assert_eq!(pipeline.flows_processed, 2);
    // The hour-old flow fills the stash window; the recent one forces it out
    assert!(pipeline.overflow_flushes >= 1);

    let counts: Vec<_> = docs.iter().filter(|d| d.meter("flows").is_some()).collect();
    assert_eq!(counts.len(), 2);
    assert!(counts[0].timestamp < counts[1].timestamp);
}
