//! Task wiring
//!
//! ```text
//! [JsonlFlowSource] --FlowRecord--> [IngestLoop/FlowHandler] --DocumentBatch--> [Sink]
//!                                            │
//!                                  [StatsReporter] polls counters
//! ```
//!
//! Shutdown runs front to back: the source finishes (EOF, error or cancel)
//! and drops its sender, the ingestion loop drains and flushes, dropping the
//! handler closes the output channel, the sink drains, and the reporter
//! writes its last interval.

use std::sync::Arc;

use anyhow::{Context, Result};
use flowmap_config::{Config, OutputConfig, OutputType};
use flowmap_metrics::{PipelineSnapshot, StatsReporter};
use flowmap_pipeline::{FlowHandler, IngestLoop, OutputHandle, default_processors};
use flowmap_protocol::DocumentBatch;
use flowmap_sinks::{NullSink, SinkMetricsHandle, StdoutConfig, StdoutSink};
use flowmap_sources::JsonlFlowSource;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Final counters of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pipeline: PipelineSnapshot,
    pub source: flowmap_sources::MetricsSnapshot,
    pub sink: flowmap_sinks::MetricsSnapshot,
}

impl RunSummary {
    /// Log the totals at info level
    pub fn log(&self) {
        tracing::info!(
            lines = self.source.lines_read,
            parse_errors = self.source.parse_errors,
            flows = self.pipeline.flows_received,
            invalid = self.pipeline.flows_invalid,
            documents = self.pipeline.documents_emitted,
            dropped = self.pipeline.documents_dropped,
            written = self.sink.documents_written,
            "flowmap finished"
        );
    }
}

/// Run the pipeline until input is exhausted or `cancel` fires
///
/// A source error (unreadable file, malformed record with
/// `continue_on_error = false`) still drains and flushes everything already
/// read before being returned.
pub async fn run(config: Config, cancel: CancellationToken) -> Result<RunSummary> {
    let (flow_tx, flow_rx) = mpsc::channel(config.pipeline.input_queue_size);
    let (doc_tx, doc_rx) = mpsc::channel(config.output.queue_size);

    let output = OutputHandle::new(config.output.output_type.as_str(), doc_tx);
    let handler = FlowHandler::new(default_processors(), output, &config.pipeline);
    let pipeline_metrics = handler.metrics_handle();

    let (sink_task, sink_metrics) = spawn_sink(&config.output, doc_rx);
    let source = JsonlFlowSource::new(config.source.clone(), flow_tx);

    let reporter_cancel = CancellationToken::new();
    let reporter = StatsReporter::builder()
        .config(config.metrics.clone())
        .pipeline(Arc::new(pipeline_metrics.clone()))
        .countable(Arc::new(handler.counter_handle()))
        .countable(Arc::new(source.metrics_handle()))
        .countable(Arc::new(sink_metrics))
        .build();
    let reporter_task = tokio::spawn(reporter.run(reporter_cancel.clone()));

    let ingest = IngestLoop::new(handler, config.pipeline.tick_interval);
    let ingest_task = tokio::spawn(ingest.run(flow_rx, cancel.clone()));

    let source_result = source.run(cancel).await;
    if let Err(e) = &source_result {
        tracing::error!(error = %e, "flow source failed, draining pipeline");
    }

    let handler = ingest_task.await.context("ingestion task panicked")?;
    let pipeline = pipeline_metrics.snapshot();
    drop(handler);

    let sink = sink_task.await.context("sink task panicked")?;

    reporter_cancel.cancel();
    reporter_task.await.context("stats reporter panicked")?;

    let source = source_result.context("flow source failed")?;

    Ok(RunSummary {
        pipeline,
        source,
        sink,
    })
}

/// Start the configured sink on its own task
fn spawn_sink(
    config: &OutputConfig,
    receiver: mpsc::Receiver<DocumentBatch>,
) -> (JoinHandle<flowmap_sinks::MetricsSnapshot>, SinkMetricsHandle) {
    match config.output_type {
        OutputType::Stdout => {
            let sink = StdoutSink::with_config(
                receiver,
                StdoutConfig {
                    format: config.format,
                    ..Default::default()
                },
            );
            let handle = sink.metrics_handle();
            (tokio::spawn(sink.run()), handle)
        }
        OutputType::Null => {
            let sink = NullSink::new(receiver);
            let handle = sink.metrics_handle();
            (tokio::spawn(sink.run()), handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::str::FromStr;
    use std::time::Duration;

    use flowmap_protocol::unix_now;
    use tokio::time::timeout;

    use super::*;

    fn flow_line(id: u64, port_dst: u16, start: Duration) -> String {
        let start_ns = start.as_nanos() as u64;
        let end_ns = start_ns + 1_000_000_000;
        format!(
            r#"{{"flow_id":{id},"ip_src":"10.0.0.7","ip_dst":"10.0.0.1","port_src":40000,"port_dst":{port_dst},"protocol":6,"start_time":{start_ns},"end_time":{end_ns},"peer_src":{{"arr_time_last":{end_ns},"byte_count":100,"packet_count":2}},"peer_dst":{{"arr_time_last":{end_ns},"byte_count":300,"packet_count":3}}}}"#
        )
    }

    fn config_for(path: &std::path::Path, extra: &str) -> Config {
        let toml = format!(
            "[metrics]\nenabled = false\n\n[output]\ntype = \"null\"\n\n{}",
            extra
        );
        let mut config = Config::from_str(&toml).unwrap();
        config.source.path = Some(path.to_path_buf());
        config
    }

    #[tokio::test]
    async fn test_run_file_to_null_sink() {
        let start = unix_now() - Duration::from_secs(30);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", flow_line(1, 443, start)).unwrap();
        writeln!(file, "{}", flow_line(2, 443, start)).unwrap();
        writeln!(file, "{}", flow_line(3, 80, start)).unwrap();
        // Starts in the future: rejected by validation
        writeln!(file, "{}", flow_line(4, 80, unix_now() + Duration::from_secs(3600))).unwrap();
        file.flush().unwrap();

        let config = config_for(file.path(), "");
        let summary = timeout(Duration::from_secs(5), run(config, CancellationToken::new()))
            .await
            .expect("run should finish at EOF")
            .unwrap();

        assert_eq!(summary.source.flows_sent, 4);
        assert_eq!(summary.pipeline.flows_received, 4);
        assert_eq!(summary.pipeline.flows_invalid, 1);
        assert_eq!(summary.pipeline.flows_processed, 3);
        assert_eq!(summary.pipeline.documents_dropped, 0);
        assert!(summary.pipeline.documents_emitted > 0);
        assert_eq!(summary.sink.documents_written, summary.pipeline.documents_emitted);
    }

    #[tokio::test]
    async fn test_run_strict_source_error_still_flushes() {
        let start = unix_now() - Duration::from_secs(30);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", flow_line(1, 443, start)).unwrap();
        writeln!(file, "{{not json").unwrap();
        file.flush().unwrap();

        let config = config_for(file.path(), "[source]\ncontinue_on_error = false\n");
        let err = timeout(Duration::from_secs(5), run(config, CancellationToken::new()))
            .await
            .expect("run should stop on the malformed line")
            .unwrap_err();

        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[tokio::test]
    async fn test_run_missing_input_file() {
        let config = config_for(std::path::Path::new("/nonexistent/flows.jsonl"), "");
        let result = timeout(Duration::from_secs(5), run(config, CancellationToken::new()))
            .await
            .expect("run should fail fast");
        assert!(result.is_err());
    }
}
