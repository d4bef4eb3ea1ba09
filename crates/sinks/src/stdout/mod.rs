//! Stdout sink - one line per document
//!
//! Writes every document of every batch to stdout, as JSON (for piping into
//! other tools) or as a compact text line (for terminals).
//!
//! # Example Output
//!
//! ```text
//! {"timestamp":1700000040,"tags":{"protocol":"tcp"},"meters":{"bytes":600,"flows":2}}
//! 1700000040 protocol=tcp bytes=600 flows=2
//! ```

use std::fmt::Write as _;
use std::io::{self, BufWriter, Stdout, Write};
use std::sync::Arc;

use flowmap_config::OutputFormat;
use flowmap_protocol::{Document, DocumentBatch};
use tokio::sync::mpsc;

use crate::common::{MetricsSnapshot, Result, SinkMetrics, SinkMetricsHandle};

/// Configuration for stdout sink
#[derive(Debug, Clone, Default)]
pub struct StdoutConfig {
    /// Line format
    pub format: OutputFormat,

    /// Print a `# batch` header line before each batch
    pub show_batch_headers: bool,
}

impl StdoutConfig {
    /// Create config with text lines
    pub fn text() -> Self {
        Self {
            format: OutputFormat::Text,
            ..Self::default()
        }
    }

    /// Create config with batch headers enabled
    pub fn with_headers() -> Self {
        Self {
            show_batch_headers: true,
            ..Self::default()
        }
    }
}

/// Stdout sink, generic over the writer for tests
pub struct StdoutSink<W: Write + Send = BufWriter<Stdout>> {
    /// Channel receiver for batches
    receiver: mpsc::Receiver<DocumentBatch>,

    /// Configuration
    config: StdoutConfig,

    /// Sink name for logging
    name: String,

    /// Destination
    writer: W,

    /// Reused line buffer
    buf: Vec<u8>,

    /// Metrics (Arc for sharing with metrics handle)
    metrics: Arc<SinkMetrics>,
}

impl StdoutSink {
    /// Create a new stdout sink with default config
    pub fn new(receiver: mpsc::Receiver<DocumentBatch>) -> Self {
        Self::with_config(receiver, StdoutConfig::default())
    }

    /// Create a new stdout sink with custom config
    pub fn with_config(receiver: mpsc::Receiver<DocumentBatch>, config: StdoutConfig) -> Self {
        Self::with_writer(receiver, "stdout", config, BufWriter::new(io::stdout()))
    }
}

impl<W: Write + Send> StdoutSink<W> {
    /// Create a sink writing to `writer`
    pub fn with_writer(
        receiver: mpsc::Receiver<DocumentBatch>,
        name: impl Into<String>,
        config: StdoutConfig,
        writer: W,
    ) -> Self {
        Self {
            receiver,
            config,
            name: name.into(),
            writer,
            buf: Vec::with_capacity(4096),
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Get reference to metrics
    #[inline]
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> SinkMetricsHandle {
        SinkMetricsHandle::new(&self.name, Arc::clone(&self.metrics))
    }

    /// Get the sink name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the underlying writer
    #[inline]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Run the sink, writing batches until the channel closes
    ///
    /// A failed write is logged and counted; the sink keeps draining.
    pub async fn run(mut self) -> MetricsSnapshot {
        tracing::info!(sink = %self.name, format = ?self.config.format, "stdout sink starting");

        while let Some(batch) = self.receiver.recv().await {
            if let Err(e) = self.write_batch(&batch) {
                self.metrics.write_error();
                tracing::warn!(sink = %self.name, error = %e, documents = batch.len(), "write failed");
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            batches = snapshot.batches_received,
            documents = snapshot.documents_written,
            bytes = snapshot.bytes_written,
            errors = snapshot.write_errors,
            "stdout sink shutting down"
        );

        snapshot
    }

    /// Format and write one batch, returning the bytes written
    pub fn write_batch(&mut self, batch: &[Document]) -> Result<u64> {
        self.buf.clear();

        if self.config.show_batch_headers {
            writeln!(self.buf, "# batch documents={}", batch.len())?;
        }

        for doc in batch {
            match self.config.format {
                OutputFormat::Json => serde_json::to_writer(&mut self.buf, doc)?,
                OutputFormat::Text => self.buf.extend_from_slice(format_text(doc).as_bytes()),
            }
            self.buf.push(b'\n');
        }

        self.writer.write_all(&self.buf)?;
        self.writer.flush()?;

        let bytes = self.buf.len() as u64;
        self.metrics.batch_written(batch.len() as u64, bytes);
        Ok(bytes)
    }
}

/// Format a document as `timestamp k=v,k=v m=v m=v`
fn format_text(doc: &Document) -> String {
    let mut line = doc.timestamp.to_string();

    let tags: Vec<String> = doc.tags.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    if !tags.is_empty() {
        line.push(' ');
        line.push_str(&tags.join(","));
    }

    for (key, value) in &doc.meters {
        let _ = write!(line, " {}={}", key, value);
    }

    line
}
