//! JSONL flow source
//!
//! Reads one JSON flow record per line from a file or stdin and sends each
//! to the input queue. Sending waits for queue capacity, so a slow pipeline
//! slows the reader down instead of losing records.
//!
//! # Record format
//!
//! ```text
//! {"flow_id":1,"ip_src":"10.0.0.7","ip_dst":"10.0.0.53","port_dst":53,"protocol":17,
//!  "start_time":1700000000000000000,"end_time":1700000001000000000, ...}
//! ```
//!
//! Times are integer nanoseconds since the UNIX epoch. Missing fields default
//! to zero.
//!
//! Lines longer than [`MAX_LINE_BYTES`] or not valid UTF-8 are treated like
//! malformed JSON: skipped and counted when `continue_on_error` is set. At
//! most `MAX_LINE_BYTES + 1` bytes of a line are ever buffered.

use std::io;
use std::sync::Arc;

use flowmap_config::SourceConfig;
use flowmap_protocol::FlowRecord;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::{MetricsSnapshot, SourceMetrics, SourceMetricsHandle};
use crate::error::{Result, SourceError};

/// Maximum JSON nesting depth (DoS protection)
pub const MAX_JSON_DEPTH: usize = 32;

/// Longest accepted line in bytes
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Newline-delimited JSON flow source
pub struct JsonlFlowSource {
    name: String,
    config: SourceConfig,
    sender: mpsc::Sender<FlowRecord>,
    metrics: Arc<SourceMetrics>,
}

impl JsonlFlowSource {
    /// Create a source sending into `sender`
    pub fn new(config: SourceConfig, sender: mpsc::Sender<FlowRecord>) -> Self {
        Self {
            name: "jsonl".into(),
            config,
            sender,
            metrics: Arc::new(SourceMetrics::new()),
        }
    }

    /// Get the source name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> SourceMetricsHandle {
        SourceMetricsHandle::new(&self.name, Arc::clone(&self.metrics))
    }

    /// Read the configured file, or stdin, to the end
    ///
    /// Returns when input is exhausted or `cancel` fires. Dropping the source
    /// closes the input queue.
    pub async fn run(self, cancel: CancellationToken) -> Result<MetricsSnapshot> {
        match self.config.path.clone() {
            Some(path) => {
                let file = File::open(&path)
                    .await
                    .map_err(|source| SourceError::Open {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!(source = %self.name, path = %path.display(), "JSONL source reading file");
                self.run_reader(BufReader::new(file), cancel).await
            }
            None => {
                tracing::info!(source = %self.name, "JSONL source reading stdin");
                self.run_reader(BufReader::new(tokio::io::stdin()), cancel).await
            }
        }
    }

    /// Read flow records from `reader` until EOF or cancellation
    pub async fn run_reader<R>(self, reader: R, cancel: CancellationToken) -> Result<MetricsSnapshot>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut reader = reader;
        let mut buf = Vec::with_capacity(1024);
        let mut line_no: u64 = 0;

        loop {
            let read = tokio::select! {
                _ = cancel.cancelled() => break,
                read = read_line_capped(&mut reader, &mut buf) => read?,
            };
            let Some(len) = read else {
                break;
            };
            line_no += 1;

            let flow = match decode_line(&buf) {
                Ok(None) => continue,
                Ok(Some(flow)) => {
                    self.metrics.line_read(len as u64);
                    flow
                }
                Err(message) => {
                    self.metrics.line_read(len as u64);
                    self.metrics.parse_error();
                    if !self.config.continue_on_error {
                        return Err(SourceError::Parse {
                            line: line_no,
                            message,
                        });
                    }
                    tracing::warn!(line = line_no, error = %message, "skipping malformed flow record");
                    continue;
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                sent = self.sender.send(flow) => {
                    if sent.is_err() {
                        return Err(SourceError::ChannelClosed);
                    }
                    self.metrics.flow_sent();
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            source = %self.name,
            lines = snapshot.lines_read,
            flows = snapshot.flows_sent,
            parse_errors = snapshot.parse_errors,
            "JSONL source finished"
        );

        Ok(snapshot)
    }
}

/// Read one `\n`-terminated line into `buf`
///
/// Keeps at most `MAX_LINE_BYTES + 1` bytes and discards the rest of a longer
/// line. Returns the full line length including the newline, or `None` at
/// EOF.
async fn read_line_capped<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<usize>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut total = 0usize;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok((total > 0).then_some(total));
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = match newline {
            Some(i) => &available[..i],
            None => available,
        };
        let room = (MAX_LINE_BYTES + 1).saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);

        let used = chunk.len() + usize::from(newline.is_some());
        reader.consume(used);
        total += used;

        if newline.is_some() {
            return Ok(Some(total));
        }
    }
}

/// Decode one raw line, `Ok(None)` for blank lines
fn decode_line(raw: &[u8]) -> std::result::Result<Option<FlowRecord>, String> {
    if raw.len() > MAX_LINE_BYTES {
        return Err(format!("line exceeds {} bytes", MAX_LINE_BYTES));
    }
    let line = std::str::from_utf8(raw).map_err(|e| format!("invalid UTF-8: {}", e))?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    parse_flow(line).map(Some)
}

/// Parse one line with size and depth limits
fn parse_flow(line: &str) -> std::result::Result<FlowRecord, String> {
    if line.len() > MAX_LINE_BYTES {
        return Err(format!("line exceeds {} bytes", MAX_LINE_BYTES));
    }
    if exceeds_json_depth(line.as_bytes(), MAX_JSON_DEPTH) {
        return Err(format!(
            "JSON nesting exceeds maximum depth of {}",
            MAX_JSON_DEPTH
        ));
    }
    serde_json::from_str(line).map_err(|e| e.to_string())
}

/// Check if JSON exceeds maximum nesting depth (lightweight check)
fn exceeds_json_depth(data: &[u8], max_depth: usize) -> bool {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for &byte in data {
        if escape_next {
            escape_next = false;
            continue;
        }

        match byte {
            b'\\' if in_string => {
                escape_next = true;
            }
            b'"' => {
                in_string = !in_string;
            }
            b'{' | b'[' if !in_string => {
                depth += 1;
                if depth > max_depth {
                    return true;
                }
            }
            b'}' | b']' if !in_string => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    false
}

#[cfg(test)]
#[path = "jsonl_test.rs"]
mod jsonl_test;
