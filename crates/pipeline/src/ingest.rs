//! Ingestion loop
//!
//! Drains the input queue in batches and drives a [`FlowHandler`], with a
//! periodic timer in the same `select!` so idle stashes get flushed even when
//! no flows arrive.
//!
//! ```text
//! [Source] ──→ mpsc<FlowRecord> ──→ [IngestLoop] ──→ FlowHandler ──→ mpsc<DocumentBatch> ──→ [Sink]
//!                                        ↑
//!                                  tick_interval
//! ```

use std::time::Duration;

use flowmap_protocol::FlowRecord;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::handler::FlowHandler;

/// Owns a flow handler and feeds it from the input queue
#[derive(Debug)]
pub struct IngestLoop {
    handler: FlowHandler,
    tick_interval: Duration,
}

impl IngestLoop {
    /// Create a loop ticking every `tick_interval` (clamped to 1ms)
    pub fn new(handler: FlowHandler, tick_interval: Duration) -> Self {
        Self {
            handler,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    /// Borrow the handler, e.g. to take its handles before running
    #[inline]
    pub fn handler(&self) -> &FlowHandler {
        &self.handler
    }

    /// Run until the input queue closes or `cancel` fires
    ///
    /// Flushes once more before returning and hands the handler back.
    pub async fn run(
        mut self,
        mut receiver: mpsc::Receiver<FlowRecord>,
        cancel: CancellationToken,
    ) -> FlowHandler {
        let batch_size = self.handler.queue_batch_size();
        let mut buffer = Vec::with_capacity(batch_size);

        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            processors = ?self.handler.processor_names(),
            batch_size,
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            "ingestion loop starting"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("ingestion loop cancelled");
                    break;
                }
                received = receiver.recv_many(&mut buffer, batch_size) => {
                    if received == 0 {
                        tracing::debug!("input queue closed");
                        break;
                    }
                    self.process_batch(&mut buffer);
                }
                _ = ticker.tick() => {
                    if self.handler.need_flush() {
                        tracing::debug!(buffered = self.handler.buffered(), "idle flush");
                        self.handler.flush();
                    }
                }
            }
        }

        self.handler.flush();

        let snapshot = self.handler.metrics_handle().snapshot();
        tracing::info!(
            flows_received = snapshot.flows_received,
            flows_processed = snapshot.flows_processed,
            flows_invalid = snapshot.flows_invalid,
            documents_emitted = snapshot.documents_emitted,
            documents_dropped = snapshot.documents_dropped,
            batches_written = snapshot.batches_written,
            flushes = snapshot.flushes,
            "ingestion loop shutting down"
        );

        self.handler
    }

    fn process_batch(&mut self, buffer: &mut Vec<FlowRecord>) {
        for flow in buffer.drain(..) {
            if let Err(e) = self.handler.process(&flow) {
                tracing::debug!(flow_id = flow.flow_id, error = %e, "dropping flow");
            }
        }
    }
}
