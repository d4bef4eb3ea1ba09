//! Flow handler
//!
//! Fans each valid flow out to every metric processor, buffers their output
//! in per-processor stashes, and writes the stashes to the output queue in
//! fixed-size batches on flush.
//!
//! # Flush triggers
//!
//! - A stash cannot absorb a processor's output (full, or the documents belong
//!   to a later window). Every stash is flushed and the residual retried.
//! - The ingestion loop's timer finds the handler idle for longer than
//!   `idle_flush_threshold`.
//! - Shutdown.
//!
//! The handler is owned by the ingestion task; only the emit counters and
//! pipeline metrics are shared, through their handles.

use std::sync::Arc;
use std::time::Duration;

use flowmap_config::PipelineConfig;
use flowmap_metrics::StatItem;
use flowmap_protocol::{FlowRecord, unix_now};
use tracing::{debug, info};

use crate::counter::{EmitCounter, EmitCounterHandle};
use crate::error::Result;
use crate::metrics::{BackpressureTracker, PipelineMetrics, PipelineMetricsHandle};
use crate::output::OutputHandle;
use crate::processor::MetricProcessor;
use crate::stash::Stash;
use crate::validator::FlowValidator;

/// Pipeline coordinator for metric processors
pub struct FlowHandler {
    /// Registered processors, index-aligned with `stashes`
    processors: Vec<Box<dyn MetricProcessor>>,

    /// One stash per processor
    stashes: Vec<Stash>,

    validator: FlowValidator,
    output: OutputHandle,
    queue_batch_size: usize,
    idle_flush_threshold: Duration,

    /// Wall clock of the last completed process or flush
    last_process: Duration,

    emit_counter: Arc<EmitCounter>,
    metrics: Arc<PipelineMetrics>,
    backpressure: BackpressureTracker,
}

impl FlowHandler {
    /// Create a handler driving `processors`
    ///
    /// Calls `prepare()` on every processor before returning.
    pub fn new(
        mut processors: Vec<Box<dyn MetricProcessor>>,
        output: OutputHandle,
        config: &PipelineConfig,
    ) -> Self {
        for processor in &mut processors {
            processor.prepare();
        }

        let stashes = processors
            .iter()
            .map(|_| Stash::new(config.docs_in_buffer, config.window_size))
            .collect();
        let names = processors.iter().map(|p| p.name().to_string()).collect();

        info!(
            processors = processors.len(),
            output = output.name(),
            docs_in_buffer = config.docs_in_buffer,
            queue_batch_size = config.queue_batch_size,
            "flow handler created"
        );

        Self {
            processors,
            stashes,
            validator: FlowValidator::from_config(config),
            output,
            queue_batch_size: config.queue_batch_size.max(1),
            idle_flush_threshold: config.idle_flush_threshold,
            last_process: unix_now(),
            emit_counter: Arc::new(EmitCounter::new(names)),
            metrics: Arc::new(PipelineMetrics::new()),
            backpressure: BackpressureTracker::new(),
        }
    }

    /// Validate `flow` and feed it to every processor
    pub fn process(&mut self, flow: &FlowRecord) -> Result<()> {
        self.process_at(flow, unix_now())
    }

    /// [`process`](Self::process) against an explicit wall clock value
    ///
    /// An invalid flow is returned as an error without touching any processor
    /// or stash.
    pub fn process_at(&mut self, flow: &FlowRecord, now: Duration) -> Result<()> {
        self.metrics.record_received();

        if let Err(rejection) = self.validator.check(flow, now) {
            self.metrics.record_invalid();
            return Err(rejection.into());
        }
        self.metrics.record_processed();

        for i in 0..self.processors.len() {
            let docs = self.processors[i].process(flow, false);
            if docs.is_empty() {
                continue;
            }

            let mut pending = self.stashes[i].add(docs);
            while let Some(residual) = pending {
                debug!(
                    processor = self.processors[i].name(),
                    residual = residual.len(),
                    "stash overflow, flushing"
                );
                self.metrics.record_overflow_flush();
                self.flush_at(now);
                pending = self.stashes[i].add(residual);
            }
        }

        self.last_process = now;
        Ok(())
    }

    /// Write every stash to the output queue and clear it
    pub fn flush(&mut self) {
        self.flush_at(unix_now());
    }

    /// [`flush`](Self::flush) against an explicit wall clock value
    pub fn flush_at(&mut self, now: Duration) {
        self.metrics.record_flush();

        for (i, stash) in self.stashes.iter_mut().enumerate() {
            if stash.is_empty() {
                continue;
            }

            let summary = self.output.put_batches(stash.dump(), self.queue_batch_size);
            self.emit_counter.add(i, summary.documents_written);
            self.metrics.record_put(&summary);
            if summary.has_drops() {
                self.backpressure
                    .record_drop(summary.batches_dropped, summary.documents_dropped);
            }

            stash.clear();
        }

        self.last_process = now;
    }

    /// Whether the handler has been idle longer than the flush threshold
    pub fn need_flush(&self) -> bool {
        self.need_flush_at(unix_now())
    }

    /// [`need_flush`](Self::need_flush) against an explicit wall clock value
    #[inline]
    pub fn need_flush_at(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_process) > self.idle_flush_threshold
    }

    /// Emit counts per processor since the previous call
    ///
    /// Same reset-on-read semantics as the handle from
    /// [`counter_handle`](Self::counter_handle); use one or the other.
    pub fn get_counter(&self) -> Vec<StatItem> {
        self.emit_counter.take()
    }

    /// Handle for registering the emit counters with a stats reporter
    pub fn counter_handle(&self) -> EmitCounterHandle {
        EmitCounterHandle::new(Arc::clone(&self.emit_counter))
    }

    /// Handle exposing pipeline-wide counters
    pub fn metrics_handle(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// Processor names in registration order
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Documents currently buffered across all stashes
    pub fn buffered(&self) -> usize {
        self.stashes.iter().map(Stash::len).sum()
    }

    /// Documents buffered for processor `index`
    pub fn buffered_for(&self, index: usize) -> Option<usize> {
        self.stashes.get(index).map(Stash::len)
    }

    /// Maximum documents per output batch
    #[inline]
    pub fn queue_batch_size(&self) -> usize {
        self.queue_batch_size
    }

    /// Wall clock of the last completed process or flush
    #[inline]
    pub fn last_process(&self) -> Duration {
        self.last_process
    }
}

impl std::fmt::Debug for FlowHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowHandler")
            .field("processors", &self.processor_names())
            .field("buffered", &self.buffered())
            .field("output", &self.output)
            .field("last_process", &self.last_process)
            .finish()
    }
}
