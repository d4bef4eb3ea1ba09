//! Output handle for pipeline communication
//!
//! `OutputHandle` wraps the sender side of the output queue. The flow handler
//! writes flushed documents through it without knowing which sink drains the
//! queue.

use flowmap_protocol::{Document, DocumentBatch};
use tokio::sync::mpsc;

/// Handle to the output queue
///
/// Writes never block: a full or closed queue hands the batch back to the
/// caller, which counts it as dropped.
///
/// # Example
///
/// ```
/// use flowmap_pipeline::OutputHandle;
/// use flowmap_protocol::Document;
/// use tokio::sync::mpsc;
///
/// let (tx, mut rx) = mpsc::channel(16);
/// let output = OutputHandle::new("stdout", tx);
///
/// let docs = vec![Document::new(60); 5];
/// let summary = output.put_batches(&docs, 2);
///
/// assert_eq!(summary.batches_written, 3);
/// assert_eq!(rx.try_recv().unwrap().len(), 2);
/// ```
#[derive(Clone)]
pub struct OutputHandle {
    /// Human-readable name for logs
    name: String,

    /// Channel sender for document batches
    sender: mpsc::Sender<DocumentBatch>,
}

/// Result of writing a run of documents as batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    /// Batches accepted by the queue
    pub batches_written: u64,
    /// Documents in accepted batches
    pub documents_written: u64,
    /// Batches rejected by a full or closed queue
    pub batches_dropped: u64,
    /// Documents in rejected batches
    pub documents_dropped: u64,
}

impl PutSummary {
    /// Whether anything was dropped
    #[inline]
    pub fn has_drops(&self) -> bool {
        self.batches_dropped > 0
    }
}

impl OutputHandle {
    /// Create a new output handle
    #[inline]
    pub fn new(name: impl Into<String>, sender: mpsc::Sender<DocumentBatch>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }

    /// Get the output's name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Try to send a batch without blocking
    ///
    /// Returns `Ok(())` if the batch was queued, or the batch back if the
    /// queue is full (backpressure) or closed.
    #[inline]
    pub fn try_put(&self, batch: DocumentBatch) -> Result<(), DocumentBatch> {
        self.sender.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(b) => b,
            mpsc::error::TrySendError::Closed(b) => b,
        })
    }

    /// Slice `docs` into batches of at most `batch_size` and queue each one
    ///
    /// The last batch may be shorter. A zero `batch_size` is treated as 1.
    pub fn put_batches(&self, docs: &[Document], batch_size: usize) -> PutSummary {
        let mut summary = PutSummary::default();

        for chunk in docs.chunks(batch_size.max(1)) {
            let len = chunk.len() as u64;
            match self.try_put(chunk.to_vec()) {
                Ok(()) => {
                    summary.batches_written += 1;
                    summary.documents_written += len;
                }
                Err(_) => {
                    summary.batches_dropped += 1;
                    summary.documents_dropped += len;
                }
            }
        }

        summary
    }

    /// Check if the output queue is closed
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Get the current free capacity of the queue
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Get the maximum capacity of the queue
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

impl std::fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandle")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}
