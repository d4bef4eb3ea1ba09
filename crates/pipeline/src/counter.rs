//! Per-processor emit counters
//!
//! Double-buffered so the stats reporter can read and reset one half while
//! the ingestion task keeps writing to the other. Slot layout is
//! `half * processors + index`; `active` selects the half being written.
//!
//! An increment that loaded the old half just before a flip lands in the half
//! being drained (after the swap) and is reported on the following poll of
//! that half. Counts can arrive late; they are never lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use flowmap_metrics::{CountableProvider, StatItem};

/// Module name the emit counters are reported under
pub const EMIT_COUNTER_MODULE: &str = "flow_mapper";

/// Double-buffered emitted-document counters, one per processor
#[derive(Debug)]
pub struct EmitCounter {
    names: Vec<String>,
    slots: Vec<AtomicU64>,
    active: AtomicUsize,
}

impl EmitCounter {
    /// Create counters for processors named `names`, in registration order
    pub fn new(names: Vec<String>) -> Self {
        let slots = (0..names.len() * 2).map(|_| AtomicU64::new(0)).collect();
        Self {
            names,
            slots,
            active: AtomicUsize::new(0),
        }
    }

    /// Number of processors tracked
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no processors are tracked
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Add `count` emitted documents for processor `index`
    ///
    /// Out-of-range indexes are ignored.
    #[inline]
    pub fn add(&self, index: usize, count: u64) {
        if index >= self.names.len() {
            return;
        }
        let half = self.active.load(Ordering::Acquire);
        self.slots[half * self.names.len() + index].fetch_add(count, Ordering::Relaxed);
    }

    /// Counts accumulated in the active half, without resetting
    pub fn peek(&self) -> Vec<StatItem> {
        let half = self.active.load(Ordering::Acquire);
        self.items(half, |slot| slot.load(Ordering::Relaxed))
    }

    /// Flip the active half, then drain and reset the previous one
    pub fn take(&self) -> Vec<StatItem> {
        let drained = self.active.fetch_xor(1, Ordering::AcqRel);
        self.items(drained, |slot| slot.swap(0, Ordering::AcqRel))
    }

    fn items(&self, half: usize, read: impl Fn(&AtomicU64) -> u64) -> Vec<StatItem> {
        let base = half * self.names.len();
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| StatItem::new(name.as_str(), read(&self.slots[base + i])))
            .collect()
    }
}

/// Cloneable handle registering the emit counters with a stats reporter
#[derive(Debug, Clone)]
pub struct EmitCounterHandle {
    counter: Arc<EmitCounter>,
}

impl EmitCounterHandle {
    pub(crate) fn new(counter: Arc<EmitCounter>) -> Self {
        Self { counter }
    }
}

impl CountableProvider for EmitCounterHandle {
    fn module(&self) -> &str {
        EMIT_COUNTER_MODULE
    }

    fn get_counter(&self) -> Vec<StatItem> {
        self.counter.take()
    }
}
