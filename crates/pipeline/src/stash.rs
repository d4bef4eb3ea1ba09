//! Per-processor document stash
//!
//! A stash sits between one metric processor and the output queue. It merges
//! documents of the same series and bounds memory with a fixed capacity.
//!
//! Windowing is enforced only across `add` calls. The first document added to
//! an empty stash opens a window; a later `add` stops at the first document
//! outside it and hands the rest back as residual. An `add` on an empty stash
//! absorbs every timestamp it is given, so after a flush any batch smaller
//! than the capacity always fits, even if it spans several windows.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use flowmap_protocol::Document;

/// Series identity: timestamp plus tags
type SeriesKey = (u32, BTreeMap<String, String>);

/// Bounded, windowed, merging document buffer
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use flowmap_pipeline::Stash;
/// use flowmap_protocol::Document;
///
/// let mut stash = Stash::new(2, Duration::from_secs(60));
/// let doc = |tag: &str| Document::new(120).with_tag("k", tag).with_meter("n", 1);
///
/// assert!(stash.add(vec![doc("a"), doc("a"), doc("b")]).is_none());
/// assert_eq!(stash.len(), 2);
///
/// let residual = stash.add(vec![doc("c")]).unwrap();
/// assert_eq!(residual.len(), 1);
/// ```
#[derive(Debug)]
pub struct Stash {
    capacity: usize,
    window_secs: u32,
    window_start: Option<u32>,
    docs: Vec<Document>,
    index: HashMap<SeriesKey, usize>,
}

impl Stash {
    /// Create a stash holding at most `capacity` distinct series
    ///
    /// `capacity` and the window are clamped to at least 1 (document, second).
    pub fn new(capacity: usize, window: Duration) -> Self {
        let capacity = capacity.max(1);
        let window_secs = u32::try_from(window.as_secs()).unwrap_or(u32::MAX).max(1);
        Self {
            capacity,
            window_secs,
            window_start: None,
            docs: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Merge `docs` into the stash
    ///
    /// Returns `None` when every document was absorbed. Otherwise returns the
    /// first document that did not fit, followed by the rest of the input, for
    /// the caller to retry after a flush.
    ///
    /// A call that starts on an empty stash accepts any timestamp and opens the
    /// window at the first document. A call that starts on a non-empty stash
    /// stops at the first document outside the open window.
    pub fn add(&mut self, docs: Vec<Document>) -> Option<Vec<Document>> {
        let check_window = !self.docs.is_empty();
        let mut iter = docs.into_iter();

        while let Some(doc) = iter.next() {
            if let Err(doc) = self.insert(doc, check_window) {
                let mut residual = Vec::with_capacity(iter.len() + 1);
                residual.push(doc);
                residual.extend(iter);
                return Some(residual);
            }
        }

        None
    }

    fn insert(&mut self, doc: Document, check_window: bool) -> Result<(), Document> {
        match self.window_start {
            Some(start) if check_window && !self.in_window(start, doc.timestamp) => {
                return Err(doc);
            }
            None => self.window_start = Some(self.align(doc.timestamp)),
            _ => {}
        }

        let key = (doc.timestamp, doc.tags.clone());
        if let Some(&slot) = self.index.get(&key) {
            self.docs[slot].merge(&doc);
            return Ok(());
        }

        if self.docs.len() >= self.capacity {
            return Err(doc);
        }

        self.index.insert(key, self.docs.len());
        self.docs.push(doc);
        Ok(())
    }

    #[inline]
    fn align(&self, timestamp: u32) -> u32 {
        timestamp - timestamp % self.window_secs
    }

    #[inline]
    fn in_window(&self, start: u32, timestamp: u32) -> bool {
        let ts = u64::from(timestamp);
        let start = u64::from(start);
        ts >= start && ts < start + u64::from(self.window_secs)
    }

    /// All buffered documents in insertion order
    #[inline]
    pub fn dump(&self) -> &[Document] {
        &self.docs
    }

    /// Drop every buffered document and close the window
    pub fn clear(&mut self) {
        self.docs.clear();
        self.index.clear();
        self.window_start = None;
    }

    /// Number of buffered series
    #[inline]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether nothing is buffered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Maximum number of buffered series
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Start of the open window in seconds, `None` after a clear
    #[inline]
    pub fn window_start(&self) -> Option<u32> {
        self.window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn doc(ts: u32, key: &str, value: u64) -> Document {
        Document::new(ts)
            .with_tag("key", key)
            .with_meter("count", value)
    }

    #[test]
    fn test_capacity_clamped() {
        let stash = Stash::new(0, WINDOW);
        assert_eq!(stash.capacity(), 1);
        assert!(stash.is_empty());
    }

    #[test]
    fn test_merges_same_series() {
        let mut stash = Stash::new(4, WINDOW);
        assert!(stash.add(vec![doc(60, "a", 1), doc(60, "a", 2)]).is_none());
        assert!(stash.add(vec![doc(60, "a", 3)]).is_none());

        assert_eq!(stash.len(), 1);
        assert_eq!(stash.dump()[0].meter("count"), Some(6));
    }

    #[test]
    fn test_distinct_tags_take_separate_slots() {
        let mut stash = Stash::new(4, WINDOW);
        assert!(stash.add(vec![doc(60, "a", 1), doc(60, "b", 1)]).is_none());
        assert_eq!(stash.len(), 2);
        assert_eq!(stash.dump()[0].tag("key"), Some("a"));
        assert_eq!(stash.dump()[1].tag("key"), Some("b"));
    }

    #[test]
    fn test_capacity_returns_residual() {
        let mut stash = Stash::new(2, WINDOW);
        let residual = stash
            .add(vec![doc(60, "a", 1), doc(60, "b", 1), doc(60, "c", 1), doc(60, "d", 1)])
            .unwrap();

        assert_eq!(stash.len(), 2);
        assert_eq!(residual.len(), 2);
        assert_eq!(residual[0].tag("key"), Some("c"));
        assert_eq!(residual[1].tag("key"), Some("d"));
    }

    #[test]
    fn test_full_stash_still_merges() {
        let mut stash = Stash::new(1, WINDOW);
        assert!(stash.add(vec![doc(60, "a", 1)]).is_none());
        assert!(stash.add(vec![doc(60, "a", 5)]).is_none());
        assert_eq!(stash.dump()[0].meter("count"), Some(6));
    }

    #[test]
    fn test_out_of_window_on_non_empty_stash() {
        let mut stash = Stash::new(8, WINDOW);
        assert!(stash.add(vec![doc(125, "a", 1)]).is_none());
        assert_eq!(stash.window_start(), Some(120));

        assert!(stash.add(vec![doc(179, "b", 1)]).is_none());

        let residual = stash.add(vec![doc(180, "c", 1), doc(130, "d", 1)]).unwrap();
        assert_eq!(residual.len(), 2);
        assert_eq!(stash.len(), 2);
    }

    #[test]
    fn test_empty_stash_accepts_any_window() {
        let mut stash = Stash::new(8, WINDOW);
        assert!(
            stash
                .add(vec![doc(60, "a", 1), doc(600, "b", 1), doc(6000, "c", 1)])
                .is_none()
        );
        assert_eq!(stash.len(), 3);
        assert_eq!(stash.window_start(), Some(60));
    }

    #[test]
    fn test_clear_resets_window_and_index() {
        let mut stash = Stash::new(2, WINDOW);
        assert!(stash.add(vec![doc(60, "a", 1), doc(60, "b", 1)]).is_none());
        stash.clear();

        assert!(stash.is_empty());
        assert_eq!(stash.window_start(), None);

        assert!(stash.add(vec![doc(900, "a", 1), doc(901, "b", 1)]).is_none());
        assert_eq!(stash.dump()[0].meter("count"), Some(1));
        assert_eq!(stash.window_start(), Some(900));
    }

    #[test]
    fn test_add_after_clear_below_capacity_succeeds() {
        let mut stash = Stash::new(3, WINDOW);
        let residual = stash.add((0..5).map(|i| doc(60, &i.to_string(), 1)).collect());
        assert_eq!(residual.map(|r| r.len()), Some(2));

        stash.clear();
        let batch: Vec<_> = (0..3).map(|i| doc(7200 + i * 100, "x", 1)).collect();
        assert!(stash.add(batch).is_none());
    }

    #[test]
    fn test_dump_does_not_clear() {
        let mut stash = Stash::new(2, WINDOW);
        assert!(stash.add(vec![doc(60, "a", 1)]).is_none());
        assert_eq!(stash.dump().len(), 1);
        assert_eq!(stash.dump().len(), 1);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let mut stash = Stash::new(4, Duration::from_secs(u64::MAX));
        assert!(stash.add(vec![doc(5, "a", 1)]).is_none());
        assert_eq!(stash.window_start(), Some(0));
        assert!(stash.add(vec![doc(u32::MAX - 1, "b", 1)]).is_none());
        assert_eq!(stash.len(), 2);
    }
}
