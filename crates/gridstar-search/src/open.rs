//! The open set: a binary heap of node references with lazy deletion.
//!
//! A node whose cost improves while it is still queued gets a second entry
//! instead of a decrease-key. Each entry remembers the `g` it was pushed
//! with; when popped, entries whose `g` no longer matches the node are
//! stale and the search skips them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Reference into the grid's node storage, ordered for `BinaryHeap`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct OpenEntry {
    pub(crate) idx: usize,
    /// `g` of the node when this entry was pushed.
    pub(crate) g: i32,
    /// Priority key `g + h`.
    pub(crate) f: i32,
    /// Insertion order, for first-seen-first-served tie-breaking.
    pub(crate) seq: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f, then oldest.
        other.f.cmp(&self.f).then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of [`OpenEntry`]s that stamps each push with a sequence
/// number.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    next_seq: u64,
}

impl OpenSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, idx: usize, g: i32, f: i32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(OpenEntry { idx, g, f, seq });
    }

    pub(crate) fn pop(&mut self) -> Option<OpenEntry> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_f_first() {
        let mut open = OpenSet::new();
        open.push(0, 0, 9);
        open.push(1, 0, 3);
        open.push(2, 0, 5);
        let order: Vec<usize> = std::iter::from_fn(|| open.pop()).map(|e| e.idx).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut open = OpenSet::new();
        for idx in [7, 3, 5, 1] {
            open.push(idx, 0, 4);
        }
        assert_eq!(open.len(), 4);
        let order: Vec<usize> = std::iter::from_fn(|| open.pop()).map(|e| e.idx).collect();
        assert_eq!(order, vec![7, 3, 5, 1]);
    }

    #[test]
    fn duplicate_entries_keep_their_tag() {
        let mut open = OpenSet::new();
        open.push(4, 6, 10);
        open.push(4, 5, 9);
        let first = open.pop().unwrap();
        assert_eq!((first.idx, first.g), (4, 5));
        let stale = open.pop().unwrap();
        assert_eq!((stale.idx, stale.g), (4, 6));
        assert!(open.pop().is_none());
    }
}
