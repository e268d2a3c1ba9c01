//! Priority frontier shared by both search engines.
//!
//! Entries are ordered by a single integer priority. Ties go to the entry
//! pushed first, so exploration order never depends on how states compare.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One frontier entry: the state reached and the label it was reached with.
#[derive(Debug)]
pub(crate) struct Entry<S> {
    priority: u64,
    seq: u64,
    pub(crate) cost: u64,
    pub(crate) state: S,
}

impl<S> PartialEq for Entry<S> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<S> Eq for Entry<S> {}

impl<S> PartialOrd for Entry<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Entry<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.seq).cmp(&(other.priority, other.seq))
    }
}

/// Min-priority queue with first-in-first-out tie-breaking.
#[derive(Debug)]
pub(crate) struct Frontier<S> {
    heap: BinaryHeap<Reverse<Entry<S>>>,
    next_seq: u64,
    pushed: usize,
}

impl<S> Frontier<S> {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            pushed: 0,
        }
    }

    /// Push `state` with its label `cost`, ordered by `priority`.
    pub(crate) fn push(&mut self, priority: u64, cost: u64, state: S) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pushed += 1;
        self.heap.push(Reverse(Entry {
            priority,
            seq,
            cost,
            state,
        }));
    }

    /// Remove the entry with the lowest priority.
    pub(crate) fn pop(&mut self) -> Option<Entry<S>> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    /// Total number of pushes so far.
    pub(crate) fn pushed(&self) -> usize {
        self.pushed
    }
}
