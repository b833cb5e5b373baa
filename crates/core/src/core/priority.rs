//! Priority queue for BPE merge candidates.
//!
//! Candidates are ordered by frequency, then by shorter combined surface
//! length, then by the lexicographically smaller `(left, right)` symbol pair.
//! The ordering is total, so the best candidate never depends on hash or
//! insertion order.

use crate::core::merges::Pair;
use crate::core::symbols::SymbolTable;
use ahash::AHashMap;
use compact_str::CompactString;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A merge candidate during BPE learning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol IDs to merge
    pub pair: Pair,
    /// The frequency of this pair
    pub count: u64,
    /// Combined surface length of both symbols, in characters
    pub len: usize,
    pub left: CompactString,
    pub right: CompactString,
}

impl MergeCandidate {
    /// Create a candidate, looking up the tie-break key in `symbols`.
    pub fn new(pair: Pair, count: u64, symbols: &SymbolTable) -> Self {
        Self {
            pair,
            count,
            len: symbols.surface_len(pair.0) + symbols.surface_len(pair.1),
            left: CompactString::new(symbols.symbol(pair.0)),
            right: CompactString::new(symbols.symbol(pair.1)),
        }
    }
}

// Max-heap order: the greatest candidate is merged first.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.len.cmp(&self.len))
            .then_with(|| (&other.left, &other.right).cmp(&(&self.left, &self.right)))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge candidates.
///
/// Uses an 8-ary heap for better cache locality than a binary heap. Count
/// changes push a fresh entry; outdated entries are skipped on pop.
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Track current counts to detect stale entries
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Push a merge candidate, superseding any earlier entry for its pair.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.current_counts.insert(candidate.pair, candidate.count);
        self.heap.push(candidate);
    }

    /// Pop the highest priority live candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Drop a pair from the queue; its heap entries become stale.
    pub fn remove(&mut self, pair: Pair) {
        self.current_counts.remove(&pair);
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current_counts.get(&pair).copied()
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}
