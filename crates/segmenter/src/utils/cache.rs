//! Segmentation cache for repeated words.
//!
//! Corpora repeat the same words constantly, so each worker keeps a
//! [`SegmentCache`] mapping a word's surface string to its segmentation.

use ahash::AHashMap;
use compact_str::CompactString;
use std::collections::VecDeque;

/// Word -> segmentation memo.
///
/// Unbounded by default. With a capacity the oldest entry is evicted first.
#[derive(Debug, Default)]
pub struct SegmentCache {
    /// The cache storing word -> units
    entries: AHashMap<CompactString, Vec<CompactString>>,
    /// Maximum number of entries, if bounded
    capacity: Option<usize>,
    /// Insertion order for eviction (only tracked when bounded)
    insertion_order: VecDeque<CompactString>,
    hits: u64,
    misses: u64,
}

impl SegmentCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `capacity` words (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: AHashMap::with_capacity(capacity),
            capacity: Some(capacity),
            insertion_order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Get the cached segmentation of `word` or compute it with `segment`.
    pub fn get_or_segment<F>(&mut self, word: &str, segment: F) -> &[CompactString]
    where
        F: FnOnce(&str) -> Vec<CompactString>,
    {
        if self.entries.contains_key(word) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let units = segment(word);
            self.insert(CompactString::new(word), units);
        }
        &self.entries[word]
    }

    fn insert(&mut self, key: CompactString, units: Vec<CompactString>) {
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                match self.insertion_order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.insertion_order.push_back(key.clone());
        }
        self.entries.insert(key, units);
    }

    /// Clear all entries and statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of cached words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            hit_rate: (lookups > 0).then(|| self.hits as f64 / lookups as f64),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity, None when unbounded
    pub capacity: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    /// Hit rate (None before the first lookup)
    pub hit_rate: Option<f64>,
}
