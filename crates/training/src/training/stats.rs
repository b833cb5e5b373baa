//! Pair statistics for BPE learning.
//!
//! [`PairStats`] holds the frequency of every adjacent symbol pair across all
//! words (weighted by word frequency) and, for each pair, the set of words
//! whose segmentation contains it. After a merge only the words listed for the
//! merged pair are re-examined; their old pairs are subtracted and their new
//! pairs added, which keeps both tables equal to a full recount.

use super::word::Word;
use ahash::{AHashMap, AHashSet};
use jointbpe_core::Pair;
use rayon::prelude::*;

/// Pair frequency table plus pair -> words index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairStats {
    /// Pair -> weighted frequency; pairs with frequency 0 are absent
    counts: AHashMap<Pair, u64>,
    /// Pair -> indices of words containing it at least once
    index: AHashMap<Pair, AHashSet<usize>>,
}

impl PairStats {
    /// Count all pairs of all words sequentially.
    pub fn from_words(words: &[Word]) -> Self {
        let mut stats = Self::default();
        for (idx, word) in words.iter().enumerate() {
            stats.add_word(idx, word);
        }
        stats
    }

    /// Count all pairs in parallel.
    ///
    /// Each worker builds statistics for a share of the words; the partial
    /// tables are then summed.
    pub fn from_words_parallel(words: &[Word]) -> Self {
        words
            .par_iter()
            .enumerate()
            .fold(Self::default, |mut stats, (idx, word)| {
                stats.add_word(idx, word);
                stats
            })
            .reduce(Self::default, |mut acc, stats| {
                acc.absorb(stats);
                acc
            })
    }

    fn add_word(&mut self, idx: usize, word: &Word) {
        if word.freq == 0 {
            return;
        }
        for pair in word.pairs() {
            *self.counts.entry(pair).or_insert(0) += word.freq;
            self.index.entry(pair).or_default().insert(idx);
        }
    }

    fn absorb(&mut self, other: Self) {
        for (pair, count) in other.counts {
            *self.counts.entry(pair).or_insert(0) += count;
        }
        for (pair, words) in other.index {
            self.index.entry(pair).or_default().extend(words);
        }
    }

    /// Frequency of a pair (0 if absent).
    #[inline]
    pub fn count(&self, pair: Pair) -> u64 {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    /// All non-zero pair frequencies.
    pub fn counts(&self) -> &AHashMap<Pair, u64> {
        &self.counts
    }

    /// Indices of the words containing `pair`, ascending.
    pub fn words_containing(&self, pair: Pair) -> Vec<usize> {
        let mut words: Vec<usize> = self
            .index
            .get(&pair)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        words.sort_unstable();
        words
    }

    /// Number of distinct pairs with non-zero frequency.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Replace word `idx`'s contribution from segmentation `old` to `new`.
    ///
    /// Returns the pairs whose frequency changed, sorted.
    pub fn replace_word(&mut self, idx: usize, old: &[u32], new: &[u32], freq: u64) -> Vec<Pair> {
        let mut delta: AHashMap<Pair, i64> = AHashMap::new();
        for w in old.windows(2) {
            *delta.entry((w[0], w[1])).or_insert(0) -= 1;
        }
        for w in new.windows(2) {
            *delta.entry((w[0], w[1])).or_insert(0) += 1;
        }

        let new_pairs: AHashSet<Pair> = new.windows(2).map(|w| (w[0], w[1])).collect();
        for w in old.windows(2) {
            let pair = (w[0], w[1]);
            if new_pairs.contains(&pair) {
                continue;
            }
            if let Some(words) = self.index.get_mut(&pair) {
                words.remove(&idx);
                if words.is_empty() {
                    self.index.remove(&pair);
                }
            }
        }
        for &pair in &new_pairs {
            self.index.entry(pair).or_default().insert(idx);
        }

        let mut changed = Vec::with_capacity(delta.len());
        for (pair, d) in delta {
            if d == 0 {
                continue;
            }
            let amount = d.unsigned_abs() * freq;
            let count = self.counts.entry(pair).or_insert(0);
            if d > 0 {
                *count += amount;
            } else {
                *count -= amount;
            }
            if *count == 0 {
                self.counts.remove(&pair);
            }
            changed.push(pair);
        }
        changed.sort_unstable();
        changed
    }
}
