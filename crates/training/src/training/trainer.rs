//! BPE trainer implementation.
//!
//! This module implements the greedy merge-learning loop: pick the best pair,
//! record it, merge it in the words that contain it and update the pair
//! statistics from those words only.

use super::counter::WordCounts;
use super::stats::PairStats;
use super::word::Word;
use jointbpe_core::{
    BpeError, CodesVersion, MergeCandidate, MergeList, MergeOp, PairPriorityQueue, Result,
    SymbolTable,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of merge operations to learn
    pub symbols: usize,
    /// Stop once no pair reaches this frequency
    pub min_frequency: u64,
    /// Treat `symbols` as the total symbol budget, initial characters included
    pub total_symbols: bool,
    /// Count initial pair statistics in parallel
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            symbols: 10_000,
            min_frequency: 2,
            total_symbols: false,
            parallel: true,
        }
    }
}

impl TrainingConfig {
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the configuration before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the number of merges to learn.
    pub fn symbols(mut self, symbols: usize) -> Self {
        self.config.symbols = symbols;
        self
    }

    /// Set the minimum pair frequency.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Count `symbols` as a total vocabulary budget.
    pub fn total_symbols(mut self, total: bool) -> Self {
        self.config.total_symbols = total;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why the learning loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of merges was learned
    TargetReached,
    /// The best remaining pair was below `min_frequency`
    BelowMinFrequency { best: u64 },
    /// No adjacent pair was left in any word
    Exhausted,
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// Learned merges in priority order
    pub merges: MergeList,
    /// Distinct symbols before the first merge
    pub initial_symbols: usize,
    /// Number of merges the run aimed for
    pub target: usize,
    pub stop: StopReason,
}

/// BPE trainer.
///
/// Learns merge operations from a word frequency table by iteratively
/// merging the most frequent adjacent symbol pair.
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Learn merges from `words`.
    pub fn train(&self, words: &WordCounts) -> Result<TrainingOutput> {
        self.config.validate()?;

        let mut state = TrainingState::new(words, self.config.parallel);
        let initial_symbols = state.symbols.len();
        let target = if self.config.total_symbols {
            self.config.symbols.saturating_sub(initial_symbols)
        } else {
            self.config.symbols
        };

        info!(
            "learning up to {} merges from {} distinct words ({} occurrences, {} initial symbols, {} pairs)",
            target,
            words.len(),
            words.total_occurrences(),
            initial_symbols,
            state.stats.len()
        );

        let mut merges = MergeList::new(CodesVersion::V0_2);
        let mut stop = StopReason::TargetReached;

        while merges.len() < target {
            let Some(candidate) = state.queue.pop() else {
                warn!("no pair left to merge after {} merges. Stopping", merges.len());
                stop = StopReason::Exhausted;
                break;
            };

            if candidate.count < self.config.min_frequency {
                warn!(
                    "no pair has frequency >= {}. Stopping",
                    self.config.min_frequency
                );
                stop = StopReason::BelowMinFrequency {
                    best: candidate.count,
                };
                break;
            }

            debug!(
                "pair {}: {} {} -> {}{} (frequency {})",
                merges.len(),
                candidate.left,
                candidate.right,
                candidate.left,
                candidate.right,
                candidate.count
            );

            merges.push(state.apply_merge(&candidate));
        }

        info!("learned {} merges", merges.len());

        Ok(TrainingOutput {
            merges,
            initial_symbols,
            target,
            stop,
        })
    }
}

/// Mutable state of one learning run.
struct TrainingState {
    symbols: SymbolTable,
    words: Vec<Word>,
    stats: PairStats,
    queue: PairPriorityQueue,
}

impl TrainingState {
    fn new(counts: &WordCounts, parallel: bool) -> Self {
        let mut symbols = SymbolTable::new();
        let words: Vec<Word> = counts
            .iter()
            .map(|(text, freq)| Word::from_text(text, freq, &mut symbols))
            .collect();

        let stats = if parallel {
            PairStats::from_words_parallel(&words)
        } else {
            PairStats::from_words(&words)
        };

        let mut queue = PairPriorityQueue::with_capacity(stats.len());
        for (&pair, &count) in stats.counts() {
            queue.push(MergeCandidate::new(pair, count, &symbols));
        }

        Self {
            symbols,
            words,
            stats,
            queue,
        }
    }

    /// Merge `candidate` in every word containing it and refresh the queue
    /// for every pair whose frequency changed.
    fn apply_merge(&mut self, candidate: &MergeCandidate) -> MergeOp {
        let pair = candidate.pair;
        let merged = self.symbols.intern_merged(pair.0, pair.1);

        let mut changed = Vec::new();
        for idx in self.stats.words_containing(pair) {
            let word = &mut self.words[idx];
            let old = word.symbols.clone();
            if word.merge(pair, merged) {
                changed.extend(self.stats.replace_word(idx, &old, &word.symbols, word.freq));
            }
        }

        changed.sort_unstable();
        changed.dedup();
        for pair in changed {
            match self.stats.count(pair) {
                0 => self.queue.remove(pair),
                count => self
                    .queue
                    .push(MergeCandidate::new(pair, count, &self.symbols)),
            }
        }

        MergeOp::new(candidate.left.clone(), candidate.right.clone())
    }
}
