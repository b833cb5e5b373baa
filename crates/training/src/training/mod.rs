//! Learning infrastructure for BPE merges.
//!
//! This module provides word counting, the word arena, pair statistics and
//! the greedy merge learner.

pub mod counter;
pub mod pool;
pub mod stats;
pub mod trainer;
pub mod word;

pub use counter::WordCounts;
pub use pool::with_workers;
pub use stats::PairStats;
pub use trainer::{BpeTrainer, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingOutput};
pub use word::Word;
