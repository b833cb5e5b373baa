//! jointbpe-training - BPE merge learning
//!
//! This crate provides the training side of joint BPE: counting words in one
//! or more corpora and learning an ordered list of merge operations from the
//! combined counts.
//!
//! # Features
//!
//! - Word counting over line chunks on a configurable worker pool
//! - Incremental pair statistics restricted to the words a merge touches
//! - Deterministic merge selection (frequency, then length, then lexicographic)
//!
//! # Example
//!
//! ```rust
//! use jointbpe_training::{BpeTrainer, TrainingConfig, WordCounts};
//!
//! let words = WordCounts::from_text("low low lower newest widest", 1)?;
//! let config = TrainingConfig::builder()
//!     .symbols(2)
//!     .min_frequency(1)
//!     .build()?;
//!
//! let output = BpeTrainer::new(config).train(&words)?;
//! assert_eq!(output.merges.len(), 2);
//! # Ok::<(), jointbpe_training::BpeError>(())
//! ```

pub use jointbpe_core::{BpeError, Result};

pub mod training;
pub use training::{
    with_workers, BpeTrainer, PairStats, StopReason, TrainingConfig, TrainingConfigBuilder,
    TrainingOutput, Word, WordCounts,
};
