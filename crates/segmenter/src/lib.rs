//! jointbpe-segmenter - Applying joint BPE merges
//!
//! This crate covers everything after a merge list exists: segmenting words
//! with it, assembling per-corpus vocabularies, reading and writing the codes
//! and vocabulary files, and the file-level pipelines that tie learning and
//! segmentation together.
//!
//! # Features
//!
//! - Lowest-rank-first merge replay with per-worker segment caches
//! - Optional vocabulary filter that splits rare units back into known parts
//! - Vocabulary assembly with add-one smoothing and entry duplication
//! - `learn_joint`, `learn` and `apply` pipelines over files
//!
//! # Example
//!
//! ```rust
//! use jointbpe_segmenter::{Segmenter, SegmenterOptions, VocabAssembler};
//! use jointbpe_training::{BpeTrainer, TrainingConfig, WordCounts};
//!
//! let words = WordCounts::from_text("low low lower newest widest", 1)?;
//! let config = TrainingConfig::builder().symbols(10).min_frequency(1).build()?;
//! let output = BpeTrainer::new(config).train(&words)?;
//!
//! let segmenter = Segmenter::new(&output.merges, SegmenterOptions::default());
//! assert_eq!(segmenter.segment("lowest").concat(), "lowest");
//!
//! let vocabulary = VocabAssembler::new(&segmenter).assemble(&words);
//! assert!(!vocabulary.is_empty());
//! # Ok::<(), jointbpe_segmenter::BpeError>(())
//! ```

pub use jointbpe_core::{BpeError, Result};

pub mod assembler;
pub mod io;
pub mod pipeline;
pub mod segmenter;
pub mod utils;

pub use assembler::{Duplication, VocabAssembler, DEFAULT_DUPLICATION_MARKER};
pub use io::{ModelLoader, ModelSaver, VocabEntry};
pub use pipeline::{
    apply, learn, learn_joint, ApplyConfig, CorpusReport, JointConfig, JointReport, LearnConfig,
};
pub use segmenter::{Segmenter, SegmenterOptions, VocabularyFilter, DEFAULT_SEPARATOR};
pub use utils::{CacheStats, SegmentCache};
