//! Reading and writing merge-operations and vocabulary files.
//!
//! Both formats are plain UTF-8 text with one entry per line:
//! `left right` for merges (optionally preceded by a `#version:` header) and
//! `unit frequency` for vocabularies.

pub mod format;
pub mod load;
pub mod save;

pub use format::{VocabEntry, VERSION_HEADER};
pub use load::ModelLoader;
pub use save::ModelSaver;
