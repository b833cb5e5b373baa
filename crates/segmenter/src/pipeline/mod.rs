//! End-to-end runs over files: joint learning, plain learning and applying.

pub mod apply;
pub mod joint;
pub mod learn;

pub use apply::{apply, build_segmenter, segment_lines, ApplyConfig};
pub use joint::{learn_joint, CorpusReport, JointConfig, JointReport};
pub use learn::{learn, LearnConfig};
