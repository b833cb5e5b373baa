//! Format definitions for merge and vocabulary files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the optional first line of a merge-operations file.
pub const VERSION_HEADER: &str = "#version:";

/// One line of a vocabulary file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Subword unit, with the separator suffix if it is not word-final
    pub unit: String,
    pub frequency: u64,
}

impl VocabEntry {
    pub fn new(unit: impl Into<String>, frequency: u64) -> Self {
        Self {
            unit: unit.into(),
            frequency,
        }
    }
}

impl fmt::Display for VocabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.unit, self.frequency)
    }
}
