//! jointbpe-core - Core data structures for joint BPE learning
//!
//! This crate provides the building blocks shared by the learner and the
//! segmenter: symbol interning, ordered merge lists, id-based merge rules,
//! the merge candidate priority queue and the common error type.
//!
//! # Example
//!
//! ```rust
//! use jointbpe_core::{MergeList, MergeOp, MergeRules, SymbolTable};
//!
//! let mut list = MergeList::default();
//! list.push(MergeOp::new("l", "o"));
//!
//! let mut symbols = SymbolTable::new();
//! let rules = MergeRules::from_list(&list, &mut symbols);
//! assert_eq!(rules.len(), 1);
//! ```

pub mod error;
pub use error::{BpeError, Result};

pub mod core;
pub use core::{
    initial_symbols, strip_end_of_word, CodesVersion, MergeCandidate, MergeList, MergeMap,
    MergeOp, MergeRules, Pair, PairPriorityQueue, SymbolTable, END_OF_WORD,
};
