//! Core BPE data structures.
//!
//! This module contains the symbol table, merge lists and rules, and the
//! priority queue shared by learning and segmentation.

pub mod merges;
pub mod priority;
pub mod symbols;

pub use merges::{CodesVersion, MergeList, MergeMap, MergeOp, MergeRules, Pair};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use symbols::{initial_symbols, strip_end_of_word, SymbolTable, END_OF_WORD};
