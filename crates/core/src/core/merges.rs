//! Merge operations and merge rule lookup.
//!
//! A learned model is an ordered [`MergeList`] of string pairs; its position is
//! the rank of each merge. [`MergeRules`] is the id-based lookup built from a
//! list for fast segmentation.

use crate::core::symbols::SymbolTable;
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pair of symbol IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, merged_symbol_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Format version of a merge-operations file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodesVersion {
    /// `</w>` is a standalone symbol after the last character
    V0_1,
    /// `</w>` is folded into the last character's symbol
    #[default]
    V0_2,
}

impl CodesVersion {
    /// Parse the `X.Y` part of a `#version: X.Y` header.
    pub fn parse(version: &str) -> Option<Self> {
        match version.trim() {
            "0.1" => Some(Self::V0_1),
            "0.2" => Some(Self::V0_2),
            _ => None,
        }
    }

    /// The `X.Y` string written in headers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V0_1 => "0.1",
            Self::V0_2 => "0.2",
        }
    }
}

/// A single learned merge: `left right -> leftright`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeOp {
    pub left: CompactString,
    pub right: CompactString,
}

impl MergeOp {
    pub fn new(left: impl Into<CompactString>, right: impl Into<CompactString>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The symbol produced by this merge.
    pub fn merged(&self) -> CompactString {
        let mut merged = self.left.clone();
        merged.push_str(&self.right);
        merged
    }
}

impl fmt::Display for MergeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.left, self.right)
    }
}

/// Ordered list of merges; index = rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeList {
    pub version: CodesVersion,
    pub merges: Vec<MergeOp>,
}

impl MergeList {
    pub fn new(version: CodesVersion) -> Self {
        Self {
            version,
            merges: Vec::new(),
        }
    }

    pub fn push(&mut self, merge: MergeOp) {
        self.merges.push(merge);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergeOp> {
        self.merges.iter()
    }

    /// Keep only the `n` highest-priority merges.
    pub fn truncate(&mut self, n: usize) {
        self.merges.truncate(n);
    }
}

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, merged_symbol_id)
    merges: MergeMap,
    /// Reverse mapping: merged_symbol_id -> pair that produced it
    reverse: AHashMap<u32, Pair>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build rules from an ordered list, interning every symbol in `symbols`.
    ///
    /// When the same pair appears twice the first (lowest rank) occurrence wins.
    pub fn from_list(list: &MergeList, symbols: &mut SymbolTable) -> Self {
        let mut rules = Self {
            merges: MergeMap::with_capacity(list.len()),
            reverse: AHashMap::with_capacity(list.len()),
        };

        for (rank, merge) in list.iter().enumerate() {
            let left = symbols.intern(&merge.left);
            let right = symbols.intern(&merge.right);
            let merged = symbols.intern_merged(left, right);
            rules.add_merge((left, right), rank as u32, merged);
        }

        rules
    }

    /// Add a merge rule unless the pair already has one.
    pub fn add_merge(&mut self, pair: Pair, rank: u32, merged: u32) {
        if self.merges.contains_key(&pair) {
            return;
        }
        self.merges.insert(pair, (rank, merged));
        self.reverse.entry(merged).or_insert(pair);
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, merged_symbol_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// The pair whose merge produced `merged`, if any.
    #[inline]
    pub fn split(&self, merged: u32) -> Option<Pair> {
        self.reverse.get(&merged).copied()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(pairs: &[(&str, &str)]) -> MergeList {
        let mut list = MergeList::default();
        for &(l, r) in pairs {
            list.push(MergeOp::new(l, r));
        }
        list
    }

    #[test]
    fn test_from_list_ranks() {
        let mut symbols = SymbolTable::new();
        let rules = MergeRules::from_list(&list(&[("l", "o"), ("lo", "w</w>")]), &mut symbols);

        let l = symbols.get_id("l").unwrap();
        let o = symbols.get_id("o").unwrap();
        let lo = symbols.get_id("lo").unwrap();
        let w = symbols.get_id("w</w>").unwrap();
        let low = symbols.get_id("low</w>").unwrap();

        assert_eq!(rules.get((l, o)), Some((0, lo)));
        assert_eq!(rules.get((lo, w)), Some((1, low)));
        assert_eq!(rules.get((o, l)), None);
        assert_eq!(rules.split(low), Some((lo, w)));
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let mut symbols = SymbolTable::new();
        let rules = MergeRules::from_list(&list(&[("a", "b"), ("c", "d"), ("a", "b")]), &mut symbols);

        let a = symbols.get_id("a").unwrap();
        let b = symbols.get_id("b").unwrap();
        assert_eq!(rules.get((a, b)).map(|(rank, _)| rank), Some(0));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_truncate_keeps_highest_priority() {
        let mut merges = list(&[("l", "o"), ("lo", "w"), ("e", "s")]);
        merges.truncate(2);
        assert_eq!(merges.merges, vec![MergeOp::new("l", "o"), MergeOp::new("lo", "w")]);

        merges.truncate(10);
        assert_eq!(merges.len(), 2);
    }

    #[test]
    fn test_codes_version() {
        assert_eq!(CodesVersion::parse(" 0.2"), Some(CodesVersion::V0_2));
        assert_eq!(CodesVersion::parse("0.1"), Some(CodesVersion::V0_1));
        assert_eq!(CodesVersion::parse("1.0"), None);
        assert_eq!(CodesVersion::default().as_str(), "0.2");
    }

    #[test]
    fn test_merge_op_display() {
        let merge = MergeOp::new("e", "s");
        assert_eq!(merge.to_string(), "e s");
        assert_eq!(merge.merged(), "es");
    }
}
