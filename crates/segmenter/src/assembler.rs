//! Per-corpus vocabulary assembly.
//!
//! After learning, every corpus is segmented with the joint merges and its
//! rendered units are counted. The resulting vocabulary lists character units
//! and subword units with add-one smoothing, most frequent first.

use crate::io::VocabEntry;
use crate::segmenter::Segmenter;
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use jointbpe_core::{BpeError, Result};
use jointbpe_training::WordCounts;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default marker framing the copy index of duplicated entries.
pub const DEFAULT_DUPLICATION_MARKER: &str = "複複";

/// Duplication of the most frequent vocabulary entries.
///
/// Each of the `top_n` first entries is followed by `copies` entries named
/// `{marker}{i}{marker}{unit}` for `i` in `1..=copies`, with the same
/// frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Duplication {
    pub top_n: usize,
    pub copies: usize,
    pub marker: String,
}

impl Default for Duplication {
    fn default() -> Self {
        Self {
            top_n: 0,
            copies: 0,
            marker: DEFAULT_DUPLICATION_MARKER.to_string(),
        }
    }
}

impl Duplication {
    pub fn new(top_n: usize, copies: usize) -> Self {
        Self {
            top_n,
            copies,
            ..Self::default()
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Whether expanding would add any entry.
    pub fn is_active(&self) -> bool {
        self.top_n > 0 && self.copies > 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_active() && self.marker.is_empty() {
            return Err(BpeError::InvalidConfig(
                "duplication marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert the marked copies after each of the first `top_n` entries.
    pub fn expand(&self, entries: Vec<VocabEntry>) -> Vec<VocabEntry> {
        if !self.is_active() {
            return entries;
        }

        let extra = self.top_n.min(entries.len()) * self.copies;
        let mut out = Vec::with_capacity(entries.len() + extra);
        for (idx, entry) in entries.into_iter().enumerate() {
            let copies = if idx < self.top_n { self.copies } else { 0 };
            let (unit, frequency) = (entry.unit.clone(), entry.frequency);
            out.push(entry);
            for i in 1..=copies {
                let marked = format!("{m}{i}{m}{unit}", m = self.marker);
                out.push(VocabEntry::new(marked, frequency));
            }
        }
        out
    }
}

/// Builds the vocabulary of one corpus from its word counts.
pub struct VocabAssembler<'a> {
    segmenter: &'a Segmenter,
    duplication: Option<Duplication>,
}

impl<'a> VocabAssembler<'a> {
    pub fn new(segmenter: &'a Segmenter) -> Self {
        Self {
            segmenter,
            duplication: None,
        }
    }

    pub fn with_duplication(mut self, duplication: Option<Duplication>) -> Self {
        self.duplication = duplication;
        self
    }

    /// Segment the corpus and count its rendered units.
    ///
    /// Entries are sorted by descending frequency. Ties keep character units
    /// before subword units. Characters keep the order of their first
    /// standalone occurrence, with never-standalone ones last; subwords keep
    /// the order of first occurrence in the corpus.
    pub fn assemble(&self, corpus: &WordCounts) -> Vec<VocabEntry> {
        let segmented: Vec<(Vec<String>, u64)> = corpus
            .entries()
            .par_iter()
            .map(|(word, count)| {
                let units = self.segmenter.segment(word);
                (self.segmenter.render(&units), *count)
            })
            .collect();

        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut units: Vec<(String, u64)> = Vec::new();
        for (rendered, count) in segmented {
            for unit in rendered {
                match index.get(&unit) {
                    Some(&pos) => units[pos].1 += count,
                    None => {
                        index.insert(unit.clone(), units.len());
                        units.push((unit, count));
                    }
                }
            }
        }

        let characters: Vec<CompactString> = corpus
            .characters()
            .into_iter()
            .map(|c| {
                let mut buf = [0u8; 4];
                CompactString::new(c.encode_utf8(&mut buf))
            })
            .collect();
        let character_set: AHashSet<&str> = characters.iter().map(|c| c.as_str()).collect();

        // characters seen standalone in unit order, then the unseen ones
        let mut entries: Vec<VocabEntry> = Vec::with_capacity(units.len() + characters.len());
        for (unit, count) in &units {
            if character_set.contains(unit.as_str()) {
                entries.push(VocabEntry::new(unit.as_str(), count + 1));
            }
        }
        for c in &characters {
            if !index.contains_key(c.as_str()) {
                entries.push(VocabEntry::new(c.as_str(), 1));
            }
        }
        for (unit, count) in units {
            if !character_set.contains(unit.as_str()) {
                entries.push(VocabEntry::new(unit, count + 1));
            }
        }

        // stable, so ties keep the order built above
        entries.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        debug!(
            "assembled {} entries ({} character units)",
            entries.len(),
            characters.len()
        );

        match &self.duplication {
            Some(duplication) => duplication.expand(entries),
            None => entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::SegmenterOptions;
    use jointbpe_core::{MergeList, MergeOp};

    fn segmenter(pairs: &[(&str, &str)]) -> Segmenter {
        let mut list = MergeList::default();
        for &(l, r) in pairs {
            list.push(MergeOp::new(l, r));
        }
        Segmenter::new(&list, SegmenterOptions::default())
    }

    fn corpus(text: &str) -> WordCounts {
        let mut counts = WordCounts::new();
        counts.add_text(text);
        counts
    }

    #[test]
    fn test_single_repeated_word() {
        let segmenter = segmenter(&[("a", "b"), ("ab", "c</w>")]);
        let entries = VocabAssembler::new(&segmenter).assemble(&corpus("abc abc abc"));

        assert_eq!(
            entries,
            vec![
                VocabEntry::new("abc", 4),
                VocabEntry::new("a", 1),
                VocabEntry::new("b", 1),
                VocabEntry::new("c", 1),
            ]
        );
    }

    #[test]
    fn test_separator_on_non_final_units() {
        let segmenter = segmenter(&[("l", "o"), ("lo", "w</w>"), ("lo", "w")]);
        let entries = VocabAssembler::new(&segmenter).assemble(&corpus("low low lower"));

        // "lower" -> low@@ e@@ r
        assert_eq!(entries[0], VocabEntry::new("low", 3));
        assert!(entries.contains(&VocabEntry::new("low@@", 2)));
        assert!(entries.contains(&VocabEntry::new("e@@", 2)));
        assert!(entries.contains(&VocabEntry::new("r", 2)));
        assert!(entries.contains(&VocabEntry::new("e", 1)));
    }

    #[test]
    fn test_ties_characters_first() {
        let segmenter = segmenter(&[("x", "y</w>")]);
        let entries = VocabAssembler::new(&segmenter).assemble(&corpus("xy z"));

        // "z" and "xy" tie at 2, then the unseen standalone "x" and "y" at 1
        let units: Vec<&str> = entries.iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(units, vec!["z", "xy", "x", "y"]);
        assert_eq!(entries[1].frequency, 2);
        assert_eq!(entries[3].frequency, 1);
    }

    #[test]
    fn test_characters_follow_standalone_order() {
        // "ab ba" -> a@@ b b@@ a: "b" stands alone before "a"
        let segmenter = segmenter(&[]);
        let entries = VocabAssembler::new(&segmenter).assemble(&corpus("ab ba"));

        assert_eq!(
            entries,
            vec![
                VocabEntry::new("b", 2),
                VocabEntry::new("a", 2),
                VocabEntry::new("a@@", 2),
                VocabEntry::new("b@@", 2),
            ]
        );
    }

    #[test]
    fn test_duplication() {
        let segmenter = segmenter(&[("a", "b"), ("ab", "c</w>")]);
        let entries = VocabAssembler::new(&segmenter)
            .with_duplication(Some(Duplication::new(1, 2)))
            .assemble(&corpus("abc abc abc"));

        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], VocabEntry::new("abc", 4));
        assert_eq!(entries[1], VocabEntry::new("複複1複複abc", 4));
        assert_eq!(entries[2], VocabEntry::new("複複2複複abc", 4));
        assert_eq!(entries[3], VocabEntry::new("a", 1));
    }

    #[test]
    fn test_duplication_custom_marker() {
        let duplication = Duplication::new(5, 1).with_marker("#");
        let expanded = duplication.expand(vec![VocabEntry::new("ab", 3)]);
        assert_eq!(
            expanded,
            vec![VocabEntry::new("ab", 3), VocabEntry::new("#1#ab", 3)]
        );

        assert!(!Duplication::default().is_active());
        assert!(Duplication::new(1, 1).with_marker("").validate().is_err());
    }

    #[test]
    fn test_empty_corpus() {
        let segmenter = segmenter(&[]);
        assert!(VocabAssembler::new(&segmenter)
            .assemble(&WordCounts::new())
            .is_empty());
    }
}
