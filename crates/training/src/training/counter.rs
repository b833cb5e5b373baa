//! Word frequency counting.
//!
//! This module turns raw text (or pre-counted `word frequency` dictionaries)
//! into a [`WordCounts`] table. Raw text is split into line chunks that are
//! counted by independent workers; the partial tables are then summed in chunk
//! order, so both the counts and the first-occurrence order of words are the
//! same for any number of workers.

use super::pool::with_workers;
use ahash::{AHashMap, AHashSet};
use compact_str::CompactString;
use jointbpe_core::{BpeError, Result};
use rayon::prelude::*;
use std::path::Path;

/// Word -> frequency table that remembers first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    /// Word -> position in `words`
    index: AHashMap<CompactString, usize>,
    /// (word, frequency) in first-occurrence order
    words: Vec<(CompactString, u64)>,
}

impl WordCounts {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of a word. Zero counts are ignored.
    pub fn add_word(&mut self, word: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.index.get(word) {
            Some(&pos) => self.words[pos].1 += count,
            None => {
                let word = CompactString::new(word);
                self.index.insert(word.clone(), self.words.len());
                self.words.push((word, count));
            }
        }
    }

    /// Count every whitespace-delimited token of `text`.
    pub fn add_text(&mut self, text: &str) {
        for word in text.split_whitespace() {
            self.add_word(word, 1);
        }
    }

    /// Add all counts of `other`; words new to `self` keep `other`'s order.
    pub fn merge(&mut self, other: WordCounts) {
        if self.words.is_empty() {
            *self = other;
            return;
        }
        for (word, count) in other.words {
            self.add_word(&word, count);
        }
    }

    /// Add all counts of `other` without consuming it.
    pub fn add_counts(&mut self, other: &WordCounts) {
        for (word, count) in &other.words {
            self.add_word(word, *count);
        }
    }

    /// Count raw text, one segment per line, using `workers` threads
    /// (0 = all available cores).
    pub fn from_text(text: &str, workers: usize) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        with_workers(workers, || count_lines(&lines))
    }

    /// Parse a pre-counted dictionary: one `word frequency` entry per line.
    ///
    /// Blank lines are skipped. A line without exactly two fields or with a
    /// non-numeric frequency is an error naming the line.
    pub fn from_dict(text: &str) -> Result<Self> {
        let mut counts = Self::new();
        for (line_num, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => continue,
                [word, freq] => {
                    let freq = freq.parse::<u64>().map_err(|_| BpeError::InvalidEntry {
                        line: line_num + 1,
                        content: line.to_string(),
                    })?;
                    counts.add_word(word, freq);
                }
                _ => {
                    return Err(BpeError::InvalidEntry {
                        line: line_num + 1,
                        content: line.to_string(),
                    })
                }
            }
        }
        Ok(counts)
    }

    /// Read and count a corpus file.
    pub fn from_file(path: &Path, is_dict: bool, workers: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        if is_dict {
            Self::from_dict(&text)
        } else {
            Self::from_text(&text, workers)
        }
    }

    /// Frequency of a word, if present.
    pub fn get(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&pos| self.words[pos].1)
    }

    /// Distinct characters of all words, in first-occurrence order.
    pub fn characters(&self) -> Vec<char> {
        let mut seen = AHashSet::new();
        let mut chars = Vec::new();
        for (word, _) in &self.words {
            for c in word.chars() {
                if seen.insert(c) {
                    chars.push(c);
                }
            }
        }
        chars
    }

    /// Iterate over (word, frequency) in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.words.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// (word, frequency) entries in first-occurrence order.
    pub fn entries(&self) -> &[(CompactString, u64)] {
        &self.words
    }

    /// Get the number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Get the total count of all word occurrences.
    pub fn total_occurrences(&self) -> u64 {
        self.words.iter().map(|(_, c)| c).sum()
    }
}

/// Count lines in contiguous chunks, one per worker thread.
fn count_lines(lines: &[&str]) -> WordCounts {
    if lines.is_empty() {
        return WordCounts::new();
    }
    let chunks = rayon::current_num_threads().max(1);
    let chunk_size = lines.len().div_ceil(chunks);

    let partials: Vec<WordCounts> = lines
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut counts = WordCounts::new();
            for line in chunk {
                counts.add_text(line);
            }
            counts
        })
        .collect();

    partials
        .into_iter()
        .fold(WordCounts::new(), |mut acc, partial| {
            acc.merge(partial);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_text() {
        let mut counts = WordCounts::new();
        counts.add_text("the cat  sat\ton the mat");

        assert_eq!(counts.len(), 5);
        assert_eq!(counts.get("the"), Some(2));
        assert_eq!(counts.get("sat"), Some(1));
        assert_eq!(counts.get("dog"), None);
        assert_eq!(counts.total_occurrences(), 6);
    }

    #[test]
    fn test_first_occurrence_order() {
        let mut counts = WordCounts::new();
        counts.add_text("b a b c a");

        let words: Vec<&str> = counts.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["b", "a", "c"]);
        assert_eq!(counts.characters(), vec!['b', 'a', 'c']);
    }

    #[test]
    fn test_from_text_independent_of_workers() {
        let text: String = (0..200)
            .map(|i| format!("w{} shared line{}\n", i % 7, i % 3))
            .collect();

        let single = WordCounts::from_text(&text, 1).unwrap();
        let many = WordCounts::from_text(&text, 4).unwrap();

        assert_eq!(single, many);
        assert_eq!(single.get("shared"), Some(200));
        assert_eq!(single.total_occurrences(), 600);
    }

    #[test]
    fn test_from_text_empty() {
        let counts = WordCounts::from_text("", 2).unwrap();
        assert!(counts.is_empty());
        assert!(counts.characters().is_empty());
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut a = WordCounts::new();
        a.add_text("x y");
        let mut b = WordCounts::new();
        b.add_text("y z z");

        a.merge(b);
        assert_eq!(a.get("x"), Some(1));
        assert_eq!(a.get("y"), Some(2));
        assert_eq!(a.get("z"), Some(2));
        let words: Vec<&str> = a.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_add_counts_keeps_other() {
        let mut combined = WordCounts::new();
        let first = WordCounts::from_dict("low 2\nnew 1\n").unwrap();
        let second = WordCounts::from_dict("new 3\nwide 1\n").unwrap();

        combined.add_counts(&first);
        combined.add_counts(&second);

        assert_eq!(combined.get("new"), Some(4));
        assert_eq!(second.get("new"), Some(3));
        let words: Vec<&str> = combined.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["low", "new", "wide"]);
    }

    #[test]
    fn test_from_dict() {
        let counts = WordCounts::from_dict("low 5\n\nlower 2\r\nlow 1\n").unwrap();
        assert_eq!(counts.get("low"), Some(6));
        assert_eq!(counts.get("lower"), Some(2));
    }

    #[test]
    fn test_from_dict_skips_zero_counts() {
        let counts = WordCounts::from_dict("ab 0\ncd 3\n").unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("ab"), None);
        assert_eq!(counts.get("cd"), Some(3));
    }

    #[test]
    fn test_from_dict_rejects_malformed_line() {
        let err = WordCounts::from_dict("low 5\nlower\n").unwrap_err();
        match err {
            BpeError::InvalidEntry { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "lower");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(WordCounts::from_dict("low many\n").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = WordCounts::from_file(Path::new("/nonexistent/corpus.txt"), false, 1).unwrap_err();
        assert!(matches!(err, BpeError::Io { .. }));
    }
}
