//! Words as arenas of interned symbols.

use jointbpe_core::{initial_symbols, Pair, SymbolTable};

/// A distinct word in its current segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Current segmentation as symbol IDs
    pub symbols: Vec<u32>,
    /// Number of occurrences in the corpus
    pub freq: u64,
}

impl Word {
    pub fn new(symbols: Vec<u32>, freq: u64) -> Self {
        Self { symbols, freq }
    }

    /// Initial segmentation of `text`: its characters, the last one carrying
    /// the end-of-word marker.
    pub fn from_text(text: &str, freq: u64, symbols: &mut SymbolTable) -> Self {
        let ids = initial_symbols(text)
            .iter()
            .map(|s| symbols.intern(s))
            .collect();
        Self::new(ids, freq)
    }

    /// Adjacent symbol pairs, left to right.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols.windows(2).map(|w| (w[0], w[1]))
    }

    /// Replace every non-overlapping occurrence of `pair`, scanning left to
    /// right, with `merged`. Returns whether anything changed.
    pub fn merge(&mut self, pair: Pair, merged: u32) -> bool {
        let len = self.symbols.len();
        let mut read = 0;
        let mut write = 0;
        let mut changed = false;

        while read < len {
            if read + 1 < len && self.symbols[read] == pair.0 && self.symbols[read + 1] == pair.1 {
                self.symbols[write] = merged;
                read += 2;
                changed = true;
            } else {
                self.symbols[write] = self.symbols[read];
                read += 1;
            }
            write += 1;
        }

        self.symbols.truncate(write);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let mut symbols = SymbolTable::new();
        let word = Word::from_text("aba", 3, &mut symbols);

        assert_eq!(word.symbols, vec![0, 1, 2]);
        assert_eq!(symbols.symbol(2), "a</w>");
        assert_eq!(word.freq, 3);
    }

    #[test]
    fn test_merge_left_to_right() {
        // "a a a" merges to "aa a", not "a aa"
        let mut word = Word::new(vec![0, 0, 0], 1);
        assert!(word.merge((0, 0), 9));
        assert_eq!(word.symbols, vec![9, 0]);

        let mut word = Word::new(vec![0, 0, 0, 0], 1);
        assert!(word.merge((0, 0), 9));
        assert_eq!(word.symbols, vec![9, 9]);
    }

    #[test]
    fn test_merge_absent_pair() {
        let mut word = Word::new(vec![1, 2, 3], 1);
        assert!(!word.merge((3, 1), 9));
        assert_eq!(word.symbols, vec![1, 2, 3]);
    }

    #[test]
    fn test_pairs() {
        let word = Word::new(vec![1, 2, 3], 1);
        let pairs: Vec<Pair> = word.pairs().collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3)]);
    }
}
