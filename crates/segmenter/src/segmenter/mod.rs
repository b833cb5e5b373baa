//! Merge application.
//!
//! A [`Segmenter`] replays a learned merge list on single words: the word
//! starts as characters (end-of-word marker on the last one) and the adjacent
//! pair with the lowest rank is merged everywhere until no learned pair is
//! left. Units are returned as slices of the original word, so joining them
//! always reproduces it.

use crate::io::{ModelLoader, VocabEntry};
use crate::utils::SegmentCache;
use ahash::AHashSet;
use compact_str::CompactString;
use jointbpe_core::{
    strip_end_of_word, CodesVersion, MergeList, MergeRules, Result, SymbolTable, END_OF_WORD,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default suffix marking a unit that does not end a word.
pub const DEFAULT_SEPARATOR: &str = "@@";

/// Symbol id for characters that no merge mentions.
const UNKNOWN: u32 = u32::MAX;

/// Options for building a [`Segmenter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterOptions {
    /// Suffix appended to non-final units when rendering
    pub separator: String,
    /// Use only the first N merges of the list
    pub max_merges: Option<usize>,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_merges: None,
        }
    }
}

impl SegmenterOptions {
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn max_merges(mut self, max_merges: usize) -> Self {
        self.max_merges = Some(max_merges);
        self
    }
}

/// Set of units allowed in the output.
///
/// Non-final units are stored and looked up with the separator suffix, the
/// same way they appear in a vocabulary file.
#[derive(Debug, Clone, Default)]
pub struct VocabularyFilter {
    units: AHashSet<String>,
}

impl VocabularyFilter {
    /// Keep the entries whose frequency is at least `threshold`.
    pub fn new(entries: &[VocabEntry], threshold: u64) -> Self {
        let units = entries
            .iter()
            .filter(|entry| entry.frequency >= threshold)
            .map(|entry| entry.unit.clone())
            .collect();
        Self { units }
    }

    /// Check a unit, appending `separator` unless it ends the word.
    pub fn contains(&self, unit: &str, is_final: bool, separator: &str) -> bool {
        if is_final {
            self.units.contains(unit)
        } else {
            let mut key = String::with_capacity(unit.len() + separator.len());
            key.push_str(unit);
            key.push_str(separator);
            self.units.contains(&key)
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// A symbol of the word being segmented: its id and byte span in the word.
#[derive(Debug, Clone, Copy)]
struct Piece {
    id: u32,
    start: usize,
    end: usize,
}

/// Applies a learned merge list to words.
///
/// Immutable once built; share it across threads and give each worker its
/// own [`SegmentCache`].
#[derive(Debug, Clone)]
pub struct Segmenter {
    symbols: SymbolTable,
    rules: MergeRules,
    version: CodesVersion,
    separator: String,
    vocabulary: Option<VocabularyFilter>,
}

impl Segmenter {
    /// Build a segmenter from a merge list.
    pub fn new(merges: &MergeList, options: SegmenterOptions) -> Self {
        let mut list = merges.clone();
        if let Some(limit) = options.max_merges {
            list.truncate(limit);
        }

        let mut symbols = SymbolTable::with_capacity(list.len() * 2);
        let rules = MergeRules::from_list(&list, &mut symbols);

        Self {
            symbols,
            rules,
            version: merges.version,
            separator: options.separator,
            vocabulary: None,
        }
    }

    /// Load a merge-operations file and build a segmenter from it.
    pub fn from_file(path: &Path, options: SegmenterOptions) -> Result<Self> {
        let merges = ModelLoader::load_merges(path)?;
        Ok(Self::new(&merges, options))
    }

    /// Restrict output units to `vocabulary`.
    pub fn with_vocabulary(mut self, vocabulary: VocabularyFilter) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Number of distinct merge rules in use.
    pub fn num_merges(&self) -> usize {
        self.rules.len()
    }

    pub fn version(&self) -> CodesVersion {
        self.version
    }

    /// Segment a single word into units, without separators.
    ///
    /// The last unit is word-final. An empty word has no units.
    pub fn segment(&self, word: &str) -> Vec<CompactString> {
        let mut pieces = self.initial_pieces(word);
        self.apply_merges(&mut pieces);

        if self.version == CodesVersion::V0_1 {
            // the standalone marker has an empty span
            while pieces.last().is_some_and(|p| p.start == p.end) {
                pieces.pop();
            }
        }

        if let Some(vocabulary) = &self.vocabulary {
            pieces = self.filter_pieces(word, pieces, vocabulary);
        }

        pieces
            .iter()
            .map(|p| CompactString::new(&word[p.start..p.end]))
            .collect()
    }

    /// Segment a word through a per-worker cache.
    pub fn segment_cached<'c>(&self, word: &str, cache: &'c mut SegmentCache) -> &'c [CompactString] {
        cache.get_or_segment(word, |w| self.segment(w))
    }

    /// Render units: the separator is appended to all but the last one.
    pub fn render(&self, units: &[CompactString]) -> Vec<String> {
        let last = units.len().saturating_sub(1);
        units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                if i < last {
                    format!("{unit}{}", self.separator)
                } else {
                    unit.to_string()
                }
            })
            .collect()
    }

    /// Segment every whitespace-separated token of `text` and join the
    /// rendered units with single spaces.
    pub fn segment_tokens(&self, text: &str, cache: &mut SegmentCache) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for token in text.split_whitespace() {
            let rendered = self.render(self.segment_cached(token, cache));
            for unit in rendered {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&unit);
            }
        }
        out
    }

    /// Segment one line, keeping its leading and trailing whitespace.
    pub fn process_line(&self, line: &str, cache: &mut SegmentCache) -> String {
        let trimmed_start = line.trim_start();
        let leading = &line[..line.len() - trimmed_start.len()];
        let content = trimmed_start.trim_end();
        let trailing = &trimmed_start[content.len()..];

        let mut out = String::with_capacity(line.len() * 2);
        out.push_str(leading);
        out.push_str(&self.segment_tokens(content, cache));
        out.push_str(trailing);
        out
    }

    fn initial_pieces(&self, word: &str) -> Vec<Piece> {
        let mut pieces = Vec::with_capacity(word.len() + 1);
        let mut chars = word.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            let end = start + c.len_utf8();
            let is_last = chars.peek().is_none();
            let symbol = &word[start..end];

            let id = if is_last && self.version == CodesVersion::V0_2 {
                let mut marked = CompactString::new(symbol);
                marked.push_str(END_OF_WORD);
                self.lookup(&marked)
            } else {
                self.lookup(symbol)
            };
            pieces.push(Piece { id, start, end });
        }

        if self.version == CodesVersion::V0_1 && !pieces.is_empty() {
            pieces.push(Piece {
                id: self.lookup(END_OF_WORD),
                start: word.len(),
                end: word.len(),
            });
        }

        pieces
    }

    #[inline]
    fn lookup(&self, symbol: &str) -> u32 {
        self.symbols.get_id(symbol).unwrap_or(UNKNOWN)
    }

    fn rule(&self, left: u32, right: u32) -> Option<(u32, u32)> {
        if left == UNKNOWN || right == UNKNOWN {
            return None;
        }
        self.rules.get((left, right))
    }

    fn apply_merges(&self, pieces: &mut Vec<Piece>) {
        while pieces.len() > 1 {
            let best = pieces
                .windows(2)
                .filter_map(|w| self.rule(w[0].id, w[1].id).map(|r| (r, w[0].id, w[1].id)))
                .min_by_key(|&((rank, _), _, _)| rank);

            let Some(((_, merged), left, right)) = best else {
                break;
            };

            let mut read = 0;
            let mut write = 0;
            while read < pieces.len() {
                if read + 1 < pieces.len()
                    && pieces[read].id == left
                    && pieces[read + 1].id == right
                {
                    pieces[write] = Piece {
                        id: merged,
                        start: pieces[read].start,
                        end: pieces[read + 1].end,
                    };
                    read += 2;
                } else {
                    pieces[write] = pieces[read];
                    read += 1;
                }
                write += 1;
            }
            pieces.truncate(write);
        }
    }

    fn filter_pieces(
        &self,
        word: &str,
        pieces: Vec<Piece>,
        vocabulary: &VocabularyFilter,
    ) -> Vec<Piece> {
        let last = pieces.len().saturating_sub(1);
        let mut out = Vec::with_capacity(pieces.len());
        for (i, piece) in pieces.into_iter().enumerate() {
            self.split_unknown(word, piece, i == last, vocabulary, &mut out);
        }
        out
    }

    /// Split `piece` back through the merge that produced it until every
    /// part is in the vocabulary or cannot be split further.
    fn split_unknown(
        &self,
        word: &str,
        piece: Piece,
        is_final: bool,
        vocabulary: &VocabularyFilter,
        out: &mut Vec<Piece>,
    ) {
        if piece.start == piece.end {
            return;
        }

        let unit = &word[piece.start..piece.end];
        if vocabulary.contains(unit, is_final, &self.separator) {
            out.push(piece);
            return;
        }

        let parts = (piece.id != UNKNOWN)
            .then(|| self.rules.split(piece.id))
            .flatten();
        let Some((left, right)) = parts else {
            out.push(piece);
            return;
        };

        let mid = piece.start + strip_end_of_word(self.symbols.symbol(left)).len();
        if mid > piece.end || !word.is_char_boundary(mid) {
            out.push(piece);
            return;
        }

        self.split_unknown(
            word,
            Piece {
                id: left,
                start: piece.start,
                end: mid,
            },
            is_final && mid == piece.end,
            vocabulary,
            out,
        );
        self.split_unknown(
            word,
            Piece {
                id: right,
                start: mid,
                end: piece.end,
            },
            is_final,
            vocabulary,
            out,
        );
    }
}
