//! Symbol interning.
//!
//! Every symbol seen during learning or application (single characters,
//! end-of-word marked characters and merged units) is stored once in a
//! [`SymbolTable`] and referred to by a dense `u32` id afterwards, so words can
//! be kept as plain id vectors and pairs compared as integer tuples.

use ahash::AHashMap;
use compact_str::CompactString;

/// Marker appended to the final symbol of every word.
pub const END_OF_WORD: &str = "</w>";

/// Split a word into its initial symbols: one per character, with
/// [`END_OF_WORD`] appended to the last one.
///
/// Returns an empty vector for an empty word.
pub fn initial_symbols(word: &str) -> Vec<CompactString> {
    let mut symbols: Vec<CompactString> = word
        .chars()
        .map(|c| {
            let mut buf = [0u8; 4];
            CompactString::new(c.encode_utf8(&mut buf))
        })
        .collect();
    if let Some(last) = symbols.last_mut() {
        last.push_str(END_OF_WORD);
    }
    symbols
}

/// Strip the end-of-word marker from a symbol, if present.
#[inline]
pub fn strip_end_of_word(symbol: &str) -> &str {
    symbol.strip_suffix(END_OF_WORD).unwrap_or(symbol)
}

/// Bidirectional symbol <-> id mapping with dense ids.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Forward mapping: symbol string -> ID
    ids: AHashMap<CompactString, u32>,
    /// Reverse mapping, indexed by ID
    symbols: Vec<CompactString>,
}

impl SymbolTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: AHashMap::with_capacity(capacity),
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Intern a symbol, returning its ID.
    ///
    /// Interning an existing symbol returns the ID it already has.
    pub fn intern(&mut self, symbol: &str) -> u32 {
        if let Some(&id) = self.ids.get(symbol) {
            return id;
        }

        let id = self.symbols.len() as u32;
        let symbol = CompactString::new(symbol);
        self.symbols.push(symbol.clone());
        self.ids.insert(symbol, id);
        id
    }

    /// Intern the concatenation of two interned symbols.
    pub fn intern_merged(&mut self, left: u32, right: u32) -> u32 {
        let merged = self.merged(left, right);
        self.intern(&merged)
    }

    /// Concatenation of two interned symbols.
    pub fn merged(&self, left: u32, right: u32) -> CompactString {
        let mut merged = CompactString::new(self.symbol(left));
        merged.push_str(self.symbol(right));
        merged
    }

    /// Get the ID for a symbol string.
    #[inline]
    pub fn get_id(&self, symbol: &str) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    /// Get the symbol string for an ID.
    #[inline]
    pub fn get_symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    /// Symbol string for an ID produced by this table.
    ///
    /// # Panics
    /// Panics if `id` was not handed out by this table.
    #[inline]
    pub fn symbol(&self, id: u32) -> &str {
        &self.symbols[id as usize]
    }

    /// Length in characters of the symbol's surface form (marker excluded).
    pub fn surface_len(&self, id: u32) -> usize {
        strip_end_of_word(self.symbol(id)).chars().count()
    }

    /// Number of interned symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern() {
        let mut table = SymbolTable::new();
        let id1 = table.intern("lo");
        let id2 = table.intern("w</w>");

        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(table.get_id("lo"), Some(0));
        assert_eq!(table.get_symbol(1), Some("w</w>"));
        assert_eq!(table.get_symbol(2), None);
    }

    #[test]
    fn test_intern_duplicate() {
        let mut table = SymbolTable::new();
        let id1 = table.intern("e");
        let id2 = table.intern("e");

        assert_eq!(id1, id2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_intern_merged() {
        let mut table = SymbolTable::new();
        let l = table.intern("lo");
        let r = table.intern("w</w>");
        let merged = table.intern_merged(l, r);

        assert_eq!(table.symbol(merged), "low</w>");
        assert_eq!(table.surface_len(merged), 3);
    }

    #[test]
    fn test_initial_symbols() {
        assert_eq!(initial_symbols("añb"), vec!["a", "ñ", "b</w>"]);
        assert_eq!(initial_symbols("x"), vec!["x</w>"]);
        assert!(initial_symbols("").is_empty());
    }

    #[test]
    fn test_strip_end_of_word() {
        assert_eq!(strip_end_of_word("st</w>"), "st");
        assert_eq!(strip_end_of_word("st"), "st");
        assert_eq!(strip_end_of_word("</w>"), "");
    }
}
