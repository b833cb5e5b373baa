//! Load functionality for learned merges and vocabularies.

use super::format::{VocabEntry, VERSION_HEADER};
use jointbpe_core::{BpeError, CodesVersion, MergeList, MergeOp, Result};
use std::path::Path;

/// Model loader - parses merge-operations and vocabulary files.
pub struct ModelLoader;

impl ModelLoader {
    /// Load a merge-operations file.
    pub fn load_merges(path: &Path) -> Result<MergeList> {
        let content = std::fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        Self::parse_merges(&content)
    }

    /// Parse merge operations, one `left right` pair per line.
    ///
    /// A leading `#version: X.Y` line selects the format version; without it
    /// the file is read as version 0.1. Blank lines are skipped; any other
    /// line without exactly two fields is an error naming its line number.
    pub fn parse_merges(content: &str) -> Result<MergeList> {
        let header = content
            .lines()
            .next()
            .and_then(|first| first.strip_prefix(VERSION_HEADER).map(|v| (first, v)));

        let (version, skip) = match header {
            Some((first, version)) => {
                let version =
                    CodesVersion::parse(version).ok_or_else(|| BpeError::InvalidMerge {
                        line: 1,
                        content: first.to_string(),
                    })?;
                (version, 1)
            }
            None => (CodesVersion::V0_1, 0),
        };

        let mut merges = MergeList::new(version);
        for (line_num, line) in content.lines().enumerate().skip(skip) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => continue,
                [left, right] => merges.push(MergeOp::new(*left, *right)),
                _ => {
                    return Err(BpeError::InvalidMerge {
                        line: line_num + 1,
                        content: line.to_string(),
                    })
                }
            }
        }

        Ok(merges)
    }

    /// Load a vocabulary file.
    pub fn load_vocabulary(path: &Path) -> Result<Vec<VocabEntry>> {
        let content = std::fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        Self::parse_vocabulary(&content)
    }

    /// Parse `unit frequency` lines. Blank lines are skipped.
    pub fn parse_vocabulary(content: &str) -> Result<Vec<VocabEntry>> {
        let mut entries = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            let invalid = || BpeError::InvalidEntry {
                line: line_num + 1,
                content: line.to_string(),
            };
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => continue,
                [unit, frequency] => {
                    let frequency = frequency.parse::<u64>().map_err(|_| invalid())?;
                    entries.push(VocabEntry::new(*unit, frequency));
                }
                _ => return Err(invalid()),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let merges = ModelLoader::parse_merges("#version: 0.2\nl o\ne s\n").unwrap();
        assert_eq!(merges.version, CodesVersion::V0_2);
        assert_eq!(
            merges.merges,
            vec![MergeOp::new("l", "o"), MergeOp::new("e", "s")]
        );
    }

    #[test]
    fn test_parse_without_header() {
        let merges = ModelLoader::parse_merges("l o\r\nlo w\n\n").unwrap();
        assert_eq!(merges.version, CodesVersion::V0_1);
        assert_eq!(merges.len(), 2);
    }

    #[test]
    fn test_parse_empty() {
        let merges = ModelLoader::parse_merges("#version: 0.2\n").unwrap();
        assert!(merges.is_empty());
        assert!(ModelLoader::parse_merges("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_merge_line() {
        let err = ModelLoader::parse_merges("#version: 0.2\nl o\nlow\n").unwrap_err();
        match err {
            BpeError::InvalidMerge { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "low");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_version() {
        let err = ModelLoader::parse_merges("#version: 9.9\nl o\n").unwrap_err();
        assert!(matches!(err, BpeError::InvalidMerge { line: 1, .. }));
    }

    #[test]
    fn test_parse_vocabulary() {
        let entries = ModelLoader::parse_vocabulary("low@@ 4\nest 3\n").unwrap();
        assert_eq!(
            entries,
            vec![VocabEntry::new("low@@", 4), VocabEntry::new("est", 3)]
        );

        let err = ModelLoader::parse_vocabulary("low@@ 4\nest three\n").unwrap_err();
        assert!(matches!(err, BpeError::InvalidEntry { line: 2, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelLoader::load_merges(Path::new("/nonexistent/codes.bpe")).unwrap_err();
        assert!(matches!(err, BpeError::Io { .. }));
    }
}
