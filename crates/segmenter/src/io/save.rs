//! Save functionality for learned merges and vocabularies.

use super::format::{VocabEntry, VERSION_HEADER};
use jointbpe_core::{BpeError, MergeList, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Model saver - writes merge-operations and vocabulary files.
pub struct ModelSaver;

impl ModelSaver {
    /// Write merges with a version header, one `left right` per line.
    pub fn write_merges<W: Write>(writer: &mut W, merges: &MergeList) -> std::io::Result<()> {
        writeln!(writer, "{} {}", VERSION_HEADER, merges.version.as_str())?;
        for merge in merges.iter() {
            writeln!(writer, "{merge}")?;
        }
        Ok(())
    }

    /// Write vocabulary entries, one `unit frequency` per line.
    pub fn write_vocabulary<W: Write>(writer: &mut W, entries: &[VocabEntry]) -> std::io::Result<()> {
        for entry in entries {
            writeln!(writer, "{entry}")?;
        }
        Ok(())
    }

    /// Save merges to `path`, replacing any existing file.
    pub fn save_merges(path: &Path, merges: &MergeList) -> Result<()> {
        Self::save_with(path, |w| Self::write_merges(w, merges))
    }

    /// Save a vocabulary to `path`, replacing any existing file.
    pub fn save_vocabulary(path: &Path, entries: &[VocabEntry]) -> Result<()> {
        Self::save_with(path, |w| Self::write_vocabulary(w, entries))
    }

    fn save_with<F>(path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        let file = File::create(path).map_err(|e| BpeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| BpeError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ModelLoader;
    use jointbpe_core::{CodesVersion, MergeOp};

    #[test]
    fn test_write_merges() {
        let mut merges = MergeList::new(CodesVersion::V0_2);
        merges.push(MergeOp::new("l", "o"));
        merges.push(MergeOp::new("lo", "w</w>"));

        let mut buf = Vec::new();
        ModelSaver::write_merges(&mut buf, &merges).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "#version: 0.2\nl o\nlo w</w>\n"
        );
    }

    #[test]
    fn test_write_vocabulary() {
        let entries = vec![VocabEntry::new("low", 3), VocabEntry::new("e@@", 2)];
        let mut buf = Vec::new();
        ModelSaver::write_vocabulary(&mut buf, &entries).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "low 3\ne@@ 2\n");
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let codes = dir.path().join("codes.bpe");
        let vocab = dir.path().join("vocab.txt");

        let mut merges = MergeList::default();
        merges.push(MergeOp::new("e", "s"));
        ModelSaver::save_merges(&codes, &merges).unwrap();
        assert_eq!(ModelLoader::load_merges(&codes).unwrap(), merges);

        let entries = vec![VocabEntry::new("es", 2)];
        ModelSaver::save_vocabulary(&vocab, &entries).unwrap();
        assert_eq!(ModelLoader::load_vocabulary(&vocab).unwrap(), entries);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("codes.bpe");
        let err = ModelSaver::save_merges(&path, &MergeList::default()).unwrap_err();
        assert!(matches!(err, BpeError::Io { .. }));
    }
}
