//! Corpus segmentation with a learned codes file.

use crate::io::ModelLoader;
use crate::segmenter::{Segmenter, SegmenterOptions, VocabularyFilter};
use crate::utils::SegmentCache;
use jointbpe_core::{BpeError, Result};
use jointbpe_training::with_workers;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Configuration of an apply run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub codes: PathBuf,
    pub options: SegmenterOptions,
    /// Restrict output units to this vocabulary file
    pub vocabulary: Option<PathBuf>,
    /// Vocabulary entries below this frequency are treated as unknown
    pub vocabulary_threshold: u64,
    pub workers: usize,
    /// Bound on each worker's segment cache (unbounded when None)
    pub cache_capacity: Option<usize>,
}

/// Load the segmenter an [`ApplyConfig`] describes.
pub fn build_segmenter(config: &ApplyConfig) -> Result<Segmenter> {
    let segmenter = Segmenter::from_file(&config.codes, config.options.clone())?;
    match &config.vocabulary {
        Some(path) => {
            let entries = ModelLoader::load_vocabulary(path)?;
            let filter = VocabularyFilter::new(&entries, config.vocabulary_threshold);
            info!("vocabulary filter with {} units", filter.len());
            Ok(segmenter.with_vocabulary(filter))
        }
        None => Ok(segmenter),
    }
}

/// Segment lines in parallel; each worker keeps its own cache.
pub fn segment_lines(
    segmenter: &Segmenter,
    lines: &[&str],
    cache_capacity: Option<usize>,
) -> Vec<String> {
    lines
        .par_iter()
        .map_init(
            || match cache_capacity {
                Some(capacity) => SegmentCache::with_capacity(capacity),
                None => SegmentCache::new(),
            },
            |cache, line| segmenter.process_line(line, cache),
        )
        .collect()
}

/// Segment the input corpus and write it to the output file.
///
/// Returns the number of lines written.
pub fn apply(config: &ApplyConfig) -> Result<usize> {
    let segmenter = build_segmenter(config)?;
    let text = std::fs::read_to_string(&config.input).map_err(|e| BpeError::io(&config.input, e))?;
    let lines: Vec<&str> = text.lines().collect();

    let segmented = with_workers(config.workers, || {
        segment_lines(&segmenter, &lines, config.cache_capacity)
    })?;

    let file = File::create(&config.output).map_err(|e| BpeError::io(&config.output, e))?;
    let mut writer = BufWriter::new(file);
    segmented
        .iter()
        .try_for_each(|line| writeln!(writer, "{line}"))
        .and_then(|()| writer.flush())
        .map_err(|e| BpeError::io(&config.output, e))?;

    info!(
        "segmented {} lines with {} merges into {}",
        segmented.len(),
        segmenter.num_merges(),
        config.output.display()
    );
    Ok(segmented.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ModelSaver, VocabEntry};
    use jointbpe_core::{MergeList, MergeOp};

    fn write_codes(path: &std::path::Path) {
        let mut merges = MergeList::default();
        for (l, r) in [("l", "o"), ("lo", "w</w>"), ("e", "s"), ("es", "t</w>"), ("lo", "w")] {
            merges.push(MergeOp::new(l, r));
        }
        ModelSaver::save_merges(path, &merges).unwrap();
    }

    #[test]
    fn test_apply_file() {
        let dir = tempfile::tempdir().unwrap();
        let codes = dir.path().join("codes.bpe");
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        write_codes(&codes);
        std::fs::write(&input, "low lowest\n\n newest\n").unwrap();

        let config = ApplyConfig {
            input,
            output: output.clone(),
            codes,
            workers: 2,
            ..ApplyConfig::default()
        };
        assert_eq!(apply(&config).unwrap(), 3);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "low low@@ est\n\n n@@ e@@ w@@ est\n"
        );
    }

    #[test]
    fn test_apply_with_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let codes = dir.path().join("codes.bpe");
        let vocab = dir.path().join("vocab.txt");
        write_codes(&codes);
        ModelSaver::save_vocabulary(
            &vocab,
            &[VocabEntry::new("low@@", 3), VocabEntry::new("est", 1)],
        )
        .unwrap();

        let config = ApplyConfig {
            codes,
            vocabulary: Some(vocab),
            vocabulary_threshold: 2,
            ..ApplyConfig::default()
        };
        let segmenter = build_segmenter(&config).unwrap();
        assert_eq!(
            segment_lines(&segmenter, &["lowest"], Some(8)),
            vec!["low@@ e@@ s@@ t"]
        );
    }

    #[test]
    fn test_apply_missing_codes() {
        let config = ApplyConfig {
            codes: PathBuf::from("/nonexistent/codes.bpe"),
            ..ApplyConfig::default()
        };
        assert!(matches!(apply(&config), Err(BpeError::Io { .. })));
    }
}
