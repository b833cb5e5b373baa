//! Joint learning: one merge list for several corpora, one vocabulary each.

use crate::assembler::{Duplication, VocabAssembler};
use crate::io::ModelSaver;
use crate::segmenter::{Segmenter, SegmenterOptions, DEFAULT_SEPARATOR};
use jointbpe_core::{BpeError, Result};
use jointbpe_training::{with_workers, BpeTrainer, StopReason, TrainingConfig, WordCounts};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of a joint learning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointConfig {
    /// Input corpora, one segment per line
    pub inputs: Vec<PathBuf>,
    /// Output merge-operations file
    pub codes: PathBuf,
    /// Output vocabulary file per input, in the same order
    pub vocabularies: Vec<PathBuf>,
    pub training: TrainingConfig,
    pub separator: String,
    /// Worker threads (0 = all available cores)
    pub workers: usize,
    pub duplication: Option<Duplication>,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            codes: PathBuf::new(),
            vocabularies: Vec::new(),
            training: TrainingConfig::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            workers: 0,
            duplication: None,
        }
    }
}

impl JointConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BpeError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(BpeError::InvalidConfig(
                "at least one input file is required".to_string(),
            ));
        }
        if self.inputs.len() != self.vocabularies.len() {
            return Err(BpeError::InvalidConfig(format!(
                "number of input files ({}) and vocabulary files ({}) must match",
                self.inputs.len(),
                self.vocabularies.len()
            )));
        }
        if self.codes.as_os_str().is_empty() {
            return Err(BpeError::InvalidConfig(
                "an output codes file is required".to_string(),
            ));
        }
        if self.separator.is_empty() {
            return Err(BpeError::InvalidConfig(
                "separator must not be empty".to_string(),
            ));
        }
        if let Some(duplication) = &self.duplication {
            duplication.validate()?;
        }
        self.training.validate()
    }
}

/// Outcome of one corpus's vocabulary.
#[derive(Debug)]
pub struct CorpusReport {
    pub input: PathBuf,
    pub vocabulary: PathBuf,
    /// Number of entries written, or why writing failed
    pub result: Result<usize>,
}

/// Summary of a joint learning run.
#[derive(Debug)]
pub struct JointReport {
    /// Number of learned merges
    pub merges: usize,
    /// Distinct characters over all corpora
    pub characters: usize,
    pub stop: StopReason,
    pub corpora: Vec<CorpusReport>,
}

impl JointReport {
    /// Corpora whose vocabulary could not be written.
    pub fn failures(&self) -> impl Iterator<Item = &CorpusReport> {
        self.corpora.iter().filter(|c| c.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Learn one merge list on all inputs together, write it, then write the
/// vocabulary of every input segmented with it.
///
/// The whole run executes on one worker pool of `config.workers` threads.
pub fn learn_joint(config: &JointConfig) -> Result<JointReport> {
    config.validate()?;
    with_workers(config.workers, || run_joint(config))?
}

fn run_joint(config: &JointConfig) -> Result<JointReport> {
    let corpora = config
        .inputs
        .par_iter()
        .map(|path| WordCounts::from_file(path, false, 0))
        .collect::<Result<Vec<_>>>()?;

    let mut combined = WordCounts::new();
    for corpus in &corpora {
        combined.add_counts(corpus);
    }
    let characters = combined.characters().len();
    info!(
        "combined {} corpora on {} workers: {} distinct words, {} characters",
        corpora.len(),
        rayon::current_num_threads(),
        combined.len(),
        characters
    );

    let output = BpeTrainer::new(config.training.clone()).train(&combined)?;
    ModelSaver::save_merges(&config.codes, &output.merges)?;
    info!(
        "wrote {} merges to {}",
        output.merges.len(),
        config.codes.display()
    );

    let options = SegmenterOptions::default().separator(config.separator.clone());
    let segmenter = Segmenter::new(&output.merges, options);
    let assembler =
        VocabAssembler::new(&segmenter).with_duplication(config.duplication.clone());

    let mut reports = Vec::with_capacity(corpora.len());
    for ((corpus, input), vocabulary) in corpora
        .iter()
        .zip(&config.inputs)
        .zip(&config.vocabularies)
    {
        let entries = assembler.assemble(corpus);
        let result =
            ModelSaver::save_vocabulary(vocabulary, &entries).map(|()| entries.len());
        match &result {
            Ok(n) => info!("wrote {} entries to {}", n, vocabulary.display()),
            Err(e) => warn!("vocabulary for {} failed: {}", input.display(), e),
        }
        reports.push(CorpusReport {
            input: input.clone(),
            vocabulary: vocabulary.clone(),
            result,
        });
    }

    Ok(JointReport {
        merges: output.merges.len(),
        characters,
        stop: output.stop,
        corpora: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(inputs: usize, vocabularies: usize) -> JointConfig {
        JointConfig {
            inputs: (0..inputs).map(|i| PathBuf::from(format!("in{i}"))).collect(),
            codes: PathBuf::from("codes"),
            vocabularies: (0..vocabularies)
                .map(|i| PathBuf::from(format!("vocab{i}")))
                .collect(),
            ..JointConfig::default()
        }
    }

    #[test]
    fn test_validate() {
        assert!(config(2, 2).validate().is_ok());
        assert!(config(0, 0).validate().is_err());
        assert!(config(2, 1).validate().is_err());

        let mut bad = config(1, 1);
        bad.separator.clear();
        assert!(bad.validate().is_err());

        let mut bad = config(1, 1);
        bad.codes = PathBuf::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_mismatch_fails_before_reading() {
        // inputs do not exist; the count check must come first
        let err = learn_joint(&config(2, 3)).unwrap_err();
        assert!(matches!(err, BpeError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_on_dedicated_pool() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(2, 2);
        config.codes = dir.path().join("codes.bpe");
        config.training.min_frequency = 1;
        config.workers = 3;
        for (i, text) in ["low lower\n", "newest low\n"].iter().enumerate() {
            config.inputs[i] = dir.path().join(format!("in{i}.txt"));
            config.vocabularies[i] = dir.path().join(format!("vocab{i}.txt"));
            std::fs::write(&config.inputs[i], text).unwrap();
        }

        let threads = with_workers(config.workers, rayon::current_num_threads).unwrap();
        assert_eq!(threads, 3);

        let report = learn_joint(&config).unwrap();
        assert!(report.is_success());
        assert!(report.merges > 0);
        assert!(config.vocabularies.iter().all(|v| v.exists()));
    }

    #[test]
    fn test_config_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joint.json");
        std::fs::write(
            &path,
            r#"{
                "inputs": ["a.txt", "b.txt"],
                "codes": "codes.bpe",
                "vocabularies": ["a.vocab", "b.vocab"],
                "training": {"symbols": 500},
                "duplication": {"top_n": 10, "copies": 2}
            }"#,
        )
        .unwrap();

        let config = JointConfig::from_json_file(&path).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.training.symbols, 500);
        assert_eq!(config.training.min_frequency, 2);
        assert_eq!(config.separator, DEFAULT_SEPARATOR);
        let duplication = config.duplication.unwrap();
        assert_eq!(duplication.marker, "複複");
        assert_eq!(duplication.copies, 2);
    }

    #[test]
    fn test_config_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joint.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JointConfig::from_json_file(&path),
            Err(BpeError::Json(_))
        ));
    }
}
