//! Merge learning without vocabulary output.

use crate::io::ModelSaver;
use jointbpe_core::{BpeError, Result};
use jointbpe_training::{with_workers, BpeTrainer, TrainingConfig, TrainingOutput, WordCounts};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of a plain learning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    pub inputs: Vec<PathBuf>,
    pub codes: PathBuf,
    pub training: TrainingConfig,
    /// Inputs are `word frequency` dictionaries instead of raw text
    pub is_dict: bool,
    pub workers: usize,
}

impl LearnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(BpeError::InvalidConfig(
                "at least one input file is required".to_string(),
            ));
        }
        if self.codes.as_os_str().is_empty() {
            return Err(BpeError::InvalidConfig(
                "an output codes file is required".to_string(),
            ));
        }
        self.training.validate()
    }
}

/// Learn merges on the combined inputs and write the codes file.
pub fn learn(config: &LearnConfig) -> Result<TrainingOutput> {
    config.validate()?;

    let output = with_workers(config.workers, || -> Result<TrainingOutput> {
        let corpora = config
            .inputs
            .par_iter()
            .map(|path| WordCounts::from_file(path, config.is_dict, 0))
            .collect::<Result<Vec<_>>>()?;

        let mut combined = WordCounts::new();
        for corpus in corpora {
            combined.merge(corpus);
        }
        info!(
            "{} distinct words, {} occurrences",
            combined.len(),
            combined.total_occurrences()
        );

        BpeTrainer::new(config.training.clone()).train(&combined)
    })??;

    ModelSaver::save_merges(&config.codes, &output.merges)?;
    info!(
        "wrote {} merges to {}",
        output.merges.len(),
        config.codes.display()
    );
    Ok(output)
}
