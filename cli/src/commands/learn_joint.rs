//! Learn-joint command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Learn-joint command arguments.
///
/// Flags override the matching fields of a `--config` file.
#[derive(Parser)]
pub struct LearnJointCommand {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Input corpora, one segment per line
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output file for the merge operations
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Vocabulary output files, one per input
    #[arg(long = "write-vocabulary", num_args = 1..)]
    pub vocabularies: Vec<PathBuf>,

    /// Number of merge operations to learn
    #[arg(short, long)]
    pub symbols: Option<usize>,

    /// Stop once no pair occurs at least this often
    #[arg(long)]
    pub min_frequency: Option<u64>,

    /// Subtract the initial characters from the number of merges
    #[arg(short, long)]
    pub total_symbols: bool,

    /// Suffix of non-final units in the vocabularies
    #[arg(long)]
    pub separator: Option<String>,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    pub num_workers: Option<usize>,

    /// Duplicate the N most frequent vocabulary entries
    #[arg(long)]
    pub duplication_n: Option<usize>,

    /// Number of copies per duplicated entry
    #[arg(long)]
    pub duplication_k: Option<usize>,

    /// Marker framing the copy index of duplicated entries
    #[arg(long)]
    pub duplication_marker: Option<String>,
}

use anyhow::{bail, Context, Result as AnyhowResult};
use jointbpe_segmenter::{learn_joint, Duplication, JointConfig};
use std::time::Instant;

impl LearnJointCommand {
    /// Resolve the run configuration from the config file and flags.
    pub fn to_config(&self) -> AnyhowResult<JointConfig> {
        let mut config = match &self.config {
            Some(path) => JointConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => JointConfig::default(),
        };

        if !self.input.is_empty() {
            config.inputs = self.input.clone();
        }
        if !self.vocabularies.is_empty() {
            config.vocabularies = self.vocabularies.clone();
        }
        if let Some(output) = &self.output {
            config.codes = output.clone();
        }
        if let Some(symbols) = self.symbols {
            config.training.symbols = symbols;
        }
        if let Some(min_frequency) = self.min_frequency {
            config.training.min_frequency = min_frequency;
        }
        if self.total_symbols {
            config.training.total_symbols = true;
        }
        if let Some(separator) = &self.separator {
            config.separator = separator.clone();
        }
        if let Some(workers) = self.num_workers {
            config.workers = workers;
        }

        if self.duplication_n.is_some()
            || self.duplication_k.is_some()
            || self.duplication_marker.is_some()
        {
            let mut duplication = config.duplication.take().unwrap_or_default();
            if let Some(n) = self.duplication_n {
                duplication.top_n = n;
            }
            if let Some(k) = self.duplication_k {
                duplication.copies = k;
            }
            if let Some(marker) = &self.duplication_marker {
                duplication.marker = marker.clone();
            }
            config.duplication = Some(duplication);
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

pub fn run(cmd: LearnJointCommand) -> AnyhowResult<()> {
    let config = cmd.to_config()?;

    println!("Learning joint BPE...");
    println!("  Inputs: {}", config.inputs.len());
    println!("  Codes: {}", config.codes.display());
    println!("  Symbols: {}", config.training.symbols);
    println!("  Min frequency: {}", config.training.min_frequency);
    if let Some(Duplication { top_n, copies, .. }) = &config.duplication {
        println!("  Duplication: top {top_n} x {copies}");
    }
    println!();

    let start = Instant::now();
    let report = learn_joint(&config).context("joint learning failed")?;
    println!(
        "Learned {} merges over {} characters in {:.2}s ({:?})",
        report.merges,
        report.characters,
        start.elapsed().as_secs_f64(),
        report.stop
    );

    for corpus in &report.corpora {
        match &corpus.result {
            Ok(entries) => println!(
                "  {} -> {} ({} entries)",
                corpus.input.display(),
                corpus.vocabulary.display(),
                entries
            ),
            Err(e) => eprintln!("  {} -> failed: {}", corpus.input.display(), e),
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} of {} vocabularies could not be written", report.corpora.len());
    }

    Ok(())
}
