//! Apply command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Apply command arguments.
#[derive(Parser)]
pub struct ApplyCommand {
    /// Merge-operations file
    #[arg(short, long)]
    pub codes: PathBuf,

    /// Input corpus
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for the segmented corpus
    #[arg(short, long)]
    pub output: PathBuf,

    /// Use only the first N merge operations
    #[arg(long)]
    pub merges: Option<usize>,

    /// Suffix of non-final units
    #[arg(short, long, default_value = "@@")]
    pub separator: String,

    /// Only produce units listed in this vocabulary file
    #[arg(long)]
    pub vocabulary: Option<PathBuf>,

    /// Vocabulary entries below this frequency count as unknown
    #[arg(long, default_value_t = 1)]
    pub vocabulary_threshold: u64,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    pub num_workers: usize,

    /// Maximum words cached per worker
    #[arg(long)]
    pub cache_capacity: Option<usize>,
}

use anyhow::{Context, Result as AnyhowResult};
use jointbpe_segmenter::{apply, ApplyConfig, SegmenterOptions};
use std::time::Instant;

pub fn run(cmd: ApplyCommand) -> AnyhowResult<()> {
    let config = ApplyConfig {
        input: cmd.input,
        output: cmd.output,
        codes: cmd.codes,
        options: SegmenterOptions {
            separator: cmd.separator,
            max_merges: cmd.merges,
        },
        vocabulary: cmd.vocabulary,
        vocabulary_threshold: cmd.vocabulary_threshold,
        workers: cmd.num_workers,
        cache_capacity: cmd.cache_capacity,
    };

    let start = Instant::now();
    let lines = apply(&config)
        .with_context(|| format!("failed to segment {}", config.input.display()))?;
    println!(
        "Segmented {} lines to {} in {:.2}s",
        lines,
        config.output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
