//! Learn command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Learn command arguments.
#[derive(Parser)]
pub struct LearnCommand {
    /// Input files (text, or `word frequency` dictionaries with --dict-input)
    #[arg(short, long, num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Output file for the merge operations
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of merge operations to learn
    #[arg(short, long, default_value_t = 10_000)]
    pub symbols: usize,

    /// Stop once no pair occurs at least this often
    #[arg(long, default_value_t = 2)]
    pub min_frequency: u64,

    /// Subtract the initial characters from the number of merges
    #[arg(short, long)]
    pub total_symbols: bool,

    /// Inputs are `word frequency` dictionaries
    #[arg(long)]
    pub dict_input: bool,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    pub num_workers: usize,
}

use anyhow::{Context, Result as AnyhowResult};
use jointbpe_segmenter::{learn, LearnConfig};
use jointbpe_training::TrainingConfig;
use std::time::Instant;

pub fn run(cmd: LearnCommand) -> AnyhowResult<()> {
    let training = TrainingConfig::builder()
        .symbols(cmd.symbols)
        .min_frequency(cmd.min_frequency)
        .total_symbols(cmd.total_symbols)
        .build()
        .context("invalid training configuration")?;

    let config = LearnConfig {
        inputs: cmd.input,
        codes: cmd.output,
        training,
        is_dict: cmd.dict_input,
        workers: cmd.num_workers,
    };

    let start = Instant::now();
    let output = learn(&config).context("learning failed")?;
    println!(
        "Learned {} of {} merges in {:.2}s ({:?})",
        output.merges.len(),
        output.target,
        start.elapsed().as_secs_f64(),
        output.stop
    );
    println!("Codes saved to {}", config.codes.display());

    Ok(())
}
