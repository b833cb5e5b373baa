//! jointbpe CLI - Command-line interface for joint BPE learning.
//!
//! This is the main entry point for the `jointbpe` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{ApplyCommand, LearnCommand, LearnJointCommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "jointbpe")]
#[command(about = "Learn joint BPE merges and per-corpus vocabularies", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn one merge list on several corpora and write a vocabulary per corpus
    LearnJoint(LearnJointCommand),
    /// Learn a merge list from text or dictionary files
    Learn(LearnCommand),
    /// Segment a corpus with a learned merge list
    Apply(ApplyCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::LearnJoint(cmd) => commands::learn_joint::run(cmd)?,
        Commands::Learn(cmd) => commands::learn::run(cmd)?,
        Commands::Apply(cmd) => commands::apply::run(cmd)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}
