use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fexp_infer::load_config;
use tracing::info;

use super::io::{emit, load_table};

#[derive(Args, Debug)]
pub struct RiArgs {
    /// YAML inference config (design, iterations, seed, statistic).
    #[arg(long)]
    pub config: PathBuf,
    /// CSV with columns `unit,treated,outcome[,probability]`.
    #[arg(long)]
    pub data: PathBuf,
    /// Override the configured number of re-randomizations.
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Override the configured seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the configured worker count.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &RiArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(&args.config)?;
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    let table = load_table(&args.data)?;
    info!(units = table.len(), iterations = config.iterations, "running randomization inference");
    let report = config.run(&table)?;
    emit(&report, args.out.as_deref())
}
