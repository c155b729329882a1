use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fexp_assign::load_plan;
use fexp_core::{AssignmentDesign, DrawProvenance};
use fexp_infer::estimate_probabilities;
use serde::Serialize;

use super::io::emit;

#[derive(Args, Debug)]
pub struct ProbabilitiesArgs {
    /// YAML design plan.
    #[arg(long)]
    pub design: PathBuf,
    /// Number of simulated draws.
    #[arg(long, default_value_t = 10_000)]
    pub draws: usize,
    /// Master seed; draw `i` uses substream `i`.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Worker threads.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProbabilitiesOutput {
    provenance: DrawProvenance,
    simulated: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exact: Option<Vec<f64>>,
    boundary_units: Vec<usize>,
}

pub fn run(args: &ProbabilitiesArgs) -> Result<(), Box<dyn Error>> {
    let design = load_plan(&args.design)?.build()?;
    let simulated = estimate_probabilities(&design, args.draws, args.seed, args.concurrency)?;
    let output = ProbabilitiesOutput {
        provenance: DrawProvenance::new("probabilities", args.seed)
            .with_parameter("design", design.name())
            .with_parameter("draws", args.draws),
        boundary_units: simulated.boundary_indices(),
        exact: design.probabilities().map(Vec::from),
        simulated: simulated.values().to_vec(),
    };
    emit(&output, args.out.as_deref())
}
