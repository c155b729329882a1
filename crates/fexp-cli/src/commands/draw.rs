use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fexp_assign::load_plan;
use fexp_core::{AssignmentDesign, DrawProvenance, RngHandle, UnitPool};
use tracing::info;

use super::assign::AssignmentOutput;
use super::io::emit;

#[derive(Args, Debug)]
pub struct DrawArgs {
    /// YAML design plan.
    #[arg(long)]
    pub design: PathBuf,
    /// Seed for the draw.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &DrawArgs) -> Result<(), Box<dyn Error>> {
    let design = load_plan(&args.design)?.build()?;
    info!(design = design.name(), units = design.units(), "drawing from plan");
    let mut rng = RngHandle::from_seed(args.seed);
    let assignment = design.draw(&mut rng)?;
    let output = AssignmentOutput {
        provenance: DrawProvenance::new(design.name(), args.seed)
            .with_parameter("plan", args.design.display())
            .with_parameter("units", design.units()),
        units: UnitPool::sequential(design.units()).ids().to_vec(),
        treated_count: assignment.treated_count(),
        treated: assignment.indicators(),
    };
    emit(&output, args.out.as_deref())
}
