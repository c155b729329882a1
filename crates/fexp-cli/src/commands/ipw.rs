use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fexp_core::UnitId;
use fexp_infer::{difference_in_means, ipw_estimate};
use serde::Serialize;
use tracing::warn;

use super::io::{emit, load_table};

#[derive(Args, Debug)]
pub struct IpwArgs {
    /// CSV with columns `unit,treated,outcome,probability`.
    #[arg(long)]
    pub data: PathBuf,
    /// Exclude units whose probability is exactly 0 or 1 before estimating.
    #[arg(long)]
    pub drop_boundary: bool,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct IpwOutput {
    units: usize,
    treated: usize,
    naive: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipw: Option<f64>,
    dropped_units: Vec<UnitId>,
}

pub fn run(args: &IpwArgs) -> Result<(), Box<dyn Error>> {
    let mut table = load_table(&args.data)?;
    let mut dropped_units = Vec::new();
    if args.drop_boundary {
        let (kept, dropped) = table.retain_interior()?;
        if !dropped.is_empty() {
            warn!(dropped = dropped.len(), "excluding units with boundary probabilities");
        }
        table = kept;
        dropped_units = dropped;
    }
    let naive = difference_in_means(table.outcomes(), table.assignment())?;
    let ipw = match table.probabilities() {
        Some(probabilities) => Some(ipw_estimate(
            table.outcomes(),
            table.assignment(),
            probabilities,
        )?),
        None => {
            warn!("data has no probability column; reporting the naive estimate only");
            None
        }
    };
    let output = IpwOutput {
        units: table.len(),
        treated: table.assignment().treated_count(),
        naive,
        ipw,
        dropped_units,
    };
    emit(&output, args.out.as_deref())
}
