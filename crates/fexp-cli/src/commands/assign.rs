use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fexp_assign::{assign, factorial_assign, multi_arm_assign, waitlist_assign};
use fexp_core::{DrawProvenance, UnitId, UnitPool};
use serde::Serialize;

use super::io::emit;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Pool size n.
    #[arg(long)]
    pub units: usize,
    /// Number of treated units m.
    #[arg(long)]
    pub treated: usize,
    /// Seed for the draw.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MultiArmArgs {
    /// Pool size n.
    #[arg(long)]
    pub units: usize,
    /// Comma-separated group sizes, drawn in order.
    #[arg(long, value_delimiter = ',', required = true)]
    pub groups: Vec<usize>,
    /// Seed for the draw.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FactorialArgs {
    /// Pool size n.
    #[arg(long)]
    pub units: usize,
    /// Comma-separated treated count per factor.
    #[arg(long, value_delimiter = ',', required = true)]
    pub factors: Vec<usize>,
    /// Seed for the draw.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WaitlistArgs {
    /// Pool size n.
    #[arg(long)]
    pub units: usize,
    /// Comma-separated wave sizes; must sum to n.
    #[arg(long, value_delimiter = ',', required = true)]
    pub waves: Vec<usize>,
    /// Seed for the draw.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentOutput {
    pub provenance: DrawProvenance,
    pub units: Vec<UnitId>,
    pub treated: Vec<u8>,
    pub treated_count: usize,
}

#[derive(Debug, Serialize)]
struct GroupOutput {
    provenance: DrawProvenance,
    units: Vec<UnitId>,
    labels: Vec<Option<usize>>,
}

#[derive(Debug, Serialize)]
struct FactorialOutput {
    provenance: DrawProvenance,
    units: Vec<UnitId>,
    factors: Vec<Vec<u8>>,
    cells: Vec<u32>,
    cell_counts: Vec<usize>,
}

fn sizes_label(sizes: &[usize]) -> String {
    sizes
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn run_assign(args: &AssignArgs) -> Result<(), Box<dyn Error>> {
    let assignment = assign(args.units, args.treated, args.seed)?;
    let output = AssignmentOutput {
        provenance: DrawProvenance::new("complete", args.seed)
            .with_parameter("units", args.units)
            .with_parameter("treated", args.treated),
        units: UnitPool::sequential(args.units).ids().to_vec(),
        treated_count: assignment.treated_count(),
        treated: assignment.indicators(),
    };
    emit(&output, args.out.as_deref())
}

pub fn run_multi_arm(args: &MultiArmArgs) -> Result<(), Box<dyn Error>> {
    let arms = multi_arm_assign(args.units, &args.groups, args.seed)?;
    let output = GroupOutput {
        provenance: DrawProvenance::new("multi-arm", args.seed)
            .with_parameter("units", args.units)
            .with_parameter("groups", sizes_label(&args.groups)),
        units: UnitPool::sequential(args.units).ids().to_vec(),
        labels: arms.labels().to_vec(),
    };
    emit(&output, args.out.as_deref())
}

pub fn run_factorial(args: &FactorialArgs) -> Result<(), Box<dyn Error>> {
    let factorial = factorial_assign(args.units, &args.factors, args.seed)?;
    let output = FactorialOutput {
        provenance: DrawProvenance::new("factorial", args.seed)
            .with_parameter("units", args.units)
            .with_parameter("factors", sizes_label(&args.factors)),
        units: UnitPool::sequential(args.units).ids().to_vec(),
        factors: factorial
            .factors()
            .iter()
            .map(|factor| factor.indicators())
            .collect(),
        cells: (0..args.units).map(|idx| factorial.cell(idx)).collect(),
        cell_counts: factorial.cell_counts(),
    };
    emit(&output, args.out.as_deref())
}

pub fn run_waitlist(args: &WaitlistArgs) -> Result<(), Box<dyn Error>> {
    let schedule = waitlist_assign(args.units, &args.waves, args.seed)?;
    let output = GroupOutput {
        provenance: DrawProvenance::new("waitlist", args.seed)
            .with_parameter("units", args.units)
            .with_parameter("waves", sizes_label(&args.waves)),
        units: UnitPool::sequential(args.units).ids().to_vec(),
        labels: schedule.waves().iter().map(|wave| Some(*wave)).collect(),
    };
    emit(&output, args.out.as_deref())
}
