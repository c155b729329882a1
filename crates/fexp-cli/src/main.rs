use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    assign::{self, AssignArgs, FactorialArgs, MultiArmArgs, WaitlistArgs},
    draw::{self, DrawArgs},
    ipw::{self, IpwArgs},
    probabilities::{self, ProbabilitiesArgs},
    ri::{self, RiArgs},
    version::{self, VersionArgs},
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "fexp", about = "Randomization and inference for field experiments")]
struct Cli {
    /// Emit debug-level logs on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Treat exactly `--treated` of `--units` units.
    Assign(AssignArgs),
    /// Split units into non-overlapping groups.
    MultiArm(MultiArmArgs),
    /// Draw one independent indicator per factor.
    Factorial(FactorialArgs),
    /// Order units into treatment waves.
    Waitlist(WaitlistArgs),
    /// Draw one assignment from a YAML design plan.
    Draw(DrawArgs),
    /// Estimate per-unit treatment probabilities by simulation.
    Probabilities(ProbabilitiesArgs),
    /// Naive and inverse-probability-weighted effect estimates.
    Ipw(IpwArgs),
    /// Randomization inference for observed data.
    Ri(RiArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn setup_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    match cli.command {
        Command::Assign(args) => assign::run_assign(&args),
        Command::MultiArm(args) => assign::run_multi_arm(&args),
        Command::Factorial(args) => assign::run_factorial(&args),
        Command::Waitlist(args) => assign::run_waitlist(&args),
        Command::Draw(args) => draw::run(&args),
        Command::Probabilities(args) => probabilities::run(&args),
        Command::Ipw(args) => ipw::run(&args),
        Command::Ri(args) => ri::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
