use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, AssignmentDesign, DrawProvenance, RngHandle, TestStatistic};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stat::{mean, Quantiles};

fn pool_error(err: impl ToString) -> FexpError {
    FexpError::Serde(ErrorInfo::new("thread_pool", err.to_string()))
}

/// Direction of the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// Share of re-randomized statistics at or above the observed one.
    #[default]
    Greater,
    /// Share at or below the observed one.
    Less,
    /// Share whose magnitude is at or above the observed magnitude.
    TwoSided,
}

impl Alternative {
    fn as_extreme(self, observed: f64, candidate: f64) -> bool {
        match self {
            Alternative::Greater => candidate >= observed,
            Alternative::Less => candidate <= observed,
            Alternative::TwoSided => candidate.abs() >= observed.abs(),
        }
    }
}

/// Options governing a randomization-inference run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiOpts {
    /// Number of re-randomizations K (at least 1).
    pub iterations: usize,
    /// Master seed; iteration `i` draws from substream `i`.
    pub seed: u64,
    /// Worker threads used for the re-randomizations.
    pub concurrency: usize,
    /// Direction of the test.
    pub alternative: Alternative,
}

impl Default for RiOpts {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: 0,
            concurrency: 1,
            alternative: Alternative::Greater,
        }
    }
}

/// Outcome of a randomization-inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiReport {
    /// Reproduction details (seed, design, K).
    pub provenance: DrawProvenance,
    /// Statistic under the observed assignment.
    pub observed: f64,
    /// Monte Carlo p-value, `exceedances / iterations`.
    pub p_value: f64,
    /// Number of re-randomizations.
    pub iterations: usize,
    /// Re-randomized statistics at least as extreme as the observed one.
    pub exceedances: usize,
    /// Draws discarded for having an empty arm.
    pub rejected_draws: usize,
    /// Direction of the test.
    pub alternative: Alternative,
    /// Mean of the null distribution.
    pub null_mean: f64,
    /// Quantiles of the null distribution.
    pub null_quantiles: Quantiles,
}

fn check_finite(value: f64, iteration: Option<usize>) -> Result<f64, FexpError> {
    if value.is_finite() {
        return Ok(value);
    }
    let mut info = ErrorInfo::new("statistic_not_finite", "test statistic must be finite");
    if let Some(iteration) = iteration {
        info = info.with_context("iteration", iteration);
    }
    Err(FexpError::InvalidArgument(info))
}

/// Redraws allowed per iteration before a design is declared degenerate.
pub const MAX_REDRAWS: usize = 1000;

fn has_both_arms(assignment: &Assignment) -> bool {
    let treated = assignment.treated_count();
    treated > 0 && treated < assignment.len()
}

/// Re-randomized statistic values and the draws discarded to produce them.
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution {
    /// Statistic value of iteration `i`, in iteration order.
    pub values: Vec<f64>,
    /// Draws rejected because one arm was empty.
    pub rejected: usize,
}

fn draw_conditioned<D>(
    design: &D,
    rng: &mut RngHandle,
    both_arms: bool,
    iteration: usize,
) -> Result<(Assignment, usize), FexpError>
where
    D: AssignmentDesign + ?Sized,
{
    for rejected in 0..=MAX_REDRAWS {
        let assignment = design.draw(rng)?;
        if !both_arms || has_both_arms(&assignment) {
            return Ok((assignment, rejected));
        }
    }
    Err(FexpError::InvalidArgument(
        ErrorInfo::new("degenerate_design", "design keeps drawing an empty arm")
            .with_context("iteration", iteration)
            .with_context("redraws", MAX_REDRAWS)
            .with_hint("use a design that treats at least one and not every unit"),
    ))
}

/// Statistic values under `iterations` fresh draws from `design`, in
/// iteration order. Iteration `i` uses substream `i` of `seed`.
///
/// With `both_arms` set, draws with an empty arm are discarded and redrawn
/// from the same substream, so the distribution is conditional on both arms
/// being non-empty.
pub fn null_distribution<D, S>(
    design: &D,
    statistic: &S,
    iterations: usize,
    seed: u64,
    concurrency: usize,
    both_arms: bool,
) -> Result<NullDistribution, FexpError>
where
    D: AssignmentDesign + ?Sized,
    S: TestStatistic + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
        .map_err(pool_error)?;
    let draws = pool.install(|| {
        (0..iterations)
            .into_par_iter()
            .map(|iteration| {
                let mut rng = RngHandle::substream(seed, iteration as u64);
                let (assignment, rejected) =
                    draw_conditioned(design, &mut rng, both_arms, iteration)?;
                let value = check_finite(statistic.evaluate(&assignment)?, Some(iteration))?;
                Ok((value, rejected))
            })
            .collect::<Result<Vec<_>, FexpError>>()
    })?;
    let rejected: usize = draws.iter().map(|(_, rejected)| rejected).sum();
    Ok(NullDistribution {
        values: draws.into_iter().map(|(value, _)| value).collect(),
        rejected,
    })
}

/// Randomization inference for an observed assignment.
///
/// Computes `t0 = s(observed)`, redraws `K` assignments from `design` (which
/// must be the design that produced `observed`, blocking and clustering
/// included), and returns the share of redraws at least as extreme as `t0`.
/// Ties count against rejection. When the observed assignment has both arms
/// non-empty, redraws with an empty arm are rejected and redrawn; the count
/// is reported in [`RiReport::rejected_draws`].
pub fn randomization_inference<D, S>(
    observed: &Assignment,
    design: &D,
    statistic: &S,
    opts: &RiOpts,
) -> Result<RiReport, FexpError>
where
    D: AssignmentDesign + ?Sized,
    S: TestStatistic + ?Sized,
{
    if opts.iterations == 0 {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("iterations", "randomization inference needs at least one iteration")
                .with_context("iterations", opts.iterations),
        ));
    }
    if observed.len() != design.units() {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("length_mismatch", "observed assignment does not cover the design's pool")
                .with_context("observed", observed.len())
                .with_context("design", design.units()),
        ));
    }
    let t0 = check_finite(statistic.evaluate(observed)?, None)?;
    debug!(
        design = design.name(),
        units = design.units(),
        iterations = opts.iterations,
        seed = opts.seed,
        observed = t0,
        "randomization inference"
    );
    let NullDistribution {
        values: null,
        rejected,
    } = null_distribution(
        design,
        statistic,
        opts.iterations,
        opts.seed,
        opts.concurrency,
        has_both_arms(observed),
    )?;
    let exceedances = null
        .iter()
        .filter(|candidate| opts.alternative.as_extreme(t0, **candidate))
        .count();
    let p_value = exceedances as f64 / opts.iterations as f64;
    debug!(p_value, exceedances, rejected, "randomization inference complete");

    let provenance = DrawProvenance::new("ri", opts.seed)
        .with_parameter("design", design.name())
        .with_parameter("units", design.units())
        .with_parameter("iterations", opts.iterations);
    Ok(RiReport {
        provenance,
        observed: t0,
        p_value,
        iterations: opts.iterations,
        exceedances,
        rejected_draws: rejected,
        alternative: opts.alternative,
        null_mean: mean(&null),
        null_quantiles: Quantiles::from_values(&null),
    })
}
