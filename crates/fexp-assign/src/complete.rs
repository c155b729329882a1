use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, AssignmentDesign, Probabilities, RngHandle};
use rand::seq::index;
use tracing::debug;

pub(crate) fn check_treated_count(units: usize, treated: usize) -> Result<(), FexpError> {
    if treated > units {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("treated_count", "treated count must lie in [0, n]")
                .with_context("n", units)
                .with_context("m", treated),
        ));
    }
    Ok(())
}

/// Draws exactly `treated` of `units` uniformly without replacement.
pub fn draw_complete(
    units: usize,
    treated: usize,
    rng: &mut RngHandle,
) -> Result<Assignment, FexpError> {
    check_treated_count(units, treated)?;
    let mut flags = vec![false; units];
    for idx in index::sample(rng, units, treated) {
        flags[idx] = true;
    }
    Ok(Assignment::from_flags(flags))
}

/// Fixed-size random assignment: an `n`-length vector with exactly `m`
/// treated units, every one of the C(n, m) subsets equally likely.
pub fn assign(n: usize, m: usize, seed: u64) -> Result<Assignment, FexpError> {
    debug!(n, m, seed, "complete assignment");
    let mut rng = RngHandle::from_seed(seed);
    draw_complete(n, m, &mut rng)
}

/// Complete randomization of a fixed pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteDesign {
    units: usize,
    treated: usize,
}

impl CompleteDesign {
    /// Design treating exactly `treated` of `units`.
    pub fn new(units: usize, treated: usize) -> Result<Self, FexpError> {
        check_treated_count(units, treated)?;
        Ok(Self { units, treated })
    }

    /// Number of treated units per draw.
    pub fn treated(&self) -> usize {
        self.treated
    }
}

impl AssignmentDesign for CompleteDesign {
    fn name(&self) -> &str {
        "complete"
    }

    fn units(&self) -> usize {
        self.units
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        draw_complete(self.units, self.treated, rng)
    }

    fn probabilities(&self) -> Option<Probabilities> {
        if self.units == 0 {
            return Probabilities::new(Vec::new()).ok();
        }
        Probabilities::uniform(self.units, self.treated as f64 / self.units as f64).ok()
    }
}
