use fexp_core::errors::FexpError;
use fexp_core::{Assignment, AssignmentDesign, Probabilities, RngHandle};
use rand::Rng;
use tracing::debug;

/// Independent coin flip per unit with unit-specific probability.
///
/// With a common probability this is simple randomization; with differing
/// probabilities it is the variable-probability design that IPW corrects for.
/// The number of treated units varies from draw to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct BernoulliDesign {
    probabilities: Probabilities,
}

impl BernoulliDesign {
    /// Design flipping a `p_i`-weighted coin for each unit.
    pub fn new(probabilities: Probabilities) -> Self {
        Self { probabilities }
    }

    /// Same probability `p` for each of `units`.
    pub fn uniform(units: usize, p: f64) -> Result<Self, FexpError> {
        Ok(Self::new(Probabilities::uniform(units, p)?))
    }
}

impl AssignmentDesign for BernoulliDesign {
    fn name(&self) -> &str {
        "bernoulli"
    }

    fn units(&self) -> usize {
        self.probabilities.len()
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        let flags = self
            .probabilities
            .values()
            .iter()
            .map(|p| rng.gen_bool(*p))
            .collect();
        Ok(Assignment::from_flags(flags))
    }

    fn probabilities(&self) -> Option<Probabilities> {
        Some(self.probabilities.clone())
    }
}

/// Simple randomization with per-unit probabilities from an explicit seed.
pub fn simple_assign(probabilities: &Probabilities, seed: u64) -> Result<Assignment, FexpError> {
    debug!(n = probabilities.len(), seed, "simple assignment");
    let mut rng = RngHandle::from_seed(seed);
    BernoulliDesign::new(probabilities.clone()).draw(&mut rng)
}
