#![deny(missing_docs)]
#![doc = "Core types and traits for field-experiment randomization: unit pools, assignment vectors, deterministic RNG handles and the design/statistic seams used by inference."]

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, FexpError};
pub use provenance::{DrawProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{
    ArmAssignment, Assignment, Outcomes, Probabilities, UnitId, UnitPool, UnitRecord, UnitTable,
};

/// A randomization procedure producing binary assignments over a fixed pool.
///
/// Randomization inference redraws from the same design that produced the
/// observed assignment, so any blocking or clustering constraint lives here.
pub trait AssignmentDesign: Send + Sync {
    /// Short label used in logs and provenance.
    fn name(&self) -> &str;

    /// Number of units the design assigns.
    fn units(&self) -> usize;

    /// Draws one assignment.
    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError>;

    /// Exact per-unit treatment probabilities when the design has a closed form.
    fn probabilities(&self) -> Option<Probabilities> {
        None
    }
}

/// Scalar test statistic evaluated on a candidate assignment.
pub trait TestStatistic: Send + Sync {
    /// Computes the statistic under `assignment`.
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, FexpError>;
}

/// Design backed by a closure; see [`design_fn`].
pub struct DesignFn<F> {
    units: usize,
    draw: F,
}

impl<F> std::fmt::Debug for DesignFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignFn")
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

/// Wraps a closure as an [`AssignmentDesign`] over `units` units.
pub fn design_fn<F>(units: usize, draw: F) -> DesignFn<F>
where
    F: Fn(&mut RngHandle) -> Result<Assignment, FexpError> + Send + Sync,
{
    DesignFn { units, draw }
}

impl<F> AssignmentDesign for DesignFn<F>
where
    F: Fn(&mut RngHandle) -> Result<Assignment, FexpError> + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn units(&self) -> usize {
        self.units
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        (self.draw)(rng)
    }
}

/// Statistic backed by a closure; see [`statistic_fn`].
pub struct StatisticFn<F> {
    evaluate: F,
}

impl<F> std::fmt::Debug for StatisticFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticFn").finish_non_exhaustive()
    }
}

/// Wraps a closure as a [`TestStatistic`].
pub fn statistic_fn<F>(evaluate: F) -> StatisticFn<F>
where
    F: Fn(&Assignment) -> Result<f64, FexpError> + Send + Sync,
{
    StatisticFn { evaluate }
}

impl<F> TestStatistic for StatisticFn<F>
where
    F: Fn(&Assignment) -> Result<f64, FexpError> + Send + Sync,
{
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, FexpError> {
        (self.evaluate)(assignment)
    }
}
