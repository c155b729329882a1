use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{AssignmentDesign, Probabilities, RngHandle};
use rayon::prelude::*;
use tracing::debug;

/// Estimates each unit's probability of treatment as its treated share over
/// `draws` simulated assignments. Draw `i` uses substream `i` of `seed`, so
/// the estimate does not depend on `concurrency`. Entries may be exactly 0
/// or 1 for units the design never or always treats.
pub fn estimate_probabilities<D>(
    design: &D,
    draws: usize,
    seed: u64,
    concurrency: usize,
) -> Result<Probabilities, FexpError>
where
    D: AssignmentDesign + ?Sized,
{
    if draws == 0 {
        return Err(FexpError::invalid(
            "draws",
            "probability simulation needs at least one draw",
        ));
    }
    let units = design.units();
    debug!(design = design.name(), units, draws, seed, "simulating assignment probabilities");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
        .map_err(|err| FexpError::Serde(ErrorInfo::new("thread_pool", err.to_string())))?;
    let counts = pool.install(|| {
        (0..draws)
            .into_par_iter()
            .try_fold(
                || vec![0u64; units],
                |mut counts, draw| {
                    let mut rng = RngHandle::substream(seed, draw as u64);
                    let assignment = design.draw(&mut rng)?;
                    if assignment.len() != units {
                        return Err(FexpError::InvalidArgument(
                            ErrorInfo::new("length_mismatch", "design drew the wrong number of units")
                                .with_context("expected", units)
                                .with_context("drawn", assignment.len()),
                        ));
                    }
                    for idx in assignment.treated_indices() {
                        counts[idx] += 1;
                    }
                    Ok::<_, FexpError>(counts)
                },
            )
            .try_reduce(
                || vec![0u64; units],
                |mut left, right| {
                    for (acc, value) in left.iter_mut().zip(right) {
                        *acc += value;
                    }
                    Ok(left)
                },
            )
    })?;
    Probabilities::new(
        counts
            .into_iter()
            .map(|count| count as f64 / draws as f64)
            .collect(),
    )
}
