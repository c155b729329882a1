use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, Outcomes, Probabilities};

pub(crate) fn check_lengths(
    outcomes: &Outcomes,
    assignment: &Assignment,
    probabilities: Option<&Probabilities>,
) -> Result<(), FexpError> {
    let n = outcomes.len();
    let p_len = probabilities.map(Probabilities::len).unwrap_or(n);
    if assignment.len() != n || p_len != n {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("length_mismatch", "outcome, assignment and probability vectors must align")
                .with_context("outcomes", n)
                .with_context("assignment", assignment.len())
                .with_context("probabilities", p_len),
        ));
    }
    Ok(())
}

fn check_arms(assignment: &Assignment) -> Result<(), FexpError> {
    let treated = assignment.treated_count();
    if treated == 0 || treated == assignment.len() {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("empty_arm", "both treatment and control must contain units")
                .with_context("treated", treated)
                .with_context("control", assignment.len() - treated),
        ));
    }
    Ok(())
}

fn weighted_mean(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (total, weight) = pairs.fold((0.0, 0.0), |(total, weight), (value, w)| {
        (total + value * w, weight + w)
    });
    total / weight
}

/// Unweighted difference between the treated and control outcome means.
pub fn difference_in_means(
    outcomes: &Outcomes,
    assignment: &Assignment,
) -> Result<f64, FexpError> {
    check_lengths(outcomes, assignment, None)?;
    check_arms(assignment)?;
    let values = outcomes.values();
    let treated = weighted_mean(
        values
            .iter()
            .enumerate()
            .filter(|(idx, _)| assignment.is_treated(*idx))
            .map(|(_, y)| (*y, 1.0)),
    );
    let control = weighted_mean(
        values
            .iter()
            .enumerate()
            .filter(|(idx, _)| !assignment.is_treated(*idx))
            .map(|(_, y)| (*y, 1.0)),
    );
    Ok(treated - control)
}

/// Inverse-probability weights: `1/p` for treated units, `1/(1-p)` for
/// controls. Fails when any probability is 0 or 1.
pub fn ipw_weights(
    assignment: &Assignment,
    probabilities: &Probabilities,
) -> Result<Vec<f64>, FexpError> {
    if assignment.len() != probabilities.len() {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("length_mismatch", "assignment and probability vectors must align")
                .with_context("assignment", assignment.len())
                .with_context("probabilities", probabilities.len()),
        ));
    }
    let boundary = probabilities.boundary_indices();
    if let Some(first) = boundary.first() {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new(
                "probability_boundary",
                "every probability must lie strictly inside (0, 1)",
            )
            .with_context("index", first)
            .with_context("count", boundary.len())
            .with_hint("exclude units that are always or never treated before estimating"),
        ));
    }
    Ok(probabilities
        .values()
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            if assignment.is_treated(idx) {
                1.0 / p
            } else {
                1.0 / (1.0 - p)
            }
        })
        .collect())
}

/// Inverse-probability-weighted difference in means.
///
/// Treated outcomes are averaged with weight `1/p`, control outcomes with
/// weight `1/(1-p)`. Units with boundary probabilities are never dropped
/// here; the caller excludes them (see `UnitTable::retain_interior`).
pub fn ipw_estimate(
    outcomes: &Outcomes,
    assignment: &Assignment,
    probabilities: &Probabilities,
) -> Result<f64, FexpError> {
    check_lengths(outcomes, assignment, Some(probabilities))?;
    let weights = ipw_weights(assignment, probabilities)?;
    check_arms(assignment)?;
    let rows = || {
        outcomes
            .values()
            .iter()
            .copied()
            .zip(weights.iter().copied())
            .enumerate()
    };
    let treated = weighted_mean(
        rows()
            .filter(|(idx, _)| assignment.is_treated(*idx))
            .map(|(_, pair)| pair),
    );
    let control = weighted_mean(
        rows()
            .filter(|(idx, _)| !assignment.is_treated(*idx))
            .map(|(_, pair)| pair),
    );
    Ok(treated - control)
}
