use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{ArmAssignment, Assignment, RngHandle};
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complete::draw_complete;

/// Largest number of crossed factors; cells are indexed by a `u32` bitmask.
pub const MAX_FACTORS: usize = 16;

fn total_size(sizes: &[usize]) -> Result<usize, FexpError> {
    sizes.iter().try_fold(0usize, |acc, size| acc.checked_add(*size)).ok_or_else(|| {
        FexpError::invalid("group_size_overflow", "group sizes overflow usize")
    })
}

fn sequential_labels(
    units: usize,
    group_sizes: &[usize],
    rng: &mut RngHandle,
) -> Vec<Option<usize>> {
    let mut labels = vec![None; units];
    let mut remaining: Vec<usize> = (0..units).collect();
    for (group, size) in group_sizes.iter().enumerate() {
        for pick in index::sample(rng, remaining.len(), *size) {
            labels[remaining[pick]] = Some(group);
        }
        remaining.retain(|unit| labels[*unit].is_none());
    }
    labels
}

/// Partitions `n` units into non-overlapping labelled groups.
///
/// Group 1 is drawn uniformly from all `n` units and removed, group 2 is
/// drawn from the remainder, and so on; units left over stay unassigned.
pub fn multi_arm_assign(
    n: usize,
    group_sizes: &[usize],
    seed: u64,
) -> Result<ArmAssignment, FexpError> {
    let total = total_size(group_sizes)?;
    if total > n {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("group_sizes", "group sizes sum to more than the pool size")
                .with_context("n", n)
                .with_context("sum", total),
        ));
    }
    debug!(n, groups = group_sizes.len(), seed, "multi-arm assignment");
    let mut rng = RngHandle::from_seed(seed);
    let labels = sequential_labels(n, group_sizes, &mut rng);
    Ok(ArmAssignment::new(labels, group_sizes.to_vec()))
}

/// Crossed treatments: one independent indicator per factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorialAssignment {
    units: usize,
    factors: Vec<Assignment>,
}

impl FactorialAssignment {
    /// Size of the pool.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Number of factors.
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Indicator of factor `k`.
    pub fn factor(&self, k: usize) -> Option<&Assignment> {
        self.factors.get(k)
    }

    /// All indicators, in factor order.
    pub fn factors(&self) -> &[Assignment] {
        &self.factors
    }

    /// Cell of the unit at `index`: bit `k` is set when factor `k` is on.
    pub fn cell(&self, index: usize) -> u32 {
        self.factors
            .iter()
            .enumerate()
            .filter(|(_, factor)| factor.is_treated(index))
            .fold(0u32, |cell, (k, _)| cell | (1 << k))
    }

    /// Number of units in each of the `2^k` cells.
    pub fn cell_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; 1 << self.factors.len()];
        for idx in 0..self.units {
            counts[self.cell(idx) as usize] += 1;
        }
        counts
    }
}

/// Factorial assignment: factor `k` treats exactly `factor_sizes[k]` units,
/// drawn from the full pool on its own RNG substream so indicators overlap
/// independently.
pub fn factorial_assign(
    n: usize,
    factor_sizes: &[usize],
    seed: u64,
) -> Result<FactorialAssignment, FexpError> {
    if factor_sizes.len() > MAX_FACTORS {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("factor_count", "too many factors")
                .with_context("factors", factor_sizes.len())
                .with_context("max", MAX_FACTORS),
        ));
    }
    debug!(n, factors = factor_sizes.len(), seed, "factorial assignment");
    let factors = factor_sizes
        .iter()
        .enumerate()
        .map(|(k, size)| {
            let mut rng = RngHandle::substream(seed, k as u64);
            draw_complete(n, *size, &mut rng)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FactorialAssignment { units: n, factors })
}

/// Order in which units receive treatment under a wait-list design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistSchedule {
    waves: Vec<usize>,
    wave_sizes: Vec<usize>,
}

impl WaitlistSchedule {
    /// Wave in which the unit at `index` starts treatment.
    pub fn wave(&self, index: usize) -> Option<usize> {
        self.waves.get(index).copied()
    }

    /// Per-unit waves in pool order.
    pub fn waves(&self) -> &[usize] {
        &self.waves
    }

    /// Number of waves.
    pub fn num_waves(&self) -> usize {
        self.wave_sizes.len()
    }

    /// Assignment in force during `wave`: units from waves `0..=wave` are treated.
    pub fn treated_by(&self, wave: usize) -> Result<Assignment, FexpError> {
        if wave >= self.wave_sizes.len() {
            return Err(FexpError::InvalidArgument(
                ErrorInfo::new("wave_range", "wave index out of range")
                    .with_context("wave", wave)
                    .with_context("waves", self.wave_sizes.len()),
            ));
        }
        Ok(Assignment::from_flags(
            self.waves.iter().map(|unit_wave| *unit_wave <= wave).collect(),
        ))
    }
}

/// Wait-list (phase-in) randomization: every unit is eventually treated and
/// the draw decides the wave. Wave sizes must sum exactly to `n`.
pub fn waitlist_assign(
    n: usize,
    wave_sizes: &[usize],
    seed: u64,
) -> Result<WaitlistSchedule, FexpError> {
    let total = total_size(wave_sizes)?;
    if total != n {
        return Err(FexpError::InvalidArgument(
            ErrorInfo::new("wave_sizes", "wave sizes must sum to the pool size")
                .with_context("n", n)
                .with_context("sum", total)
                .with_hint("every unit on a wait list is treated in some wave"),
        ));
    }
    debug!(n, waves = wave_sizes.len(), seed, "wait-list assignment");
    let mut rng = RngHandle::from_seed(seed);
    let waves = sequential_labels(n, wave_sizes, &mut rng)
        .into_iter()
        .map(|label| label.unwrap_or_default())
        .collect();
    Ok(WaitlistSchedule {
        waves,
        wave_sizes: wave_sizes.to_vec(),
    })
}
