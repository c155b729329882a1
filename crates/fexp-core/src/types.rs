use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, FexpError};

/// Identifier for an experimental unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Ordered, duplicate-free sequence of units taking part in one randomization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPool {
    ids: Vec<UnitId>,
}

impl UnitPool {
    /// Pool with identifiers `1..=n`.
    pub fn sequential(n: usize) -> Self {
        Self {
            ids: (1..=n as u64).map(UnitId::from_raw).collect(),
        }
    }

    /// Builds a pool from explicit identifiers, rejecting duplicates.
    pub fn from_ids(ids: Vec<UnitId>) -> Result<Self, FexpError> {
        let mut seen = BTreeSet::new();
        for id in &ids {
            if !seen.insert(*id) {
                return Err(FexpError::InvalidArgument(
                    ErrorInfo::new("duplicate_unit", "unit identifiers must be unique")
                        .with_context("unit", id.as_raw()),
                ));
            }
        }
        Ok(Self { ids })
    }

    /// Number of units in the pool.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the pool holds no units.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in pool order.
    pub fn ids(&self) -> &[UnitId] {
        &self.ids
    }

    /// Position of `id` within the pool.
    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.ids.iter().position(|candidate| *candidate == id)
    }
}

/// Binary treatment indicator per unit, in pool order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    treated: Vec<bool>,
}

impl Assignment {
    /// Wraps a vector of treatment flags.
    pub fn from_flags(treated: Vec<bool>) -> Self {
        Self { treated }
    }

    /// Builds an assignment from 0/1 indicators; any other value is rejected.
    pub fn from_indicators(indicators: &[u8]) -> Result<Self, FexpError> {
        let mut treated = Vec::with_capacity(indicators.len());
        for (idx, value) in indicators.iter().enumerate() {
            match value {
                0 => treated.push(false),
                1 => treated.push(true),
                other => {
                    return Err(FexpError::InvalidArgument(
                        ErrorInfo::new("indicator_range", "treatment indicators must be 0 or 1")
                            .with_context("index", idx)
                            .with_context("value", other),
                    ))
                }
            }
        }
        Ok(Self { treated })
    }

    /// Number of units covered by the assignment.
    pub fn len(&self) -> usize {
        self.treated.len()
    }

    /// True when the assignment covers no units.
    pub fn is_empty(&self) -> bool {
        self.treated.is_empty()
    }

    /// Whether the unit at `index` is treated.
    pub fn is_treated(&self, index: usize) -> bool {
        self.treated.get(index).copied().unwrap_or(false)
    }

    /// Number of treated units.
    pub fn treated_count(&self) -> usize {
        self.treated.iter().filter(|flag| **flag).count()
    }

    /// Number of control units.
    pub fn control_count(&self) -> usize {
        self.len() - self.treated_count()
    }

    /// Raw treatment flags.
    pub fn flags(&self) -> &[bool] {
        &self.treated
    }

    /// Treatment flags as 0/1 indicators.
    pub fn indicators(&self) -> Vec<u8> {
        self.treated.iter().map(|flag| u8::from(*flag)).collect()
    }

    /// Positions of treated units in ascending order.
    pub fn treated_indices(&self) -> Vec<usize> {
        self.treated
            .iter()
            .enumerate()
            .filter_map(|(idx, flag)| flag.then_some(idx))
            .collect()
    }
}

/// Categorical assignment: at most one group label per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmAssignment {
    labels: Vec<Option<usize>>,
    group_sizes: Vec<usize>,
}

impl ArmAssignment {
    /// Wraps per-unit labels together with the group sizes that produced them.
    pub fn new(labels: Vec<Option<usize>>, group_sizes: Vec<usize>) -> Self {
        Self {
            labels,
            group_sizes,
        }
    }

    /// Number of units covered by the assignment.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the assignment covers no units.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of groups.
    pub fn num_groups(&self) -> usize {
        self.group_sizes.len()
    }

    /// Requested group sizes.
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    /// Label of the unit at `index`; `None` for unassigned units.
    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied().flatten()
    }

    /// Per-unit labels in pool order.
    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    /// Positions of the units placed in `group`.
    pub fn members(&self, group: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| (*label == Some(group)).then_some(idx))
            .collect()
    }

    /// Number of units left without a label.
    pub fn unassigned_count(&self) -> usize {
        self.labels.iter().filter(|label| label.is_none()).count()
    }

    /// Binary indicator for membership in `group`.
    pub fn indicator(&self, group: usize) -> Assignment {
        Assignment::from_flags(
            self.labels
                .iter()
                .map(|label| *label == Some(group))
                .collect(),
        )
    }
}

/// Per-unit probability of treatment, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Probabilities {
    values: Vec<f64>,
}

impl Probabilities {
    /// Validates that every entry is a finite number in `[0, 1]`.
    pub fn new(values: Vec<f64>) -> Result<Self, FexpError> {
        for (idx, value) in values.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 || *value > 1.0 {
                return Err(FexpError::InvalidArgument(
                    ErrorInfo::new("probability_range", "probabilities must lie in [0, 1]")
                        .with_context("index", idx)
                        .with_context("value", value),
                ));
            }
        }
        Ok(Self { values })
    }

    /// Same probability for every unit.
    pub fn uniform(n: usize, p: f64) -> Result<Self, FexpError> {
        Self::new(vec![p; n])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in pool order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Indices whose probability is exactly 0 or 1.
    pub fn boundary_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| (*p <= 0.0 || *p >= 1.0).then_some(idx))
            .collect()
    }
}

impl TryFrom<Vec<f64>> for Probabilities {
    type Error = FexpError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Probabilities> for Vec<f64> {
    fn from(probabilities: Probabilities) -> Self {
        probabilities.values
    }
}

/// Observed numeric outcome per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Outcomes {
    values: Vec<f64>,
}

impl Outcomes {
    /// Validates that every outcome is finite.
    pub fn new(values: Vec<f64>) -> Result<Self, FexpError> {
        if let Some(idx) = values.iter().position(|value| !value.is_finite()) {
            return Err(FexpError::InvalidArgument(
                ErrorInfo::new("outcome_not_finite", "outcomes must be finite numbers")
                    .with_context("index", idx),
            ));
        }
        Ok(Self { values })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in pool order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for Outcomes {
    type Error = FexpError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Outcomes> for Vec<f64> {
    fn from(outcomes: Outcomes) -> Self {
        outcomes.values
    }
}

/// One row of experimental data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Unit identifier.
    pub unit: UnitId,
    /// Whether the unit was assigned to treatment.
    pub treated: bool,
    /// Observed outcome.
    pub outcome: f64,
    /// Known or simulated probability of treatment, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// Experimental data keyed by unit, exposed as aligned vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    pool: UnitPool,
    assignment: Assignment,
    outcomes: Outcomes,
    probabilities: Option<Probabilities>,
}

impl UnitTable {
    /// Builds a table from records. Probabilities must be given for every
    /// record or for none.
    pub fn from_records(records: Vec<UnitRecord>) -> Result<Self, FexpError> {
        let with_probability = records
            .iter()
            .filter(|record| record.probability.is_some())
            .count();
        if with_probability != 0 && with_probability != records.len() {
            return Err(FexpError::InvalidArgument(
                ErrorInfo::new(
                    "partial_probabilities",
                    "probabilities must be supplied for all units or none",
                )
                .with_context("with_probability", with_probability)
                .with_context("units", records.len()),
            ));
        }
        let pool = UnitPool::from_ids(records.iter().map(|record| record.unit).collect())?;
        let assignment =
            Assignment::from_flags(records.iter().map(|record| record.treated).collect());
        let outcomes = Outcomes::new(records.iter().map(|record| record.outcome).collect())?;
        let probabilities = if with_probability == 0 {
            None
        } else {
            Some(Probabilities::new(
                records.iter().filter_map(|record| record.probability).collect(),
            )?)
        };
        Ok(Self {
            pool,
            assignment,
            outcomes,
            probabilities,
        })
    }

    /// Units in table order.
    pub fn pool(&self) -> &UnitPool {
        &self.pool
    }

    /// Observed assignment.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Observed outcomes.
    pub fn outcomes(&self) -> &Outcomes {
        &self.outcomes
    }

    /// Treatment probabilities, if the data carried them.
    pub fn probabilities(&self) -> Option<&Probabilities> {
        self.probabilities.as_ref()
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// True when the table holds no units.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Records in table order.
    pub fn records(&self) -> Vec<UnitRecord> {
        (0..self.len())
            .map(|idx| UnitRecord {
                unit: self.pool.ids()[idx],
                treated: self.assignment.is_treated(idx),
                outcome: self.outcomes.values()[idx],
                probability: self
                    .probabilities
                    .as_ref()
                    .map(|probabilities| probabilities.values()[idx]),
            })
            .collect()
    }

    /// Copy of the table without units whose probability is 0 or 1, plus the
    /// identifiers that were removed. Tables without probabilities are
    /// returned unchanged.
    pub fn retain_interior(&self) -> Result<(UnitTable, Vec<UnitId>), FexpError> {
        let mut kept = Vec::with_capacity(self.len());
        let mut dropped = Vec::new();
        for record in self.records() {
            match record.probability {
                Some(p) if p <= 0.0 || p >= 1.0 => dropped.push(record.unit),
                _ => kept.push(record),
            }
        }
        Ok((UnitTable::from_records(kept)?, dropped))
    }
}
