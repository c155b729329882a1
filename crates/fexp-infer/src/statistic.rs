use fexp_core::errors::FexpError;
use fexp_core::{Assignment, Outcomes, Probabilities, TestStatistic};
use serde::{Deserialize, Serialize};

use crate::estimate::{difference_in_means, ipw_estimate};

/// Treated mean minus control mean of a fixed outcome vector.
#[derive(Debug, Clone, Copy)]
pub struct DifferenceInMeans<'a> {
    outcomes: &'a Outcomes,
}

impl<'a> DifferenceInMeans<'a> {
    /// Statistic over `outcomes`.
    pub fn new(outcomes: &'a Outcomes) -> Self {
        Self { outcomes }
    }
}

impl TestStatistic for DifferenceInMeans<'_> {
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, FexpError> {
        difference_in_means(self.outcomes, assignment)
    }
}

/// Absolute difference in means.
#[derive(Debug, Clone, Copy)]
pub struct AbsDifferenceInMeans<'a> {
    outcomes: &'a Outcomes,
}

impl<'a> AbsDifferenceInMeans<'a> {
    /// Statistic over `outcomes`.
    pub fn new(outcomes: &'a Outcomes) -> Self {
        Self { outcomes }
    }
}

impl TestStatistic for AbsDifferenceInMeans<'_> {
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, FexpError> {
        difference_in_means(self.outcomes, assignment).map(f64::abs)
    }
}

/// IPW difference in means under fixed design probabilities.
#[derive(Debug, Clone, Copy)]
pub struct IpwDifference<'a> {
    outcomes: &'a Outcomes,
    probabilities: &'a Probabilities,
}

impl<'a> IpwDifference<'a> {
    /// Statistic over `outcomes` weighted by `probabilities`.
    pub fn new(outcomes: &'a Outcomes, probabilities: &'a Probabilities) -> Self {
        Self {
            outcomes,
            probabilities,
        }
    }
}

impl TestStatistic for IpwDifference<'_> {
    fn evaluate(&self, assignment: &Assignment) -> Result<f64, FexpError> {
        ipw_estimate(self.outcomes, assignment, self.probabilities)
    }
}

/// Statistic selector used by configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StatisticKind {
    /// [`DifferenceInMeans`].
    #[default]
    DifferenceInMeans,
    /// [`AbsDifferenceInMeans`].
    AbsDifferenceInMeans,
    /// [`IpwDifference`]; requires probabilities.
    Ipw,
}

impl StatisticKind {
    /// Configuration name of the statistic.
    pub fn label(self) -> &'static str {
        match self {
            StatisticKind::DifferenceInMeans => "difference-in-means",
            StatisticKind::AbsDifferenceInMeans => "abs-difference-in-means",
            StatisticKind::Ipw => "ipw",
        }
    }

    /// Builds the selected statistic over `outcomes`.
    pub fn build<'a>(
        self,
        outcomes: &'a Outcomes,
        probabilities: Option<&'a Probabilities>,
    ) -> Result<Box<dyn TestStatistic + 'a>, FexpError> {
        let statistic: Box<dyn TestStatistic + 'a> = match self {
            StatisticKind::DifferenceInMeans => Box::new(DifferenceInMeans::new(outcomes)),
            StatisticKind::AbsDifferenceInMeans => Box::new(AbsDifferenceInMeans::new(outcomes)),
            StatisticKind::Ipw => {
                let probabilities = probabilities.ok_or_else(|| {
                    FexpError::invalid(
                        "probabilities_missing",
                        "the ipw statistic needs treatment probabilities",
                    )
                })?;
                Box::new(IpwDifference::new(outcomes, probabilities))
            }
        };
        Ok(statistic)
    }
}
