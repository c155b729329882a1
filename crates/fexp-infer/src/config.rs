use std::fs;
use std::path::Path;

use fexp_assign::DesignPlan;
use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{AssignmentDesign, UnitTable};
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;
use crate::ri::{randomization_inference, Alternative, RiOpts, RiReport};
use crate::statistic::StatisticKind;

/// YAML-configurable randomization-inference run.
///
/// ```yaml
/// seed: 1000
/// iterations: 5000
/// concurrency: 4
/// alternative: two-sided
/// statistic: difference-in-means
/// design:
///   kind: complete
///   units: 100
///   treated: 34
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Master seed for the re-randomizations.
    #[serde(default)]
    pub seed: u64,
    /// Number of re-randomizations K.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Worker threads.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Direction of the test.
    #[serde(default)]
    pub alternative: Alternative,
    /// Test statistic.
    #[serde(default)]
    pub statistic: StatisticKind,
    /// Design that produced the observed assignment.
    pub design: DesignPlan,
}

fn default_iterations() -> usize {
    1000
}

fn default_concurrency() -> usize {
    1
}

impl InferenceConfig {
    /// Run options derived from the config.
    pub fn opts(&self) -> RiOpts {
        RiOpts {
            iterations: self.iterations,
            seed: self.seed,
            concurrency: self.concurrency,
            alternative: self.alternative,
        }
    }

    /// Runs randomization inference on `table` under the configured design.
    ///
    /// The IPW statistic takes probabilities from the data when present and
    /// from the design otherwise.
    pub fn run(&self, table: &UnitTable) -> Result<RiReport, FexpError> {
        let design = self.design.build()?;
        let design_probabilities = design.probabilities();
        let probabilities = table.probabilities().or(design_probabilities.as_ref());
        let statistic = self.statistic.build(table.outcomes(), probabilities)?;
        let mut report =
            randomization_inference(table.assignment(), &design, statistic.as_ref(), &self.opts())?;
        report.provenance = report
            .provenance
            .with_parameter("data_hash", stable_hash_string(&table.records())?)
            .with_parameter("statistic", self.statistic.label());
        Ok(report)
    }
}

/// Parses an inference config from YAML text.
pub fn config_from_yaml(contents: &str) -> Result<InferenceConfig, FexpError> {
    serde_yaml::from_str(contents)
        .map_err(|err| FexpError::Serde(ErrorInfo::new("yaml_deserialize", err.to_string())))
}

/// Loads an inference config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<InferenceConfig, FexpError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| {
        FexpError::Serde(
            ErrorInfo::new("config_read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    config_from_yaml(&contents)
}
