use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, AssignmentDesign, Probabilities, RngHandle};
use serde::{Deserialize, Serialize};

use crate::block::BlockDesign;
use crate::cluster::ClusterDesign;
use crate::complete::CompleteDesign;
use crate::simple::BernoulliDesign;

fn serde_error(code: &str, err: impl ToString) -> FexpError {
    FexpError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Declarative description of a binary design, as written in YAML.
///
/// ```yaml
/// kind: block
/// blocks: ["north", "north", "south", "south"]
/// treated: { north: 1, south: 1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DesignPlan {
    /// Exactly `treated` of `units` units.
    Complete {
        /// Pool size.
        units: usize,
        /// Treated count.
        treated: usize,
    },
    /// Independent coin flips with per-unit probabilities.
    Bernoulli {
        /// Probability of treatment for each unit.
        probabilities: Vec<f64>,
    },
    /// Complete randomization within blocks.
    Block {
        /// Block label of each unit.
        blocks: Vec<String>,
        /// Treated count per block label.
        treated: BTreeMap<String, usize>,
    },
    /// Whole clusters assigned together.
    Cluster {
        /// Cluster label of each unit.
        clusters: Vec<String>,
        /// Number of clusters to treat.
        treated_clusters: usize,
    },
}

impl DesignPlan {
    /// Validates the plan and builds the design it describes.
    pub fn build(&self) -> Result<PlannedDesign, FexpError> {
        Ok(match self {
            DesignPlan::Complete { units, treated } => {
                PlannedDesign::Complete(CompleteDesign::new(*units, *treated)?)
            }
            DesignPlan::Bernoulli { probabilities } => PlannedDesign::Bernoulli(
                BernoulliDesign::new(Probabilities::new(probabilities.clone())?),
            ),
            DesignPlan::Block { blocks, treated } => {
                PlannedDesign::Block(BlockDesign::new(blocks, treated.clone())?)
            }
            DesignPlan::Cluster {
                clusters,
                treated_clusters,
            } => PlannedDesign::Cluster(ClusterDesign::new(clusters, *treated_clusters)?),
        })
    }
}

/// A design built from a [`DesignPlan`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedDesign {
    /// See [`CompleteDesign`].
    Complete(CompleteDesign),
    /// See [`BernoulliDesign`].
    Bernoulli(BernoulliDesign),
    /// See [`BlockDesign`].
    Block(BlockDesign),
    /// See [`ClusterDesign`].
    Cluster(ClusterDesign),
}

impl PlannedDesign {
    fn inner(&self) -> &dyn AssignmentDesign {
        match self {
            PlannedDesign::Complete(design) => design,
            PlannedDesign::Bernoulli(design) => design,
            PlannedDesign::Block(design) => design,
            PlannedDesign::Cluster(design) => design,
        }
    }
}

impl AssignmentDesign for PlannedDesign {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn units(&self) -> usize {
        self.inner().units()
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        self.inner().draw(rng)
    }

    fn probabilities(&self) -> Option<Probabilities> {
        self.inner().probabilities()
    }
}

/// Parses a design plan from YAML text.
pub fn plan_from_yaml(contents: &str) -> Result<DesignPlan, FexpError> {
    serde_yaml::from_str(contents).map_err(|err| serde_error("yaml_deserialize", err))
}

/// Renders a design plan as YAML.
pub fn plan_to_yaml(plan: &DesignPlan) -> Result<String, FexpError> {
    serde_yaml::to_string(plan).map_err(|err| serde_error("yaml_serialize", err))
}

/// Loads a design plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<DesignPlan, FexpError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| {
        FexpError::Serde(
            ErrorInfo::new("plan_read", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    plan_from_yaml(&contents)
}
