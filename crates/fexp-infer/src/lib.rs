#![deny(missing_docs)]
#![doc = "Estimators and randomization inference for field experiments."]

/// YAML inference configuration.
pub mod config;
/// Difference-in-means and inverse-probability-weighted estimators.
pub mod estimate;
/// Canonical hashing helpers.
pub mod hash;
/// Simulation-estimated assignment probabilities.
pub mod probability;
/// Randomization inference.
pub mod ri;
/// Canonical JSON serde helpers.
pub mod serde;
/// Summary statistics of null distributions.
pub mod stat;
/// Test statistics evaluated under re-randomization.
pub mod statistic;

pub use config::{config_from_yaml, load_config, InferenceConfig};
pub use estimate::{difference_in_means, ipw_estimate, ipw_weights};
pub use hash::stable_hash_string;
pub use probability::estimate_probabilities;
pub use ri::{
    null_distribution, randomization_inference, Alternative, NullDistribution, RiOpts, RiReport,
};
pub use serde::to_canonical_json_bytes;
pub use stat::Quantiles;
pub use statistic::{AbsDifferenceInMeans, DifferenceInMeans, IpwDifference, StatisticKind};
