use std::collections::BTreeMap;

use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, AssignmentDesign, Probabilities, RngHandle};

use crate::complete::{check_treated_count, draw_complete};

/// Whole clusters are assigned together: a fixed number of clusters is
/// treated and every unit inherits its cluster's condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDesign {
    units: usize,
    clusters: BTreeMap<String, Vec<usize>>,
    treated_clusters: usize,
}

impl ClusterDesign {
    /// `clusters[i]` is the cluster of unit `i`.
    pub fn new(clusters: &[String], treated_clusters: usize) -> Result<Self, FexpError> {
        let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, cluster) in clusters.iter().enumerate() {
            members.entry(cluster.clone()).or_default().push(idx);
        }
        check_treated_count(members.len(), treated_clusters).map_err(|_| {
            FexpError::InvalidArgument(
                ErrorInfo::new("treated_clusters", "treated cluster count exceeds cluster count")
                    .with_context("clusters", members.len())
                    .with_context("m", treated_clusters),
            )
        })?;
        Ok(Self {
            units: clusters.len(),
            clusters: members,
            treated_clusters,
        })
    }

    /// Number of distinct clusters.
    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Positions of the units in `cluster`.
    pub fn members(&self, cluster: &str) -> Option<&[usize]> {
        self.clusters.get(cluster).map(Vec::as_slice)
    }
}

impl AssignmentDesign for ClusterDesign {
    fn name(&self) -> &str {
        "cluster"
    }

    fn units(&self) -> usize {
        self.units
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        let cluster_draw = draw_complete(self.clusters.len(), self.treated_clusters, rng)?;
        let mut flags = vec![false; self.units];
        for (cluster_idx, units) in self.clusters.values().enumerate() {
            if cluster_draw.is_treated(cluster_idx) {
                for unit in units {
                    flags[*unit] = true;
                }
            }
        }
        Ok(Assignment::from_flags(flags))
    }

    fn probabilities(&self) -> Option<Probabilities> {
        if self.clusters.is_empty() {
            return Probabilities::new(Vec::new()).ok();
        }
        let p = self.treated_clusters as f64 / self.clusters.len() as f64;
        Probabilities::uniform(self.units, p).ok()
    }
}
