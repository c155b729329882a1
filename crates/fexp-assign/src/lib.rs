#![deny(missing_docs)]
#![doc = "Randomization procedures for field experiments: complete, simple, block, cluster, multi-arm, factorial and wait-list assignment."]

/// Block randomization.
pub mod block;
/// Cluster randomization.
pub mod cluster;
/// Fixed-size (complete) randomization.
pub mod complete;
/// Multi-arm, factorial and wait-list assignment.
pub mod multi_arm;
/// YAML design plans.
pub mod plan;
/// Simple and variable-probability randomization.
pub mod simple;

pub use block::BlockDesign;
pub use cluster::ClusterDesign;
pub use complete::{assign, draw_complete, CompleteDesign};
pub use multi_arm::{
    factorial_assign, multi_arm_assign, waitlist_assign, FactorialAssignment, WaitlistSchedule,
};
pub use plan::{load_plan, plan_from_yaml, plan_to_yaml, DesignPlan, PlannedDesign};
pub use simple::{simple_assign, BernoulliDesign};
