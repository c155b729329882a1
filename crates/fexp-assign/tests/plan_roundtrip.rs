use std::fs;

use fexp_assign::{load_plan, plan_from_yaml, plan_to_yaml, DesignPlan};
use fexp_core::{AssignmentDesign, RngHandle};

const BLOCK_PLAN: &str = r#"
kind: block
blocks: ["north", "north", "south", "south", "south"]
treated:
  north: 1
  south: 2
"#;

#[test]
fn block_plan_builds() {
    let plan = plan_from_yaml(BLOCK_PLAN).expect("parse");
    let design = plan.build().expect("build");
    assert_eq!(design.name(), "block");
    assert_eq!(design.units(), 5);
    let mut rng = RngHandle::from_seed(4);
    assert_eq!(design.draw(&mut rng).unwrap().treated_count(), 3);
}

#[test]
fn plans_round_trip_yaml() {
    let plan = DesignPlan::Cluster {
        clusters: vec!["a".into(), "a".into(), "b".into()],
        treated_clusters: 1,
    };
    let yaml = plan_to_yaml(&plan).expect("serialize");
    assert!(yaml.contains("kind: cluster"));
    assert_eq!(plan_from_yaml(&yaml).expect("parse"), plan);
}

#[test]
fn invalid_plans_fail_on_build() {
    let plan = plan_from_yaml("kind: complete\nunits: 4\ntreated: 9\n").expect("parse");
    assert!(plan.build().unwrap_err().is_invalid_argument());
    let plan = plan_from_yaml("kind: bernoulli\nprobabilities: [0.5, 2.0]\n").expect("parse");
    assert!(plan.build().is_err());
    let err = plan_from_yaml("kind: restricted\nunits: 4\n").unwrap_err();
    assert_eq!(err.info().code, "yaml_deserialize");
}

#[test]
fn plans_load_from_disk() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("design.yaml");
    fs::write(&path, "kind: complete\nunits: 10\ntreated: 4\n").expect("write");
    let plan = load_plan(&path).expect("load");
    assert_eq!(
        plan,
        DesignPlan::Complete {
            units: 10,
            treated: 4
        }
    );
    assert_eq!(
        load_plan(dir.path().join("missing.yaml")).unwrap_err().info().code,
        "plan_read"
    );
}
