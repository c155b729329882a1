use fexp_core::{
    ArmAssignment, Assignment, Outcomes, Probabilities, UnitId, UnitPool, UnitRecord, UnitTable,
};

fn record(unit: u64, treated: bool, outcome: f64, probability: Option<f64>) -> UnitRecord {
    UnitRecord {
        unit: UnitId::from_raw(unit),
        treated,
        outcome,
        probability,
    }
}

#[test]
fn sequential_pool_starts_at_one() {
    let pool = UnitPool::sequential(3);
    let raw: Vec<u64> = pool.ids().iter().map(|id| id.as_raw()).collect();
    assert_eq!(raw, vec![1, 2, 3]);
    assert_eq!(pool.position(UnitId::from_raw(3)), Some(2));
}

#[test]
fn duplicate_units_are_rejected() {
    let err = UnitPool::from_ids(vec![UnitId::from_raw(4), UnitId::from_raw(4)]).unwrap_err();
    assert_eq!(err.info().code, "duplicate_unit");
}

#[test]
fn assignment_counts_and_indicators() {
    let assignment = Assignment::from_indicators(&[1, 0, 1, 0, 0]).expect("valid");
    assert_eq!(assignment.treated_count(), 2);
    assert_eq!(assignment.control_count(), 3);
    assert_eq!(assignment.treated_indices(), vec![0, 2]);
    assert_eq!(assignment.indicators(), vec![1, 0, 1, 0, 0]);
    assert!(Assignment::from_indicators(&[0, 2]).is_err());
}

#[test]
fn arm_assignment_members_and_indicator() {
    let arms = ArmAssignment::new(vec![Some(0), None, Some(1), Some(0)], vec![2, 1]);
    assert_eq!(arms.members(0), vec![0, 3]);
    assert_eq!(arms.unassigned_count(), 1);
    assert_eq!(arms.indicator(1).treated_indices(), vec![2]);
    assert_eq!(arms.label(1), None);
}

#[test]
fn probabilities_and_outcomes_validate() {
    assert!(Probabilities::new(vec![0.0, 0.5, 1.0]).is_ok());
    assert!(Probabilities::new(vec![1.5]).is_err());
    assert!(Probabilities::new(vec![f64::NAN]).is_err());
    assert!(Outcomes::new(vec![f64::INFINITY]).is_err());
    let probabilities = Probabilities::new(vec![0.0, 0.3, 1.0]).unwrap();
    assert_eq!(probabilities.boundary_indices(), vec![0, 2]);
}

#[test]
fn probabilities_reject_invalid_json() {
    let parsed: Result<Probabilities, _> = serde_json::from_str("[0.2, 1.2]");
    assert!(parsed.is_err());
    let parsed: Probabilities = serde_json::from_str("[0.2, 0.8]").expect("valid");
    assert_eq!(parsed.values(), &[0.2, 0.8]);
}

#[test]
fn table_aligns_records() {
    let table = UnitTable::from_records(vec![
        record(10, true, 3.0, Some(0.5)),
        record(11, false, 1.0, Some(0.25)),
    ])
    .expect("table");
    assert_eq!(table.len(), 2);
    assert_eq!(table.assignment().treated_indices(), vec![0]);
    assert_eq!(table.outcomes().values(), &[3.0, 1.0]);
    assert_eq!(table.probabilities().unwrap().values(), &[0.5, 0.25]);
}

#[test]
fn table_requires_all_or_no_probabilities() {
    let err = UnitTable::from_records(vec![
        record(1, true, 3.0, Some(0.5)),
        record(2, false, 1.0, None),
    ])
    .unwrap_err();
    assert_eq!(err.info().code, "partial_probabilities");
}

#[test]
fn retain_interior_reports_dropped_units() {
    let table = UnitTable::from_records(vec![
        record(1, true, 3.0, Some(1.0)),
        record(2, false, 1.0, Some(0.4)),
        record(3, true, 2.0, Some(0.6)),
        record(4, false, 0.0, Some(0.0)),
    ])
    .expect("table");
    let (kept, dropped) = table.retain_interior().expect("retain");
    assert_eq!(kept.len(), 2);
    assert_eq!(dropped, vec![UnitId::from_raw(1), UnitId::from_raw(4)]);
    assert!(kept.probabilities().unwrap().boundary_indices().is_empty());
}
