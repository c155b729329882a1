use std::collections::BTreeSet;

use fexp_assign::{factorial_assign, multi_arm_assign, waitlist_assign};
use proptest::prelude::*;

proptest! {
    #[test]
    fn groups_are_disjoint_and_exact(
        sizes in proptest::collection::vec(0usize..15, 1..5),
        slack in 0usize..10,
        seed in any::<u64>(),
    ) {
        let n = sizes.iter().sum::<usize>() + slack;
        let arms = multi_arm_assign(n, &sizes, seed).unwrap();
        let mut seen = BTreeSet::new();
        for (group, size) in sizes.iter().enumerate() {
            let members = arms.members(group);
            prop_assert_eq!(members.len(), *size);
            for unit in members {
                prop_assert!(seen.insert(unit));
            }
        }
        prop_assert!(seen.len() <= n);
        prop_assert_eq!(arms.unassigned_count(), slack);
    }
}

#[test]
fn oversized_groups_are_rejected() {
    let err = multi_arm_assign(10, &[6, 5], 1).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.info().code, "group_sizes");
    assert!(multi_arm_assign(10, &[usize::MAX, 2], 1).is_err());
}

#[test]
fn multi_arm_is_deterministic() {
    assert_eq!(
        multi_arm_assign(30, &[10, 10, 5], 8).unwrap(),
        multi_arm_assign(30, &[10, 10, 5], 8).unwrap()
    );
}

#[test]
fn later_groups_have_uniform_marginals() {
    let draws = 3000;
    let mut counts = vec![0usize; 6];
    for seed in 0..draws {
        let arms = multi_arm_assign(6, &[2, 2], seed).unwrap();
        for unit in arms.members(1) {
            counts[unit] += 1;
        }
    }
    for count in counts {
        let share = count as f64 / draws as f64;
        assert!((share - 1.0 / 3.0).abs() < 0.05, "share {share}");
    }
}

#[test]
fn factorial_factors_have_exact_sizes() {
    let factorial = factorial_assign(40, &[20, 10], 3).unwrap();
    assert_eq!(factorial.num_factors(), 2);
    assert_eq!(factorial.factor(0).unwrap().treated_count(), 20);
    assert_eq!(factorial.factor(1).unwrap().treated_count(), 10);
    let cells = factorial.cell_counts();
    assert_eq!(cells.len(), 4);
    assert_eq!(cells.iter().sum::<usize>(), 40);
    assert_eq!(cells[1] + cells[3], 20);
    assert_eq!(cells[2] + cells[3], 10);
}

#[test]
fn factorial_without_factors_keeps_the_pool_in_one_cell() {
    let factorial = factorial_assign(5, &[], 0).unwrap();
    assert_eq!(factorial.units(), 5);
    assert_eq!(factorial.num_factors(), 0);
    assert_eq!(factorial.cell_counts(), vec![5]);
}

#[test]
fn factorial_rejects_oversized_factor() {
    let err = factorial_assign(10, &[5, 11], 0).unwrap_err();
    assert_eq!(err.info().code, "treated_count");
}

#[test]
fn waitlist_covers_everyone() {
    let schedule = waitlist_assign(12, &[4, 4, 4], 21).unwrap();
    assert_eq!(schedule.num_waves(), 3);
    assert_eq!(schedule.treated_by(0).unwrap().treated_count(), 4);
    assert_eq!(schedule.treated_by(1).unwrap().treated_count(), 8);
    assert_eq!(schedule.treated_by(2).unwrap().treated_count(), 12);
    assert!(schedule.treated_by(3).is_err());
    assert!(schedule.waves().iter().all(|wave| *wave < 3));
}

#[test]
fn waitlist_requires_exact_cover() {
    assert!(waitlist_assign(12, &[4, 4], 0).is_err());
    assert!(waitlist_assign(12, &[8, 8], 0).is_err());
}
