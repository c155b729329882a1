use std::collections::BTreeMap;

use fexp_assign::{assign, BernoulliDesign, BlockDesign, CompleteDesign};
use fexp_core::{
    statistic_fn, Assignment, AssignmentDesign, Outcomes, Probabilities, RngHandle,
};
use fexp_infer::{
    randomization_inference, AbsDifferenceInMeans, Alternative, DifferenceInMeans, RiOpts,
};
use rand::Rng;

fn noise_outcomes(n: usize, seed: u64) -> Outcomes {
    let mut rng = RngHandle::from_seed(seed);
    Outcomes::new((0..n).map(|_| rng.gen::<f64>()).collect()).unwrap()
}

fn opts(iterations: usize, seed: u64) -> RiOpts {
    RiOpts {
        iterations,
        seed,
        ..RiOpts::default()
    }
}

#[test]
fn null_p_values_are_roughly_uniform() {
    let design = CompleteDesign::new(40, 20).unwrap();
    let replications = 200u64;
    let mut p_values = Vec::new();
    for rep in 0..replications {
        let outcomes = noise_outcomes(40, 10_000 + rep);
        let observed = assign(40, 20, rep).unwrap();
        let statistic = DifferenceInMeans::new(&outcomes);
        let report =
            randomization_inference(&observed, &design, &statistic, &opts(200, rep)).unwrap();
        assert!((0.0..=1.0).contains(&report.p_value));
        p_values.push(report.p_value);
    }
    let mean = p_values.iter().sum::<f64>() / p_values.len() as f64;
    let small = p_values.iter().filter(|p| **p <= 0.1).count() as f64 / p_values.len() as f64;
    assert!((0.42..=0.58).contains(&mean), "mean p-value {mean}");
    assert!((0.03..=0.18).contains(&small), "share below 0.1 {small}");
}

#[test]
fn strong_effect_is_detected() {
    let observed = assign(40, 20, 77).unwrap();
    let mut rng = RngHandle::from_seed(3);
    let outcomes = Outcomes::new(
        (0..40)
            .map(|idx| rng.gen::<f64>() + if observed.is_treated(idx) { 5.0 } else { 0.0 })
            .collect(),
    )
    .unwrap();
    let design = CompleteDesign::new(40, 20).unwrap();
    let statistic = DifferenceInMeans::new(&outcomes);

    let greater = randomization_inference(&observed, &design, &statistic, &opts(1000, 9)).unwrap();
    assert!(greater.p_value < 0.01, "p-value {}", greater.p_value);
    assert!(greater.observed > 4.0);
    assert_eq!(greater.iterations, 1000);

    let less = RiOpts {
        alternative: Alternative::Less,
        ..opts(1000, 9)
    };
    let less = randomization_inference(&observed, &design, &statistic, &less).unwrap();
    assert!(less.p_value > 0.99);

    let abs = AbsDifferenceInMeans::new(&outcomes);
    let two_sided = RiOpts {
        alternative: Alternative::TwoSided,
        ..opts(1000, 9)
    };
    let two_sided = randomization_inference(&observed, &design, &abs, &two_sided).unwrap();
    assert!(two_sided.p_value < 0.01);
}

#[test]
fn ties_count_toward_the_null() {
    let design = CompleteDesign::new(6, 3).unwrap();
    let observed = assign(6, 3, 0).unwrap();
    let constant = statistic_fn(|_: &Assignment| Ok(1.0));
    let report = randomization_inference(&observed, &design, &constant, &opts(50, 1)).unwrap();
    assert_eq!(report.exceedances, 50);
    assert_eq!(report.p_value, 1.0);
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let outcomes = noise_outcomes(30, 4);
    let observed = assign(30, 10, 4).unwrap();
    let design = CompleteDesign::new(30, 10).unwrap();
    let statistic = DifferenceInMeans::new(&outcomes);
    let serial = randomization_inference(&observed, &design, &statistic, &opts(500, 12)).unwrap();
    let parallel = RiOpts {
        concurrency: 4,
        ..opts(500, 12)
    };
    let parallel = randomization_inference(&observed, &design, &statistic, &parallel).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn block_designs_redraw_within_blocks() {
    let blocks: Vec<String> = (0..20)
        .map(|idx| if idx < 10 { "a".to_string() } else { "b".to_string() })
        .collect();
    let treated: BTreeMap<String, usize> = [("a".into(), 5), ("b".into(), 5)].into_iter().collect();
    let design = BlockDesign::new(&blocks, treated).unwrap();
    let mut rng = RngHandle::from_seed(8);
    let observed = design.draw(&mut rng).unwrap();
    let block_counts = statistic_fn(|assignment: &Assignment| {
        let in_a = (0..10).filter(|idx| assignment.is_treated(*idx)).count();
        Ok(in_a as f64)
    });
    let report = randomization_inference(&observed, &design, &block_counts, &opts(100, 2)).unwrap();
    assert_eq!(report.p_value, 1.0);
    assert_eq!(report.null_quantiles.q05, 5.0);
    assert_eq!(report.null_quantiles.q95, 5.0);
}

#[test]
fn invalid_requests_are_rejected() {
    let outcomes = noise_outcomes(10, 1);
    let design = CompleteDesign::new(10, 5).unwrap();
    let statistic = DifferenceInMeans::new(&outcomes);
    let observed = assign(10, 5, 1).unwrap();
    let err = randomization_inference(&observed, &design, &statistic, &opts(0, 1)).unwrap_err();
    assert_eq!(err.info().code, "iterations");

    let short = assign(8, 4, 1).unwrap();
    let err = randomization_inference(&short, &design, &statistic, &opts(10, 1)).unwrap_err();
    assert_eq!(err.info().code, "length_mismatch");

    let nan = statistic_fn(|_: &Assignment| Ok(f64::NAN));
    let err = randomization_inference(&observed, &design, &nan, &opts(10, 1)).unwrap_err();
    assert_eq!(err.info().code, "statistic_not_finite");
}

#[test]
fn reports_carry_provenance() {
    let outcomes = noise_outcomes(12, 2);
    let design = CompleteDesign::new(12, 6).unwrap();
    let statistic = DifferenceInMeans::new(&outcomes);
    let observed = assign(12, 6, 2).unwrap();
    let report = randomization_inference(&observed, &design, &statistic, &opts(20, 33)).unwrap();
    assert_eq!(report.provenance.procedure, "ri");
    assert_eq!(report.provenance.seed, 33);
    assert_eq!(
        report.provenance.parameters.get("design").map(String::as_str),
        Some("complete")
    );
}

#[test]
fn bernoulli_redraws_condition_on_both_arms() {
    let design = BernoulliDesign::uniform(6, 0.5).unwrap();
    let outcomes = noise_outcomes(6, 21);
    let statistic = DifferenceInMeans::new(&outcomes);
    let observed = Assignment::from_flags(vec![true, false, true, false, false, true]);
    let report = randomization_inference(&observed, &design, &statistic, &opts(500, 3)).unwrap();
    assert_eq!(report.iterations, 500);
    assert!((0.0..=1.0).contains(&report.p_value));
    assert!(report.rejected_draws > 0);

    let parallel = RiOpts {
        concurrency: 3,
        ..opts(500, 3)
    };
    let parallel = randomization_inference(&observed, &design, &statistic, &parallel).unwrap();
    assert_eq!(report, parallel);
}

#[test]
fn complete_designs_never_reject_draws() {
    let outcomes = noise_outcomes(10, 6);
    let design = CompleteDesign::new(10, 4).unwrap();
    let statistic = DifferenceInMeans::new(&outcomes);
    let observed = assign(10, 4, 6).unwrap();
    let report = randomization_inference(&observed, &design, &statistic, &opts(100, 6)).unwrap();
    assert_eq!(report.rejected_draws, 0);
}

#[test]
fn designs_that_cannot_fill_both_arms_are_rejected() {
    let design = BernoulliDesign::new(Probabilities::uniform(4, 0.0).unwrap());
    let outcomes = noise_outcomes(4, 1);
    let statistic = DifferenceInMeans::new(&outcomes);
    let observed = Assignment::from_flags(vec![true, false, true, false]);
    let err = randomization_inference(&observed, &design, &statistic, &opts(5, 1)).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.info().code, "degenerate_design");
}
