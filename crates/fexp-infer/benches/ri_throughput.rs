use fexp_assign::{assign, CompleteDesign};
use fexp_core::Outcomes;
use fexp_infer::{estimate_probabilities, randomization_inference, DifferenceInMeans, RiOpts};
use criterion::{criterion_group, criterion_main, Criterion};

fn outcomes(n: usize) -> Outcomes {
    Outcomes::new((0..n).map(|idx| (idx % 17) as f64 * 0.5).collect()).expect("outcomes")
}

fn bench_ri(c: &mut Criterion) {
    let n = 500;
    let observed = assign(n, 250, 1000).expect("assign");
    let design = CompleteDesign::new(n, 250).expect("design");
    let outcomes = outcomes(n);
    let statistic = DifferenceInMeans::new(&outcomes);

    for concurrency in [1usize, 4] {
        let opts = RiOpts {
            iterations: 2000,
            seed: 7,
            concurrency,
            ..RiOpts::default()
        };
        c.bench_function(&format!("ri_complete_500x2000_threads{concurrency}"), |b| {
            b.iter(|| {
                randomization_inference(&observed, &design, &statistic, &opts).expect("ri");
            });
        });
    }

    c.bench_function("probabilities_complete_500x2000", |b| {
        b.iter(|| {
            estimate_probabilities(&design, 2000, 3, 1).expect("probabilities");
        });
    });
}

criterion_group!(benches, bench_ri);
criterion_main!(benches);
