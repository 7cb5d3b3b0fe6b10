//! Curve benchmarks
//!
//! Measures the cost of one plot (solve + generate) at various resolutions and
//! of the interpolated lookup used by the real-time sampler.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pvwatch_core::prelude::*;

fn reference_params() -> ModuleParameters {
    ModuleParameters::from_datasheet(35.0, 9.0, 30.0, 8.5)
}

/// Solver alone, with the default Rs refinement count
fn bench_solve(c: &mut Criterion) {
    let params = reference_params().with_resolution(200, 50);
    let solver = SingleDiodeSolver::default();

    c.bench_function("solve (50 iterations)", |b| {
        b.iter(|| black_box(solver.solve(black_box(&params))));
    });
}

/// Full plot at increasing sample counts
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Solve + Generate");

    for steps in [50usize, 200, 800].iter() {
        let params = reference_params().with_resolution(*steps, 50);
        let solver = SingleDiodeSolver::default();

        group.bench_with_input(BenchmarkId::new("steps", steps), steps, |b, _| {
            b.iter(|| {
                let circuit = solver.solve(&params);
                black_box(CurveGenerator::generate(&params, &circuit));
            });
        });
    }

    group.finish();
}

/// One sampler pass worth of lookups
fn bench_lookup(c: &mut Criterion) {
    let params = reference_params().with_resolution(200, 50);
    let circuit = SingleDiodeSolver::default().solve(&params);
    let curve = CurveGenerator::generate(&params, &circuit);

    c.bench_function("lookup 140 voltages", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for tick in 0..140 {
                total += curve.current_at(black_box(tick as f64 * 0.25));
            }
            black_box(total)
        });
    });
}

/// Plot through the shared module, including snapshot publication
fn bench_module_plot(c: &mut Criterion) {
    let params = reference_params().with_resolution(200, 50);
    let module = PvModule::new("bench", params);
    let solver = SingleDiodeSolver::for_sweep();

    c.bench_function("PvModule::plot (200 steps)", |b| {
        b.iter(|| black_box(module.plot(black_box(&params), &solver)));
    });
}

criterion_group!(benches, bench_solve, bench_generate, bench_lookup, bench_module_plot);
criterion_main!(benches);
