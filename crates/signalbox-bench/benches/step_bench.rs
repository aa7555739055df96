//! Step and check overhead benchmarks.
//!
//! Measures the per-step cost of the automaton alone, of one step plus the
//! invariant check, and of a full driver loop over a scripted input.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use signalbox_core::{Driver, DriverConfig, Intersection, InvariantChecker, NoopObserver};
use signalbox_harness::ScriptedInput;

fn bench_step(c: &mut Criterion) {
    c.bench_function("step_powered", |b| {
        let mut automaton = Intersection::new();
        b.iter(|| {
            black_box(automaton.step(black_box(true)));
        });
    });
}

fn bench_step_and_check(c: &mut Criterion) {
    c.bench_function("step_and_check", |b| {
        let mut automaton = Intersection::new();
        let mut checker = InvariantChecker::new();
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            automaton.step(i % 7 != 0);
            black_box(checker.check_invariants(automaton.state()));
        });
    });
}

fn bench_driver_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_loop");
    for steps in [64usize, 1024] {
        let samples: Vec<bool> = (0..steps).map(|i| i % 5 != 0).collect();
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &samples, |b, samples| {
            b.iter(|| {
                let mut driver = Driver::new(
                    ScriptedInput::new(samples.iter().copied()),
                    NoopObserver,
                    NoopObserver,
                    DriverConfig::default(),
                );
                black_box(driver.run().ok());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_step_and_check, bench_driver_loop);
criterion_main!(benches);
