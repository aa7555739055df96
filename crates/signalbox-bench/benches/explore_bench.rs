//! Reachability exploration benchmark.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use signalbox_harness::Explorer;

fn bench_explore_full(c: &mut Criterion) {
    let explorer = Explorer::new();
    c.bench_function("explore_full", |b| {
        b.iter(|| {
            black_box(explorer.run());
        });
    });
}

criterion_group!(benches, bench_explore_full);
criterion_main!(benches);
