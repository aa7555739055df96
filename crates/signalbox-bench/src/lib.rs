//! Benchmark support for signalbox. The benchmarks live under `benches/`.
