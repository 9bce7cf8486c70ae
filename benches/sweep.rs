//! Compares the sweep-line engine (C6) against the brute-force intersector
//! (C7) across input sizes, following `rgeometry`'s convention of a
//! `harness = false` Criterion binary per bench target.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use line_intersectors::{find, find_simple, gen};

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_vs_find_simple");
    for &n in &[50usize, 200, 800] {
        let mut rng = rand::thread_rng();
        let lines = gen::generate_lines::<gen::ShortLines>(n, &mut rng);

        group.bench_with_input(BenchmarkId::new("sweep", n), &lines, |b, lines| {
            b.iter(|| find(black_box(lines)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("brute", n), &lines, |b, lines| {
            b.iter(|| find_simple(black_box(lines)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find);
criterion_main!(benches);
