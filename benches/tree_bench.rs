// Benchmark suite for CountTree
//
// - bulk_load: sequential vs fork-join construction
// - increase: random inserts into an empty tree
// - mixed: increase/reduce churn on a loaded tree
// - queries: count, in_range, next/previous on a loaded tree

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tallytree::tree::{BulkLoader, CountTree, Id, Weight};

const SIZES: [usize; 3] = [1_000, 100_000, 1_000_000];

fn sorted_entries(n: usize) -> Vec<(Id, Weight)> {
    return (0..n as i64).map(|i| (i * 2, i % 100 + 1)).collect();
}

// =============================================================================
// Construction
// =============================================================================

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_load");
    for n in SIZES {
        let entries = sorted_entries(n);
        group.throughput(Throughput::Elements(n as u64));
        for depth in [0, 2] {
            group.bench_with_input(
                BenchmarkId::new(format!("parallel_depth_{depth}"), n),
                &entries,
                |b, entries| {
                    let loader = BulkLoader::new().parallel_depth(depth);
                    b.iter(|| loader.build(black_box(entries)).unwrap());
                },
            );
        }
    }
    group.finish();
}

fn bench_increase(c: &mut Criterion) {
    let mut group = c.benchmark_group("increase");
    for n in [1_000usize, 100_000] {
        let mut rng = StdRng::seed_from_u64(42);
        let ids: Vec<Id> = (0..n).map(|_| rng.gen_range(0..n as i64 * 4)).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| {
                let mut tree = CountTree::new();
                for &id in ids {
                    tree.increase(id, 1);
                }
                tree
            });
        });
    }
    group.finish();
}

// =============================================================================
// Updates and queries on a loaded tree
// =============================================================================

fn bench_mixed(c: &mut Criterion) {
    let n = 100_000;
    let base = CountTree::from_sorted(&sorted_entries(n)).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let ops: Vec<(bool, Id, Weight)> = (0..10_000)
        .map(|_| (rng.gen_bool(0.5), rng.gen_range(0..n as i64 * 2), rng.gen_range(1..150)))
        .collect();

    c.bench_function("mixed_churn_10k", |b| {
        b.iter_batched(
            || base.clone(),
            |mut tree| {
                for &(grow, id, amount) in &ops {
                    if grow {
                        tree.increase(id, amount);
                    } else {
                        tree.reduce(id, amount);
                    }
                }
                tree
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_queries(c: &mut Criterion) {
    let n = 1_000_000;
    let tree = CountTree::from_sorted(&sorted_entries(n)).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let probes: Vec<Id> = (0..1_000).map(|_| rng.gen_range(0..n as i64 * 2)).collect();

    let mut group = c.benchmark_group("queries");
    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function("count", |b| {
        b.iter(|| probes.iter().map(|&id| tree.count(black_box(id))).sum::<Weight>());
    });
    group.bench_function("next_previous", |b| {
        b.iter(|| {
            for &id in &probes {
                black_box(tree.next(id));
                black_box(tree.previous(id));
            }
        });
    });
    for width in [10i64, 1_000, 100_000] {
        group.bench_function(BenchmarkId::new("in_range", width), |b| {
            b.iter(|| {
                probes
                    .iter()
                    .map(|&low| tree.in_range(low, low + width))
                    .fold(0i64, |acc, w| acc.saturating_add(w))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bulk_load, bench_increase, bench_mixed, bench_queries);
criterion_main!(benches);
