use bptree::{BPTree, Config, Map, MultiMap};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::hint::black_box;

const N: usize = 10_000;
const SEED: u64 = 0x5EED;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn shuffled_keys(n: usize) -> Vec<i64> {
    let mut keys = ordered_keys(n);
    keys.shuffle(&mut StdRng::seed_from_u64(SEED));
    keys
}

fn tree_with_min(min: usize) -> BPTree<i64> {
    BPTree::with_config(Config::default().min(min).capacity(N)).unwrap()
}

// ─── Set Benchmarks ─────────────────────────────────────────────────────────

fn bench_set_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_insert");

    for (label, keys) in [("ordered", ordered_keys(N)), ("shuffled", shuffled_keys(N))] {
        for min in [1, 4, 16] {
            group.bench_with_input(BenchmarkId::new(format!("BPTree/min={min}"), label), &keys, |b, keys| {
                b.iter(|| {
                    let mut tree = tree_with_min(min);
                    for &key in keys {
                        tree.insert(key);
                    }
                    tree
                });
            });
        }

        group.bench_with_input(BenchmarkId::new("BTreeSet", label), &keys, |b, keys| {
            b.iter(|| keys.iter().copied().collect::<BTreeSet<_>>());
        });
    }

    group.finish();
}

fn bench_set_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_contains");
    let keys = shuffled_keys(N);

    for min in [1, 4, 16] {
        let mut tree = tree_with_min(min);
        tree.extend(keys.iter().copied());
        group.bench_function(BenchmarkId::new("BPTree", min), |b| {
            b.iter(|| keys.iter().filter(|key| tree.contains(*key)).count());
        });
    }

    let set: BTreeSet<_> = keys.iter().copied().collect();
    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| keys.iter().filter(|key| set.contains(*key)).count());
    });

    group.finish();
}

fn bench_set_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_remove");
    let keys = shuffled_keys(N);

    for min in [1, 4, 16] {
        let mut full = tree_with_min(min);
        full.extend(keys.iter().copied());
        group.bench_function(BenchmarkId::new("BPTree", min), |b| {
            b.iter_batched(
                || full.clone(),
                |mut tree| {
                    for key in &keys {
                        tree.remove(key);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    let full: BTreeSet<_> = keys.iter().copied().collect();
    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || full.clone(),
            |mut set| {
                for key in &keys {
                    set.remove(key);
                }
                set
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_set_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_iter");
    let tree: BPTree<_> = ordered_keys(N).into_iter().collect();
    let set: BTreeSet<_> = ordered_keys(N).into_iter().collect();

    group.bench_function(BenchmarkId::new("BPTree", N), |b| b.iter(|| tree.iter().sum::<i64>()));
    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| b.iter(|| set.iter().sum::<i64>()));
    group.bench_function(BenchmarkId::new("BPTree/range", N), |b| {
        b.iter(|| tree.range(black_box(1_000)..black_box(9_000)).count());
    });

    group.finish();
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert");
    let keys = shuffled_keys(N);

    group.bench_function(BenchmarkId::new("Map", N), |b| {
        b.iter(|| {
            let mut map = Map::new();
            for &key in &keys {
                map.insert(key, key);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &key in &keys {
                map.insert(key, key);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_get");
    let keys = shuffled_keys(N);

    let map: Map<_, _> = keys.iter().map(|&key| (key, key)).collect();
    group.bench_function(BenchmarkId::new("Map", N), |b| {
        b.iter(|| keys.iter().filter_map(|key| map.get(key)).sum::<i64>());
    });

    let model: BTreeMap<_, _> = keys.iter().map(|&key| (key, key)).collect();
    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| keys.iter().filter_map(|key| model.get(key)).sum::<i64>());
    });

    group.finish();
}

fn bench_multimap_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("multimap_insert");
    let mut rng = StdRng::seed_from_u64(SEED);
    let entries: Vec<(i64, i64)> = (0..N).map(|_| (rng.random_range(0..1_000), rng.random())).collect();

    group.bench_function(BenchmarkId::new("MultiMap", N), |b| {
        b.iter(|| entries.iter().copied().collect::<MultiMap<_, _>>());
    });

    group.bench_function(BenchmarkId::new("BTreeMap<Vec>", N), |b| {
        b.iter(|| {
            let mut map: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
            for &(key, value) in &entries {
                map.entry(key).or_default().push(value);
            }
            map
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set_insert,
    bench_set_contains,
    bench_set_remove,
    bench_set_iter,
    bench_map_insert,
    bench_map_get,
    bench_multimap_insert,
);
criterion_main!(benches);
