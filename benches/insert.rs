use criterion::{criterion_group, criterion_main, Criterion};
use dynamic_learned_index::{Config, DynamicIndex};
use rand::seq::SliceRandom;

fn insert_into_fresh_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert into fresh index");

    for item_count in [1_000u64, 10_000, 100_000] {
        group.bench_function(format!("{item_count}"), |b| {
            b.iter(|| {
                let config = Config::new().build().expect("valid config");
                let mut index: DynamicIndex<u64, u64> = DynamicIndex::new(config);

                for k in 0..item_count {
                    index.insert(k, k);
                }

                assert_eq!(item_count as usize, index.len());
            });
        });
    }
}

fn insert_causing_repeated_cascades(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert with small bottom level");

    for item_count in [1_000u64, 10_000, 100_000] {
        group.bench_function(format!("{item_count}"), |b| {
            b.iter(|| {
                // A tiny bottom buffer forces far more cascades per item
                // than the default config, stressing the merge path rather
                // than the append-only fast path.
                let config = Config::new().min_level(3).build().expect("valid config");
                let mut index: DynamicIndex<u64, u64> = DynamicIndex::new(config);

                for k in 0..item_count {
                    index.insert(k, k);
                }
            });
        });
    }
}

fn insert_in_random_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert in random order");
    let mut rng = rand::rng();

    for item_count in [1_000u64, 10_000, 100_000] {
        let mut keys: Vec<u64> = (0..item_count).collect();
        keys.shuffle(&mut rng);

        group.bench_function(format!("{item_count}"), |b| {
            b.iter(|| {
                let config = Config::new().build().expect("valid config");
                let mut index: DynamicIndex<u64, u64> = DynamicIndex::new(config);

                for &k in &keys {
                    index.insert(k, k);
                }
            });
        });
    }
}

fn bulk_load_vs_streaming_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_load vs streaming insert");
    let item_count = 100_000u64;

    group.bench_function("bulk_load", |b| {
        b.iter(|| {
            let config = Config::new().build().expect("valid config");
            let data = (0..item_count).map(|k| (k, k));
            let index: DynamicIndex<u64, u64> =
                DynamicIndex::bulk_load(config, data).expect("valid config");
            assert_eq!(item_count as usize, index.len());
        });
    });

    group.bench_function("streaming insert", |b| {
        b.iter(|| {
            let config = Config::new().build().expect("valid config");
            let mut index: DynamicIndex<u64, u64> = DynamicIndex::new(config);

            for k in 0..item_count {
                index.insert(k, k);
            }
        });
    });
}

criterion_group!(
    benches,
    insert_into_fresh_index,
    insert_causing_repeated_cascades,
    insert_in_random_order,
    bulk_load_vs_streaming_insert
);
criterion_main!(benches);
