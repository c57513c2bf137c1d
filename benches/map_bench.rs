use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use probemap::OpenAddressingMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("probemap_insert_10k", |b| {
        b.iter_batched(
            || OpenAddressingMap::<String, u64>::new(),
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("probemap_get_hit", |b| {
        let mut m = OpenAddressingMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.put(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("probemap_get_miss", |b| {
        let mut m = OpenAddressingMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // Keys unlikely to be in the map; try_get because a randomized
            // absent walk may exhaust the probe bound.
            let k = key(miss.next().unwrap());
            black_box(m.try_get(k.as_str()).ok());
        })
    });
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("probemap_put_remove_churn", |b| {
        let mut m = OpenAddressingMap::new();
        let mut src = lcg(42);
        b.iter(|| {
            let k = key(src.next().unwrap());
            m.put(k.clone(), 1u64);
            black_box(m.remove(k.as_str()));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_churn
}
criterion_main!(benches);
