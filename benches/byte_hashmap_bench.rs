use byte_hashmap::{ByteHashMap, Value};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashbrown::HashMap;
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

fn filled(seed: u64, n: usize) -> (ByteHashMap, Vec<String>) {
    let mut m = ByteHashMap::new(8, 0).unwrap();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.set(k.as_bytes(), Some(Value::U64(i as u64))).unwrap();
    }
    (m, keys)
}

// Precompute `n` random picks from `keys` using a second LCG.
fn queries(keys: &[String], n: usize) -> Vec<String> {
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            keys[(s as usize) % keys.len()].clone()
        })
        .collect()
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("byte::insert_fresh_100k", |b| {
        let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
        b.iter_batched(
            || ByteHashMap::new(8, 0).unwrap(),
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    m.set(k.as_bytes(), Some(Value::U64(i as u64))).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("byte::insert_reserved_100k", |b| {
        let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
        b.iter_batched(
            || {
                let mut m = ByteHashMap::new(8, 0).unwrap();
                m.reserve(keys.len()).unwrap();
                m
            },
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    m.set(k.as_bytes(), Some(Value::U64(i as u64))).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("hashbrown::insert_fresh_100k", |b| {
        let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
        b.iter_batched(
            HashMap::<Vec<u8>, u64>::new,
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    m.insert(k.as_bytes().to_vec(), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("byte::get_hit_10k_on_100k", |b| {
        let (m, keys) = filled(7, 100_000);
        let queries = queries(&keys, 10_000);
        b.iter(|| {
            let mut dest = [0u8; 8];
            for k in &queries {
                black_box(m.get(k.as_bytes(), &mut dest));
            }
        })
    });

    c.bench_function("hashbrown::get_hit_10k_on_100k", |b| {
        let keys: Vec<String> = lcg(7).take(100_000).map(key).collect();
        let m: HashMap<Vec<u8>, u64> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_bytes().to_vec(), i as u64))
            .collect();
        let queries = queries(&keys, 10_000);
        b.iter(|| {
            for k in &queries {
                black_box(m.get(k.as_bytes()));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("byte::get_miss_10k_on_100k", |b| {
        let (m, _) = filled(11, 100_000);
        let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();
        b.iter(|| {
            for k in &misses {
                black_box(m.contains_key(k.as_bytes()));
            }
        })
    });
}

fn bench_delete_random_10k(c: &mut Criterion) {
    c.bench_function("byte::delete_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled(5, 110_000);
                let to_delete = queries(&keys, 10_000);
                (m, to_delete)
            },
            |(mut m, to_delete)| {
                for k in &to_delete {
                    let _ = m.delete(k.as_bytes());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_count_in_place_10k(c: &mut Criterion) {
    c.bench_function("byte::at_mut_increment_10k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled(123, 100_000);
                let targets = queries(&keys, 10_000);
                (m, targets)
            },
            |(mut m, targets)| {
                for k in &targets {
                    if let Some(v) = m.at_mut(k.as_bytes()) {
                        v[0] = v[0].wrapping_add(1);
                    }
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_100k(c: &mut Criterion) {
    c.bench_function("byte::iter_all_100k", |b| {
        let (m, _) = filled(999, 100_000);
        b.iter(|| {
            let mut sum = 0usize;
            for (k, v) in &m {
                sum = sum.wrapping_add(k.len()).wrapping_add(usize::from(v[0]));
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_delete_random_10k,
              bench_count_in_place_10k,
              bench_iter_100k
}
criterion_main!(benches_insert, benches_ops);
