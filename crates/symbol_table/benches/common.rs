use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{
    apply_large_runtime_config, apply_medium_runtime_config, apply_small_runtime_config,
    distinct_keys, seed_base, seed_for_iter,
};
use criterion::measurement::Measurement;
use criterion::{BatchSize, BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use symbol_table::{Bst, OrderedSymbolTable, RedBlackBst, StdBTreeMap};

const SIZES: [usize; 4] = [1_000, 8_000, 64_000, 256_000];
const OPS_PER_ITER: usize = 200;
const GET_HIT_RATE_PERCENT: u64 = 80;

#[derive(Clone)]
enum ReadOp {
    Get { key: u64 },
    Floor { key: u64 },
    Ceiling { key: u64 },
}

#[derive(Clone)]
enum OrderOp {
    Rank { key: u64 },
    Select { rank: usize },
    RangeLen { lo: u64, hi: u64 },
}

#[derive(Clone)]
enum UpdateOp {
    Put { key: u64, value: u64 },
    Delete { key: u64 },
}

fn build<M>(keys: &[u64], seed: u64) -> M
where
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut st = M::new();
    for &k in keys {
        black_box(st.put(k, rng.random()));
    }
    st
}

fn bench_read<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for &size in &SIZES {
        apply_small_runtime_config(group);
        let base_seed = seed_base(1, size as u64);
        let keys = distinct_keys(size, base_seed);
        let st = build::<M>(&keys, base_seed ^ 0x11_22_33_44);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let ops = generate_read_ops(&keys, &mut rng);
                    let start = Instant::now();
                    run_read_ops(&st, &ops);
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

fn bench_order_statistics<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for &size in &SIZES {
        apply_large_runtime_config(group);
        let base_seed = seed_base(2, size as u64);
        let keys = distinct_keys(size, base_seed);
        let st = build::<M>(&keys, base_seed ^ 0x55_66_77_88);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let ops = generate_order_ops(size, &mut rng);
                    let start = Instant::now();
                    run_order_ops(&st, &ops);
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

fn bench_update<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for &size in &SIZES {
        apply_medium_runtime_config(group);
        let base_seed = seed_base(3, size as u64);
        let keys = distinct_keys(size, base_seed);
        let mut st = build::<M>(&keys, base_seed ^ 0x99_AA_BB_CC);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = StdRng::seed_from_u64(seed_for_iter(base_seed, iter));
                    let ops = generate_update_ops(size, base_seed, iter, &mut rng);
                    let start = Instant::now();
                    run_update_ops(&mut st, &ops);
                    black_box(st.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

fn bench_drain<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for &size in &SIZES {
        apply_medium_runtime_config(group);
        let base_seed = seed_base(4, size as u64);
        let keys = distinct_keys(size, base_seed);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_batched(
                || build::<M>(&keys, base_seed),
                |mut st| {
                    while let Ok(entry) = st.delete_min() {
                        black_box(entry);
                    }
                    st
                },
                BatchSize::LargeInput,
            )
        });
    }
}

fn generate_read_ops(keys: &[u64], rng: &mut StdRng) -> Vec<ReadOp> {
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for _ in 0..OPS_PER_ITER {
        let op = match rng.random_range(0..4) {
            0 | 1 => {
                let hit = rng.random_range(0..100) < GET_HIT_RATE_PERCENT;
                let key = if hit {
                    keys[rng.random_range(0..keys.len())]
                } else {
                    rng.random()
                };
                ReadOp::Get { key }
            }
            2 => ReadOp::Floor { key: rng.random() },
            _ => ReadOp::Ceiling { key: rng.random() },
        };
        ops.push(op);
    }
    ops
}

fn generate_order_ops(size: usize, rng: &mut StdRng) -> Vec<OrderOp> {
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for _ in 0..OPS_PER_ITER {
        let op = match rng.random_range(0..3) {
            0 => OrderOp::Rank { key: rng.random() },
            1 => OrderOp::Select {
                rank: rng.random_range(0..size),
            },
            _ => {
                let lo: u64 = rng.random();
                let hi = lo.saturating_add(rng.random_range(0..u64::MAX / 64));
                OrderOp::RangeLen { lo, hi }
            }
        };
        ops.push(op);
    }
    ops
}

fn generate_update_ops(size: usize, base_seed: u64, iter: u64, rng: &mut StdRng) -> Vec<UpdateOp> {
    let puts = OPS_PER_ITER / 2;
    let first_id = (size as u64).wrapping_add(iter.wrapping_mul(puts as u64));
    let fresh = distinct_keys(puts, base_seed ^ first_id);
    let mut inserted = Vec::with_capacity(puts);
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for (i, &key) in fresh.iter().enumerate() {
        ops.push(UpdateOp::Put {
            key,
            value: rng.random(),
        });
        inserted.push(key);
        if i % 2 == 1 {
            let idx = rng.random_range(0..inserted.len());
            ops.push(UpdateOp::Delete {
                key: inserted.swap_remove(idx),
            });
        }
    }
    // Delete what is left so the table size is stable across iterations.
    ops.extend(inserted.into_iter().map(|key| UpdateOp::Delete { key }));
    ops
}

fn run_read_ops<M>(st: &M, ops: &[ReadOp])
where
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for op in ops {
        match *op {
            ReadOp::Get { key } => {
                black_box(st.get(&key).copied());
            }
            ReadOp::Floor { key } => {
                black_box(st.floor(&key).copied());
            }
            ReadOp::Ceiling { key } => {
                black_box(st.ceiling(&key).copied());
            }
        }
    }
}

fn run_order_ops<M>(st: &M, ops: &[OrderOp])
where
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for op in ops {
        match *op {
            OrderOp::Rank { key } => {
                black_box(st.rank(&key));
            }
            OrderOp::Select { rank } => {
                black_box(st.select(rank).ok().copied());
            }
            OrderOp::RangeLen { lo, hi } => {
                black_box(st.range_len(&lo, &hi));
            }
        }
    }
}

fn run_update_ops<M>(st: &mut M, ops: &[UpdateOp])
where
    M: OrderedSymbolTable<Key = u64, Value = u64>,
{
    for op in ops {
        match *op {
            UpdateOp::Put { key, value } => {
                black_box(st.put(key, value));
            }
            UpdateOp::Delete { key } => {
                black_box(st.delete(&key));
            }
        }
    }
}

pub fn bench_all_read<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_read::<StdBTreeMap<u64, u64>, _>(group, "std_btree");
    bench_read::<Bst<u64, u64>, _>(group, "bst");
    bench_read::<RedBlackBst<u64, u64>, _>(group, "llrb");
}

pub fn bench_all_order_statistics<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    // `StdBTreeMap` answers rank/select by linear scans and is left out.
    bench_order_statistics::<Bst<u64, u64>, _>(group, "bst");
    bench_order_statistics::<RedBlackBst<u64, u64>, _>(group, "llrb");
}

pub fn bench_all_update<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_update::<StdBTreeMap<u64, u64>, _>(group, "std_btree");
    bench_update::<Bst<u64, u64>, _>(group, "bst");
    bench_update::<RedBlackBst<u64, u64>, _>(group, "llrb");
}

pub fn bench_all_drain<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_drain::<StdBTreeMap<u64, u64>, _>(group, "std_btree");
    bench_drain::<Bst<u64, u64>, _>(group, "bst");
    bench_drain::<RedBlackBst<u64, u64>, _>(group, "llrb");
}
