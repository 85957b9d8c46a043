// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_hierarchy::{ConflictPolicy, Hierarchy, InstanceId, NodeSource, ParentChange};

/// Complete `arity`-ary forest over `n` nodes; node `i` has instance id `i`.
struct Forest {
    n: usize,
    arity: usize,
}

impl Forest {
    fn new(n: usize, arity: usize) -> Self {
        Self { n, arity }
    }

    fn id(i: usize) -> InstanceId {
        InstanceId(i32::try_from(i).unwrap())
    }

    fn leaves(&self) -> core::ops::Range<usize> {
        (self.n - 1) / self.arity + 1..self.n
    }
}

impl NodeSource for Forest {
    type Node = usize;
    type Payload = u64;

    fn instance_id(&self, node: &usize) -> InstanceId {
        Self::id(*node)
    }

    fn parent_of(&self, node: &usize) -> Option<usize> {
        (*node > 0).then(|| (*node - 1) / self.arity)
    }

    fn children_of(&self, node: &usize) -> impl Iterator<Item = usize> {
        let first = node * self.arity + 1;
        (first..first + self.arity).take_while(|&c| c < self.n)
    }

    fn payload(&self, node: &usize) -> u64 {
        *node as u64
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000usize, 10_000, 100_000] {
        let forest = Forest::new(n, 4);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("quad_n{}", n), |b| {
            b.iter(|| {
                let h = Hierarchy::build(&forest, [0]).unwrap();
                black_box(h.len());
            })
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    for &n in &[10_000usize, 100_000] {
        let forest = Forest::new(n, 4);
        let built = Hierarchy::build(&forest, [0]).unwrap();
        group.bench_function(format!("quarter_subtree_n{}", n), |b| {
            b.iter_batched(
                || built.clone(),
                |mut h| black_box(h.remove([Forest::id(1)])),
                BatchSize::LargeInput,
            )
        });

        let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
        let leaves = forest.leaves();
        let doomed: Vec<_> = (0..256)
            .map(|_| Forest::id(leaves.start + rng.below(leaves.len())))
            .collect();
        group.bench_function(format!("leaf_batch_256_n{}", n), |b| {
            b.iter_batched(
                || built.clone(),
                |mut h| black_box(h.remove(doomed.iter().copied())),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_add_recurse(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_recurse");
    for &n in &[10_000usize, 100_000] {
        let forest = Forest::new(n, 4);
        let mut pruned = Hierarchy::build(&forest, [0]).unwrap();
        let removed = pruned.remove([Forest::id(2)]);
        group.throughput(Throughput::Elements(removed as u64));
        group.bench_function(format!("quarter_subtree_n{}", n), |b| {
            b.iter_batched(
                || pruned.clone(),
                |mut h| black_box(h.add_recurse(&forest, &2)),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_change_parents(c: &mut Criterion) {
    let mut group = c.benchmark_group("change_parents");
    let n = 100_000;
    let forest = Forest::new(n, 4);
    let built = Hierarchy::build(&forest, [0]).unwrap();
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let leaves = forest.leaves();
    let batch: Vec<_> = (0..1024)
        .map(|_| {
            let child = leaves.start + rng.below(leaves.len());
            let parent = rng.below(leaves.start);
            ParentChange::new(Forest::id(child), Some(Forest::id(parent)))
        })
        .collect();
    for (name, policy) in [
        ("skip_offending", ConflictPolicy::SkipOffending),
        ("reject_batch", ConflictPolicy::RejectBatch),
    ] {
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_function(format!("leaf_moves_1024_{}", name), |b| {
            b.iter_batched(
                || (built.clone(), Vec::with_capacity(batch.len())),
                |(mut h, mut applied)| {
                    // Leaves only move under internal nodes, so no pair can form a cycle.
                    h.change_parents(&batch, policy, &mut applied).unwrap();
                    black_box(applied.len());
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_hierarchy_instance_ids");
    let forest = Forest::new(100_000, 4);
    let h = Hierarchy::build(&forest, [0]).unwrap();
    let roots = [Forest::id(1), Forest::id(7), Forest::id(30)];
    group.bench_function("three_roots_n100000", |b| {
        let mut visited = Vec::new();
        b.iter(|| {
            visited.clear();
            h.collect_hierarchy_instance_ids(roots, &mut visited);
            black_box(visited.len());
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_remove,
    bench_add_recurse,
    bench_change_parents,
    bench_collect,
);
criterion_main!(benches);
