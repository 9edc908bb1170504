//! Classification benchmarks.
//!
//! Measures deep acyclic chains, long reference rings and wide unions.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use immut_solver::{
    Immutability, ImmutabilityClassifier, OverrideTable, PropertyInfo, TypeArena, TypeId,
};

/// `readonly (readonly (... number[])[])[]`, `depth` levels deep.
fn nested_arrays(depth: usize) -> (TypeArena, TypeId) {
    let mut arena = TypeArena::new();
    let mut current = TypeId::NUMBER;
    for _ in 0..depth {
        current = arena.readonly_array(current);
    }
    (arena, current)
}

/// A ring of `len` readonly objects pointing at each other.
fn ring(len: usize) -> (TypeArena, TypeId) {
    let mut arena = TypeArena::new();
    let refs: Vec<TypeId> = (0..len).map(|_| arena.declare()).collect();
    for i in 0..len {
        let shape = arena.object(vec![
            PropertyInfo::readonly("next", refs[(i + 1) % len]),
            PropertyInfo::readonly("id", TypeId::STRING),
        ]);
        arena.define_reference(refs[i], format!("Node{i}"), shape);
    }
    (arena, refs[0])
}

/// A union of `width` distinct readonly object shapes.
fn wide_union(width: usize) -> (TypeArena, TypeId) {
    let mut arena = TypeArena::new();
    let members: Vec<TypeId> = (0..width)
        .map(|i| arena.object(vec![PropertyInfo::readonly(format!("k{i}"), TypeId::NUMBER)]))
        .collect();
    let union = arena.union(&members);
    (arena, union)
}

fn bench_nested_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_nested_arrays");

    for depth in [10, 100, 1_000] {
        let (arena, root) = nested_arrays(depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &root, |b, &root| {
            b.iter(|| {
                let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
                black_box(classifier.classify_fully(root))
            });
        });
    }

    group.finish();
}

fn bench_rings(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_rings");

    for len in [10, 100, 1_000] {
        let (arena, head) = ring(len);
        group.bench_with_input(BenchmarkId::new("len", len), &head, |b, &head| {
            b.iter(|| {
                let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
                black_box(classifier.classify_fully(head))
            });
        });
    }

    group.finish();
}

fn bench_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_threshold");
    let (arena, union) = wide_union(500);

    group.bench_function("exact", |b| {
        b.iter(|| {
            let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
            black_box(classifier.classify_fully(union))
        });
    });
    group.bench_function("hinted_immutable", |b| {
        b.iter(|| {
            let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
            black_box(classifier.classify(union, Immutability::Immutable))
        });
    });

    group.finish();
}

criterion_group!(
    classify_benches,
    bench_nested_arrays,
    bench_rings,
    bench_threshold
);
criterion_main!(classify_benches);
