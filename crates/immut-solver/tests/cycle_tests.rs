//! Classification of self-referential type graphs.

use immut_solver::recursion::RecursionProfile;
use immut_solver::{
    Immutability, ImmutabilityClassifier, OverrideTable, PropertyInfo, TypeArena, TypeId,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// `type Node{i} = { readonly next: Node{i+1}; readonly value: V }`, with the
/// last node pointing back at the first. Returns the reference nodes.
fn readonly_ring(arena: &mut TypeArena, len: usize, value: TypeId) -> Vec<TypeId> {
    let refs: Vec<TypeId> = (0..len).map(|_| arena.declare()).collect();
    for i in 0..len {
        let next = refs[(i + 1) % len];
        let shape = arena.object(vec![
            PropertyInfo::readonly("next", next),
            PropertyInfo::readonly("value", value),
        ]);
        arena.define_reference(refs[i], format!("Node{i}"), shape);
    }
    refs
}

#[test]
fn long_ring_terminates() {
    init_tracing();
    let mut arena = TypeArena::new();
    let ring = readonly_ring(&mut arena, 2_000, TypeId::NUMBER);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(classifier.classify_fully(ring[0]), Immutability::ReadonlyDeep);
}

#[test]
fn every_ring_member_agrees_with_the_head() {
    let mut arena = TypeArena::new();
    let list = arena.array(TypeId::STRING);
    let ring = readonly_ring(&mut arena, 300, list);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    for &member in ring.iter().rev() {
        assert_eq!(
            classifier.classify_fully(member),
            Immutability::ReadonlyShallow
        );
    }
    // Each reference and each object shape settles exactly once.
    assert!(classifier.cache_len() <= arena.len());
}

#[test]
fn long_alias_cycle_resolves_to_immutable() {
    let mut arena = TypeArena::new();
    let aliases: Vec<TypeId> = (0..4_000).map(|_| arena.declare()).collect();
    for (i, &alias) in aliases.iter().enumerate() {
        let target = aliases[(i + 1) % aliases.len()];
        arena.define_reference(alias, format!("A{i}"), target);
    }

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(classifier.classify_fully(aliases[17]), Immutability::Immutable);
}

#[test]
fn mutual_recursion_is_order_independent() {
    // type A = { readonly b: B }
    // type B = { readonly a: A; readonly tags: string[] }
    let build = || {
        let mut arena = TypeArena::new();
        let a = arena.declare();
        let b = arena.declare();
        let tags = arena.array(TypeId::STRING);
        let a_shape = arena.object(vec![PropertyInfo::readonly("b", b)]);
        let b_shape = arena.object(vec![
            PropertyInfo::readonly("a", a),
            PropertyInfo::readonly("tags", tags),
        ]);
        arena.define_reference(a, "A", a_shape);
        arena.define_reference(b, "B", b_shape);
        (arena, a, b)
    };

    let (arena, a, b) = build();
    let mut from_a = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    let a_first = (from_a.classify_fully(a), from_a.classify_fully(b));

    let mut from_b = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    let b_second = from_b.classify_fully(b);
    let b_first = (from_b.classify_fully(a), b_second);

    assert_eq!(a_first, b_first);
    assert_eq!(
        a_first,
        (Immutability::ReadonlyShallow, Immutability::ReadonlyShallow)
    );
}

#[test]
fn nested_cycles_share_one_pass() {
    // type Outer = { readonly inner: Inner; readonly back: Outer }
    // type Inner = { readonly self: Inner; readonly outer: Outer }
    let mut arena = TypeArena::new();
    let outer = arena.declare();
    let inner = arena.declare();
    let outer_shape = arena.object(vec![
        PropertyInfo::readonly("inner", inner),
        PropertyInfo::readonly("back", outer),
    ]);
    let inner_shape = arena.object(vec![
        PropertyInfo::readonly("self", inner),
        PropertyInfo::readonly("outer", outer),
    ]);
    arena.define_reference(outer, "Outer", outer_shape);
    arena.define_reference(inner, "Inner", inner_shape);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(classifier.classify_fully(outer), Immutability::ReadonlyDeep);
    assert_eq!(classifier.classify_fully(inner), Immutability::ReadonlyDeep);
    assert_eq!(classifier.classify_fully(inner_shape), Immutability::ReadonlyDeep);
}

#[test]
fn repeated_queries_are_idempotent() {
    let mut arena = TypeArena::new();
    let list = arena.array(TypeId::STRING);
    let ring = readonly_ring(&mut arena, 50, list);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    let first: Vec<_> = ring.iter().map(|&id| classifier.classify_fully(id)).collect();
    let second: Vec<_> = ring.iter().map(|&id| classifier.classify_fully(id)).collect();
    assert_eq!(first, second);

    let mut fresh = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(fresh.classify_fully(ring[25]), first[25]);
}

#[test]
fn ring_deeper_than_the_guard_degrades_to_a_lower_level() {
    init_tracing();
    let mut arena = TypeArena::new();
    let ring = readonly_ring(&mut arena, 64, TypeId::NUMBER);

    let mut classifier = ImmutabilityClassifier::with_profile(
        &arena,
        OverrideTable::builtin(),
        RecursionProfile::Custom {
            max_depth: 32,
            max_iterations: 10_000,
        },
    );
    // The cut-off node counts as Mutable, which the readonly properties
    // above it lift to ReadonlyShallow.
    assert_eq!(
        classifier.classify_fully(ring[0]),
        Immutability::ReadonlyShallow
    );
    assert_eq!(classifier.cached(ring[0]), None);
}

/// `type N{i} = { readonly next: N{i+1}; readonly skip: N{i+2}; readonly prev: N{i-1} }`,
/// indices wrapping around. Every node sits in one component with many
/// back edges.
fn readonly_ladder(arena: &mut TypeArena, len: usize) -> Vec<TypeId> {
    let refs: Vec<TypeId> = (0..len).map(|_| arena.declare()).collect();
    for i in 0..len {
        let shape = arena.object(vec![
            PropertyInfo::readonly("next", refs[(i + 1) % len]),
            PropertyInfo::readonly("skip", refs[(i + 2) % len]),
            PropertyInfo::readonly("prev", refs[(i + len - 1) % len]),
        ]);
        arena.define_reference(refs[i], format!("N{i}"), shape);
    }
    refs
}

#[test]
fn ladder_with_many_back_edges_is_readonly_deep() {
    init_tracing();
    let mut arena = TypeArena::new();
    let ladder = readonly_ladder(&mut arena, 200);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(classifier.classify_fully(ladder[0]), Immutability::ReadonlyDeep);
    for &node in &ladder {
        assert_eq!(classifier.cached(node), Some(Immutability::ReadonlyDeep));
    }
}

#[test]
fn ladder_walk_enters_each_node_a_bounded_number_of_times() {
    let mut arena = TypeArena::new();
    let ladder = readonly_ladder(&mut arena, 200);

    // One reference, one shape and a few back edges per rung. A walk that
    // recomputed members would run out of iterations and degrade.
    let mut classifier = ImmutabilityClassifier::with_profile(
        &arena,
        OverrideTable::builtin(),
        RecursionProfile::Custom {
            max_depth: 5_000,
            max_iterations: 8 * ladder.len() as u32,
        },
    );
    assert_eq!(classifier.classify_fully(ladder[0]), Immutability::ReadonlyDeep);
}

#[test]
fn ladder_result_does_not_depend_on_the_first_query() {
    let mut arena = TypeArena::new();
    let ladder = readonly_ladder(&mut arena, 60);

    for start in [0, 1, 29, 59] {
        let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
        classifier.classify_fully(ladder[start]);
        let levels: Vec<_> = ladder
            .iter()
            .map(|&node| classifier.classify_fully(node))
            .collect();
        assert!(
            levels.iter().all(|&level| level == Immutability::ReadonlyDeep),
            "starting at N{start}: {levels:?}"
        );
    }
}

#[test]
fn members_settle_below_their_first_estimate() {
    // type H = { readonly x: M; readonly y: string[] }
    // type M = { readonly back: H }
    // M first sees H as the optimistic seed; H then turns out shallow.
    let mut arena = TypeArena::new();
    let h = arena.declare();
    let m = arena.declare();
    let list = arena.array(TypeId::STRING);
    let h_shape = arena.object(vec![
        PropertyInfo::readonly("x", m),
        PropertyInfo::readonly("y", list),
    ]);
    let m_shape = arena.object(vec![PropertyInfo::readonly("back", h)]);
    arena.define_reference(h, "H", h_shape);
    arena.define_reference(m, "M", m_shape);

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(classifier.classify_fully(h), Immutability::ReadonlyShallow);
    assert_eq!(classifier.cached(m), Some(Immutability::ReadonlyShallow));

    let mut fresh = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(fresh.classify_fully(m), Immutability::ReadonlyShallow);
}

#[test]
fn back_edge_through_an_intersection_is_order_independent() {
    // interface Node { readonly next: Node & Tagged }
    // type Tagged = { tag: string }
    let build = || {
        let mut arena = TypeArena::new();
        let node = arena.declare();
        let tagged = arena.object(vec![PropertyInfo::new("tag", TypeId::STRING)]);
        let both = arena.intersection(&[node, tagged]);
        let shape = arena.object(vec![PropertyInfo::readonly("next", both)]);
        arena.define_reference(node, "Node", shape);
        (arena, node, both)
    };

    let (arena, node, both) = build();
    let mut node_first = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    let node_level = node_first.classify_fully(node);
    let both_level = node_first.classify_fully(both);

    let mut both_first = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    assert_eq!(both_first.classify_fully(both), both_level);
    assert_eq!(both_first.classify_fully(node), node_level);

    assert_eq!(node_level, Immutability::ReadonlyDeep);
    assert_eq!(both_level, Immutability::ReadonlyDeep);
}

#[test]
fn back_edge_through_a_union_is_order_independent() {
    // type Tree = { readonly children: readonly Tree[]; readonly label: string } | null
    let mut arena = TypeArena::new();
    let tree = arena.declare();
    let children = arena.readonly_array(tree);
    let shape = arena.object(vec![
        PropertyInfo::readonly("children", children),
        PropertyInfo::readonly("label", TypeId::STRING),
    ]);
    let body = arena.union(&[shape, TypeId::NULL]);
    arena.define_reference(tree, "Tree", body);

    let nodes = [tree, children, shape, body];
    for &start in &nodes {
        let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
        classifier.classify_fully(start);
        for &node in &nodes {
            assert_eq!(
                classifier.classify_fully(node),
                Immutability::ReadonlyDeep,
                "{node:?} after starting at {start:?}"
            );
        }
    }
}

#[test]
fn mixed_union_and_intersection_cycle_agrees_across_queries() {
    // type A = { readonly b: B & Frozen } | string
    // type B = { readonly a: A; readonly items: number[] }
    let mut arena = TypeArena::new();
    let a = arena.declare();
    let b = arena.declare();
    let frozen = arena.readonly_array(TypeId::NUMBER);
    let b_and_frozen = arena.intersection(&[b, frozen]);
    let a_shape = arena.object(vec![PropertyInfo::readonly("b", b_and_frozen)]);
    let a_body = arena.union(&[a_shape, TypeId::STRING]);
    let items = arena.array(TypeId::NUMBER);
    let b_shape = arena.object(vec![
        PropertyInfo::readonly("a", a),
        PropertyInfo::readonly("items", items),
    ]);
    arena.define_reference(a, "A", a_body);
    arena.define_reference(b, "B", b_shape);

    let nodes = [a, b, b_and_frozen, a_shape, b_shape];
    let reference: Vec<_> = {
        let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
        nodes.iter().map(|&id| classifier.classify_fully(id)).collect()
    };
    for &start in &nodes {
        let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
        classifier.classify_fully(start);
        let levels: Vec<_> = nodes.iter().map(|&id| classifier.classify_fully(id)).collect();
        assert_eq!(levels, reference, "starting at {start:?}");
    }
    // B is shallow through `items`; `B & Frozen` is lifted to ReadonlyDeep by
    // the frozen array, which keeps A deep.
    assert_eq!(reference[1], Immutability::ReadonlyShallow);
    assert_eq!(reference[2], Immutability::ReadonlyDeep);
    assert_eq!(reference[0], Immutability::ReadonlyDeep);
}
