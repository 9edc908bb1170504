//! Whole-crate properties of classification: monotonicity, threshold
//! soundness and override precedence.

use immut_solver::{
    Immutability, ImmutabilityClassifier, Override, OverrideTable, PropertyInfo, TypeArena,
    TypeId, classify, resolve,
};

/// A handful of value types spanning every level.
fn sample_values(arena: &mut TypeArena) -> Vec<TypeId> {
    let list = arena.array(TypeId::STRING);
    let frozen = arena.readonly_array(TypeId::STRING);
    let shallow = arena.readonly_array(list);
    let date = arena.interface("Date", vec![]);
    let empty = arena.object(vec![]);
    vec![TypeId::NUMBER, list, frozen, shallow, date, empty]
}

#[test]
fn marking_a_property_readonly_never_lowers_the_level() {
    let mut arena = TypeArena::new();
    let values = sample_values(&mut arena);

    for &first in &values {
        for &second in &values {
            let writable = arena.object(vec![
                PropertyInfo::new("a", first),
                PropertyInfo::readonly("b", second),
            ]);
            let readonly = arena.object(vec![
                PropertyInfo::readonly("a", first),
                PropertyInfo::readonly("b", second),
            ]);
            let before = classify(&arena, writable, &OverrideTable::builtin(), Immutability::Unknown);
            let after = classify(&arena, readonly, &OverrideTable::builtin(), Immutability::Unknown);
            assert!(after >= before, "{before} -> {after}");
        }
    }
}

#[test]
fn raising_a_member_never_lowers_its_container() {
    let mut arena = TypeArena::new();
    let values = sample_values(&mut arena);
    let mut classifier_levels = Vec::new();
    {
        let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
        for &value in &values {
            classifier_levels.push(classifier.classify_fully(value));
        }
    }

    let mut containers = Vec::new();
    for &value in &values {
        let array = arena.readonly_array(value);
        let tuple = arena.tuple(&[TypeId::STRING, value], true);
        let union = arena.union(&[value, TypeId::BOOLEAN]);
        let object = arena.object(vec![PropertyInfo::readonly("v", value)]);
        containers.push([array, tuple, union, object]);
    }

    let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
    for (i, lower) in classifier_levels.iter().enumerate() {
        for (j, higher) in classifier_levels.iter().enumerate() {
            if lower > higher {
                continue;
            }
            for kind in 0..4 {
                let small = classifier.classify_fully(containers[i][kind]);
                let large = classifier.classify_fully(containers[j][kind]);
                assert!(
                    small <= large,
                    "container {kind}: member {lower} gave {small}, member {higher} gave {large}"
                );
            }
        }
    }
}

#[test]
fn threshold_hint_never_flips_a_verdict() {
    let mut arena = TypeArena::new();
    let values = sample_values(&mut arena);
    let mut candidates = values.clone();
    for &value in &values {
        candidates.push(arena.object(vec![
            PropertyInfo::readonly("v", value),
            PropertyInfo::readonly("n", TypeId::NUMBER),
        ]));
        candidates.push(arena.union(&[TypeId::STRING, value]));
        candidates.push(arena.intersection(&[value, TypeId::NUMBER]));
    }

    let overrides = OverrideTable::builtin();
    for id in candidates {
        let exact = classify(&arena, id, &overrides, Immutability::Unknown);
        for threshold in Immutability::LEVELS {
            let hinted = classify(&arena, id, &overrides, threshold);
            assert_eq!(hinted >= threshold, exact >= threshold);
            if hinted != exact {
                assert!(hinted < threshold);
            }
        }
    }
}

#[test]
fn user_overrides_beat_builtins_with_keep_default() {
    let mut arena = TypeArena::new();
    let map = arena.map("Map", TypeId::STRING, TypeId::NUMBER, false);
    let user = [Override::named("Map", Immutability::ReadonlyDeep)];

    let merged = resolve(&OverrideTable::builtin(), &user, true);
    assert_eq!(
        classify(&arena, map, &merged, Immutability::Unknown),
        Immutability::ReadonlyDeep
    );
    assert_eq!(
        classify(&arena, map, &OverrideTable::builtin(), Immutability::Unknown),
        Immutability::Mutable
    );
}
