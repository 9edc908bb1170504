use super::*;

#[test]
fn primitives_are_preregistered() {
    let arena = TypeArena::new();
    assert_eq!(
        arena.lookup(TypeId::STRING),
        Some(&TypeData::Primitive(PrimitiveKind::String))
    );
    assert_eq!(
        arena.lookup(TypeId::NEVER),
        Some(&TypeData::Primitive(PrimitiveKind::Never))
    );
    assert_eq!(arena.len(), TypeId::FIRST_USER as usize);
    assert_eq!(arena.primitive(PrimitiveKind::Number), TypeId::NUMBER);
}

#[test]
fn declared_nodes_are_invisible_until_defined() {
    let mut arena = TypeArena::new();
    let node = arena.declare();
    assert_eq!(arena.lookup(node), None);

    let shape = arena.object(vec![PropertyInfo::new("next", node)]);
    arena.define_reference(node, "Node", shape);

    match arena.lookup(node) {
        Some(TypeData::Reference(reference)) => {
            assert_eq!(reference.name, "Node");
            assert_eq!(reference.target, Some(shape));
        }
        other => panic!("expected a reference, got {other:?}"),
    }
}

#[test]
fn readonly_of_marks_object_members_readonly() {
    let mut arena = TypeArena::new();
    let inner = arena.object(vec![
        PropertyInfo::new("foo", TypeId::NUMBER),
        PropertyInfo::new("bar", TypeId::STRING).optional(),
    ]);
    let wrapped = arena.readonly_of(inner);

    let Some(TypeData::Reference(reference)) = arena.lookup(wrapped) else {
        panic!("Readonly<T> should be a reference");
    };
    assert_eq!(reference.name, "Readonly");
    assert_eq!(reference.type_args.as_slice(), &[inner]);

    let target = reference.target.expect("mapped target");
    let Some(TypeData::Object(shape)) = arena.lookup(target) else {
        panic!("mapped target should be an object");
    };
    assert!(shape.properties.iter().all(|p| p.readonly));
    assert!(shape.properties[1].optional);
}

#[test]
fn readonly_of_follows_aliases_and_arrays() {
    let mut arena = TypeArena::new();
    let array = arena.array(TypeId::STRING);
    let alias = arena.reference("Names", Some(array), &[]);
    let wrapped = arena.readonly_of(alias);

    let Some(TypeData::Reference(reference)) = arena.lookup(wrapped) else {
        panic!("Readonly<T> should be a reference");
    };
    let target = reference.target.expect("mapped target");
    assert_eq!(
        arena.lookup(target),
        Some(&TypeData::Array(ArrayShape {
            element: TypeId::STRING,
            readonly: true,
        }))
    );
}

#[test]
fn readonly_of_a_primitive_targets_the_primitive() {
    let mut arena = TypeArena::new();
    let wrapped = arena.readonly_of(TypeId::STRING);
    let Some(TypeData::Reference(reference)) = arena.lookup(wrapped) else {
        panic!("Readonly<T> should be a reference");
    };
    assert_eq!(reference.target, Some(TypeId::STRING));
}

#[test]
fn declared_names_cover_override_targets() {
    let mut arena = TypeArena::new();
    let array = arena.readonly_array(TypeId::NUMBER);
    let set = arena.set("Set", TypeId::STRING, false);
    let literal = arena.object(vec![]);
    let iface = arena.interface("Point", vec![]);

    let name = |id| arena.lookup(id).and_then(TypeData::declared_name);
    assert_eq!(name(array), Some("ReadonlyArray"));
    assert_eq!(name(set), Some("Set"));
    assert_eq!(name(literal), None);
    assert_eq!(name(iface), Some("Point"));
}
