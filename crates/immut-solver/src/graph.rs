//! The type graph adapter and its arena implementation.
//!
//! The classifier only needs to look up a node by id. Hosts that already own
//! a type representation implement [`TypeGraph`] over it; everyone else can
//! build a [`TypeArena`].

use crate::types::{
    ArrayShape, FunctionShape, IndexSignature, MapShape, ObjectShape, ParamInfo, PrimitiveKind,
    PropertyInfo, ReferenceShape, TupleElement, TupleShape, TypeData, TypeId, TypeParamInfo,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Read-only access to a structural type graph.
pub trait TypeGraph {
    /// Look up a node. `None` means the id is unknown or not yet defined.
    fn lookup(&self, id: TypeId) -> Option<&TypeData>;
}

impl<G: TypeGraph + ?Sized> TypeGraph for &G {
    fn lookup(&self, id: TypeId) -> Option<&TypeData> {
        (**self).lookup(id)
    }
}

/// Append-only arena of type nodes.
///
/// Cyclic graphs are built with [`declare`](Self::declare) followed by
/// [`define`](Self::define):
///
/// ```
/// use immut_solver::{PropertyInfo, TypeArena};
///
/// let mut arena = TypeArena::new();
/// let node = arena.declare();
/// let shape = arena.object(vec![PropertyInfo::readonly("next", node)]);
/// arena.define_reference(node, "Node", shape);
/// ```
#[derive(Clone, Debug)]
pub struct TypeArena {
    nodes: Vec<Option<TypeData>>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Create an arena with the primitives pre-registered at their `TypeId` constants.
    pub fn new() -> Self {
        let nodes = PrimitiveKind::ALL
            .into_iter()
            .map(|kind| Some(TypeData::Primitive(kind)))
            .collect();
        TypeArena { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(Some(data));
        id
    }

    /// Reserve an id whose data is supplied later with [`define`](Self::define).
    pub fn declare(&mut self) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(None);
        id
    }

    /// Fill in a declared node. Redefining a node replaces its data.
    pub fn define(&mut self, id: TypeId, data: TypeData) {
        debug_assert!(
            matches!(self.nodes.get(id.index()), Some(None)),
            "define() on {id:?}, which is not a pending declaration"
        );
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = Some(data);
        }
    }

    /// Shorthand for defining a declared node as a named reference to `target`.
    pub fn define_reference(&mut self, id: TypeId, name: impl Into<String>, target: TypeId) {
        self.define(
            id,
            TypeData::Reference(ReferenceShape {
                name: name.into(),
                target: Some(target),
                type_args: SmallVec::new(),
            }),
        );
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        TypeId(kind as u32)
    }

    pub fn object(&mut self, properties: Vec<PropertyInfo>) -> TypeId {
        self.alloc(TypeData::Object(ObjectShape {
            name: None,
            properties,
            index_signatures: Vec::new(),
        }))
    }

    pub fn interface(&mut self, name: impl Into<String>, properties: Vec<PropertyInfo>) -> TypeId {
        self.alloc(TypeData::Object(ObjectShape {
            name: Some(name.into()),
            properties,
            index_signatures: Vec::new(),
        }))
    }

    pub fn object_with_index(
        &mut self,
        properties: Vec<PropertyInfo>,
        index_signatures: Vec<IndexSignature>,
    ) -> TypeId {
        self.alloc(TypeData::Object(ObjectShape {
            name: None,
            properties,
            index_signatures,
        }))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.alloc(TypeData::Array(ArrayShape {
            element,
            readonly: false,
        }))
    }

    pub fn readonly_array(&mut self, element: TypeId) -> TypeId {
        self.alloc(TypeData::Array(ArrayShape {
            element,
            readonly: true,
        }))
    }

    pub fn tuple(&mut self, elements: &[TypeId], readonly: bool) -> TypeId {
        self.alloc(TypeData::Tuple(TupleShape {
            elements: elements.iter().copied().map(TupleElement::required).collect(),
            readonly,
        }))
    }

    pub fn map(
        &mut self,
        name: impl Into<String>,
        key: TypeId,
        value: TypeId,
        readonly: bool,
    ) -> TypeId {
        self.alloc(TypeData::Map(MapShape {
            name: name.into(),
            key,
            value: Some(value),
            readonly,
        }))
    }

    pub fn set(&mut self, name: impl Into<String>, element: TypeId, readonly: bool) -> TypeId {
        self.alloc(TypeData::Map(MapShape {
            name: name.into(),
            key: element,
            value: None,
            readonly,
        }))
    }

    pub fn function(&mut self, params: Vec<ParamInfo>, return_type: TypeId) -> TypeId {
        self.alloc(TypeData::Function(FunctionShape {
            params,
            return_type,
        }))
    }

    pub fn union(&mut self, members: &[TypeId]) -> TypeId {
        self.alloc(TypeData::Union(members.iter().copied().collect()))
    }

    pub fn intersection(&mut self, members: &[TypeId]) -> TypeId {
        self.alloc(TypeData::Intersection(members.iter().copied().collect()))
    }

    pub fn reference(
        &mut self,
        name: impl Into<String>,
        target: Option<TypeId>,
        type_args: &[TypeId],
    ) -> TypeId {
        self.alloc(TypeData::Reference(ReferenceShape {
            name: name.into(),
            target,
            type_args: type_args.iter().copied().collect(),
        }))
    }

    pub fn type_param(&mut self, name: impl Into<String>, constraint: Option<TypeId>) -> TypeId {
        self.alloc(TypeData::TypeParameter(TypeParamInfo {
            name: name.into(),
            constraint,
        }))
    }

    pub fn unsupported(&mut self, text: impl Into<String>) -> TypeId {
        self.alloc(TypeData::Unsupported(text.into()))
    }

    /// Build `Readonly<inner>`: a reference named `Readonly` whose target is
    /// `inner` with every top-level member marked readonly.
    ///
    /// Aliases are followed to find the shape being mapped. Shapes the
    /// wrapper does not change (primitives, functions, maps) are targeted
    /// as-is.
    pub fn readonly_of(&mut self, inner: TypeId) -> TypeId {
        let mapped = match self.resolve_alias(inner).cloned() {
            Some(TypeData::Object(shape)) => self.alloc(TypeData::Object(ObjectShape {
                name: None,
                properties: shape
                    .properties
                    .into_iter()
                    .map(|prop| PropertyInfo {
                        readonly: true,
                        ..prop
                    })
                    .collect(),
                index_signatures: shape
                    .index_signatures
                    .into_iter()
                    .map(|sig| IndexSignature {
                        readonly: true,
                        ..sig
                    })
                    .collect(),
            })),
            Some(TypeData::Array(shape)) => self.readonly_array(shape.element),
            Some(TypeData::Tuple(shape)) => self.alloc(TypeData::Tuple(TupleShape {
                readonly: true,
                ..shape
            })),
            _ => inner,
        };
        self.reference("Readonly", Some(mapped), &[inner])
    }

    /// Follow reference targets until a non-reference node.
    fn resolve_alias(&self, id: TypeId) -> Option<&TypeData> {
        let mut seen = FxHashSet::default();
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return None;
            }
            match self.lookup(current)? {
                TypeData::Reference(ReferenceShape {
                    target: Some(target),
                    ..
                }) => current = *target,
                data => return Some(data),
            }
        }
    }
}

impl TypeGraph for TypeArena {
    fn lookup(&self, id: TypeId) -> Option<&TypeData> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }
}

#[cfg(test)]
#[path = "../tests/graph_tests.rs"]
mod tests;
