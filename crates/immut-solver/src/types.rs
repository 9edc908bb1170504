//! Structural type representation.
//!
//! Types are stored in an arena and addressed by [`TypeId`]. Identity is the
//! handle: two references to the same declared type share a `TypeId`, which
//! is what the classification cache and the cycle detector key on.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Stable handle to a node in a [`TypeGraph`](crate::TypeGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    // Primitives are pre-registered by `TypeArena::new` in this order.
    pub const STRING: TypeId = TypeId(0);
    pub const NUMBER: TypeId = TypeId(1);
    pub const BOOLEAN: TypeId = TypeId(2);
    pub const BIGINT: TypeId = TypeId(3);
    pub const SYMBOL: TypeId = TypeId(4);
    pub const NULL: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    pub const VOID: TypeId = TypeId(7);
    pub const NEVER: TypeId = TypeId(8);

    /// First id available for user types.
    pub const FIRST_USER: u32 = 9;

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value types with no mutable identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Null,
    Undefined,
    Void,
    Never,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::String,
        PrimitiveKind::Number,
        PrimitiveKind::Boolean,
        PrimitiveKind::BigInt,
        PrimitiveKind::Symbol,
        PrimitiveKind::Null,
        PrimitiveKind::Undefined,
        PrimitiveKind::Void,
        PrimitiveKind::Never,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::BigInt => "bigint",
            PrimitiveKind::Symbol => "symbol",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Never => "never",
        }
    }
}

/// A named member of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub readonly: bool,
    pub optional: bool,
    /// Declared with method syntax (`m(): T`). Methods cannot be reassigned.
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            readonly: false,
            optional: false,
            is_method: false,
        }
    }

    pub fn readonly(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            readonly: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn method(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            is_method: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Methods count as readonly members.
    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.readonly || self.is_method
    }
}

/// `[key: K]: V`, optionally `readonly`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub readonly: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    /// Declared name for interfaces and classes, `None` for literals.
    pub name: Option<String>,
    pub properties: Vec<PropertyInfo>,
    pub index_signatures: Vec<IndexSignature>,
}

impl ObjectShape {
    pub fn member_count(&self) -> usize {
        self.properties.len() + self.index_signatures.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    pub element: TypeId,
    pub readonly: bool,
}

impl ArrayShape {
    /// Name used for override lookup.
    pub const fn name(&self) -> &'static str {
        if self.readonly { "ReadonlyArray" } else { "Array" }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl TupleElement {
    pub const fn required(type_id: TypeId) -> Self {
        Self {
            type_id,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleShape {
    pub elements: SmallVec<[TupleElement; 4]>,
    pub readonly: bool,
}

/// Map-like and set-like containers (`Map`, `Set`, `ReadonlyMap`, `WeakSet`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapShape {
    pub name: String,
    pub key: TypeId,
    /// `None` for set-like containers.
    pub value: Option<TypeId>,
    pub readonly: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// A named reference to another node (alias, interface, generic application).
///
/// References are what make cycles possible: `type Node = { next: Node }`
/// has the object's `next` property pointing back at the reference node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceShape {
    pub name: String,
    /// `None` when the host could not resolve the target.
    pub target: Option<TypeId>,
    pub type_args: SmallVec<[TypeId; 2]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: String,
    pub constraint: Option<TypeId>,
}

/// The closed set of node kinds the classifier understands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Primitive(PrimitiveKind),
    Object(ObjectShape),
    Array(ArrayShape),
    Tuple(TupleShape),
    Map(MapShape),
    Function(FunctionShape),
    Union(SmallVec<[TypeId; 4]>),
    Intersection(SmallVec<[TypeId; 4]>),
    Reference(ReferenceShape),
    TypeParameter(TypeParamInfo),
    /// A shape the host could not describe. Carries its source text.
    Unsupported(String),
}

impl TypeData {
    /// Declared name used for override lookup, if the node has one.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeData::Object(shape) => shape.name.as_deref(),
            TypeData::Array(shape) => Some(shape.name()),
            TypeData::Map(shape) => Some(shape.name.as_str()),
            TypeData::Reference(shape) => Some(shape.name.as_str()),
            TypeData::Primitive(_)
            | TypeData::Tuple(_)
            | TypeData::Function(_)
            | TypeData::Union(_)
            | TypeData::Intersection(_)
            | TypeData::TypeParameter(_)
            | TypeData::Unsupported(_) => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            TypeData::Primitive(_) => "primitive",
            TypeData::Object(_) => "object",
            TypeData::Array(_) => "array",
            TypeData::Tuple(_) => "tuple",
            TypeData::Map(_) => "map",
            TypeData::Function(_) => "function",
            TypeData::Union(_) => "union",
            TypeData::Intersection(_) => "intersection",
            TypeData::Reference(_) => "reference",
            TypeData::TypeParameter(_) => "type parameter",
            TypeData::Unsupported(_) => "unsupported",
        }
    }
}
