//! The declaration model hosts hand to the checks.
//!
//! Hosts walk their own syntax tree and describe each interesting node with
//! these plain structs: names, spans, the `TypeId` of the node's type in the
//! graph, and the source text of any explicit annotation.

use crate::diagnostics::Span;
use immut_solver::{TypeGraph, TypeId, TypePrinter};

/// An explicit type annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub type_id: TypeId,
    /// Source text of the annotation, without the leading `:`.
    pub text: String,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(type_id: TypeId, text: impl Into<String>, span: Span) -> Self {
        Self {
            type_id,
            text: text.into(),
            span,
        }
    }

    /// An annotation whose text is rendered from the graph, for hosts that
    /// cannot hand over the source text.
    pub fn printed<G: TypeGraph + ?Sized>(graph: &G, type_id: TypeId, span: Span) -> Self {
        Self::new(type_id, TypePrinter::new(graph).print_type(type_id), span)
    }
}

/// The type of a declaration, either written out or inferred by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Typed {
    Annotated(TypeAnnotation),
    Inferred(TypeId),
}

impl Typed {
    pub fn type_id(&self) -> TypeId {
        match self {
            Typed::Annotated(annotation) => annotation.type_id,
            Typed::Inferred(type_id) => *type_id,
        }
    }

    pub fn annotation(&self) -> Option<&TypeAnnotation> {
        match self {
            Typed::Annotated(annotation) => Some(annotation),
            Typed::Inferred(_) => None,
        }
    }

    pub fn is_inferred(&self) -> bool {
        matches!(self, Typed::Inferred(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    TypeAlias,
    Interface,
}

/// `type Name = ...` or `interface Name { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: String,
    pub name_span: Span,
    pub kind: DeclarationKind,
    /// Aliases carry their right-hand side as the annotation.
    pub ty: Typed,
}

impl TypeDeclaration {
    pub fn alias(name: impl Into<String>, name_span: Span, annotation: TypeAnnotation) -> Self {
        Self {
            name: name.into(),
            name_span,
            kind: DeclarationKind::TypeAlias,
            ty: Typed::Annotated(annotation),
        }
    }

    pub fn interface(name: impl Into<String>, name_span: Span, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            name_span,
            kind: DeclarationKind::Interface,
            ty: Typed::Inferred(type_id),
        }
    }
}

/// Constructor parameter declared with an accessibility or `readonly`
/// modifier, which makes it a class property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterProperty {
    pub readonly: bool,
    /// Where `readonly ` would be inserted (start of the parameter name).
    pub insert_at: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDecl {
    /// `None` for destructuring patterns.
    pub name: Option<String>,
    pub span: Span,
    pub ty: Typed,
    pub property: Option<ParameterProperty>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, span: Span, ty: Typed) -> Self {
        Self {
            name: Some(name.into()),
            span,
            ty,
            property: None,
        }
    }

    pub fn as_property(mut self, readonly: bool, insert_at: u32) -> Self {
        self.property = Some(ParameterProperty { readonly, insert_at });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnTypeDecl {
    Annotated(TypeAnnotation),
    /// `x is T` / `asserts x is T`; `parameter` names the narrowed parameter.
    Predicate { parameter: Option<String> },
    /// No annotation; the host's inferred return types, if it has any.
    Inferred(Vec<TypeId>),
}

/// Anything with a parameter list: functions, methods, call signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    /// Reported location for inferred return types (the name, or the whole node).
    pub span: Span,
    pub params: Vec<ParameterDecl>,
    pub return_type: ReturnTypeDecl,
    pub in_class: bool,
    /// The implementation signature of an overloaded function.
    pub is_overload_implementation: bool,
}

impl FunctionDecl {
    pub fn new(name: Option<String>, span: Span, return_type: ReturnTypeDecl) -> Self {
        Self {
            name,
            span,
            params: Vec::new(),
            return_type,
            in_class: false,
            is_overload_implementation: false,
        }
    }

    pub fn with_param(mut self, param: ParameterDecl) -> Self {
        self.params.push(param);
        self
    }

    /// The parameter narrowed by a type predicate return, if any.
    pub fn predicate_parameter(&self) -> Option<&str> {
        match &self.return_type {
            ReturnTypeDecl::Predicate { parameter } => parameter.as_deref(),
            ReturnTypeDecl::Annotated(_) | ReturnTypeDecl::Inferred(_) => None,
        }
    }
}

/// A class field's modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassField {
    pub readonly: bool,
    /// Start of the property key, where `readonly ` would be inserted.
    pub key_start: u32,
}

/// A variable declarator or a class field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDecl {
    pub name: Option<String>,
    pub span: Span,
    pub ty: Typed,
    pub in_function: bool,
    pub in_class: bool,
    pub class_field: Option<ClassField>,
}

impl VariableDecl {
    pub fn new(name: impl Into<String>, span: Span, ty: Typed) -> Self {
        Self {
            name: Some(name.into()),
            span,
            ty,
            in_function: false,
            in_class: false,
            class_field: None,
        }
    }

    pub fn field(name: impl Into<String>, span: Span, ty: Typed, field: ClassField) -> Self {
        Self {
            in_class: true,
            class_field: Some(field),
            ..Self::new(name, span, ty)
        }
    }

    pub fn in_function(mut self) -> Self {
        self.in_function = true;
        self
    }
}
