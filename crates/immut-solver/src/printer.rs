//! Type Printer - render graph nodes as TypeScript-like syntax.
//!
//! The fixer rewrites the serialized text of a type. Hosts normally hand it
//! the declaration's source text; this printer is the fallback when only the
//! graph is available.

use crate::graph::TypeGraph;
use crate::types::{
    FunctionShape, MapShape, ObjectShape, ReferenceShape, TupleShape, TypeData, TypeId,
};

const MAX_PRINT_DEPTH: u32 = 32;

/// Prints types as TypeScript syntax.
///
/// ```
/// use immut_solver::{PropertyInfo, TypeArena, TypeId, TypePrinter};
///
/// let mut arena = TypeArena::new();
/// let obj = arena.object(vec![PropertyInfo::new("foo", TypeId::NUMBER)]);
/// assert_eq!(TypePrinter::new(&arena).print_type(obj), "{ foo: number }");
/// ```
pub struct TypePrinter<'a, G: TypeGraph + ?Sized> {
    graph: &'a G,
}

impl<'a, G: TypeGraph + ?Sized> TypePrinter<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    pub fn print_type(&self, type_id: TypeId) -> String {
        self.print_at(type_id, 0)
    }

    fn print_at(&self, type_id: TypeId, depth: u32) -> String {
        if depth > MAX_PRINT_DEPTH {
            return "...".to_string();
        }
        let Some(data) = self.graph.lookup(type_id) else {
            return "unknown".to_string();
        };
        let depth = depth + 1;

        match data {
            TypeData::Primitive(kind) => kind.keyword().to_string(),
            TypeData::Object(shape) => self.print_object(shape, depth),
            TypeData::Array(shape) => {
                let element = self.print_operand(shape.element, depth);
                if shape.readonly {
                    format!("readonly {element}[]")
                } else {
                    format!("{element}[]")
                }
            }
            TypeData::Tuple(shape) => self.print_tuple(shape, depth),
            TypeData::Map(shape) => self.print_map(shape, depth),
            TypeData::Function(shape) => self.print_function(shape, depth),
            TypeData::Union(members) => {
                if members.is_empty() {
                    return "never".to_string();
                }
                self.join_members(members, " | ", depth)
            }
            TypeData::Intersection(members) => {
                if members.is_empty() {
                    return "unknown".to_string();
                }
                self.join_members(members, " & ", depth)
            }
            TypeData::Reference(shape) => self.print_reference(shape, depth),
            TypeData::TypeParameter(info) => info.name.clone(),
            TypeData::Unsupported(text) => text.clone(),
        }
    }

    fn print_object(&self, shape: &ObjectShape, depth: u32) -> String {
        if let Some(name) = &shape.name {
            return name.clone();
        }
        if shape.member_count() == 0 {
            return "{}".to_string();
        }

        let mut members = Vec::with_capacity(shape.member_count());
        for sig in &shape.index_signatures {
            let readonly = if sig.readonly { "readonly " } else { "" };
            members.push(format!(
                "{readonly}[key: {}]: {}",
                self.print_at(sig.key_type, depth),
                self.print_at(sig.value_type, depth)
            ));
        }
        for prop in &shape.properties {
            let optional = if prop.optional { "?" } else { "" };
            if prop.is_method {
                if let Some(TypeData::Function(func)) = self.graph.lookup(prop.type_id) {
                    members.push(format!(
                        "{}{optional}({}): {}",
                        prop.name,
                        self.print_params(func, depth),
                        self.print_at(func.return_type, depth)
                    ));
                    continue;
                }
            }
            let readonly = if prop.readonly { "readonly " } else { "" };
            members.push(format!(
                "{readonly}{}{optional}: {}",
                prop.name,
                self.print_at(prop.type_id, depth)
            ));
        }

        format!("{{ {} }}", members.join("; "))
    }

    fn print_tuple(&self, shape: &TupleShape, depth: u32) -> String {
        let parts: Vec<String> = shape
            .elements
            .iter()
            .map(|elem| {
                let text = self.print_at(elem.type_id, depth);
                if elem.rest {
                    format!("...{text}")
                } else if elem.optional {
                    format!("{text}?")
                } else {
                    text
                }
            })
            .collect();
        let readonly = if shape.readonly { "readonly " } else { "" };
        format!("{readonly}[{}]", parts.join(", "))
    }

    fn print_map(&self, shape: &MapShape, depth: u32) -> String {
        let key = self.print_at(shape.key, depth);
        match shape.value {
            Some(value) => format!("{}<{key}, {}>", shape.name, self.print_at(value, depth)),
            None => format!("{}<{key}>", shape.name),
        }
    }

    fn print_function(&self, shape: &FunctionShape, depth: u32) -> String {
        format!(
            "({}) => {}",
            self.print_params(shape, depth),
            self.print_at(shape.return_type, depth)
        )
    }

    fn print_params(&self, shape: &FunctionShape, depth: u32) -> String {
        shape
            .params
            .iter()
            .map(|param| {
                let optional = if param.optional { "?" } else { "" };
                format!(
                    "{}{optional}: {}",
                    param.name,
                    self.print_at(param.type_id, depth)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_reference(&self, shape: &ReferenceShape, depth: u32) -> String {
        if shape.type_args.is_empty() {
            return shape.name.clone();
        }
        let args: Vec<String> = shape
            .type_args
            .iter()
            .map(|&arg| self.print_at(arg, depth))
            .collect();
        format!("{}<{}>", shape.name, args.join(", "))
    }

    fn join_members(&self, members: &[TypeId], separator: &str, depth: u32) -> String {
        members
            .iter()
            .map(|&member| self.print_operand(member, depth))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Print a type used as an operand of `[]`, `|` or `&`, parenthesizing
    /// the forms that would otherwise bind wrongly.
    fn print_operand(&self, type_id: TypeId, depth: u32) -> String {
        let text = self.print_at(type_id, depth);
        match self.graph.lookup(type_id) {
            Some(TypeData::Function(_) | TypeData::Union(_) | TypeData::Intersection(_)) => {
                format!("({text})")
            }
            _ => text,
        }
    }
}

#[cfg(test)]
#[path = "../tests/printer_tests.rs"]
mod tests;
