//! `prefer-immutable-types`: parameters, return types, variables and class
//! properties must reach a minimum immutability.

use crate::config::{CheckOptions, FixerTable, IgnoreClasses, PreferImmutableTypesOptions};
use crate::declaration::{FunctionDecl, ParameterDecl, ReturnTypeDecl, TypeAnnotation, Typed, VariableDecl};
use crate::diagnostics::{Diagnostic, MessageId, Span, TextEdit};
use crate::fixer;
use immut_solver::{Immutability, ImmutabilityClassifier, TypeGraph, TypeId, compare};
use regex::Regex;
use std::cmp::Ordering;
use tracing::trace;

pub const RULE_NAME: &str = "prefer-immutable-types";

/// Parameter diagnostics first, in declaration order, then the return type.
pub fn check_function<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &PreferImmutableTypesOptions,
    func: &FunctionDecl,
) -> Vec<Diagnostic> {
    let mut diagnostics = parameter_violations(classifier, options, func);
    diagnostics.extend(return_type_violation(classifier, options, func));
    diagnostics
}

/// Variable declarators and class fields.
pub fn check_variable<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &PreferImmutableTypesOptions,
    var: &VariableDecl,
) -> Option<Diagnostic> {
    let check = &options.variables;
    let enforcement = check.enforcement?;
    if ignores_class(check.ignore_classes, var.in_class, var.class_field.is_some())
        || (check.ignore_in_functions && var.in_function)
        || ignores_name(&check.ignore_name_pattern, var.name.as_deref())
    {
        return None;
    }

    match var.class_field {
        Some(field) if !field.readonly => {
            return Some(property_modifier(&options.fixer, var.span, field.key_start));
        }
        _ => {}
    }

    if skips_type(check, &var.ty) {
        return None;
    }

    let actual = shortfall(classifier, var.ty.type_id(), enforcement)?;
    let message_id = if var.class_field.is_some() {
        MessageId::PropertyImmutability
    } else {
        MessageId::Variable
    };
    let fix = var
        .ty
        .annotation()
        .and_then(|annotation| annotation_fix(&options.fixer, enforcement, annotation));
    Some(Diagnostic::mismatch(RULE_NAME, message_id, var.span, enforcement, actual).with_fix(fix))
}

fn parameter_violations<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &PreferImmutableTypesOptions,
    func: &FunctionDecl,
) -> Vec<Diagnostic> {
    let check = &options.parameters;
    let Some(enforcement) = check.enforcement else {
        return Vec::new();
    };
    if ignores_class(check.ignore_classes, func.in_class, false) {
        return Vec::new();
    }

    let guarded = func.predicate_parameter();
    func.params
        .iter()
        .filter_map(|param| {
            check_parameter(classifier, options, check, enforcement, guarded, param)
        })
        .collect()
}

fn check_parameter<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &PreferImmutableTypesOptions,
    check: &CheckOptions,
    enforcement: Immutability,
    guarded: Option<&str>,
    param: &ParameterDecl,
) -> Option<Diagnostic> {
    if ignores_name(&check.ignore_name_pattern, param.name.as_deref()) {
        return None;
    }

    match param.property {
        Some(property) if !property.readonly => {
            return Some(property_modifier(&options.fixer, param.span, property.insert_at));
        }
        _ => {}
    }

    // The subject of a type guard has to accept whatever is being narrowed.
    if guarded.is_some() && guarded == param.name.as_deref() {
        trace!(name = ?param.name, "skipping type guard subject");
        return None;
    }
    if skips_type(check, &param.ty) {
        return None;
    }

    let actual = shortfall(classifier, param.ty.type_id(), enforcement)?;
    let fix = param
        .ty
        .annotation()
        .and_then(|annotation| annotation_fix(&options.fixer, enforcement, annotation));
    Some(
        Diagnostic::mismatch(RULE_NAME, MessageId::Parameter, param.span, enforcement, actual)
            .with_fix(fix),
    )
}

fn return_type_violation<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &PreferImmutableTypesOptions,
    func: &FunctionDecl,
) -> Option<Diagnostic> {
    let check = &options.return_types;
    let enforcement = check.enforcement?;
    let inferred = matches!(func.return_type, ReturnTypeDecl::Inferred(_));
    if (check.ignore_inferred_types && inferred)
        || ignores_class(check.ignore_classes, func.in_class, false)
        || ignores_name(&check.ignore_name_pattern, func.name.as_deref())
    {
        return None;
    }

    match &func.return_type {
        ReturnTypeDecl::Annotated(annotation) => {
            if matches_any(&check.ignore_type_pattern, &annotation.text) {
                return None;
            }
            let actual = shortfall(classifier, annotation.type_id, enforcement)?;
            let fix = annotation_fix(&options.fixer, enforcement, annotation);
            Some(
                Diagnostic::mismatch(
                    RULE_NAME,
                    MessageId::ReturnType,
                    annotation.span,
                    enforcement,
                    actual,
                )
                .with_fix(fix),
            )
        }
        ReturnTypeDecl::Predicate { .. } => None,
        ReturnTypeDecl::Inferred(types) => {
            // Several candidate types, or an overload implementation whose
            // signature callers never see: nothing sensible to report.
            let [type_id] = types.as_slice() else {
                return None;
            };
            if func.is_overload_implementation {
                return None;
            }
            let actual = shortfall(classifier, *type_id, enforcement)?;
            Some(Diagnostic::mismatch(
                RULE_NAME,
                MessageId::ReturnType,
                func.span,
                enforcement,
                actual,
            ))
        }
    }
}

/// The exact level of `type_id` when it falls short of `enforcement`.
fn shortfall<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    type_id: TypeId,
    enforcement: Immutability,
) -> Option<Immutability> {
    let level = classifier.classify(type_id, enforcement);
    if compare(level, enforcement) != Ordering::Less {
        return None;
    }
    Some(classifier.classify_fully(type_id))
}

fn property_modifier(fixer: &FixerTable, span: Span, insert_at: u32) -> Diagnostic {
    let fix = fixer
        .is_enabled()
        .then(|| TextEdit::insert(insert_at, "readonly "));
    Diagnostic::plain(RULE_NAME, MessageId::PropertyModifier, span).with_fix(fix)
}

fn annotation_fix(
    table: &FixerTable,
    enforcement: Immutability,
    annotation: &TypeAnnotation,
) -> Option<TextEdit> {
    let entries = table.for_level(enforcement)?;
    fixer::apply_fixers(entries, &annotation.text)
        .map(|text| TextEdit::replace(annotation.span, text))
}

fn ignores_class(ignore: IgnoreClasses, in_class: bool, is_field: bool) -> bool {
    match ignore {
        IgnoreClasses::Off => false,
        IgnoreClasses::All => in_class,
        IgnoreClasses::FieldsOnly => is_field,
    }
}

fn ignores_name(patterns: &[Regex], name: Option<&str>) -> bool {
    name.is_some_and(|name| matches_any(patterns, name))
}

fn skips_type(check: &CheckOptions, ty: &Typed) -> bool {
    match ty {
        Typed::Inferred(_) => check.ignore_inferred_types,
        Typed::Annotated(annotation) => matches_any(&check.ignore_type_pattern, &annotation.text),
    }
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}
