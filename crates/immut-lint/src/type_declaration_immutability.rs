//! `type-declaration-immutability`: a type's name promises an immutability
//! level, and the declared type has to keep that promise.

use crate::config::TypeDeclarationOptions;
use crate::declaration::{DeclarationKind, TypeDeclaration};
use crate::diagnostics::{Diagnostic, MessageId, TextEdit};
use crate::rules::{self, Comparator};
use immut_solver::{ImmutabilityClassifier, TypeGraph};
use tracing::{debug, trace};

pub const RULE_NAME: &str = "type-declaration-immutability";

pub fn check_type_declaration<G: TypeGraph + ?Sized>(
    classifier: &mut ImmutabilityClassifier<'_, G>,
    options: &TypeDeclarationOptions,
    decl: &TypeDeclaration,
) -> Option<Diagnostic> {
    if options.ignore_interfaces && decl.kind == DeclarationKind::Interface {
        return None;
    }
    if options
        .ignore_identifier_pattern
        .iter()
        .any(|re| re.is_match(&decl.name))
    {
        trace!(name = %decl.name, "ignored by identifier pattern");
        return None;
    }

    let (index, rule) = options.rules.find(&decl.name)?;
    let type_id = decl.ty.type_id();

    let level = classifier.classify(type_id, rule.immutability);
    let mut result = rule.evaluate(index, level);
    if !result.violated {
        return None;
    }
    // The thresholded walk may have stopped early; report the exact level.
    result.actual = classifier.classify_fully(type_id);

    debug!(
        name = %decl.name,
        rule = index,
        expected = %result.expected,
        actual = %result.actual,
        "type declaration breaks its naming rule"
    );

    let message_id = match result.comparator {
        Comparator::AtLeast => MessageId::AtLeast,
        Comparator::AtMost => MessageId::AtMost,
        Comparator::Exactly => MessageId::Exactly,
    };
    let fix = decl.ty.annotation().and_then(|annotation| {
        rules::fix(rule, &annotation.text).map(|text| TextEdit::replace(annotation.span, text))
    });

    Some(
        Diagnostic::mismatch(
            RULE_NAME,
            message_id,
            decl.name_span,
            result.expected,
            result.actual,
        )
        .with_fix(fix),
    )
}
