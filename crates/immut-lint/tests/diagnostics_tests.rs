use super::*;

#[test]
fn mismatch_formats_expected_and_actual() {
    let diag = Diagnostic::mismatch(
        "type-declaration-immutability",
        MessageId::AtLeast,
        Span::new(5, 16),
        Immutability::ReadonlyShallow,
        Immutability::Mutable,
    );
    assert_eq!(
        diag.message_text,
        "This type is declared to have an immutability of at least \"ReadonlyShallow\" (actual: \"Mutable\")."
    );
    assert_eq!(diag.message_id.as_str(), "AtLeast");
}

#[test]
fn plain_diagnostics_carry_no_levels() {
    let diag = Diagnostic::plain("prefer-immutable-types", MessageId::PropertyModifier, Span::new(0, 3));
    assert_eq!(diag.expected, None);
    assert_eq!(diag.message_text, "Property should have a readonly modifier.");
    assert_eq!(diag.message_id.as_str(), "propertyModifier");
}

#[test]
fn apply_fixes_rewrites_back_to_front() {
    let source = "type A = X; type B = Y;";
    let diags = [
        Diagnostic::plain("r", MessageId::AtLeast, Span::new(5, 6))
            .with_fix(Some(TextEdit::replace(Span::new(9, 10), "Readonly<X>"))),
        Diagnostic::plain("r", MessageId::AtLeast, Span::new(17, 18))
            .with_fix(Some(TextEdit::replace(Span::new(21, 22), "Readonly<Y>"))),
    ];
    assert_eq!(
        apply_fixes(source, &diags),
        "type A = Readonly<X>; type B = Readonly<Y>;"
    );
}

#[test]
fn apply_fixes_skips_overlapping_and_out_of_range_edits() {
    let source = "abcdef";
    let diags = [
        Diagnostic::plain("r", MessageId::AtLeast, Span::default())
            .with_fix(Some(TextEdit::replace(Span::new(1, 4), "X"))),
        Diagnostic::plain("r", MessageId::AtLeast, Span::default())
            .with_fix(Some(TextEdit::replace(Span::new(3, 5), "Y"))),
        Diagnostic::plain("r", MessageId::AtLeast, Span::default())
            .with_fix(Some(TextEdit::replace(Span::new(40, 41), "Z"))),
        Diagnostic::plain("r", MessageId::AtLeast, Span::default())
            .with_fix(Some(TextEdit::insert(0, ">"))),
    ];
    assert_eq!(apply_fixes(source, &diags), ">abcYf");
}

#[test]
fn format_message_substitutes_positional_args() {
    assert_eq!(format_message("{0} < {1}", &["a", "b"]), "a < b");
}
