//! Lint diagnostics, their message templates, and applying their fixes to
//! source text.

use immut_solver::Immutability;
use serde::Serialize;

/// Byte range in the source file, `start..end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Empty span used for insertions.
    pub const fn at(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single text edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    /// The range to replace.
    pub span: Span,
    /// The new text.
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::replace(Span::at(offset), text)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MessageId {
    AtLeast,
    AtMost,
    Exactly,
    Parameter,
    ReturnType,
    Variable,
    PropertyImmutability,
    PropertyModifier,
}

impl MessageId {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageId::AtLeast => "AtLeast",
            MessageId::AtMost => "AtMost",
            MessageId::Exactly => "Exactly",
            MessageId::Parameter => "parameter",
            MessageId::ReturnType => "returnType",
            MessageId::Variable => "variable",
            MessageId::PropertyImmutability => "propertyImmutability",
            MessageId::PropertyModifier => "propertyModifier",
        }
    }

    /// Message template; `{0}` is the expected level, `{1}` the actual one.
    pub const fn template(self) -> &'static str {
        match self {
            MessageId::AtLeast => {
                "This type is declared to have an immutability of at least \"{0}\" (actual: \"{1}\")."
            }
            MessageId::AtMost => {
                "This type is declared to have an immutability of at most \"{0}\" (actual: \"{1}\")."
            }
            MessageId::Exactly => {
                "This type is declared to have an immutability of exactly \"{0}\" (actual: \"{1}\")."
            }
            MessageId::Parameter => {
                "Parameter should have an immutability of at least \"{0}\" (actual: \"{1}\")."
            }
            MessageId::ReturnType => {
                "Return type should have an immutability of at least \"{0}\" (actual: \"{1}\")."
            }
            MessageId::Variable => {
                "Variable should have an immutability of at least \"{0}\" (actual: \"{1}\")."
            }
            MessageId::PropertyImmutability => {
                "Property should have an immutability of at least \"{0}\" (actual: \"{1}\")."
            }
            MessageId::PropertyModifier => "Property should have a readonly modifier.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule: &'static str,
    pub message_id: MessageId,
    pub span: Span,
    pub expected: Option<Immutability>,
    pub actual: Option<Immutability>,
    pub message_text: String,
    pub fix: Option<TextEdit>,
}

impl Diagnostic {
    /// A level mismatch carrying `{expected, actual}` data.
    pub fn mismatch(
        rule: &'static str,
        message_id: MessageId,
        span: Span,
        expected: Immutability,
        actual: Immutability,
    ) -> Self {
        Self {
            rule,
            message_id,
            span,
            expected: Some(expected),
            actual: Some(actual),
            message_text: format_message(message_id.template(), &[expected.name(), actual.name()]),
            fix: None,
        }
    }

    /// A diagnostic with no level data.
    pub fn plain(rule: &'static str, message_id: MessageId, span: Span) -> Self {
        Self {
            rule,
            message_id,
            span,
            expected: None,
            actual: None,
            message_text: message_id.template().to_string(),
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: Option<TextEdit>) -> Self {
        self.fix = fix;
        self
    }
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Apply every fix in `diagnostics` to `source`.
///
/// Edits are applied back to front. An edit overlapping one already applied
/// is skipped, as is any edit outside the source or off a char boundary.
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut edits: Vec<&TextEdit> = diagnostics
        .iter()
        .filter_map(|diag| diag.fix.as_ref())
        .collect();
    edits.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut result = source.to_string();
    let mut floor = u32::MAX;
    for edit in edits {
        let (start, end) = (edit.span.start as usize, edit.span.end as usize);
        if edit.span.end > floor
            || start > end
            || !result.is_char_boundary(start)
            || !result.is_char_boundary(end)
        {
            continue;
        }
        result.replace_range(start..end, &edit.new_text);
        floor = edit.span.start;
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
