//! Regex rewrites of serialized type text.
//!
//! A fixer is an ordered list of `(pattern, replacement)` entries. The
//! first entry whose pattern matches the whitespace-normalized text is
//! applied once. The result is not re-checked: a rewrite that does not
//! actually reach the required level is the configuration's problem.

use crate::config::ConfigError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// `$1`, `$&` and `$$` in replacement templates.
static BACKREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$|&|[0-9]+)").expect("valid regex"));

#[derive(Clone, Debug)]
pub struct FixerEntry {
    pattern: Regex,
    replacement: String,
    /// The template as written in the configuration.
    template: String,
}

impl FixerEntry {
    /// Compile an entry. `replacement` uses `$1`-style back-references;
    /// `$&` is the whole match and `$$` a literal dollar sign.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        let compiled = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            option: "fixer",
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: expand_backrefs(replacement),
            template: replacement.to_string(),
        })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn rewrite(&self, text: &str) -> Option<String> {
        if !self.pattern.is_match(text) {
            return None;
        }
        Some(self.pattern.replace(text, self.replacement.as_str()).into_owned())
    }
}

impl PartialEq for FixerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.template == other.template
    }
}

/// Collapse every whitespace run to a single space.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    WHITESPACE_RE.replace_all(text, " ")
}

/// Rewrite `serialized` with the first matching entry.
pub fn apply_fixers(entries: &[FixerEntry], serialized: &str) -> Option<String> {
    let text = normalize_whitespace(serialized);
    entries.iter().find_map(|entry| entry.rewrite(&text))
}

/// Rewrite template references into the `regex` crate's `${n}` form, so
/// `$1<` and `$1abc` both mean group 1 followed by literal text.
fn expand_backrefs(template: &str) -> String {
    BACKREF_RE
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "$" => "$$".to_string(),
            "&" => "${0}".to_string(),
            group => format!("${{{group}}}"),
        })
        .into_owned()
}

/// The fixer applied by default when a type must become `ReadonlyShallow`.
pub fn default_readonly_shallow() -> Vec<FixerEntry> {
    [
        (r"^(Array|Map|Set)<(.+)>$", "Readonly$1<$2>"),
        (r"^(.+)$", "Readonly<$1>"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| FixerEntry::new(pattern, replacement).ok())
    .collect()
}

/// Undo the readonly wrappers added by [`default_readonly_shallow`].
pub fn default_mutable() -> Vec<FixerEntry> {
    [
        (r"^Readonly(Array|Map|Set)<(.+)>$", "$1<$2>"),
        (r"^Readonly<(.+)>$", "$1"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| FixerEntry::new(pattern, replacement).ok())
    .collect()
}

#[cfg(test)]
#[path = "../tests/fixer_tests.rs"]
mod tests;
