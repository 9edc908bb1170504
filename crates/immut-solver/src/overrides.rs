//! Immutability overrides for named types.
//!
//! Some types cannot be classified structurally: `Date` has no readonly
//! surface but mutates through its methods, `Readonly<T>` only freezes the
//! top level. An [`OverrideTable`] pins such types to a level by declared
//! name, either unconditionally or only when the structural result reaches a
//! `from` level.

use crate::lattice::Immutability;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use tracing::debug;

/// How an override picks the types it applies to.
#[derive(Clone, Debug)]
pub enum TypeNameMatcher {
    /// Exact declared name.
    Name(String),
    /// Regex tested against the declared name.
    Pattern(Regex),
}

impl TypeNameMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            TypeNameMatcher::Name(expected) => expected == name,
            TypeNameMatcher::Pattern(re) => re.is_match(name),
        }
    }

    /// Grouping key used when layering user entries over builtins.
    pub fn key(&self) -> String {
        match self {
            TypeNameMatcher::Name(name) => name.clone(),
            TypeNameMatcher::Pattern(re) => format!("/{}/", re.as_str()),
        }
    }
}

impl PartialEq for TypeNameMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeNameMatcher::Name(a), TypeNameMatcher::Name(b)) => a == b,
            (TypeNameMatcher::Pattern(a), TypeNameMatcher::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeNameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A single override entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Override {
    pub type_name: TypeNameMatcher,
    pub to: Immutability,
    /// Only apply when the computed level is at least this.
    pub from: Option<Immutability>,
}

impl Override {
    pub fn named(name: impl Into<String>, to: Immutability) -> Self {
        Self {
            type_name: TypeNameMatcher::Name(name.into()),
            to,
            from: None,
        }
    }

    pub fn pattern(re: Regex, to: Immutability) -> Self {
        Self {
            type_name: TypeNameMatcher::Pattern(re),
            to,
            from: None,
        }
    }

    pub fn from_level(mut self, from: Immutability) -> Self {
        self.from = Some(from);
        self
    }

    #[inline]
    pub fn is_conditional(&self) -> bool {
        self.from.is_some()
    }
}

/// Ordered, immutable list of overrides. The first applicable entry wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideTable {
    entries: Vec<Override>,
}

/// Outcome of looking a declared name up in an [`OverrideTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideLookup {
    /// No entry mentions the name.
    None,
    /// The first matching entry is unconditional; skip the structural walk.
    Fixed(Immutability),
    /// Matching entries depend on the structural result.
    Conditional,
}

impl OverrideTable {
    pub fn new(entries: Vec<Override>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The defaults every pass starts from.
    pub fn builtin() -> Self {
        use Immutability::{Immutable, Mutable, ReadonlyDeep, ReadonlyShallow};

        let mut entries: Vec<Override> = ["Map", "Set", "Date", "URL", "URLSearchParams"]
            .into_iter()
            .map(|name| Override::named(name, Mutable))
            .collect();
        entries.push(Override::named("ReadonlyMap", ReadonlyDeep).from_level(Immutable));
        entries.push(Override::named("ReadonlySet", ReadonlyDeep).from_level(Immutable));
        entries.push(Override::named("Readonly", ReadonlyShallow).from_level(ReadonlyDeep));
        Self { entries }
    }

    pub fn entries(&self) -> &[Override] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> OverrideLookup {
        match self.matching(name).next() {
            None => OverrideLookup::None,
            Some(entry) if !entry.is_conditional() => OverrideLookup::Fixed(entry.to),
            Some(_) => OverrideLookup::Conditional,
        }
    }

    /// Apply the first entry whose condition holds for `computed`.
    ///
    /// A conditional entry never fires on `Unknown`; later entries for the
    /// same name are still consulted.
    pub fn apply(&self, name: &str, computed: Immutability) -> Immutability {
        for entry in self.matching(name) {
            match entry.from {
                None => return entry.to,
                Some(from) if computed >= from => return entry.to,
                Some(_) => {}
            }
        }
        computed
    }

    fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Override> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.type_name.matches(name))
    }
}

/// Layer `user` overrides over `builtin` ones.
///
/// User entries always come first. With `keep_default` the builtin entries
/// stay behind them (merge); without it, builtin entries for every name the
/// user lists are dropped (replace). Builtin entries for names the user does
/// not mention survive either way.
pub fn resolve(builtin: &OverrideTable, user: &[Override], keep_default: bool) -> OverrideTable {
    let mut groups: IndexMap<String, Vec<Override>> = IndexMap::new();
    for entry in user {
        groups
            .entry(entry.type_name.key())
            .or_default()
            .push(entry.clone());
    }

    let mut entries: Vec<Override> = Vec::with_capacity(user.len() + builtin.entries.len());
    for group in groups.values() {
        entries.extend(group.iter().cloned());
    }
    for entry in &builtin.entries {
        if keep_default || !groups.contains_key(&entry.type_name.key()) {
            entries.push(entry.clone());
        }
    }

    debug!(
        user = user.len(),
        builtin = builtin.entries.len(),
        resolved = entries.len(),
        keep_default,
        "resolved immutability overrides"
    );
    OverrideTable { entries }
}

#[cfg(test)]
#[path = "../tests/overrides_tests.rs"]
mod tests;
