//! Naming rules binding identifiers to expected immutability.

use crate::fixer::{self, FixerEntry};
use immut_solver::{Immutability, compare};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// How the actual level is compared with a rule's expected level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    AtLeast,
    AtMost,
    Exactly,
}

impl Comparator {
    /// Whether `actual` breaks a rule expecting `expected`.
    pub fn is_violated(self, actual: Immutability, expected: Immutability) -> bool {
        let ordering = compare(actual, expected);
        match self {
            Comparator::AtLeast => ordering == Ordering::Less,
            Comparator::AtMost => ordering == Ordering::Greater,
            Comparator::Exactly => ordering != Ordering::Equal,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Comparator::AtLeast => "AtLeast",
            Comparator::AtMost => "AtMost",
            Comparator::Exactly => "Exactly",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub identifiers: SmallVec<[Regex; 2]>,
    pub immutability: Immutability,
    pub comparator: Comparator,
    /// `None` when the rule offers no fix.
    pub fixer: Option<Vec<FixerEntry>>,
}

impl Rule {
    pub fn matches(&self, name: &str) -> bool {
        self.identifiers.iter().any(|re| re.is_match(name))
    }

    /// Compare `actual` against this rule.
    pub fn evaluate(&self, rule_index: usize, actual: Immutability) -> MatchResult {
        MatchResult {
            rule_index,
            violated: self.comparator.is_violated(actual, self.immutability),
            expected: self.immutability,
            actual,
            comparator: self.comparator,
        }
    }
}

/// Outcome of matching a declaration against a rule list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub rule_index: usize,
    pub violated: bool,
    pub expected: Immutability,
    pub actual: Immutability,
    pub comparator: Comparator,
}

/// Evaluate `actual` against the first rule whose identifier patterns match
/// `name`. `None` when no rule applies.
pub fn match_rules(name: &str, actual: Immutability, rules: &[Rule]) -> Option<MatchResult> {
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matches(name))
        .map(|(index, rule)| rule.evaluate(index, actual))
}

/// Rewrite `serialized` with the rule's fixer, if it has one.
pub fn fix(rule: &Rule, serialized: &str) -> Option<String> {
    let entries = rule.fixer.as_deref()?;
    fixer::apply_fixers(entries, serialized)
}

/// Ordered rule list. First match wins.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

static RECOMMENDED: Lazy<RuleSet> = Lazy::new(|| {
    let rule = |pattern: &str, immutability, comparator, fixer| Rule {
        identifiers: Regex::new(pattern).into_iter().collect(),
        immutability,
        comparator,
        fixer,
    };
    RuleSet::new(vec![
        rule(
            "^I?Immutable.+",
            Immutability::Immutable,
            Comparator::AtLeast,
            None,
        ),
        rule(
            "^I?ReadonlyDeep.+",
            Immutability::ReadonlyDeep,
            Comparator::AtLeast,
            None,
        ),
        rule(
            "^I?Readonly.+",
            Immutability::ReadonlyShallow,
            Comparator::AtLeast,
            Some(fixer::default_readonly_shallow()),
        ),
        rule(
            "^I?Mutable.+",
            Immutability::Mutable,
            Comparator::AtMost,
            Some(fixer::default_mutable()),
        ),
    ])
});

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// `Immutable*`, `ReadonlyDeep*`, `Readonly*` and `Mutable*` names, each
    /// with an optional `I` prefix.
    pub fn recommended() -> Self {
        RECOMMENDED.clone()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule that applies to `name`, with its index.
    pub fn find(&self, name: &str) -> Option<(usize, &Rule)> {
        self.rules.iter().enumerate().find(|(_, rule)| rule.matches(name))
    }

    pub fn match_name(&self, name: &str, actual: Immutability) -> Option<MatchResult> {
        match_rules(name, actual, &self.rules)
    }
}

#[cfg(test)]
#[path = "../tests/rules_tests.rs"]
mod tests;
