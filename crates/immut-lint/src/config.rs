//! Configuration: raw JSON shapes and their resolved, compiled forms.
//!
//! Every raw struct mirrors the JSON users write (camelCase, shorthands,
//! one-or-many lists). Resolution validates levels, compiles regexes and
//! fills in defaults; after it succeeds nothing in a lint pass can fail.

use crate::fixer::{self, FixerEntry};
use crate::rules::{Comparator, Rule, RuleSet};
use immut_solver::{Immutability, Override, OverrideTable, TypeNameMatcher, resolve};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid regular expression `{pattern}` in {option}: {source}")]
    InvalidPattern {
        option: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown immutability level `{value}` in {option}")]
    UnknownLevel { option: &'static str, value: String },
    #[error("`{value}` is not a valid enforcement for {option}")]
    InvalidEnforcement { option: &'static str, value: String },
    #[error("{option} accepts `false` or fixer entries, not `true`")]
    FixerFlag { option: &'static str },
    #[error("override #{index} must set exactly one of `name` or `pattern`")]
    OverrideMatcher { index: usize },
    #[error("invalid ignoreClasses value `{0}`; expected true, false or \"fieldsOnly\"")]
    IgnoreClasses(String),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Shared raw shapes
// ---------------------------------------------------------------------------

/// A level written as a name (`"ReadonlyDeep"`), an ordinal (`3`), or a flag.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Ordinal(i64),
    Name(String),
    Flag(bool),
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLevel::Ordinal(n) => write!(f, "{n}"),
            RawLevel::Name(name) => f.write_str(name),
            RawLevel::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl RawLevel {
    pub fn to_level(&self, option: &'static str) -> Result<Immutability, ConfigError> {
        let unknown = || ConfigError::UnknownLevel {
            option,
            value: self.to_string(),
        };
        match self {
            RawLevel::Name(name) => name.parse().map_err(|_| unknown()),
            RawLevel::Ordinal(n) => u64::try_from(*n)
                .ok()
                .and_then(Immutability::from_ordinal)
                .ok_or_else(unknown),
            RawLevel::Flag(_) => Err(unknown()),
        }
    }

    /// `"None"` and `false` disable the check. `Mutable` is not a
    /// meaningful minimum and is rejected.
    pub fn to_enforcement(&self, option: &'static str) -> Result<Option<Immutability>, ConfigError> {
        match self {
            RawLevel::Flag(false) => Ok(None),
            RawLevel::Name(name) if name == "None" => Ok(None),
            raw => match raw.to_level(option) {
                Ok(level) if level != Immutability::Mutable => Ok(Some(level)),
                _ => Err(ConfigError::InvalidEnforcement {
                    option,
                    value: raw.to_string(),
                }),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

fn compile_pattern(option: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        option,
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_patterns(
    option: &'static str,
    patterns: Option<&OneOrMany<String>>,
) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .map(OneOrMany::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|pattern| compile_pattern(option, pattern))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFixerEntry {
    pub pattern: String,
    pub replace: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFixer {
    Flag(bool),
    One(RawFixerEntry),
    Many(Vec<RawFixerEntry>),
}

/// `None` for `false`, the compiled entries otherwise.
fn compile_fixer(
    option: &'static str,
    raw: &RawFixer,
) -> Result<Option<Vec<FixerEntry>>, ConfigError> {
    let entries = match raw {
        RawFixer::Flag(false) => return Ok(None),
        RawFixer::Flag(true) => return Err(ConfigError::FixerFlag { option }),
        RawFixer::One(entry) => std::slice::from_ref(entry),
        RawFixer::Many(entries) => entries.as_slice(),
    };
    entries
        .iter()
        .map(|entry| FixerEntry::new(&entry.pattern, &entry.replace))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOverrideSettings {
    /// Keep the builtin entries for names the user overrides. Default `true`.
    #[serde(default)]
    pub keep_default: Option<bool>,
    #[serde(default)]
    pub values: Vec<RawOverride>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    pub to: RawLevel,
    #[serde(default)]
    pub from: Option<RawLevel>,
}

/// Layer user overrides over the builtin table.
pub fn resolve_overrides(raw: Option<&RawOverrideSettings>) -> Result<OverrideTable, ConfigError> {
    let builtin = OverrideTable::builtin();
    let Some(raw) = raw else {
        return Ok(builtin);
    };

    let mut user = Vec::with_capacity(raw.values.len());
    for (index, value) in raw.values.iter().enumerate() {
        let type_name = match (&value.name, &value.pattern) {
            (Some(name), None) => TypeNameMatcher::Name(name.clone()),
            (None, Some(pattern)) => {
                TypeNameMatcher::Pattern(compile_pattern("overrides.pattern", pattern)?)
            }
            _ => return Err(ConfigError::OverrideMatcher { index }),
        };
        user.push(Override {
            type_name,
            to: value.to.to_level("overrides.to")?,
            from: value
                .from
                .as_ref()
                .map(|from| from.to_level("overrides.from"))
                .transpose()?,
        });
    }

    Ok(resolve(&builtin, &user, raw.keep_default.unwrap_or(true)))
}

// ---------------------------------------------------------------------------
// type-declaration-immutability
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTypeDeclarationOptions {
    #[serde(default)]
    pub rules: Option<Vec<RawRule>>,
    #[serde(default)]
    pub ignore_interfaces: Option<bool>,
    #[serde(default)]
    pub ignore_identifier_pattern: Option<OneOrMany<String>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    pub identifiers: OneOrMany<String>,
    pub immutability: RawLevel,
    #[serde(default)]
    pub comparator: Option<Comparator>,
    #[serde(default)]
    pub fixer: Option<RawFixer>,
}

#[derive(Clone, Debug)]
pub struct TypeDeclarationOptions {
    pub rules: RuleSet,
    pub ignore_interfaces: bool,
    pub ignore_identifier_pattern: Vec<Regex>,
}

impl Default for TypeDeclarationOptions {
    fn default() -> Self {
        Self {
            rules: RuleSet::recommended(),
            ignore_interfaces: false,
            ignore_identifier_pattern: Vec::new(),
        }
    }
}

pub fn resolve_type_declaration_options(
    raw: &RawTypeDeclarationOptions,
) -> Result<TypeDeclarationOptions, ConfigError> {
    let rules = match &raw.rules {
        None => RuleSet::recommended(),
        Some(raw_rules) => RuleSet::new(
            raw_rules
                .iter()
                .map(resolve_rule)
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };

    Ok(TypeDeclarationOptions {
        rules,
        ignore_interfaces: raw.ignore_interfaces.unwrap_or(false),
        ignore_identifier_pattern: compile_patterns(
            "ignoreIdentifierPattern",
            raw.ignore_identifier_pattern.as_ref(),
        )?,
    })
}

fn resolve_rule(raw: &RawRule) -> Result<Rule, ConfigError> {
    let identifiers = raw
        .identifiers
        .as_slice()
        .iter()
        .map(|pattern| compile_pattern("rules.identifiers", pattern))
        .collect::<Result<_, _>>()?;
    let fixer = match &raw.fixer {
        Some(fixer) => compile_fixer("rules.fixer", fixer)?,
        None => None,
    };
    Ok(Rule {
        identifiers,
        immutability: raw.immutability.to_level("rules.immutability")?,
        comparator: raw.comparator.unwrap_or_default(),
        fixer,
    })
}

// ---------------------------------------------------------------------------
// prefer-immutable-types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawIgnoreClasses {
    Flag(bool),
    Mode(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IgnoreClasses {
    #[default]
    Off,
    /// Skip everything declared inside a class.
    All,
    /// Skip class fields only.
    FieldsOnly,
}

impl RawIgnoreClasses {
    fn resolve(&self) -> Result<IgnoreClasses, ConfigError> {
        match self {
            RawIgnoreClasses::Flag(false) => Ok(IgnoreClasses::Off),
            RawIgnoreClasses::Flag(true) => Ok(IgnoreClasses::All),
            RawIgnoreClasses::Mode(mode) if mode == "fieldsOnly" => Ok(IgnoreClasses::FieldsOnly),
            RawIgnoreClasses::Mode(mode) => Err(ConfigError::IgnoreClasses(mode.clone())),
        }
    }
}

/// Per-check options. Only a missing `enforcement` or `ignoreInferredTypes`
/// falls back to the top level.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawCheckOptions {
    #[serde(default)]
    pub enforcement: Option<RawLevel>,
    #[serde(default)]
    pub ignore_inferred_types: Option<bool>,
    #[serde(default)]
    pub ignore_name_pattern: Option<OneOrMany<String>>,
    #[serde(default)]
    pub ignore_type_pattern: Option<OneOrMany<String>>,
    #[serde(default)]
    pub ignore_classes: Option<RawIgnoreClasses>,
    /// Only meaningful for `variables`.
    #[serde(default)]
    pub ignore_in_functions: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCheckSetting {
    Options(RawCheckOptions),
    Shorthand(RawLevel),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFixerLevels {
    #[serde(default, rename = "ReadonlyShallow")]
    pub readonly_shallow: Option<RawFixer>,
    #[serde(default, rename = "ReadonlyDeep")]
    pub readonly_deep: Option<RawFixer>,
    #[serde(default, rename = "Immutable")]
    pub immutable: Option<RawFixer>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFixerTable {
    Flag(bool),
    Levels(RawFixerLevels),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawPreferImmutableTypesOptions {
    #[serde(default)]
    pub enforcement: Option<RawLevel>,
    #[serde(default)]
    pub ignore_inferred_types: Option<bool>,
    #[serde(default)]
    pub ignore_name_pattern: Option<OneOrMany<String>>,
    #[serde(default)]
    pub ignore_type_pattern: Option<OneOrMany<String>>,
    #[serde(default)]
    pub ignore_classes: Option<RawIgnoreClasses>,
    #[serde(default)]
    pub parameters: Option<RawCheckSetting>,
    #[serde(default)]
    pub return_types: Option<RawCheckSetting>,
    #[serde(default)]
    pub variables: Option<RawCheckSetting>,
    #[serde(default)]
    pub fixer: Option<RawFixerTable>,
}

#[derive(Clone, Debug)]
pub struct CheckOptions {
    /// `None` disables the check.
    pub enforcement: Option<Immutability>,
    pub ignore_inferred_types: bool,
    pub ignore_name_pattern: Vec<Regex>,
    pub ignore_type_pattern: Vec<Regex>,
    pub ignore_classes: IgnoreClasses,
    pub ignore_in_functions: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            enforcement: Some(Immutability::Immutable),
            ignore_inferred_types: false,
            ignore_name_pattern: Vec::new(),
            ignore_type_pattern: Vec::new(),
            ignore_classes: IgnoreClasses::Off,
            ignore_in_functions: false,
        }
    }
}

/// Fixers per enforcement level.
#[derive(Clone, Debug)]
pub enum FixerTable {
    /// `fixer: false`: no fixes at all, including `readonly` insertion.
    Disabled,
    Levels {
        readonly_shallow: Vec<FixerEntry>,
        readonly_deep: Vec<FixerEntry>,
        immutable: Vec<FixerEntry>,
    },
}

impl Default for FixerTable {
    fn default() -> Self {
        FixerTable::Levels {
            readonly_shallow: fixer::default_readonly_shallow(),
            readonly_deep: Vec::new(),
            immutable: Vec::new(),
        }
    }
}

impl FixerTable {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, FixerTable::Disabled)
    }

    /// Entries for rewriting a type up to `level`; `None` when fixes are off.
    pub fn for_level(&self, level: Immutability) -> Option<&[FixerEntry]> {
        match self {
            FixerTable::Disabled => None,
            FixerTable::Levels {
                readonly_shallow,
                readonly_deep,
                immutable,
            } => Some(match level {
                Immutability::ReadonlyShallow => readonly_shallow.as_slice(),
                Immutability::ReadonlyDeep => readonly_deep.as_slice(),
                Immutability::Immutable => immutable.as_slice(),
                Immutability::Mutable | Immutability::Unknown => &[],
            }),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PreferImmutableTypesOptions {
    pub parameters: CheckOptions,
    pub return_types: CheckOptions,
    pub variables: CheckOptions,
    pub fixer: FixerTable,
}

pub fn resolve_prefer_immutable_types_options(
    raw: &RawPreferImmutableTypesOptions,
) -> Result<PreferImmutableTypesOptions, ConfigError> {
    let base = CheckOptions {
        enforcement: match &raw.enforcement {
            Some(level) => level.to_enforcement("enforcement")?,
            None => Some(Immutability::Immutable),
        },
        ignore_inferred_types: raw.ignore_inferred_types.unwrap_or(false),
        ignore_name_pattern: compile_patterns("ignoreNamePattern", raw.ignore_name_pattern.as_ref())?,
        ignore_type_pattern: compile_patterns("ignoreTypePattern", raw.ignore_type_pattern.as_ref())?,
        ignore_classes: match &raw.ignore_classes {
            Some(ignore) => ignore.resolve()?,
            None => IgnoreClasses::Off,
        },
        ignore_in_functions: false,
    };

    let options = PreferImmutableTypesOptions {
        parameters: resolve_check("parameters", &base, raw.parameters.as_ref())?,
        return_types: resolve_check("returnTypes", &base, raw.return_types.as_ref())?,
        variables: resolve_check("variables", &base, raw.variables.as_ref())?,
        fixer: resolve_fixer_table(raw.fixer.as_ref())?,
    };
    debug!(
        parameters = ?options.parameters.enforcement,
        return_types = ?options.return_types.enforcement,
        variables = ?options.variables.enforcement,
        fixes = options.fixer.is_enabled(),
        "resolved prefer-immutable-types options"
    );
    Ok(options)
}

fn resolve_check(
    option: &'static str,
    base: &CheckOptions,
    setting: Option<&RawCheckSetting>,
) -> Result<CheckOptions, ConfigError> {
    let raw = match setting {
        None => return Ok(base.clone()),
        Some(RawCheckSetting::Shorthand(level)) => {
            return Ok(CheckOptions {
                enforcement: level.to_enforcement(option)?,
                ..base.clone()
            });
        }
        Some(RawCheckSetting::Options(raw)) => raw,
    };

    // An explicit object only inherits the level and the inferred-type
    // switch; its ignore lists are its own.
    Ok(CheckOptions {
        enforcement: match &raw.enforcement {
            Some(level) => level.to_enforcement(option)?,
            None => base.enforcement,
        },
        ignore_inferred_types: raw
            .ignore_inferred_types
            .unwrap_or(base.ignore_inferred_types),
        ignore_name_pattern: compile_patterns("ignoreNamePattern", raw.ignore_name_pattern.as_ref())?,
        ignore_type_pattern: compile_patterns("ignoreTypePattern", raw.ignore_type_pattern.as_ref())?,
        ignore_classes: match &raw.ignore_classes {
            Some(ignore) => ignore.resolve()?,
            None => IgnoreClasses::Off,
        },
        ignore_in_functions: raw.ignore_in_functions.unwrap_or(false),
    })
}

fn resolve_fixer_table(raw: Option<&RawFixerTable>) -> Result<FixerTable, ConfigError> {
    let levels = match raw {
        None => return Ok(FixerTable::default()),
        Some(RawFixerTable::Flag(false)) => return Ok(FixerTable::Disabled),
        Some(RawFixerTable::Flag(true)) => return Err(ConfigError::FixerFlag { option: "fixer" }),
        Some(RawFixerTable::Levels(levels)) => levels,
    };

    // Missing levels keep their defaults; `false` clears one level.
    let level = |raw: Option<&RawFixer>, default: fn() -> Vec<FixerEntry>| match raw {
        None => Ok(default()),
        Some(raw) => compile_fixer("fixer", raw).map(Option::unwrap_or_default),
    };
    Ok(FixerTable::Levels {
        readonly_shallow: level(levels.readonly_shallow.as_ref(), fixer::default_readonly_shallow)?,
        readonly_deep: level(levels.readonly_deep.as_ref(), Vec::new)?,
        immutable: level(levels.immutable.as_ref(), Vec::new)?,
    })
}

// ---------------------------------------------------------------------------
// Whole configuration
// ---------------------------------------------------------------------------

/// ```json
/// {
///   "overrides": { "keepDefault": false, "values": [{ "name": "Set", "to": "Immutable" }] },
///   "type-declaration-immutability": { "rules": [...] },
///   "prefer-immutable-types": { "enforcement": "ReadonlyDeep" }
/// }
/// ```
///
/// A check whose section is absent is disabled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLintConfig {
    #[serde(default)]
    pub overrides: Option<RawOverrideSettings>,
    #[serde(default, rename = "type-declaration-immutability")]
    pub type_declaration_immutability: Option<RawTypeDeclarationOptions>,
    #[serde(default, rename = "prefer-immutable-types")]
    pub prefer_immutable_types: Option<RawPreferImmutableTypesOptions>,
}

#[derive(Clone, Debug)]
pub struct LintConfig {
    pub overrides: OverrideTable,
    pub type_declaration_immutability: Option<TypeDeclarationOptions>,
    pub prefer_immutable_types: Option<PreferImmutableTypesOptions>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self::recommended()
    }
}

impl LintConfig {
    /// Builtin overrides and both checks with their default options.
    pub fn recommended() -> Self {
        Self {
            overrides: OverrideTable::builtin(),
            type_declaration_immutability: Some(TypeDeclarationOptions::default()),
            prefer_immutable_types: Some(PreferImmutableTypesOptions::default()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawLintConfig = serde_json::from_str(json)?;
        resolve_lint_config(&raw)
    }
}

pub fn resolve_lint_config(raw: &RawLintConfig) -> Result<LintConfig, ConfigError> {
    Ok(LintConfig {
        overrides: resolve_overrides(raw.overrides.as_ref())?,
        type_declaration_immutability: raw
            .type_declaration_immutability
            .as_ref()
            .map(resolve_type_declaration_options)
            .transpose()?,
        prefer_immutable_types: raw
            .prefer_immutable_types
            .as_ref()
            .map(resolve_prefer_immutable_types_options)
            .transpose()?,
    })
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
