//! Lint checks built on immutability classification.
//!
//! - **`type-declaration-immutability`**: type names bound to an expected
//!   level through ordered naming rules
//! - **`prefer-immutable-types`**: minimum levels for parameters, return
//!   types, variables and class properties
//!
//! Hosts resolve a [`LintConfig`] once, describe their declarations with the
//! [`declaration`] model, and run one [`LintPass`] per file.
pub mod config;
pub mod declaration;
pub mod diagnostics;
pub mod fixer;
mod pass;
pub mod prefer_immutable_types;
pub mod rules;
pub mod tracing_config;
pub mod type_declaration_immutability;

pub use config::{ConfigError, LintConfig};
pub use diagnostics::{Diagnostic, MessageId, Span, TextEdit, apply_fixes};
pub use fixer::FixerEntry;
pub use pass::LintPass;
pub use rules::{Comparator, MatchResult, Rule, RuleSet, fix, match_rules};
