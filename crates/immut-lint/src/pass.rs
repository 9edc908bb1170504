//! Per-file lint runs: one classifier shared by every check in a pass.

use crate::config::LintConfig;
use crate::declaration::{FunctionDecl, TypeDeclaration, VariableDecl};
use crate::diagnostics::Diagnostic;
use crate::{prefer_immutable_types, type_declaration_immutability};
use immut_solver::{Immutability, ImmutabilityClassifier, TypeGraph, TypeId};
use tracing::debug;

/// One lint run over one file's declarations.
///
/// The pass owns its classifier, so classification results are shared by
/// every declaration it checks and dropped with it. Checks whose section is
/// missing from the configuration are no-ops.
pub struct LintPass<'a, G: TypeGraph + ?Sized> {
    classifier: ImmutabilityClassifier<'a, G>,
    config: &'a LintConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, G: TypeGraph + ?Sized> LintPass<'a, G> {
    pub fn new(graph: &'a G, config: &'a LintConfig) -> Self {
        Self {
            classifier: ImmutabilityClassifier::new(graph, config.overrides.clone()),
            config,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &LintConfig {
        self.config
    }

    /// Exact level of `type_id` under this pass's overrides.
    pub fn classify(&mut self, type_id: TypeId) -> Immutability {
        self.classifier.classify_fully(type_id)
    }

    pub fn check_type_declaration(&mut self, decl: &TypeDeclaration) {
        let config = self.config;
        let Some(options) = &config.type_declaration_immutability else {
            return;
        };
        self.diagnostics.extend(type_declaration_immutability::check_type_declaration(
            &mut self.classifier,
            options,
            decl,
        ));
    }

    pub fn check_function(&mut self, func: &FunctionDecl) {
        let config = self.config;
        let Some(options) = &config.prefer_immutable_types else {
            return;
        };
        self.diagnostics.extend(prefer_immutable_types::check_function(
            &mut self.classifier,
            options,
            func,
        ));
    }

    pub fn check_variable(&mut self, var: &VariableDecl) {
        let config = self.config;
        let Some(options) = &config.prefer_immutable_types else {
            return;
        };
        self.diagnostics.extend(prefer_immutable_types::check_variable(
            &mut self.classifier,
            options,
            var,
        ));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics in source order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|diag| (diag.span.start, diag.span.end));
        debug!(
            diagnostics = self.diagnostics.len(),
            classified = self.classifier.cache_len(),
            "lint pass finished"
        );
        self.diagnostics
    }
}
