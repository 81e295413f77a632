//! Validation engine for component catalogs.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`Registry`] and collects every finding into a [`ValidationReport`]. It
//! never short-circuits on the first problem, so a startup self-check or a
//! CI test sees all of them at once. Every rule is pure: the same registry
//! always yields the same report, in the same order.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_nlu::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&registry);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::{component_path, template_entry_path, template_path, CatalogError};
use crate::errors::{FrameworkError, Result};
use crate::registry::{Registry, ALL_COMPONENTS};
use crate::types::PropertySet;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding with its severity.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: CatalogError,
}

impl ValidationDiagnostic {
    pub fn error(err: CatalogError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: CatalogError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &CatalogError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &CatalogError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Error-severity diagnostics carrying `code`.
    pub fn errors_with_code(&self, code: ErrorCode) -> impl Iterator<Item = &CatalogError> {
        self.errors().filter(move |e| e.code == code)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Turn a report with errors into a hard failure.
    pub fn into_result(self) -> Result<()> {
        let mut errors = self.errors();
        match errors.next() {
            None => Ok(()),
            Some(first) => Err(FrameworkError::CatalogInvalid {
                count: 1 + errors.count(),
                first: first.to_string(),
            }),
        }
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`Registry`] and returns zero or
/// more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"unique_names"`).
    fn name(&self) -> &str;

    /// Inspect `registry` and return any findings.
    fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`Registry`] and collects all
/// diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(UniqueNamesRule));
        engine.add_rule(Box::new(TemplateComponentsRule));
        engine.add_rule(Box::new(SatisfiableRequirementsRule));
        engine.add_rule(Box::new(AllComponentsTemplateRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in execution order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run all rules against `registry` and return the collected report.
    pub fn validate(&self, registry: &Registry) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            let found = rule.validate(registry);
            trace_debug!(rule = rule.name(), findings = found.len(), "catalog rule finished");
            report.diagnostics.extend(found);
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Component names are unique ──────────────────────────────────────────

struct UniqueNamesRule;

impl ValidationRule for UniqueNamesRule {
    fn name(&self) -> &str {
        "unique_names"
    }

    fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for descriptor in registry.component_classes() {
            *counts.entry(descriptor.name()).or_default() += 1;
        }

        // component_names() is declaration-ordered and distinct
        registry
            .component_names()
            .into_iter()
            .filter_map(|name| {
                let count = counts.get(name).copied().unwrap_or(0);
                (count > 1).then(|| {
                    ValidationDiagnostic::error(
                        CatalogError::new(
                            ErrorCode::DuplicateComponentName,
                            component_path(name),
                            format!("there is more than one component named '{name}' ({count} declarations)"),
                        )
                        .with_hint("Component names are referenced by pipelines and must be unique"),
                    )
                })
            })
            .collect()
    }
}

// ─── 2. Templates only reference known components ───────────────────────────

struct TemplateComponentsRule;

impl ValidationRule for TemplateComponentsRule {
    fn name(&self) -> &str {
        "template_components"
    }

    fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        for template in registry.templates() {
            for (idx, component) in template.components().iter().enumerate() {
                if !registry.contains(component) {
                    out.push(ValidationDiagnostic::error(
                        CatalogError::new(
                            ErrorCode::UnknownTemplateComponent,
                            template_entry_path(template.name(), idx),
                            format!(
                                "template '{}' contains unknown component '{component}'",
                                template.name()
                            ),
                        )
                        .with_hint("Check spelling or register the component"),
                    ));
                }
            }
        }
        out
    }
}

// ─── 3. Every requirement is provided somewhere ─────────────────────────────

/// Global check: a required tag must be provided by *some* component in the
/// catalog. Pipeline order is not considered here.
struct SatisfiableRequirementsRule;

impl ValidationRule for SatisfiableRequirementsRule {
    fn name(&self) -> &str {
        "satisfiable_requirements"
    }

    fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic> {
        let provided: PropertySet = registry
            .component_classes()
            .iter()
            .flat_map(|d| d.provided_properties().iter().cloned())
            .collect();

        let mut out = Vec::new();
        for descriptor in registry.component_classes() {
            for required in descriptor.required_properties() {
                if !provided.contains(required) {
                    out.push(ValidationDiagnostic::error(
                        CatalogError::new(
                            ErrorCode::UnsatisfiedRequirement,
                            component_path(descriptor.name()),
                            format!("requires '{required}', which no component provides"),
                        )
                        .with_hint(format!(
                            "Register a component that provides '{required}'"
                        )),
                    ));
                }
            }
        }
        out
    }
}

// ─── 4. all_components lists every component ────────────────────────────────

struct AllComponentsTemplateRule;

impl ValidationRule for AllComponentsTemplateRule {
    fn name(&self) -> &str {
        "all_components_template"
    }

    fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic> {
        let template = match registry.template(ALL_COMPONENTS) {
            Ok(t) => t,
            Err(_) if registry.is_empty() => return vec![],
            Err(_) => {
                return vec![ValidationDiagnostic::error(
                    CatalogError::new(
                        ErrorCode::MissingAllComponentsTemplate,
                        template_path(ALL_COMPONENTS),
                        format!("the '{ALL_COMPONENTS}' template is not declared"),
                    )
                    .with_hint("Declare a template listing every registered component"),
                )]
            }
        };

        registry
            .component_names()
            .into_iter()
            .filter(|name| !template.contains(name))
            .map(|name| {
                ValidationDiagnostic::error(
                    CatalogError::new(
                        ErrorCode::IncompleteAllComponentsTemplate,
                        template_path(ALL_COMPONENTS),
                        format!("'{ALL_COMPONENTS}' template is missing component '{name}'"),
                    )
                    .with_hint(format!("Add '{name}' to the {ALL_COMPONENTS} template")),
                )
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::catalog::{self, InertFactory};
    use crate::registry::{ComponentDescriptor, RegistryBuilder};

    fn descriptor(name: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(name, Arc::new(InertFactory::named(name)))
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::with_defaults()
    }

    /// tokenizer → featurizer → classifier, with a complete all_components.
    fn base() -> RegistryBuilder {
        Registry::builder()
            .register(descriptor("tok").provides(["tokens"]))
            .register(descriptor("feat").requires(["tokens"]).provides(["text_features"]))
            .register(descriptor("clf").requires(["text_features"]).provides(["intent"]))
            .template("default", ["tok", "feat", "clf"])
    }

    fn with_all(builder: RegistryBuilder, names: &[&str]) -> Registry {
        builder.template(ALL_COMPONENTS, names.iter().copied()).build()
    }

    // ─── Valid catalogs ─────────────────────────────────────────────────

    #[test]
    fn test_builtin_catalog_is_valid() {
        let report = engine().validate(&catalog::builtin());
        assert!(report.is_valid(), "{:?}", report.errors().collect::<Vec<_>>());
        assert!(report.is_empty());
    }

    #[test]
    fn test_consistent_catalog_is_valid() {
        let report = engine().validate(&with_all(base(), &["tok", "feat", "clf"]));
        assert!(report.is_valid());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let report = engine().validate(&Registry::default());
        assert!(report.is_empty());
    }

    #[test]
    fn test_default_rule_order() {
        assert_eq!(
            engine().rule_names(),
            vec![
                "unique_names",
                "template_components",
                "satisfiable_requirements",
                "all_components_template"
            ]
        );
    }

    // ─── Rule: unique_names ─────────────────────────────────────────────

    #[test]
    fn test_duplicate_name_reported_once() {
        let registry = with_all(
            base().register(descriptor("tok").provides(["tokens"])),
            &["tok", "feat", "clf"],
        );
        let report = engine().validate(&registry);
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::DuplicateComponentName);
        assert_eq!(errs[0].path, "/components/tok");
        assert!(errs[0].message.contains("2 declarations"));
    }

    // ─── Rule: template_components ──────────────────────────────────────

    #[test]
    fn test_unknown_template_component() {
        let registry = with_all(
            base().template("broken", ["tok", "my_made_up_component"]),
            &["tok", "feat", "clf"],
        );
        let report = engine().validate(&registry);
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnknownTemplateComponent);
        assert_eq!(errs[0].path, "/templates/broken/1");
        assert!(errs[0].message.contains("my_made_up_component"));
    }

    #[test]
    fn test_extra_name_in_all_components_is_unknown() {
        let registry = with_all(base(), &["tok", "feat", "clf", "ghost"]);
        let report = engine().validate(&registry);
        let errs: Vec<_> = report
            .errors_with_code(ErrorCode::UnknownTemplateComponent)
            .collect();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].path.starts_with("/templates/all_components/"));
    }

    // ─── Rule: satisfiable_requirements ─────────────────────────────────

    #[test]
    fn test_unsatisfied_requirement() {
        let registry = with_all(
            base().register(descriptor("ner").requires(["tokens", "spacy_doc"])),
            &["tok", "feat", "clf", "ner"],
        );
        let report = engine().validate(&registry);
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnsatisfiedRequirement);
        assert_eq!(errs[0].path, "/components/ner");
        assert!(errs[0].message.contains("spacy_doc"));
    }

    #[test]
    fn test_requirement_satisfied_regardless_of_order() {
        // the classifier is declared before its provider; the global check
        // does not care
        let registry = Registry::builder()
            .register(descriptor("clf").requires(["tokens"]))
            .register(descriptor("tok").provides(["tokens"]))
            .template(ALL_COMPONENTS, ["clf", "tok"])
            .build();
        assert!(engine().validate(&registry).is_valid());
    }

    // ─── Rule: all_components_template ──────────────────────────────────

    #[test]
    fn test_all_components_missing_entry() {
        let registry = with_all(base(), &["tok", "clf"]);
        let report = engine().validate(&registry);
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::IncompleteAllComponentsTemplate);
        assert!(errs[0].message.contains("'feat'"));
    }

    #[test]
    fn test_all_components_template_absent() {
        let report = engine().validate(&base().build());
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::MissingAllComponentsTemplate);
    }

    // ─── Collect-all behaviour ──────────────────────────────────────────

    #[test]
    fn test_all_violations_collected() {
        let registry = with_all(
            base()
                .register(descriptor("tok"))
                .register(descriptor("ner").requires(["spacy_nlp"]))
                .template("broken", ["nope"]),
            &["tok", "feat", "clf"],
        );
        let report = engine().validate(&registry);
        assert_eq!(report.errors().count(), 4);

        let err = report.into_result().unwrap_err();
        match err {
            FrameworkError::CatalogInvalid { count, first } => {
                assert_eq!(count, 4);
                assert!(first.starts_with("[duplicate_component_name]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_is_deterministic() {
        let registry = with_all(
            base()
                .register(descriptor("a").requires(["x", "y"]))
                .register(descriptor("b").requires(["z"])),
            &["tok"],
        );
        let first: Vec<String> = engine()
            .validate(&registry)
            .errors()
            .map(ToString::to_string)
            .collect();
        let second: Vec<String> = engine()
            .validate(&registry)
            .errors()
            .map(ToString::to_string)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3 + 4);
    }

    // ─── Custom rules ───────────────────────────────────────────────────

    struct NoEmptyProvides;

    impl ValidationRule for NoEmptyProvides {
        fn name(&self) -> &str {
            "no_empty_provides"
        }

        fn validate(&self, registry: &Registry) -> Vec<ValidationDiagnostic> {
            registry
                .component_classes()
                .iter()
                .filter(|d| d.provided_properties().is_empty())
                .map(|d| {
                    ValidationDiagnostic::warning(CatalogError::new(
                        ErrorCode::UnsatisfiedRequirement,
                        component_path(d.name()),
                        "provides nothing",
                    ))
                })
                .collect()
        }
    }

    #[test]
    fn test_custom_rule_warnings_keep_report_valid() {
        let mut engine = ValidationEngine::new();
        engine.add_rule(Box::new(NoEmptyProvides));
        let registry = Registry::builder().register(descriptor("noop")).build();

        let report = engine.validate(&registry);
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }
}
