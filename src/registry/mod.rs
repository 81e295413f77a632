//! Component registry.
//!
//! The [`Registry`] is the process-wide catalog of component descriptors and
//! named pipeline templates. It is assembled once at startup through a
//! [`RegistryBuilder`] and is read-only afterwards, so it can be shared
//! behind an `Arc` between the validator, the builder and any number of
//! threads without synchronization.
//!
//! ## Submodules
//!
//! - [`component`]: component, factory and descriptor contracts
//! - [`catalog`]: the built-in NLU component catalog

pub mod catalog;
pub mod component;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::{FrameworkError, Result};
use crate::types::PipelineSelection;

pub use component::{Component, ComponentDescriptor, ComponentFactory};

/// Name of the reserved template that must list every registered component.
pub const ALL_COMPONENTS: &str = "all_components";

// ============================================================================
// PipelineTemplate
// ============================================================================

/// A named, ordered list of component names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTemplate {
    name: String,
    components: Vec<String>,
}

impl PipelineTemplate {
    pub fn new<I, S>(name: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component names in execution order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn contains(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Read-only catalog of component descriptors and pipeline templates.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Descriptors in declaration order (duplicates are kept so the
    /// validator can report them).
    component_classes: Vec<Arc<ComponentDescriptor>>,
    /// Name lookup; holds the first descriptor declared under each name.
    registered_components: FxHashMap<String, Arc<ComponentDescriptor>>,
    /// Templates in declaration order.
    templates: Vec<PipelineTemplate>,
    template_index: FxHashMap<String, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// All descriptors in declaration order.
    pub fn component_classes(&self) -> &[Arc<ComponentDescriptor>] {
        &self.component_classes
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Result<&Arc<ComponentDescriptor>> {
        self.registered_components
            .get(name)
            .ok_or_else(|| FrameworkError::unknown_component(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered_components.contains_key(name)
    }

    /// Distinct registered names in declaration order.
    pub fn component_names(&self) -> Vec<&str> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.component_classes
            .iter()
            .map(|d| d.name())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// All templates in declaration order.
    pub fn templates(&self) -> &[PipelineTemplate] {
        &self.templates
    }

    /// Look up a template by name.
    pub fn template(&self, name: &str) -> Result<&PipelineTemplate> {
        self.template_index
            .get(name)
            .map(|&idx| &self.templates[idx])
            .ok_or_else(|| FrameworkError::unknown_template(name))
    }

    /// Expand a pipeline selection into an ordered list of component names.
    ///
    /// Template names are looked up; explicit lists are returned as given.
    /// Names are not checked against the catalog here.
    pub fn resolve_pipeline(&self, selection: &PipelineSelection) -> Result<Vec<String>> {
        match selection {
            PipelineSelection::Template(name) => Ok(self.template(name)?.components().to_vec()),
            PipelineSelection::Components(names) => Ok(names.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.component_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.component_classes.is_empty()
    }
}

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Collects descriptors and templates at startup.
///
/// `build` never fails: structural problems such as duplicate names are left
/// in place for [`crate::pipeline::validation::ValidationEngine`] to report.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    components: Vec<ComponentDescriptor>,
    templates: Vec<PipelineTemplate>,
}

impl RegistryBuilder {
    pub fn register(mut self, descriptor: ComponentDescriptor) -> Self {
        self.components.push(descriptor);
        self
    }

    /// Add a template; a later template with the same name replaces the
    /// earlier one.
    pub fn template<I, S>(mut self, name: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = PipelineTemplate::new(name, components);
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        self
    }

    pub fn build(self) -> Registry {
        let component_classes: Vec<Arc<ComponentDescriptor>> =
            self.components.into_iter().map(Arc::new).collect();

        let mut registered_components = FxHashMap::default();
        for descriptor in &component_classes {
            registered_components
                .entry(descriptor.name().to_string())
                .or_insert_with(|| Arc::clone(descriptor));
        }

        let template_index = self
            .templates
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.name.clone(), idx))
            .collect();

        Registry {
            component_classes,
            registered_components,
            templates: self.templates,
            template_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::catalog::InertFactory;
    use super::*;

    fn descriptor(name: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(name, Arc::new(InertFactory::named(name)))
    }

    fn sample() -> Registry {
        Registry::builder()
            .register(descriptor("tokenizer_whitespace").provides(["tokens"]))
            .register(
                descriptor("intent_classifier_keyword")
                    .requires(["tokens"])
                    .provides(["intent"]),
            )
            .template("keyword", ["tokenizer_whitespace", "intent_classifier_keyword"])
            .template(
                ALL_COMPONENTS,
                ["tokenizer_whitespace", "intent_classifier_keyword"],
            )
            .build()
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = sample();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("tokenizer_whitespace"));
        let descriptor = registry.get("intent_classifier_keyword").unwrap();
        assert!(descriptor.required_properties().contains("tokens"));
    }

    #[test]
    fn test_lookup_unknown_name_fails() {
        let err = sample().get("my_made_up_component").unwrap_err();
        assert!(err.is_unknown_component());
        assert!(err.to_string().contains("Unknown component name"));
    }

    #[test]
    fn test_name_map_matches_component_list() {
        let registry = sample();
        for descriptor in registry.component_classes() {
            let looked_up = registry.get(descriptor.name()).unwrap();
            assert!(Arc::ptr_eq(looked_up, descriptor));
        }
    }

    #[test]
    fn test_duplicates_kept_in_list_first_wins_in_map() {
        let registry = Registry::builder()
            .register(descriptor("dup").provides(["a"]))
            .register(descriptor("dup").provides(["b"]))
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.component_names(), vec!["dup"]);
        assert!(registry.get("dup").unwrap().provided_properties().contains("a"));
    }

    #[test]
    fn test_template_lookup_and_resolution() {
        let registry = sample();
        let template = registry.template("keyword").unwrap();
        assert_eq!(template.components().len(), 2);
        assert!(template.contains("tokenizer_whitespace"));

        let names = registry
            .resolve_pipeline(&PipelineSelection::Template("keyword".to_string()))
            .unwrap();
        assert_eq!(names, vec!["tokenizer_whitespace", "intent_classifier_keyword"]);

        let explicit = PipelineSelection::Components(vec!["anything".to_string()]);
        assert_eq!(registry.resolve_pipeline(&explicit).unwrap(), vec!["anything"]);
    }

    #[test]
    fn test_unknown_template_fails() {
        let err = sample().template("nope").unwrap_err();
        assert_eq!(err, FrameworkError::unknown_template("nope"));
    }

    #[test]
    fn test_template_redeclaration_replaces() {
        let registry = Registry::builder()
            .template("t", ["a"])
            .template("t", ["b", "c"])
            .build();
        assert_eq!(registry.templates().len(), 1);
        assert_eq!(registry.template("t").unwrap().components(), ["b", "c"]);
    }
}
