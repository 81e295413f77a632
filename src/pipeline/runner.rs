//! Pipeline assembly and execution.
//!
//! [`Pipeline::assemble`] turns a [`PipelineConfig`] into an ordered list of
//! live component instances. Before anything is constructed it checks, in
//! this order:
//!
//! 1. every configured name is registered,
//! 2. every package those components need resolves,
//! 3. walking the pipeline front to back, each component's requirements are
//!    provided by the initial context or by an earlier component.
//!
//! The third check is per pipeline and order-aware, unlike the global
//! satisfiability rule in [`super::validation`].

use std::path::Path;
use std::sync::Arc;

use crate::errors::{FrameworkError, Result};
use crate::packages::{validate_requirements, PackageResolver};
use crate::pipeline::builder::ComponentBuilder;
use crate::registry::{Component, Registry};
use crate::types::{Message, Metadata, PipelineConfig, Property, PropertySet};

/// A requirement that is not available at the point a component runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingProperty {
    /// Position of the component in the pipeline.
    pub index: usize,
    pub component: String,
    pub property: Property,
}

/// Every requirement of `names` that no earlier component (and nothing in
/// `initial_context`) provides, in pipeline order.
pub fn missing_properties<S: AsRef<str>>(
    registry: &Registry,
    names: &[S],
    initial_context: &PropertySet,
) -> Result<Vec<MissingProperty>> {
    let mut context = initial_context.clone();
    let mut missing = Vec::new();

    for (index, name) in names.iter().enumerate() {
        let descriptor = registry.get(name.as_ref())?;
        for required in descriptor.required_properties() {
            if !context.contains(required) {
                missing.push(MissingProperty {
                    index,
                    component: descriptor.name().to_string(),
                    property: required.clone(),
                });
            }
        }
        context.extend(descriptor.provided_properties().iter().cloned());
    }

    Ok(missing)
}

/// Fail on the first requirement that is not available when its component
/// runs.
pub fn validate_pipeline_order<S: AsRef<str>>(
    registry: &Registry,
    names: &[S],
    initial_context: &PropertySet,
) -> Result<()> {
    match missing_properties(registry, names, initial_context)?.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(FrameworkError::missing_property(
            first.component,
            first.property.as_str(),
        )),
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Enter a tracing span for one component (when the `tracing` feature is
/// enabled). When disabled, this is a no-op.
macro_rules! trace_component {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pipeline_component", component = $name).entered();
    };
}

/// An ordered set of live component instances.
#[derive(Debug, Clone)]
pub struct Pipeline {
    names: Vec<String>,
    components: Vec<Arc<dyn Component>>,
}

impl Pipeline {
    /// Build a pipeline from a configuration, creating (or reusing) every
    /// component through `builder`.
    pub fn assemble<R>(
        builder: &ComponentBuilder,
        config: &PipelineConfig,
        resolver: &R,
    ) -> Result<Self>
    where
        R: PackageResolver + ?Sized,
    {
        config.validate()?;
        let registry = builder.registry();
        let names = registry.resolve_pipeline(&config.pipeline)?;
        Self::check(registry, &names, resolver)?;

        let components = builder.create_all(&names, config)?;
        trace_debug!(components = names.len(), "pipeline assembled");
        Ok(Self { names, components })
    }

    /// Restore a persisted pipeline from its metadata.
    ///
    /// Component names come from the metadata's `pipeline` entry; the model
    /// directory defaults to the current directory when the metadata has
    /// none.
    pub fn load<R>(builder: &ComponentBuilder, metadata: &Metadata, resolver: &R) -> Result<Self>
    where
        R: PackageResolver + ?Sized,
    {
        let registry = builder.registry();
        let names = metadata.component_names();
        Self::check(registry, &names, resolver)?;

        let model_dir = metadata.model_dir().unwrap_or(Path::new(""));
        let components = names
            .iter()
            .map(|name| builder.load_component(name, model_dir, metadata))
            .collect::<Result<Vec<_>>>()?;
        trace_debug!(components = names.len(), "pipeline loaded");
        Ok(Self { names, components })
    }

    fn check<R>(registry: &Registry, names: &[String], resolver: &R) -> Result<()>
    where
        R: PackageResolver + ?Sized,
    {
        for name in names {
            registry.get(name)?;
        }
        validate_requirements(registry, names, resolver)?;
        validate_pipeline_order(registry, names, &PropertySet::new())
    }

    /// Run every component on `message`, in order.
    pub fn process(&self, message: &mut Message) -> Result<()> {
        for component in &self.components {
            trace_component!(component.name());
            component.process(message)?;
        }
        Ok(())
    }

    pub fn component_names(&self) -> &[String] {
        &self.names
    }

    pub fn components(&self) -> &[Arc<dyn Component>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
