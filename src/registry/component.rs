//! Component contracts.
//!
//! A [`ComponentDescriptor`] is the static declaration of a component: its
//! unique name, the property tags it needs in the processing context
//! (`requires`), the tags it adds (`provides`), and the packages it needs at
//! runtime. Construction is delegated to a [`ComponentFactory`], which is the
//! seam where concrete implementations plug in.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;
use crate::types::{Message, Metadata, PipelineConfig, Property, PropertySet};

// ============================================================================
// Component: a live instance
// ============================================================================

/// A constructed pipeline component.
///
/// Instances are shared between every pipeline that asks the builder for the
/// same (name, configuration) pair, so they must be `Send + Sync` and must
/// not rely on exclusive access.
pub trait Component: Send + Sync + fmt::Debug {
    /// Registry name of the component that produced this instance.
    fn name(&self) -> &str;

    /// Process one message, adding the component's provided properties.
    fn process(&self, _message: &mut Message) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// ComponentFactory: create / load entry points
// ============================================================================

/// Creation and loading entry points for one component kind.
///
/// # Contract
///
/// - `create` builds a fresh, untrained instance from a configuration.
/// - `load` restores a persisted instance; `cached` carries an instance the
///   builder already holds under [`cache_key`](Self::cache_key), if any.
/// - Both may block (e.g. reading large resources); the builder calls them
///   while holding only the lock of the affected cache entry.
pub trait ComponentFactory: Send + Sync {
    fn create(&self, config: &PipelineConfig) -> Result<Arc<dyn Component>>;

    fn load(
        &self,
        model_dir: &Path,
        metadata: &Metadata,
        cached: Option<Arc<dyn Component>>,
    ) -> Result<Arc<dyn Component>>;

    /// Key under which a loaded instance may be reused. `None` disables
    /// caching of loaded instances for this component.
    fn cache_key(&self, _metadata: &Metadata) -> Option<String> {
        None
    }
}

// ============================================================================
// ComponentDescriptor
// ============================================================================

/// Static declaration of a component, immutable once registered.
#[derive(Clone)]
pub struct ComponentDescriptor {
    name: String,
    requires: PropertySet,
    provides: PropertySet,
    required_packages: Vec<String>,
    factory: Arc<dyn ComponentFactory>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, factory: Arc<dyn ComponentFactory>) -> Self {
        Self {
            name: name.into(),
            requires: PropertySet::new(),
            provides: PropertySet::new(),
            required_packages: Vec::new(),
            factory,
        }
    }

    /// Builder method: tags this component needs before it runs
    pub fn requires<I, P>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Property>,
    {
        self.requires.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Builder method: tags this component adds after it runs
    pub fn provides<I, P>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Property>,
    {
        self.provides.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Builder method: packages that must resolve for this component to work
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_packages
            .extend(packages.into_iter().map(Into::into));
        self
    }

    /// Builder method: bind a different construction backend
    pub fn with_factory(mut self, factory: Arc<dyn ComponentFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_properties(&self) -> &PropertySet {
        &self.requires
    }

    pub fn provided_properties(&self) -> &PropertySet {
        &self.provides
    }

    pub fn required_packages(&self) -> &[String] {
        &self.required_packages
    }

    pub fn factory(&self) -> &dyn ComponentFactory {
        self.factory.as_ref()
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("provides", &self.provides)
            .field("required_packages", &self.required_packages)
            .finish_non_exhaustive()
    }
}
