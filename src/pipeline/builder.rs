//! Component builder: creates and loads component instances by name.
//!
//! The [`ComponentBuilder`] resolves a name against the [`Registry`], then
//! delegates to the descriptor's [`ComponentFactory`]. Instances are cached
//! under a [`CacheKey`] so that a component requested by several pipelines
//! (or several stages) with an identical configuration is built once and
//! shared.
//!
//! # Locking
//!
//! The cache map is guarded by a short-lived lock that only hands out a
//! per-key slot. Construction happens while holding the slot's own lock, so
//! two threads asking for the same key serialize (the second one gets the
//! first one's instance) while different keys build in parallel. A failed
//! construction leaves no entry behind.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::registry::{Component, ComponentDescriptor, Registry};
use crate::types::{Fingerprint, Metadata, PipelineConfig};

/// How a cached instance came into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOrigin {
    /// Built by the factory's `create` entry point; keyed by the config's component fingerprint.
    Created,
    /// Restored by the factory's `load` entry point; keyed by the factory's
    /// own cache key.
    Loaded,
}

/// Identity of a cached instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub component: String,
    pub origin: CacheOrigin,
    pub fingerprint: Fingerprint,
}

type Slot = Arc<Mutex<Option<Arc<dyn Component>>>>;

/// Creates or loads components, reusing instances per (name, configuration).
///
/// Created instances are keyed by [`PipelineConfig::component_fingerprint`]:
/// the same component with the same language and settings is shared across
/// pipelines, whatever pipeline selection the config carries.
pub struct ComponentBuilder {
    registry: Arc<Registry>,
    use_cache: bool,
    cache: Mutex<FxHashMap<CacheKey, Slot>>,
    cached: AtomicUsize,
}

impl ComponentBuilder {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            use_cache: true,
            cache: Mutex::new(FxHashMap::default()),
            cached: AtomicUsize::new(0),
        }
    }

    /// Builder method: construct a fresh instance on every call
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of instances currently held by the cache.
    pub fn cached_len(&self) -> usize {
        self.cached.load(Ordering::Acquire)
    }

    /// Create a component from a configuration.
    ///
    /// Fails with [`FrameworkError::UnknownComponent`](crate::FrameworkError::UnknownComponent)
    /// if `name` is not registered; the configuration is not looked at
    /// before that check.
    pub fn create_component(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<Arc<dyn Component>> {
        let descriptor = self.registry.get(name)?;

        if !(self.use_cache && config.use_cache) {
            return descriptor.factory().create(config);
        }

        let key = CacheKey {
            component: name.to_string(),
            origin: CacheOrigin::Created,
            fingerprint: config.component_fingerprint()?,
        };
        let slot = self.slot(&key);
        let mut guard = slot.lock();

        if let Some(existing) = guard.as_ref() {
            trace_debug!(component = name, "component cache hit");
            return Ok(Arc::clone(existing));
        }

        match descriptor.factory().create(config) {
            Ok(instance) => {
                *guard = Some(Arc::clone(&instance));
                self.cached.fetch_add(1, Ordering::AcqRel);
                trace_info!(component = name, key = %key.fingerprint, "added component to cache");
                Ok(instance)
            }
            Err(err) => {
                drop(guard);
                self.discard_if_empty(&key, &slot);
                Err(err)
            }
        }
    }

    /// Load a persisted component.
    ///
    /// Fails with [`FrameworkError::UnknownComponent`](crate::FrameworkError::UnknownComponent)
    /// if `name` is not registered, whatever `model_dir` and `metadata` hold.
    /// Loaded instances are cached only when the factory supplies a
    /// [`cache_key`](crate::ComponentFactory::cache_key); a cached instance
    /// is handed back to the factory's `load`.
    pub fn load_component(
        &self,
        name: &str,
        model_dir: impl AsRef<Path>,
        metadata: &Metadata,
    ) -> Result<Arc<dyn Component>> {
        let descriptor = self.registry.get(name)?;
        let model_dir = model_dir.as_ref();

        let cache_key = if self.use_cache {
            descriptor.factory().cache_key(metadata)
        } else {
            None
        };
        let Some(cache_key) = cache_key else {
            return descriptor.factory().load(model_dir, metadata, None);
        };

        let key = CacheKey {
            component: name.to_string(),
            origin: CacheOrigin::Loaded,
            fingerprint: Fingerprint::from_key(cache_key),
        };
        let slot = self.slot(&key);
        let mut guard = slot.lock();

        if let Some(existing) = guard.as_ref() {
            trace_debug!(component = name, "component cache hit on load");
            return descriptor
                .factory()
                .load(model_dir, metadata, Some(Arc::clone(existing)));
        }

        match descriptor.factory().load(model_dir, metadata, None) {
            Ok(instance) => {
                *guard = Some(Arc::clone(&instance));
                self.cached.fetch_add(1, Ordering::AcqRel);
                trace_info!(component = name, key = %key.fingerprint, "added loaded component to cache");
                Ok(instance)
            }
            Err(err) => {
                drop(guard);
                self.discard_if_empty(&key, &slot);
                Err(err)
            }
        }
    }

    /// Create every component of an ordered pipeline.
    pub fn create_all<S: AsRef<str>>(
        &self,
        names: &[S],
        config: &PipelineConfig,
    ) -> Result<Vec<Arc<dyn Component>>> {
        names
            .iter()
            .map(|name| self.create_component(name.as_ref(), config))
            .collect()
    }

    /// Look up a descriptor through the builder's registry.
    pub fn descriptor(&self, name: &str) -> Result<&Arc<ComponentDescriptor>> {
        self.registry.get(name)
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut cache = self.cache.lock();
        Arc::clone(cache.entry(key.clone()).or_default())
    }

    fn discard_if_empty(&self, key: &CacheKey, slot: &Slot) {
        let mut cache = self.cache.lock();
        let empty = match cache.get(key) {
            // Only the map and the caller may hold the slot; any other holder
            // took it in `slot()` and is about to lock it.
            Some(current) if Arc::ptr_eq(current, slot) && Arc::strong_count(current) == 2 => {
                current.try_lock().is_some_and(|inner| inner.is_none())
            }
            _ => false,
        };
        if empty {
            cache.remove(key);
        }
    }
}

impl std::fmt::Debug for ComponentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBuilder")
            .field("components", &self.registry.len())
            .field("use_cache", &self.use_cache)
            .field("cached", &self.cached_len())
            .finish()
    }
}
