//! Optional-dependency availability checking.
//!
//! Components declare the packages they need at runtime. Before a pipeline
//! is assembled, those names are resolved against the running process; the
//! ones that cannot be resolved are reported so that callers can warn,
//! disable optional features, or abort.
//!
//! Resolution is pluggable through [`PackageResolver`]. The default
//! [`SystemResolver`] accepts modules that are always linked into the
//! process and otherwise tries to open a shared library of that name.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;

use crate::errors::{FrameworkError, Result};
use crate::registry::Registry;

/// Standard library modules; always available.
const LINKED_MODULES: &[&str] = &[
    "alloc", "any", "borrow", "cell", "collections", "env", "ffi", "fmt", "fs", "hash", "io",
    "iter", "mem", "net", "num", "ops", "os", "panic", "path", "process", "ptr", "rc", "str",
    "string", "sync", "thread", "time", "vec",
];

// ============================================================================
// Resolver
// ============================================================================

/// Decides whether a named package can be used in the current process.
pub trait PackageResolver: Send + Sync {
    /// `Ok(())` if `name` resolves; otherwise the reason it does not.
    fn resolve(&self, name: &str) -> std::result::Result<(), String>;
}

/// Resolves linked modules first, then shared libraries on the loader path.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    linked: FxHashSet<String>,
    search_libraries: bool,
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self {
            linked: LINKED_MODULES.iter().map(|m| m.to_string()).collect(),
            search_libraries: true,
        }
    }
}

impl SystemResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: treat additional names as linked into the process
    pub fn with_linked<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.linked.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builder method: resolve linked names only, never open libraries
    pub fn without_libraries(mut self) -> Self {
        self.search_libraries = false;
        self
    }

    fn open_library(name: &str) -> std::result::Result<(), String> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(format!("'{name}' is not a library name"));
        }
        let file = libloading::library_filename(name);
        // SAFETY: opening a library runs its initializers; packages named by
        // component descriptors are expected to be well-behaved shared
        // objects. The handle is closed again immediately.
        let library = unsafe { libloading::Library::new(&file) }.map_err(|e| e.to_string())?;
        drop(library);
        Ok(())
    }
}

impl PackageResolver for SystemResolver {
    fn resolve(&self, name: &str) -> std::result::Result<(), String> {
        if self.linked.contains(name) {
            return Ok(());
        }
        if !self.search_libraries {
            return Err(format!("'{name}' is not linked into this process"));
        }
        Self::open_library(name)
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Names from `packages` that the default [`SystemResolver`] cannot resolve.
pub fn find_unavailable_packages<I, S>(packages: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    find_unavailable_packages_with(&SystemResolver::default(), packages)
}

/// Names from `packages` that `resolver` cannot resolve.
///
/// Each distinct name is resolved once. A resolver that panics is treated
/// as having failed for that name; the panic does not propagate.
pub fn find_unavailable_packages_with<R, I, S>(resolver: &R, packages: I) -> BTreeSet<String>
where
    R: PackageResolver + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut checked = FxHashSet::default();
    let mut unavailable = BTreeSet::new();

    for package in packages {
        let name = package.as_ref();
        if !checked.insert(name.to_string()) {
            continue;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(name))) {
            Ok(Ok(())) => {}
            Ok(Err(_reason)) => {
                trace_debug!(package = name, reason = %_reason, "package unavailable");
                unavailable.insert(name.to_string());
            }
            Err(_) => {
                trace_debug!(package = name, "package resolver panicked");
                unavailable.insert(name.to_string());
            }
        }
    }

    unavailable
}

/// Check that every package needed by the named components resolves.
///
/// Fails with `UnknownComponent` for a name missing from the registry, or
/// with `MissingPackages` listing every unresolved package.
pub fn validate_requirements<R, S>(
    registry: &Registry,
    component_names: &[S],
    resolver: &R,
) -> Result<()>
where
    R: PackageResolver + ?Sized,
    S: AsRef<str>,
{
    let mut packages = Vec::new();
    for name in component_names {
        let descriptor = registry.get(name.as_ref())?;
        packages.extend(descriptor.required_packages().iter().map(String::as_str));
    }

    let missing = find_unavailable_packages_with(resolver, packages);
    if missing.is_empty() {
        return Ok(());
    }

    trace_warn!(missing = ?missing, "pipeline requires packages that are not installed");
    Err(FrameworkError::missing_packages(missing))
}
