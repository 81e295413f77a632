//! # rapid_nlu
//!
//! Component registry and pipeline assembly for natural-language-understanding
//! pipelines.
//!
//! This library declares the processing components an NLU pipeline can be
//! built from, checks that the declarations are consistent, and builds or
//! restores component instances by name.
//!
//! ## Features
//!
//! - **Registry**: named component descriptors with required/provided
//!   properties, plus ready-made pipeline templates
//! - **Validation**: rule-based consistency checks over the whole catalog
//! - **Availability**: detection of optional packages that cannot be resolved
//! - **Requirements**: grouping of requirement lines by `#group` directives
//! - **Builder**: cached, thread-safe creation and loading of instances

/// Emit a `tracing` event when the `tracing` feature is enabled.
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

macro_rules! trace_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::info!($($arg)*);
    };
}

macro_rules! trace_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    };
}

pub mod errors;
pub mod packages;
pub mod pipeline;
pub mod registry;
pub mod requirements;
pub mod types;

// Re-export commonly used types
pub use errors::{FrameworkError, Result};
pub use types::{
    Fingerprint, Message, Metadata, PipelineConfig, PipelineSelection, Property, PropertySet,
};

// Re-export main functionality
pub use packages::{
    find_unavailable_packages, find_unavailable_packages_with, validate_requirements,
    PackageResolver, SystemResolver,
};
pub use pipeline::builder::ComponentBuilder;
pub use pipeline::error_code::ErrorCode;
pub use pipeline::errors::CatalogError;
pub use pipeline::runner::{validate_pipeline_order, Pipeline};
pub use pipeline::validation::{ValidationEngine, ValidationReport};
pub use registry::{
    Component, ComponentDescriptor, ComponentFactory, PipelineTemplate, Registry,
    RegistryBuilder, ALL_COMPONENTS,
};
pub use requirements::{group_requirements, read_requirement_groups, RequirementGroups};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
