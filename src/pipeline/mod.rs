//! Catalog validation, component construction, and pipeline execution.
//!
//! ## Submodules
//!
//! - [`validation`]: Rule-based checks over a whole [`Registry`](crate::Registry)
//! - [`errors`] / [`error_code`]: Structured catalog diagnostics
//! - [`builder`]: Cached creation and loading of component instances
//! - [`runner`]: Ordered pipeline assembly and message processing

pub mod builder;
pub mod error_code;
pub mod errors;
pub mod runner;
pub mod validation;

pub use builder::{CacheKey, CacheOrigin, ComponentBuilder};
pub use error_code::ErrorCode;
pub use errors::CatalogError;
pub use runner::{missing_properties, validate_pipeline_order, MissingProperty, Pipeline};
pub use validation::{
    Severity, ValidationDiagnostic, ValidationEngine, ValidationReport, ValidationRule,
};
