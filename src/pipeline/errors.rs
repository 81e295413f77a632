//! Catalog findings.
//!
//! A [`CatalogError`] describes one structural problem in a registry: a
//! duplicated name, a template pointing at an unknown component, a
//! requirement nobody provides, or a gap in the `all_components` template.
//! Findings carry a stable [`ErrorCode`] for programmatic matching, a path
//! locating the problem in the catalog, a human-readable `message`, and an
//! optional `hint`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error_code::ErrorCode;

/// A structural problem found in a component catalog.
///
/// # Display format
///
/// ```text
/// [unsatisfied_requirement] /components/ner_crf: requires 'tokens', which no component provides
/// ```
///
/// # Paths
///
/// - `/components/<name>` for a descriptor
/// - `/templates/<template>/<index>` for a template entry
/// - `/templates/<template>` for a whole template
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {path}: {message}")]
pub struct CatalogError {
    /// Stable error code for programmatic matching.
    pub code: ErrorCode,

    /// Location of the problem in the catalog.
    pub path: String,

    /// Human-readable description of the problem.
    pub message: String,

    /// Optional suggestion for how to fix the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CatalogError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint suggesting how to fix the problem.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub(crate) fn component_path(name: &str) -> String {
    format!("/components/{name}")
}

pub(crate) fn template_path(template: &str) -> String {
    format!("/templates/{template}")
}

pub(crate) fn template_entry_path(template: &str, index: usize) -> String {
    format!("/templates/{template}/{index}")
}
