//! Stable error codes shared by catalog findings.
//!
//! Codes serialize as `snake_case` strings and their `Display` output is the
//! same string, so `[unsatisfied_requirement] /components/ner_crf: ...` reads
//! identically in logs and in JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable category of a catalog finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Two descriptors share a name.
    DuplicateComponentName,
    /// A template references a name absent from the registry.
    UnknownTemplateComponent,
    /// A required tag is provided by no component in the catalog.
    UnsatisfiedRequirement,
    /// The reserved `all_components` template omits a component.
    IncompleteAllComponentsTemplate,
    /// The reserved `all_components` template is not declared at all.
    MissingAllComponentsTemplate,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateComponentName => "duplicate_component_name",
            Self::UnknownTemplateComponent => "unknown_template_component",
            Self::UnsatisfiedRequirement => "unsatisfied_requirement",
            Self::IncompleteAllComponentsTemplate => "incomplete_all_components_template",
            Self::MissingAllComponentsTemplate => "missing_all_components_template",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
