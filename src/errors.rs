//! Error types for rapid_nlu
//!
//! Hard failures that cross the crate boundary live here. Catalog validation
//! findings are reported separately (see [`crate::pipeline::errors`]) because
//! the validator collects them instead of failing.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// Main error type for rapid_nlu
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameworkError {
    /// A component name was requested that the registry does not know
    #[error(
        "Failed to find component '{name}'. Unknown component name. \
         Check your configured pipeline and make sure the component is not misspelled"
    )]
    UnknownComponent { name: String },

    /// A pipeline template name was requested that the registry does not know
    #[error("Unknown pipeline template '{name}'")]
    UnknownTemplate { name: String },

    /// Packages required by the configured pipeline cannot be resolved
    #[error(
        "Not all required packages are installed. To use this pipeline, \
         install the missing dependencies: {}",
        .packages.join(", ")
    )]
    MissingPackages { packages: Vec<String> },

    /// A component runs before anything in the pipeline provides its input
    #[error("Component '{component}' requires '{property}', which no earlier component provides")]
    MissingProperty { component: String, property: String },

    /// The external create/load entry point of a component failed
    #[error("Failed to construct component '{component}': {message}")]
    ComponentFailed { component: String, message: String },

    /// The component catalog violates one or more structural rules
    #[error("Component catalog is invalid ({count} problem(s)); first: {first}")]
    CatalogInvalid { count: usize, first: String },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Reading an input file failed
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl FrameworkError {
    /// Create an unknown component error
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::UnknownComponent { name: name.into() }
    }

    /// Create an unknown template error
    pub fn unknown_template(name: impl Into<String>) -> Self {
        Self::UnknownTemplate { name: name.into() }
    }

    /// Create a missing packages error; names are reported sorted
    pub fn missing_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut packages: Vec<String> = packages.into_iter().map(Into::into).collect();
        packages.sort();
        packages.dedup();
        Self::MissingPackages { packages }
    }

    /// Create a missing property error
    pub fn missing_property(component: impl Into<String>, property: impl Into<String>) -> Self {
        Self::MissingProperty {
            component: component.into(),
            property: property.into(),
        }
    }

    /// Create a component construction error
    pub fn component_failed(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ComponentFailed {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error means a requested name is absent from the registry
    pub fn is_unknown_component(&self) -> bool {
        matches!(self, Self::UnknownComponent { .. })
    }
}

impl From<serde_json::Error> for FrameworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for FrameworkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameworkError::unknown_component("my_made_up_component");
        assert!(err.to_string().contains("Unknown component name"));
        assert!(err.to_string().contains("my_made_up_component"));

        let err = FrameworkError::invalid_config("language must not be empty");
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(err.to_string().contains("language must not be empty"));
    }

    #[test]
    fn test_missing_packages_sorted_and_deduplicated() {
        let err = FrameworkError::missing_packages(["spacy", "mitie", "spacy"]);
        assert_eq!(
            err,
            FrameworkError::MissingPackages {
                packages: vec!["mitie".to_string(), "spacy".to_string()]
            }
        );
        assert!(err.to_string().ends_with("mitie, spacy"));
    }

    #[test]
    fn test_is_unknown_component() {
        assert!(FrameworkError::unknown_component("x").is_unknown_component());
        assert!(!FrameworkError::unknown_template("x").is_unknown_component());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: FrameworkError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, FrameworkError::Serialization { .. }));
    }
}
