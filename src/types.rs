//! Core types for rapid_nlu
//!
//! This module defines the data passed between the registry, the builder and
//! the pipeline runner: property tags, configuration fingerprints, pipeline
//! configuration, persisted-model metadata, and the message that flows
//! through a pipeline.

use crate::errors::{FrameworkError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Property tags
// ============================================================================

/// A property tag that components require from, or add to, the processing
/// context (e.g. `"tokens"`, `"text_features"`).
///
/// Tags are cheap to clone and compare by string content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Property(Arc<str>);

impl Property {
    pub fn new(tag: &str) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Property {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Property {
    fn from(tag: String) -> Self {
        Self(tag.into())
    }
}

impl Borrow<str> for Property {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique, ordered set of property tags.
pub type PropertySet = BTreeSet<Property>;

// ============================================================================
// Fingerprint
// ============================================================================

/// Deterministic, canonical rendering of a configuration value.
///
/// The value is converted to a JSON tree first, so object keys come out
/// sorted and two structurally equal values always produce the same
/// fingerprint, regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint any serializable value
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let tree = serde_json::to_value(value)?;
        Ok(Self(serde_json::to_string(&tree)?))
    }

    /// Wrap an already canonical key (e.g. one chosen by a component factory)
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Which components a pipeline consists of.
///
/// In JSON this is either a template name (`"pipeline": "spacy_sklearn"`)
/// or an explicit ordered list (`"pipeline": ["tokenizer_whitespace", ...]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineSelection {
    Template(String),
    Components(Vec<String>),
}

impl Default for PipelineSelection {
    fn default() -> Self {
        Self::Components(Vec::new())
    }
}

/// Configuration handed to component factories and used to select a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Language code of the training data / model (e.g. "en", "de")
    #[serde(default = "default_language")]
    pub language: String,
    /// Template name or explicit component list
    #[serde(default)]
    pub pipeline: PipelineSelection,
    /// Reuse component instances with identical (name, configuration)
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    /// Component parameters not known to the framework itself
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

#[derive(Serialize)]
struct ComponentKey<'a> {
    language: &'a str,
    settings: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct ConfigKey<'a> {
    #[serde(flatten)]
    component: ComponentKey<'a>,
    pipeline: &'a PipelineSelection,
    use_cache: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_use_cache() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            pipeline: PipelineSelection::default(),
            use_cache: default_use_cache(),
            settings: Map::new(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(FrameworkError::invalid_config("language must not be empty"));
        }

        match &self.pipeline {
            PipelineSelection::Template(name) if name.trim().is_empty() => {
                return Err(FrameworkError::invalid_config(
                    "pipeline template name must not be empty",
                ));
            }
            PipelineSelection::Components(names) => {
                if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
                    return Err(FrameworkError::invalid_config(format!(
                        "pipeline entry {pos} has an empty component name"
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Canonical fingerprint of the whole configuration.
    ///
    /// Settings are nested under their own key, so a setting named like a
    /// top-level field never masks that field.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Fingerprint::of(&ConfigKey {
            component: self.component_key(),
            pipeline: &self.pipeline,
            use_cache: self.use_cache,
        })
    }

    /// Fingerprint of what a component instance is built from: language and
    /// settings. The pipeline selection and the cache flag are left out, so
    /// pipelines sharing a component with identical settings share the
    /// instance.
    pub fn component_fingerprint(&self) -> Result<Fingerprint> {
        Fingerprint::of(&self.component_key())
    }

    fn component_key(&self) -> ComponentKey<'_> {
        ComponentKey {
            language: &self.language,
            settings: &self.settings,
        }
    }

    /// Look up a component parameter
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Builder method: set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Builder method: use a named pipeline template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.pipeline = PipelineSelection::Template(template.into());
        self
    }

    /// Builder method: use an explicit component list
    pub fn with_pipeline<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pipeline = PipelineSelection::Components(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method: set a component parameter
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Builder method: enable or disable instance caching
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Metadata of a persisted model, handed through unchanged to component
/// loaders. The framework only reads it for convenience accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub model_dir: Option<PathBuf>,
}

impl Metadata {
    pub fn new(data: Map<String, Value>, model_dir: Option<PathBuf>) -> Self {
        Self { data, model_dir }
    }

    /// Placeholder metadata with no entries and no model directory
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn model_dir(&self) -> Option<&Path> {
        self.model_dir.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.get("language").and_then(Value::as_str)
    }

    /// Names of the persisted pipeline's components, in order.
    ///
    /// Entries may be plain names or objects carrying a `"name"` field.
    pub fn component_names(&self) -> Vec<String> {
        let Some(Value::Array(entries)) = self.get("pipeline") else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// Message
// ============================================================================

/// The shared processing context a pipeline threads through its components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    pub fn has(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_set_semantics() {
        let mut set = PropertySet::new();
        set.insert(Property::from("tokens"));
        set.insert(Property::from("tokens".to_string()));
        set.insert(Property::from("entities"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("tokens"));
        assert!(!set.contains("intent"));
    }

    #[test]
    fn test_fingerprint_ignores_construction_order() {
        let a = PipelineConfig::new()
            .with_setting("max_ngrams", 3)
            .with_setting("epochs", 300);
        let b = PipelineConfig::new()
            .with_setting("epochs", 300)
            .with_setting("max_ngrams", 3);

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_distinguishes_values() {
        let a = PipelineConfig::new().with_language("en");
        let b = PipelineConfig::new().with_language("de");
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_setting_named_like_a_field_keeps_fingerprints_apart() {
        let de = PipelineConfig::new().with_language("de");
        let en_with_setting = PipelineConfig::new()
            .with_language("en")
            .with_setting("language", "de");
        assert_ne!(de, en_with_setting);
        assert_ne!(de.fingerprint().unwrap(), en_with_setting.fingerprint().unwrap());
        assert_ne!(
            de.component_fingerprint().unwrap(),
            en_with_setting.component_fingerprint().unwrap()
        );

        let cached = PipelineConfig::new().with_setting("use_cache", false);
        assert_ne!(
            PipelineConfig::new().with_cache(false).fingerprint().unwrap(),
            cached.fingerprint().unwrap()
        );
    }

    #[test]
    fn test_component_fingerprint_ignores_pipeline_selection() {
        let a = PipelineConfig::new()
            .with_template("spacy_sklearn")
            .with_setting("epochs", 300);
        let b = PipelineConfig::new()
            .with_template("mitie")
            .with_setting("epochs", 300)
            .with_cache(false);

        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.component_fingerprint().unwrap(), b.component_fingerprint().unwrap());
        assert_ne!(
            a.component_fingerprint().unwrap(),
            a.clone().with_language("de").component_fingerprint().unwrap()
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.language, "en");
        assert!(config.use_cache);
        assert_eq!(config.pipeline, PipelineSelection::Components(Vec::new()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_template() {
        let config = PipelineConfig::from_json_str(
            r#"{ "language": "de", "pipeline": "spacy_sklearn", "max_ngrams": 2 }"#,
        )
        .unwrap();
        assert_eq!(config.language, "de");
        assert_eq!(
            config.pipeline,
            PipelineSelection::Template("spacy_sklearn".to_string())
        );
        assert_eq!(config.setting("max_ngrams"), Some(&Value::from(2)));
    }

    #[test]
    fn test_config_from_json_component_list() {
        let config = PipelineConfig::from_json_str(
            r#"{ "pipeline": ["tokenizer_whitespace", "intent_classifier_keyword"] }"#,
        )
        .unwrap();
        assert_eq!(
            config.pipeline,
            PipelineSelection::Components(vec![
                "tokenizer_whitespace".to_string(),
                "intent_classifier_keyword".to_string()
            ])
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(PipelineConfig::new().with_language("").validate().is_err());
        assert!(PipelineConfig::new().with_template(" ").validate().is_err());
        assert!(PipelineConfig::new()
            .with_pipeline(["tokenizer_whitespace", ""])
            .validate()
            .is_err());
        assert!(PipelineConfig::from_json_str(r#"{ "language": "" }"#).is_err());
    }

    #[test]
    fn test_metadata_accessors() {
        let data = serde_json::json!({
            "language": "en",
            "pipeline": [
                "tokenizer_whitespace",
                { "name": "intent_classifier_keyword", "class": "KeywordIntentClassifier" },
                42
            ]
        });
        let Value::Object(map) = data else { unreachable!() };
        let metadata = Metadata::new(map, Some(PathBuf::from("/models/default")));

        assert_eq!(metadata.language(), Some("en"));
        assert_eq!(
            metadata.component_names(),
            vec!["tokenizer_whitespace", "intent_classifier_keyword"]
        );
        assert_eq!(metadata.model_dir(), Some(Path::new("/models/default")));
        assert!(Metadata::empty().component_names().is_empty());
    }

    #[test]
    fn test_message_properties() {
        let mut message = Message::new("hello there");
        assert!(!message.has("intent"));
        message.set("intent", "greet");
        assert_eq!(message.get("intent"), Some(&Value::from("greet")));
    }
}
