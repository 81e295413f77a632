//! Built-in component catalog.
//!
//! Declares the standard NLU components (language-model loaders, tokenizers,
//! featurizers, entity extractors and intent classifiers) together with the
//! ready-made pipeline templates. The algorithms behind these names live in
//! backend crates; until a backend rebinds a descriptor with
//! [`ComponentDescriptor::with_factory`], its factory yields an
//! [`InertComponent`] that passes messages through unchanged.

use std::path::Path;
use std::sync::Arc;

use super::component::{Component, ComponentDescriptor, ComponentFactory};
use super::{Registry, RegistryBuilder, ALL_COMPONENTS};
use crate::errors::Result;
use crate::types::{Metadata, PipelineConfig};

// ─── Property tags ──────────────────────────────────────────────────────────

pub const SPACY_DOC: &str = "spacy_doc";
pub const SPACY_NLP: &str = "spacy_nlp";
pub const MITIE_FEATURE_EXTRACTOR: &str = "mitie_feature_extractor";
pub const TOKENS: &str = "tokens";
pub const TEXT_FEATURES: &str = "text_features";
pub const ENTITIES: &str = "entities";
pub const INTENT: &str = "intent";
pub const INTENT_RANKING: &str = "intent_ranking";

// ─── Inert backend ──────────────────────────────────────────────────────────

/// Pass-through instance bound to a catalog name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InertComponent {
    name: String,
}

impl InertComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Component for InertComponent {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory used by catalog entries that have no backend bound yet.
///
/// The instance it builds is named after the component it was declared
/// for; `create` and `load` never fail.
#[derive(Debug, Clone, Default)]
pub struct InertFactory {
    name: String,
}

impl InertFactory {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn instance(&self) -> Arc<dyn Component> {
        Arc::new(InertComponent::new(self.name.clone()))
    }
}

impl ComponentFactory for InertFactory {
    fn create(&self, _config: &PipelineConfig) -> Result<Arc<dyn Component>> {
        Ok(self.instance())
    }

    fn load(
        &self,
        _model_dir: &Path,
        _metadata: &Metadata,
        cached: Option<Arc<dyn Component>>,
    ) -> Result<Arc<dyn Component>> {
        Ok(cached.unwrap_or_else(|| self.instance()))
    }
}

fn declare(name: &str) -> ComponentDescriptor {
    ComponentDescriptor::new(name, Arc::new(InertFactory::named(name)))
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Descriptors of every built-in component, in declaration order.
pub fn builtin_components() -> Vec<ComponentDescriptor> {
    vec![
        // language models
        declare("nlp_spacy")
            .provides([SPACY_DOC, SPACY_NLP])
            .with_packages(["spacy"]),
        declare("nlp_mitie")
            .provides([MITIE_FEATURE_EXTRACTOR])
            .with_packages(["mitie"]),
        // entity extractors
        declare("ner_spacy")
            .requires([SPACY_NLP])
            .provides([ENTITIES])
            .with_packages(["spacy"]),
        declare("ner_mitie")
            .requires([TOKENS, MITIE_FEATURE_EXTRACTOR])
            .provides([ENTITIES])
            .with_packages(["mitie"]),
        declare("ner_crf")
            .requires([TOKENS])
            .provides([ENTITIES])
            .with_packages(["crfsuite"]),
        declare("ner_duckling")
            .provides([ENTITIES])
            .with_packages(["duckling"]),
        declare("ner_duckling_http").provides([ENTITIES]),
        declare("ner_synonyms").provides([ENTITIES]),
        // featurizers
        declare("intent_featurizer_spacy")
            .requires([SPACY_DOC])
            .provides([TEXT_FEATURES])
            .with_packages(["spacy"]),
        declare("intent_featurizer_mitie")
            .requires([TOKENS, MITIE_FEATURE_EXTRACTOR])
            .provides([TEXT_FEATURES])
            .with_packages(["mitie"]),
        declare("intent_featurizer_ngrams")
            .requires([SPACY_DOC])
            .provides([TEXT_FEATURES])
            .with_packages(["spacy"]),
        declare("intent_entity_featurizer_regex")
            .requires([TOKENS])
            .provides([TEXT_FEATURES]),
        declare("intent_featurizer_count_vectors")
            .requires([TOKENS])
            .provides([TEXT_FEATURES]),
        // tokenizers
        declare("tokenizer_mitie")
            .provides([TOKENS])
            .with_packages(["mitie"]),
        declare("tokenizer_spacy")
            .requires([SPACY_DOC])
            .provides([TOKENS])
            .with_packages(["spacy"]),
        declare("tokenizer_whitespace").provides([TOKENS]),
        declare("tokenizer_jieba")
            .provides([TOKENS])
            .with_packages(["jieba"]),
        // intent classifiers
        declare("intent_classifier_sklearn")
            .requires([TEXT_FEATURES])
            .provides([INTENT, INTENT_RANKING])
            .with_packages(["sklearn"]),
        declare("intent_classifier_mitie")
            .requires([TOKENS, MITIE_FEATURE_EXTRACTOR])
            .provides([INTENT])
            .with_packages(["mitie"]),
        declare("intent_classifier_keyword").provides([INTENT]),
        declare("intent_classifier_tensorflow_embedding")
            .requires([TEXT_FEATURES])
            .provides([INTENT, INTENT_RANKING])
            .with_packages(["tensorflow"]),
    ]
}

/// Add the built-in templates to a builder.
pub fn builtin_templates(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .template(
            "spacy_sklearn",
            [
                "nlp_spacy",
                "tokenizer_spacy",
                "intent_featurizer_spacy",
                "intent_entity_featurizer_regex",
                "ner_crf",
                "ner_synonyms",
                "intent_classifier_sklearn",
            ],
        )
        .template(
            "mitie",
            [
                "nlp_mitie",
                "tokenizer_mitie",
                "ner_mitie",
                "ner_synonyms",
                "intent_entity_featurizer_regex",
                "intent_classifier_mitie",
            ],
        )
        .template(
            "mitie_sklearn",
            [
                "nlp_mitie",
                "tokenizer_mitie",
                "ner_mitie",
                "ner_synonyms",
                "intent_entity_featurizer_regex",
                "intent_featurizer_mitie",
                "intent_classifier_sklearn",
            ],
        )
        .template("keyword", ["intent_classifier_keyword"])
        .template(
            "tensorflow_embedding",
            [
                "tokenizer_whitespace",
                "ner_crf",
                "intent_featurizer_count_vectors",
                "intent_classifier_tensorflow_embedding",
            ],
        )
        .template(
            ALL_COMPONENTS,
            [
                "nlp_spacy",
                "nlp_mitie",
                "tokenizer_whitespace",
                "tokenizer_jieba",
                "tokenizer_mitie",
                "tokenizer_spacy",
                "intent_featurizer_mitie",
                "intent_featurizer_spacy",
                "intent_featurizer_ngrams",
                "intent_entity_featurizer_regex",
                "intent_featurizer_count_vectors",
                "ner_mitie",
                "ner_crf",
                "ner_spacy",
                "ner_duckling",
                "ner_duckling_http",
                "ner_synonyms",
                "intent_classifier_keyword",
                "intent_classifier_sklearn",
                "intent_classifier_mitie",
                "intent_classifier_tensorflow_embedding",
            ],
        )
}

/// The standard registry: built-in components plus built-in templates.
pub fn builtin() -> Registry {
    let builder = builtin_components()
        .into_iter()
        .fold(Registry::builder(), RegistryBuilder::register);
    builtin_templates(builder).build()
}
