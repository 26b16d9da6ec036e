//! Provider name → structured-output spec mapping for the verdict schema

use crate::{
    constants::guard_defaults::VERDICT_SCHEMA_NAME,
    models::ResponseFormat,
    provider::{ProviderType, StructuredOutputSpec},
};
use serde_json::{json, Value};
use std::{collections::HashMap, fmt};

use super::verdict::{ToxicityCategory, ToxicityScore};

/// Builds a fresh spec for one provider
pub type SpecBuilder = Box<dyn Fn() -> StructuredOutputSpec + Send + Sync>;

const FIELD_ORDER: [&str; 5] = ["is_toxic", "confidence", "categories", "reason", "score"];

fn category_names() -> Vec<&'static str> {
    ToxicityCategory::ALL.iter().map(|c| c.as_str()).collect()
}

fn score_names() -> Vec<&'static str> {
    [ToxicityScore::Low, ToxicityScore::Medium, ToxicityScore::High]
        .iter()
        .map(|s| s.as_str())
        .collect()
}

/// Verdict schema in standard JSON Schema (Draft 7)
///
/// Every property is required and extra properties are forbidden, as OpenAI
/// strict mode demands.
pub fn verdict_json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "is_toxic": {"type": "boolean"},
            "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
            "categories": {
                "type": "array",
                "items": {"type": "string", "enum": category_names()}
            },
            "reason": {"type": "string"},
            "score": {"type": "string", "enum": score_names()}
        },
        "required": FIELD_ORDER,
        "additionalProperties": false
    })
}

/// Verdict schema in Gemini's OpenAPI subset (upper-case type names)
pub fn verdict_gemini_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_toxic": {"type": "BOOLEAN"},
            "confidence": {"type": "NUMBER", "minimum": 0.0, "maximum": 1.0},
            "categories": {
                "type": "ARRAY",
                "items": {"type": "STRING", "format": "enum", "enum": category_names()}
            },
            "reason": {"type": "STRING"},
            "score": {"type": "STRING", "format": "enum", "enum": score_names()}
        },
        "required": FIELD_ORDER,
        "propertyOrdering": FIELD_ORDER
    })
}

/// Extensible mapping from `provider_name()` to the spec shape that backend accepts
///
/// New backends are supported by registration rather than by branching in
/// the guard.
pub struct StructuredOutputRegistry {
    builders: HashMap<String, SpecBuilder>,
}

impl StructuredOutputRegistry {
    /// Registry without any provider
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Add or replace the builder for `provider`
    pub fn register<F>(&mut self, provider: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn() -> StructuredOutputSpec + Send + Sync + 'static,
    {
        self.builders.insert(provider.into(), Box::new(builder));
        self
    }

    /// `None` for providers without a registered shape (plain completion)
    pub fn spec_for(&self, provider: &str) -> Option<StructuredOutputSpec> {
        self.builders.get(provider).map(|build| build())
    }

    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for StructuredOutputRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let openai_family = || {
            StructuredOutputSpec::ResponseFormat(ResponseFormat::json_schema(
                VERDICT_SCHEMA_NAME,
                verdict_json_schema(),
                true,
            ))
        };
        registry
            .register(ProviderType::OpenAI.as_str(), openai_family)
            .register(ProviderType::AzureOpenAI.as_str(), openai_family)
            .register(ProviderType::Vllm.as_str(), openai_family)
            .register(ProviderType::Gemini.as_str(), || {
                StructuredOutputSpec::ResponseSchema {
                    mime_type: "application/json".to_string(),
                    schema: verdict_gemini_schema(),
                }
            })
            .register(ProviderType::Ollama.as_str(), || {
                StructuredOutputSpec::Format(verdict_json_schema())
            });
        registry
    }
}

impl fmt::Debug for StructuredOutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredOutputRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
