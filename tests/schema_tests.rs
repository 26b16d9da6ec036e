// Verdict schema checks against a JSON Schema validator

use ai_sentinel::guards::toxicity::{
    verdict_gemini_schema, verdict_json_schema, StructuredOutputRegistry,
};
use ai_sentinel::{ProviderType, StructuredOutputSpec, ToxicityCategory};
use serde_json::json;

fn validator() -> jsonschema::Validator {
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .build(&verdict_json_schema())
        .expect("verdict schema should be a valid Draft 7 schema")
}

#[test]
fn test_schema_accepts_wire_examples() {
    let validator = validator();
    let examples = [
        json!({
            "is_toxic": false,
            "confidence": 0.0,
            "categories": [],
            "reason": "respectful disagreement",
            "score": "low"
        }),
        json!({
            "is_toxic": true,
            "confidence": 0.95,
            "categories": ["hate_speech", "violence"],
            "reason": "dehumanising language",
            "score": "high"
        }),
    ];
    for example in &examples {
        assert!(validator.is_valid(example), "rejected {example}");
    }
}

#[test]
fn test_schema_rejects_invalid_replies() {
    let validator = validator();
    let invalid = [
        // confidence above 1
        json!({"is_toxic": true, "confidence": 1.5, "categories": [], "reason": "r", "score": "high"}),
        // unknown category
        json!({"is_toxic": true, "confidence": 0.9, "categories": ["spam"], "reason": "r", "score": "high"}),
        // missing score
        json!({"is_toxic": true, "confidence": 0.9, "categories": [], "reason": "r"}),
        // extra property
        json!({"is_toxic": false, "confidence": 0.1, "categories": [], "reason": "r", "score": "low", "note": "x"}),
    ];
    for instance in &invalid {
        assert!(!validator.is_valid(instance), "accepted {instance}");
    }
}

#[test]
fn test_schemas_list_every_category() {
    let names: Vec<&str> = ToxicityCategory::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        verdict_json_schema()["properties"]["categories"]["items"]["enum"],
        json!(names)
    );
    assert_eq!(
        verdict_gemini_schema()["properties"]["categories"]["items"]["enum"],
        json!(names)
    );
}

#[test]
fn test_default_registry_covers_every_builtin_provider() {
    let registry = StructuredOutputRegistry::default();
    for provider in ProviderType::all() {
        assert!(
            registry.spec_for(provider.as_str()).is_some(),
            "{provider} has no structured-output shape"
        );
    }
    assert!(matches!(
        registry.spec_for("ollama"),
        Some(StructuredOutputSpec::Format(_))
    ));
    assert!(registry.spec_for("bedrock").is_none());
}
