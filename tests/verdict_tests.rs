// Verdict model: score derivation, category normalisation and wire round-trips

use ai_sentinel::{ToxicityCategory, ToxicityScore, ToxicityVerdict, VerdictError};
use serde_json::json;

#[test]
fn test_score_follows_confidence_bands() {
    let cases = [
        (0.0, ToxicityScore::Low),
        (0.15, ToxicityScore::Low),
        (0.3, ToxicityScore::Low),
        (0.300001, ToxicityScore::Medium),
        (0.5, ToxicityScore::Medium),
        (0.7, ToxicityScore::Medium),
        (0.700001, ToxicityScore::High),
        (1.0, ToxicityScore::High),
    ];
    for (confidence, expected) in cases {
        let verdict = ToxicityVerdict::new(confidence > 0.5, confidence, [], "r").unwrap();
        assert_eq!(verdict.score(), expected, "confidence {confidence}");
    }
}

#[test]
fn test_supplied_score_never_survives() {
    for (confidence, supplied) in [(0.1, "high"), (0.5, "low"), (0.9, "medium")] {
        let verdict = ToxicityVerdict::from_json(&json!({
            "is_toxic": true,
            "confidence": confidence,
            "categories": [],
            "reason": "r",
            "score": supplied
        }))
        .unwrap();
        assert_eq!(verdict.score(), ToxicityScore::from_confidence(confidence));
    }
}

#[test]
fn test_confidence_outside_unit_interval_fails() {
    for confidence in [1.5, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            ToxicityVerdict::new(true, confidence, [], "r"),
            Err(VerdictError::ConfidenceOutOfRange(_))
        ));
    }
}

#[test]
fn test_every_category_parses_case_insensitively() {
    for category in ToxicityCategory::ALL {
        let upper = category.as_str().to_uppercase();
        let verdict = ToxicityVerdict::from_json(&json!({
            "is_toxic": true,
            "confidence": 0.8,
            "categories": [upper],
            "reason": "r"
        }))
        .unwrap();
        assert!(verdict.categories().contains(&category));

        let single = ToxicityVerdict::from_json(&json!({
            "is_toxic": true,
            "confidence": 0.8,
            "categories": format!(" {} ", category.as_str()),
            "reason": "r"
        }))
        .unwrap();
        assert_eq!(single.categories().len(), 1);
        assert!(single.categories().contains(&category));
    }
}

#[test]
fn test_categories_null_missing_and_duplicates() {
    let missing = ToxicityVerdict::from_json(&json!({
        "is_toxic": false, "confidence": 0.0, "reason": "fine"
    }))
    .unwrap();
    assert!(missing.categories().is_empty());

    let null = ToxicityVerdict::from_json(&json!({
        "is_toxic": false, "confidence": 0.0, "categories": null, "reason": "fine"
    }))
    .unwrap();
    assert!(null.categories().is_empty());

    let duplicated = ToxicityVerdict::from_json(&json!({
        "is_toxic": true, "confidence": 0.6,
        "categories": ["threats", "Threats", "THREATS"], "reason": "r"
    }))
    .unwrap();
    assert_eq!(duplicated.categories().len(), 1);
}

#[test]
fn test_unknown_or_mistyped_categories_fail() {
    let unknown = ToxicityVerdict::from_json(&json!({
        "is_toxic": true, "confidence": 0.6, "categories": ["profanity"], "reason": "r"
    }));
    assert_eq!(
        unknown.unwrap_err(),
        VerdictError::UnknownCategory("profanity".to_string())
    );

    let numeric = ToxicityVerdict::from_json(&json!({
        "is_toxic": true, "confidence": 0.6, "categories": [1], "reason": "r"
    }));
    assert!(matches!(numeric, Err(VerdictError::InvalidCategoryValue(_))));

    let object = ToxicityVerdict::from_json(&json!({
        "is_toxic": true, "confidence": 0.6, "categories": {"a": 1}, "reason": "r"
    }));
    assert!(matches!(object, Err(VerdictError::InvalidCategoryValue(_))));
}

#[test]
fn test_shape_errors() {
    let missing_reason = ToxicityVerdict::from_json(&json!({
        "is_toxic": true, "confidence": 0.6
    }));
    assert!(matches!(missing_reason, Err(VerdictError::Shape(_))));

    let string_flag = ToxicityVerdict::from_json(&json!({
        "is_toxic": "yes", "confidence": 0.6, "reason": "r"
    }));
    assert!(matches!(string_flag, Err(VerdictError::Shape(_))));

    let blank_reason = ToxicityVerdict::from_json(&json!({
        "is_toxic": false, "confidence": 0.1, "reason": "   "
    }));
    assert_eq!(blank_reason.unwrap_err(), VerdictError::EmptyReason);
}

#[test]
fn test_round_trip_through_wire_format() {
    let original = ToxicityVerdict::from_json(&json!({
        "is_toxic": true,
        "confidence": 0.82,
        "categories": ["self_harm", "violence"],
        "reason": "describes methods of self-injury"
    }))
    .unwrap();

    let wire = serde_json::to_string(&original).unwrap();
    let reparsed: ToxicityVerdict = serde_json::from_str(&wire).unwrap();

    assert_eq!(reparsed, original);
    assert_eq!(reparsed.score(), ToxicityScore::High);
}

#[test]
fn test_serialized_form_uses_wire_names() {
    let verdict = ToxicityVerdict::new(
        true,
        0.4,
        [ToxicityCategory::SexualContent, ToxicityCategory::HateSpeech],
        "r",
    )
    .unwrap();
    let value = serde_json::to_value(&verdict).unwrap();

    assert_eq!(value["score"], "medium");
    assert_eq!(value["categories"], json!(["hate_speech", "sexual_content"]));
}

#[test]
fn test_deserialize_validates_like_constructor() {
    let result: Result<ToxicityVerdict, _> = serde_json::from_str(
        r#"{"is_toxic": false, "confidence": 2.0, "categories": [], "reason": "r"}"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_non_toxic_verdict_keeps_reported_categories() {
    let verdict = ToxicityVerdict::from_json(&json!({
        "is_toxic": false,
        "confidence": 0.25,
        "categories": ["violence"],
        "reason": "fictional battle description"
    }))
    .unwrap();
    assert!(!verdict.is_toxic());
    assert!(verdict.categories().contains(&ToxicityCategory::Violence));
}
