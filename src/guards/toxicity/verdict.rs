use crate::constants::guard_defaults::{HIGH_CONFIDENCE_THRESHOLD, LOW_CONFIDENCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error;

/// Reasons a judge reply cannot become a `ToxicityVerdict`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerdictError {
    #[error("confidence must be within [0.0, 1.0], got {0}")]
    ConfidenceOutOfRange(f64),

    #[error("unknown toxicity category '{0}'")]
    UnknownCategory(String),

    /// `categories` was neither a string nor a list of strings
    #[error("categories must be a string or a list of strings, got {0}")]
    InvalidCategoryValue(String),

    #[error("reason must be a non-empty string")]
    EmptyReason,

    /// Missing field or wrong JSON type
    #[error("verdict has the wrong shape: {0}")]
    Shape(String),
}

/// Fixed toxicity taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToxicityCategory {
    HateSpeech,
    Harassment,
    Threats,
    SexualContent,
    SelfHarm,
    Violence,
    Bullying,
    Discrimination,
}

impl ToxicityCategory {
    pub const ALL: [Self; 8] = [
        Self::HateSpeech,
        Self::Harassment,
        Self::Threats,
        Self::SexualContent,
        Self::SelfHarm,
        Self::Violence,
        Self::Bullying,
        Self::Discrimination,
    ];

    /// Wire name (`hate_speech`, `self_harm`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HateSpeech => "hate_speech",
            Self::Harassment => "harassment",
            Self::Threats => "threats",
            Self::SexualContent => "sexual_content",
            Self::SelfHarm => "self_harm",
            Self::Violence => "violence",
            Self::Bullying => "bullying",
            Self::Discrimination => "discrimination",
        }
    }

    /// One-line rubric shown to the judge
    pub fn description(&self) -> &'static str {
        match self {
            Self::HateSpeech => {
                "Attacks on or demeaning of people because of race, religion, gender, \
                 sexual orientation, nationality or another protected characteristic"
            }
            Self::Harassment => "Severe or repeated hostility aimed at a specific person",
            Self::Threats => "Explicit or implied threats of violence or other harm",
            Self::SexualContent => "Inappropriate sexual material, including non-consensual content",
            Self::SelfHarm => "Encouraging, promoting or explaining methods of self-injury or suicide",
            Self::Violence => "Glorifying, promoting or graphically describing violence",
            Self::Bullying => "Intimidating, humiliating or aggressive behaviour meant to hurt someone",
            Self::Discrimination => "Unfair treatment of, or prejudice against, particular groups",
        }
    }
}

impl fmt::Display for ToxicityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToxicityCategory {
    type Err = VerdictError;

    /// Case-insensitive match on the category name, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| VerdictError::UnknownCategory(token.to_string()))
    }
}

/// Severity label derived from confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityScore {
    Low,
    Medium,
    High,
}

impl ToxicityScore {
    /// `High` above 0.7, `Low` at or below 0.3, `Medium` in between
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > HIGH_CONFIDENCE_THRESHOLD {
            Self::High
        } else if confidence <= LOW_CONFIDENCE_THRESHOLD {
            Self::Low
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ToxicityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated toxicity judgment
///
/// Immutable once built. `score` is recomputed from `confidence` on every
/// construction path, so any `score` present in a judge reply is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVerdict")]
pub struct ToxicityVerdict {
    is_toxic: bool,
    confidence: f64,
    categories: BTreeSet<ToxicityCategory>,
    reason: String,
    score: ToxicityScore,
}

/// Judge reply as it arrives on the wire; `score` is deliberately not read
#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_toxic: bool,
    confidence: f64,
    #[serde(default)]
    categories: Option<Value>,
    reason: String,
}

impl TryFrom<RawVerdict> for ToxicityVerdict {
    type Error = VerdictError;

    fn try_from(raw: RawVerdict) -> Result<Self, Self::Error> {
        let categories = normalize_categories(raw.categories.as_ref())?;
        Self::new(raw.is_toxic, raw.confidence, categories, raw.reason)
    }
}

impl ToxicityVerdict {
    /// # Errors
    ///
    /// `ConfidenceOutOfRange` outside `[0.0, 1.0]` (NaN included),
    /// `EmptyReason` for a blank reason.
    pub fn new(
        is_toxic: bool,
        confidence: f64,
        categories: impl IntoIterator<Item = ToxicityCategory>,
        reason: impl Into<String>,
    ) -> Result<Self, VerdictError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(VerdictError::ConfidenceOutOfRange(confidence));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(VerdictError::EmptyReason);
        }
        Ok(Self {
            is_toxic,
            confidence,
            categories: categories.into_iter().collect(),
            reason,
            score: ToxicityScore::from_confidence(confidence),
        })
    }

    /// Build a verdict from a parsed judge reply
    pub fn from_json(value: &Value) -> Result<Self, VerdictError> {
        let raw = RawVerdict::deserialize(value).map_err(|e| VerdictError::Shape(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn is_toxic(&self) -> bool {
        self.is_toxic
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn categories(&self) -> &BTreeSet<ToxicityCategory> {
        &self.categories
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn score(&self) -> ToxicityScore {
        self.score
    }
}

/// Accept `null`, a single category string or a list of category strings
fn normalize_categories(value: Option<&Value>) -> Result<BTreeSet<ToxicityCategory>, VerdictError> {
    match value {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::String(token)) => Ok(BTreeSet::from([token.parse()?])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(token) => token.parse(),
                other => Err(VerdictError::InvalidCategoryValue(other.to_string())),
            })
            .collect(),
        Some(other) => Err(VerdictError::InvalidCategoryValue(other.to_string())),
    }
}
