//! Canonical response envelope produced by every provider adapter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token accounting reported by a backend
///
/// Each counter is present only if the backend reported it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    /// Build usage from whatever subset of counters the backend returned.
    /// Returns `None` when nothing was reported.
    pub fn from_counts(
        prompt_tokens: Option<u64>,
        output_tokens: Option<u64>,
        total_tokens: Option<u64>,
    ) -> Option<Self> {
        if prompt_tokens.is_none() && output_tokens.is_none() && total_tokens.is_none() {
            return None;
        }
        Some(Self {
            prompt_tokens,
            output_tokens,
            total_tokens,
        })
    }
}

/// Response from an LLM provider
///
/// Built once by an adapter right after the vendor reply arrives; the
/// timestamp is fixed at construction and the value is never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    content: String,
    model: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<f64>,
}

impl LlmResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            timestamp: Utc::now(),
            usage: None,
            finish_reason: None,
            response_time_ms: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: Option<String>) -> Self {
        self.finish_reason = finish_reason;
        self
    }

    /// Set `response_time_ms` to the time elapsed between `started` and this
    /// envelope's timestamp. `None` leaves it unset; clock skew clamps to zero.
    pub fn with_latency_since(mut self, started: Option<DateTime<Utc>>) -> Self {
        self.response_time_ms = started.map(|start| {
            let elapsed = self.timestamp - start;
            elapsed
                .num_microseconds()
                .map(|us| us as f64 / 1_000.0)
                .unwrap_or_else(|| elapsed.num_milliseconds() as f64)
                .max(0.0)
        });
        self
    }

    /// Set `response_time_ms` from a duration the backend measured itself
    pub fn with_response_time_ms(mut self, response_time_ms: Option<f64>) -> Self {
        self.response_time_ms = response_time_ms.map(|ms| ms.max(0.0));
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn usage(&self) -> Option<&TokenUsage> {
        self.usage.as_ref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn response_time_ms(&self) -> Option<f64> {
        self.response_time_ms
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
