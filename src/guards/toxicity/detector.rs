use crate::{
    blocking::run_blocking,
    constants::guard_defaults::{DEFAULT_BATCH_CONCURRENCY, JUDGE_TEMPERATURE},
    error::SentinelError,
    provider::{GenerateRequest, LlmProvider},
    response::LlmResponse,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;

use super::{prompts::SYSTEM_PROMPT, structured_output::StructuredOutputRegistry, ToxicityVerdict};

/// Verdict together with the envelope it was parsed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub verdict: ToxicityVerdict,
    pub response: LlmResponse,
}

/// LLM-as-judge toxicity guard
///
/// Holds exactly one client. Each assessment is a single judge call with no
/// retry; malformed or invalid judge output is returned as an error rather
/// than a guessed verdict.
///
/// # Example
///
/// ```ignore
/// let provider = create_provider(&config.provider)?;
/// let guard = ToxicityGuard::new(provider);
/// let verdict = guard.analyze("some user text").await?;
/// if verdict.is_toxic() {
///     // block or flag
/// }
/// ```
pub struct ToxicityGuard {
    client: Box<dyn LlmProvider>,
    system_prompt: String,
    registry: StructuredOutputRegistry,
    batch_concurrency: usize,
}

impl ToxicityGuard {
    pub fn new(client: Box<dyn LlmProvider>) -> Self {
        Self {
            client,
            system_prompt: SYSTEM_PROMPT.clone(),
            registry: StructuredOutputRegistry::default(),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Replace the moderation system instruction
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Replace the provider → structured-output mapping
    pub fn with_registry(mut self, registry: StructuredOutputRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Cap on judge calls in flight for `assess_all`; zero is treated as one
    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency.max(1);
        self
    }

    pub fn client(&self) -> &dyn LlmProvider {
        self.client.as_ref()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    /// Run one judge call and return the verdict with its envelope
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty text (no network call)
    /// - generation failures from the client, unchanged
    /// - `MalformedJudgeOutput` when the reply is not a JSON object
    /// - `VerdictValidation` when the object breaks verdict invariants
    pub async fn assess(&self, text: &str) -> Result<Assessment, SentinelError> {
        let provider = self.client.provider_name();
        let spec = self.registry.spec_for(provider);
        match &spec {
            Some(spec) => log::debug!("Using {} structured output for {provider}", spec.kind()),
            None => log::debug!("No structured-output shape for {provider}; relying on parsing"),
        }

        let mut request = GenerateRequest::new(text)
            .system_prompt(&self.system_prompt)
            .temperature(JUDGE_TEMPERATURE);
        if let Some(spec) = spec.as_ref() {
            request = request.structured_output(spec);
        }

        let response = self.client.generate(request).await?;
        let verdict = parse_verdict(response.content())?;
        log::info!(
            "Toxicity verdict from {provider}: is_toxic={} score={} confidence={:.2}",
            verdict.is_toxic(),
            verdict.score(),
            verdict.confidence()
        );
        Ok(Assessment { verdict, response })
    }

    /// Produce a verdict for `text`
    pub async fn analyze(&self, text: &str) -> Result<ToxicityVerdict, SentinelError> {
        self.assess(text).await.map(|a| a.verdict)
    }

    /// Blocking `analyze`; safe to call from inside an async runtime
    pub fn analyze_blocking(&self, text: &str) -> Result<ToxicityVerdict, SentinelError> {
        run_blocking(self.analyze(text))?
    }

    /// Assess each text independently with at most `concurrency` calls in flight
    ///
    /// Results come back in input order, one per text.
    pub async fn analyze_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        concurrency: usize,
    ) -> Vec<Result<Assessment, SentinelError>> {
        stream::iter(texts)
            .map(|text| self.assess(text.as_ref()))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// `analyze_batch` bounded by the guard's configured batch concurrency
    pub async fn assess_all<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Vec<Result<Assessment, SentinelError>> {
        self.analyze_batch(texts, self.batch_concurrency).await
    }
}

/// Parse judge content into a verdict, keeping the raw text on failure
fn parse_verdict(content: &str) -> Result<ToxicityVerdict, SentinelError> {
    let value: Value =
        serde_json::from_str(content.trim()).map_err(|e| SentinelError::MalformedJudgeOutput {
            message: format!("Judge reply is not valid JSON: {e}"),
            raw_content: content.to_string(),
        })?;
    if !value.is_object() {
        return Err(SentinelError::MalformedJudgeOutput {
            message: "Judge reply is not a JSON object".to_string(),
            raw_content: content.to_string(),
        });
    }
    ToxicityVerdict::from_json(&value).map_err(|source| SentinelError::VerdictValidation {
        source,
        raw_content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::toxicity::{ToxicityScore, VerdictError};

    #[test]
    fn test_parse_verdict_malformed() {
        let err = parse_verdict("not json at all").unwrap_err();
        match err {
            SentinelError::MalformedJudgeOutput { raw_content, .. } => {
                assert_eq!(raw_content, "not json at all")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_verdict_rejects_non_object() {
        assert!(matches!(
            parse_verdict("[1, 2]"),
            Err(SentinelError::MalformedJudgeOutput { .. })
        ));
    }

    #[test]
    fn test_parse_verdict_validation_error_keeps_source() {
        let err = parse_verdict(
            r#"{"is_toxic": true, "confidence": 1.5, "categories": [], "reason": "r"}"#,
        )
        .unwrap_err();
        match err {
            SentinelError::VerdictValidation { source, .. } => {
                assert_eq!(source, VerdictError::ConfidenceOutOfRange(1.5))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_verdict_tolerates_surrounding_whitespace() {
        let verdict = parse_verdict(
            "\n {\"is_toxic\": false, \"confidence\": 0.1, \"reason\": \"benign\"} \n",
        )
        .unwrap();
        assert_eq!(verdict.score(), ToxicityScore::Low);
    }
}
