use crate::{
    constants::endpoints::OLLAMA_BASE_URL,
    error::SentinelError,
    models::{OllamaChatRequest, OllamaChatResponse, OllamaOptions},
    provider::{ClientInfo, ClientSettings, GenerateRequest, LlmProvider, StructuredOutputSpec},
    response::{LlmResponse, TokenUsage},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{
    chat_completions::{report_validation_failure, status_error},
    default_timeout_secs,
    logging::{log_request, log_response},
    normalize_base_url, placeholder_api_key,
};

const PROVIDER_NAME: &str = "ollama";

fn default_ollama_base_url() -> String {
    OLLAMA_BASE_URL.to_string()
}

/// Settings for a locally hosted Ollama runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub model: String,
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    #[serde(default = "placeholder_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: default_ollama_base_url(),
            api_key: placeholder_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Provider for Ollama's `/api/chat` endpoint (non-streaming)
pub struct OllamaProvider {
    client: Client,
    settings: ClientSettings,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Result<Self, SentinelError> {
        let settings = ClientSettings::new(config.api_key, config.model, config.timeout_secs)?;
        let base_url = normalize_base_url("base_url", &config.base_url)?;
        Ok(Self {
            client: Client::new(),
            settings,
            base_url,
        })
    }

    /// Local runtimes normally run keyless; only send a real credential
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.settings.has_placeholder_key() {
            return builder;
        }
        log::debug!("Authorization header: Bearer [REDACTED]");
        builder.bearer_auth(self.settings.api_key())
    }

    fn build_request(
        &self,
        request: &GenerateRequest<'_>,
    ) -> Result<OllamaChatRequest, SentinelError> {
        let format = match request.structured_output {
            None => None,
            Some(StructuredOutputSpec::Format(schema)) => Some(schema.clone()),
            Some(other) => {
                return Err(SentinelError::InvalidInput(format!(
                    "{PROVIDER_NAME} expects a format structured-output spec, got {}",
                    other.kind()
                )))
            }
        };
        Ok(OllamaChatRequest {
            model: self.settings.model().to_string(),
            messages: request.messages(),
            stream: false,
            format,
            options: request
                .temperature
                .map(|temperature| OllamaOptions { temperature }),
        })
    }

    fn to_envelope(
        &self,
        parsed: OllamaChatResponse,
        started: DateTime<Utc>,
    ) -> Result<LlmResponse, SentinelError> {
        let total = parsed
            .prompt_eval_count
            .zip(parsed.eval_count)
            .map(|(prompt, output)| prompt + output);
        let usage = TokenUsage::from_counts(parsed.prompt_eval_count, parsed.eval_count, total);
        let model = parsed
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.settings.model().to_string());
        let content = parsed.message.content.ok_or_else(|| {
            SentinelError::generation(PROVIDER_NAME, "Response message has no content")
        })?;

        let response = LlmResponse::new(content, model)
            .with_usage(usage)
            .with_finish_reason(parsed.done_reason);
        Ok(match parsed.total_duration {
            Some(ns) => response.with_response_time_ms(Some(ns as f64 / 1_000_000.0)),
            None => response.with_latency_since(Some(started)),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError> {
        request.validate()?;
        let body = self.build_request(&request)?;
        log_request(PROVIDER_NAME, &body);

        let started = Utc::now();
        let builder = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .timeout(self.settings.timeout());
        let response = self.authorize(builder).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER_NAME, status, &error_body));
        }

        let response_text = response.text().await?;
        log_response(PROVIDER_NAME, &response_text);

        let parsed: OllamaChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            SentinelError::generation(PROVIDER_NAME, format!("Failed to parse response: {e}"))
        })?;
        self.to_envelope(parsed, started)
    }

    async fn validate_credentials(&self) -> bool {
        let builder = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.settings.timeout());
        let result = match self.authorize(builder).send().await {
            Ok(response) if response.status().is_success() => return true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                status_error(PROVIDER_NAME, status, &body)
            }
            Err(e) => SentinelError::from(e),
        };
        report_validation_failure(PROVIDER_NAME, &result)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn describe(&self) -> ClientInfo {
        self.settings
            .info(PROVIDER_NAME, &[("base_url", self.base_url.as_str())])
    }
}
