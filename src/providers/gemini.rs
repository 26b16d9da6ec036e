use crate::{
    constants::endpoints::GEMINI_BASE_URL,
    error::SentinelError,
    models::{
        ChatMessage, GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest,
        GeminiResponse, Role,
    },
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
    normalize_base_url,
};

const PROVIDER_NAME: &str = "google_gemini";

fn default_gemini_base_url() -> String {
    GEMINI_BASE_URL.to_string()
}

/// Settings for the Google Gemini API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    client: Client,
    settings: ClientSettings,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, SentinelError> {
        let model = config
            .model
            .trim()
            .trim_start_matches("models/")
            .to_string();
        let settings = ClientSettings::new(config.api_key, model, config.timeout_secs)?;
        let base_url = normalize_base_url("base_url", &config.base_url)?;
        Ok(Self {
            client: Client::new(),
            settings,
            base_url,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.settings.model()
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        log::debug!("x-goog-api-key header: [REDACTED]");
        builder.header("x-goog-api-key", self.settings.api_key())
    }

    fn build_request(&self, request: &GenerateRequest<'_>) -> Result<GeminiRequest, SentinelError> {
        let (response_mime_type, response_schema) = match request.structured_output {
            None => (None, None),
            Some(StructuredOutputSpec::ResponseSchema { mime_type, schema }) => {
                if mime_type.trim().is_empty() {
                    return Err(SentinelError::InvalidInput(
                        "Gemini structured output needs both a mime type and a schema".to_string(),
                    ));
                }
                (Some(mime_type.clone()), Some(schema.clone()))
            }
            Some(other) => {
                return Err(SentinelError::InvalidInput(format!(
                    "{PROVIDER_NAME} expects a response_schema structured-output spec, got {}",
                    other.kind()
                )))
            }
        };

        let generation_config = if request.temperature.is_none() && response_mime_type.is_none() {
            None
        } else {
            Some(GeminiGenerationConfig {
                temperature: request.temperature,
                response_mime_type,
                response_schema,
            })
        };

        let mut contents: Vec<GeminiContent> =
            request.context.iter().map(to_gemini_content).collect();
        contents.push(to_gemini_content(&ChatMessage::user(request.prompt)));

        Ok(GeminiRequest {
            contents,
            system_instruction: request
                .system_prompt
                .filter(|s| !s.is_empty())
                .map(|s| GeminiContent {
                    role: None,
                    parts: vec![GeminiPart {
                        text: Some(s.to_string()),
                    }],
                }),
            generation_config,
        })
    }

    fn to_envelope(
        &self,
        parsed: GeminiResponse,
        started: DateTime<Utc>,
    ) -> Result<LlmResponse, SentinelError> {
        let reported_start = parsed
            .create_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));
        let usage = parsed.usage_metadata.as_ref().and_then(|u| {
            TokenUsage::from_counts(
                u.prompt_token_count,
                u.candidates_token_count,
                u.total_token_count,
            )
        });
        let model = parsed
            .model_version
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.settings.model().to_string());

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SentinelError::generation(PROVIDER_NAME, "No candidates in response"))?;
        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if texts.is_empty() {
            return Err(SentinelError::generation(
                PROVIDER_NAME,
                format!(
                    "Candidate has no text content (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        Ok(LlmResponse::new(texts.concat(), model)
            .with_usage(usage)
            .with_finish_reason(candidate.finish_reason)
            .with_latency_since(reported_start.or(Some(started))))
    }
}

fn to_gemini_content(message: &ChatMessage) -> GeminiContent {
    let role = match message.role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    };
    GeminiContent {
        role: Some(role.to_string()),
        parts: vec![GeminiPart {
            text: Some(message.content.clone()),
        }],
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError> {
        request.validate()?;
        let body = self.build_request(&request)?;
        log_request(PROVIDER_NAME, &body);

        let started = Utc::now();
        let builder = self
            .client
            .post(self.generate_url())
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

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            SentinelError::generation(PROVIDER_NAME, format!("Failed to parse response: {e}"))
        })?;
        self.to_envelope(parsed, started)
    }

    async fn validate_credentials(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let builder = self.client.get(url).timeout(self.settings.timeout());
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
