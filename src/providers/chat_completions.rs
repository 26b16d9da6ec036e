//! Chat-completions transport shared by the OpenAI-compatible adapters

use crate::{
    error::SentinelError,
    models::{ChatCompletionRequest, ChatCompletionResponse},
    provider::{ClientSettings, GenerateRequest, StructuredOutputSpec},
    response::{LlmResponse, TokenUsage},
};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};

use super::logging::{log_request, log_response};

/// How the credential is attached to requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>` (Azure)
    ApiKeyHeader,
}

pub(crate) struct ChatCompletionsTransport {
    client: Client,
    provider: &'static str,
    auth: AuthScheme,
}

impl ChatCompletionsTransport {
    pub(crate) fn new(provider: &'static str, auth: AuthScheme) -> Self {
        Self {
            client: Client::new(),
            provider,
            auth,
        }
    }

    fn authorize(&self, builder: RequestBuilder, settings: &ClientSettings) -> RequestBuilder {
        match self.auth {
            AuthScheme::Bearer => {
                log::debug!("Authorization header: Bearer [REDACTED]");
                builder.bearer_auth(settings.api_key())
            }
            AuthScheme::ApiKeyHeader => {
                log::debug!("api-key header: [REDACTED]");
                builder.header("api-key", settings.api_key())
            }
        }
    }

    /// POST a chat-completions request to `url` and map the reply
    pub(crate) async fn complete(
        &self,
        url: &str,
        settings: &ClientSettings,
        request: GenerateRequest<'_>,
    ) -> Result<LlmResponse, SentinelError> {
        request.validate()?;

        let response_format = match request.structured_output {
            None => None,
            Some(StructuredOutputSpec::ResponseFormat(format)) => Some(format.clone()),
            Some(other) => {
                return Err(SentinelError::InvalidInput(format!(
                    "{} expects a response_format structured-output spec, got {}",
                    self.provider,
                    other.kind()
                )))
            }
        };

        let body = ChatCompletionRequest {
            model: settings.model().to_string(),
            messages: request.messages(),
            temperature: request.temperature,
            response_format,
        };
        log_request(self.provider, &body);

        let started = Utc::now();
        let builder = self
            .client
            .post(url)
            .json(&body)
            .timeout(settings.timeout());
        let response = self.authorize(builder, settings).send().await?;
        let response_text = self.read_success_body(response).await?;
        log_response(self.provider, &response_text);

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                SentinelError::generation(self.provider, format!("Failed to parse response: {e}"))
            })?;

        self.to_envelope(parsed, settings, started)
    }

    fn to_envelope(
        &self,
        parsed: ChatCompletionResponse,
        settings: &ClientSettings,
        started: DateTime<Utc>,
    ) -> Result<LlmResponse, SentinelError> {
        let reported_start = parsed
            .created
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        let usage = parsed.usage.as_ref().and_then(|u| {
            TokenUsage::from_counts(u.prompt_tokens, u.completion_tokens, u.total_tokens)
        });
        let model = parsed
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| settings.model().to_string());

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SentinelError::generation(self.provider, "No choices in response"))?;
        let content = choice.message.content.ok_or_else(|| {
            SentinelError::generation(self.provider, "Response message has no content")
        })?;

        Ok(LlmResponse::new(content, model)
            .with_usage(usage)
            .with_finish_reason(choice.finish_reason)
            .with_latency_since(reported_start.or(Some(started))))
    }

    /// Turn non-2xx replies into errors, otherwise return the body text
    async fn read_success_body(&self, response: Response) -> Result<String, SentinelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }
        let error_body = response.text().await.unwrap_or_default();
        Err(status_error(self.provider, status, &error_body))
    }

    /// GET `url` and report whether the backend accepted the credential
    pub(crate) async fn probe(
        &self,
        url: &str,
        settings: &ClientSettings,
    ) -> Result<(), SentinelError> {
        let builder = self.client.get(url).timeout(settings.timeout());
        let response = self.authorize(builder, settings).send().await?;
        self.read_success_body(response).await.map(|_| ())
    }
}

/// Map an HTTP error status to the generation failure taxonomy
pub(crate) fn status_error(
    provider: &str,
    status: reqwest::StatusCode,
    error_body: &str,
) -> SentinelError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return SentinelError::AuthenticationFailed {
            provider: provider.to_string(),
            message: format!("Invalid or missing API key (HTTP {})", status.as_u16()),
        };
    }
    SentinelError::generation(
        provider,
        format!(
            "HTTP {} error: {}\nResponse from API: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error"),
            if error_body.is_empty() {
                "No details provided"
            } else {
                error_body
            }
        ),
    )
}

/// Log an absorbed credential-validation failure and return `false`
pub(crate) fn report_validation_failure(provider: &str, error: &SentinelError) -> bool {
    match error {
        SentinelError::AuthenticationFailed { .. } => {
            log::warn!("{provider}: API key is invalid: {error}")
        }
        _ => log::error!(
            "{provider}: unexpected error during credential validation: {error}"
        ),
    }
    false
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
