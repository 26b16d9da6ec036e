use crate::{
    error::SentinelError,
    provider::{ClientInfo, ClientSettings, GenerateRequest, LlmProvider},
    response::LlmResponse,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    chat_completions::{join_url, report_validation_failure, AuthScheme, ChatCompletionsTransport},
    default_timeout_secs, normalize_base_url, placeholder_api_key,
};

const PROVIDER_NAME: &str = "openai";

/// Settings for a self-hosted OpenAI-compatible server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Server root including the version segment, e.g. `http://localhost:8000/v1`
    pub base_url: String,
    pub model: String,
    #[serde(default = "placeholder_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl OpenAIConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: placeholder_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAIProvider {
    transport: ChatCompletionsTransport,
    settings: ClientSettings,
    base_url: String,
}

impl OpenAIProvider {
    /// # Errors
    ///
    /// `SentinelError::Configuration` for an empty model, empty credential,
    /// non-positive timeout or unparseable base URL.
    pub fn new(config: OpenAIConfig) -> Result<Self, SentinelError> {
        let settings = ClientSettings::new(config.api_key, config.model, config.timeout_secs)?;
        let base_url = normalize_base_url("base_url", &config.base_url)?;
        Ok(Self {
            transport: ChatCompletionsTransport::new(PROVIDER_NAME, AuthScheme::Bearer),
            settings,
            base_url,
        })
    }

    fn completions_url(&self) -> String {
        join_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError> {
        self.transport
            .complete(&self.completions_url(), &self.settings, request)
            .await
    }

    async fn validate_credentials(&self) -> bool {
        let url = join_url(&self.base_url, "models");
        match self.transport.probe(&url, &self.settings).await {
            Ok(()) => true,
            Err(e) => report_validation_failure(PROVIDER_NAME, &e),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn describe(&self) -> ClientInfo {
        self.settings
            .info(PROVIDER_NAME, &[("base_url", self.base_url.as_str())])
    }
}
