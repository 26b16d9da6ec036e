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

const PROVIDER_NAME: &str = "vllm";

/// Settings for a vLLM OpenAI-compatible server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VllmConfig {
    /// e.g. `http://localhost:8000/v1`
    pub api_base: String,
    pub model: String,
    #[serde(default = "placeholder_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl VllmConfig {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
            api_key: placeholder_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// vLLM provider; speaks the chat-completions protocol
pub struct VllmProvider {
    transport: ChatCompletionsTransport,
    settings: ClientSettings,
    api_base: String,
}

impl VllmProvider {
    pub fn new(config: VllmConfig) -> Result<Self, SentinelError> {
        let settings = ClientSettings::new(config.api_key, config.model, config.timeout_secs)?;
        let api_base = normalize_base_url("api_base", &config.api_base)?;
        Ok(Self {
            transport: ChatCompletionsTransport::new(PROVIDER_NAME, AuthScheme::Bearer),
            settings,
            api_base,
        })
    }
}

#[async_trait]
impl LlmProvider for VllmProvider {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError> {
        let url = join_url(&self.api_base, "chat/completions");
        self.transport.complete(&url, &self.settings, request).await
    }

    async fn validate_credentials(&self) -> bool {
        let url = join_url(&self.api_base, "models");
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
            .info(PROVIDER_NAME, &[("api_base", self.api_base.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vllm_provider_name() {
        let provider =
            VllmProvider::new(VllmConfig::new("http://localhost:8000/v1", "qwen")).unwrap();
        assert_eq!(provider.provider_name(), "vllm");
        assert_eq!(provider.describe().extra_config["api_base"], "http://localhost:8000/v1");
    }

    #[test]
    fn test_vllm_rejects_bad_timeout() {
        let mut config = VllmConfig::new("http://localhost:8000/v1", "qwen");
        config.timeout_secs = 0.0;
        assert!(matches!(
            VllmProvider::new(config),
            Err(SentinelError::Configuration(_))
        ));
    }
}
