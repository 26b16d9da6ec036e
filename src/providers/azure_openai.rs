use crate::{
    error::SentinelError,
    provider::{require_non_empty, ClientInfo, ClientSettings, GenerateRequest, LlmProvider},
    response::LlmResponse,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    chat_completions::{report_validation_failure, AuthScheme, ChatCompletionsTransport},
    default_timeout_secs, normalize_base_url,
};

const PROVIDER_NAME: &str = "azure_openai";

/// Settings for an Azure OpenAI deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureOpenAIConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub azure_endpoint: String,
    pub api_version: String,
    /// Deployment name
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl AzureOpenAIConfig {
    pub fn new(
        azure_endpoint: impl Into<String>,
        api_version: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            azure_endpoint: azure_endpoint.into(),
            api_version: api_version.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Azure OpenAI provider
///
/// The deployment is addressed by path, the API version by query string and
/// the credential travels in the `api-key` header.
pub struct AzureOpenAIProvider {
    transport: ChatCompletionsTransport,
    settings: ClientSettings,
    endpoint: String,
    api_version: String,
}

impl AzureOpenAIProvider {
    /// # Errors
    ///
    /// `SentinelError::Configuration` when the key, deployment, endpoint or
    /// API version is missing, or the timeout is not positive.
    pub fn new(config: AzureOpenAIConfig) -> Result<Self, SentinelError> {
        let settings = ClientSettings::new(config.api_key, config.model, config.timeout_secs)?;
        require_non_empty("Azure endpoint", &config.azure_endpoint)?;
        require_non_empty("API version", &config.api_version)?;
        let endpoint = normalize_base_url("azure_endpoint", &config.azure_endpoint)?;
        Ok(Self {
            transport: ChatCompletionsTransport::new(PROVIDER_NAME, AuthScheme::ApiKeyHeader),
            settings,
            endpoint,
            api_version: config.api_version.trim().to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint,
            self.settings.model(),
            self.api_version
        )
    }

    fn models_url(&self) -> String {
        format!(
            "{}/openai/models?api-version={}",
            self.endpoint, self.api_version
        )
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAIProvider {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError> {
        self.transport
            .complete(&self.completions_url(), &self.settings, request)
            .await
    }

    async fn validate_credentials(&self) -> bool {
        match self.transport.probe(&self.models_url(), &self.settings).await {
            Ok(()) => true,
            Err(e) => report_validation_failure(PROVIDER_NAME, &e),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn describe(&self) -> ClientInfo {
        self.settings.info(
            PROVIDER_NAME,
            &[
                ("azure_endpoint", self.endpoint.as_str()),
                ("api_version", self.api_version.as_str()),
            ],
        )
    }
}
