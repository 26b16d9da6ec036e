//! Backend adapters implementing `LlmProvider`

pub mod azure_openai;
pub(crate) mod chat_completions;
pub mod detection;
pub mod gemini;
pub(crate) mod logging;
pub mod ollama;
pub mod openai;
pub mod vllm;

pub use azure_openai::{AzureOpenAIConfig, AzureOpenAIProvider};
pub use detection::{create_provider, detect_provider_type};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use vllm::{VllmConfig, VllmProvider};

use crate::{constants::client_defaults, error::SentinelError};

pub(crate) fn default_timeout_secs() -> f64 {
    client_defaults::DEFAULT_TIMEOUT_SECS
}

pub(crate) fn placeholder_api_key() -> String {
    client_defaults::PLACEHOLDER_API_KEY.to_string()
}

/// Validate a configured base URL and return it without a trailing slash
pub(crate) fn normalize_base_url(field: &str, url: &str) -> Result<String, SentinelError> {
    let trimmed = url.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed)
        .map_err(|e| SentinelError::Configuration(format!("Invalid {field} '{url}': {e}")))?;
    Ok(trimmed.to_string())
}
