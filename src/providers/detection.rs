use crate::{
    config::ProviderConfig,
    error::SentinelError,
    provider::{LlmProvider, ProviderType},
};

use super::{
    azure_openai::AzureOpenAIProvider, gemini::GeminiProvider, ollama::OllamaProvider,
    openai::OpenAIProvider, vllm::VllmProvider,
};

/// Guess the backend kind from a base URL
///
/// # Detection Strategy
///
/// 1. **Host-based detection**:
///    - `*.openai.azure.com` → Azure OpenAI
///    - `generativelanguage.googleapis.com` → Gemini
///
/// 2. **Port-based detection**:
///    - Port 11434 → Ollama (its default listen port)
///
/// 3. **Default**: OpenAI-compatible (the common denominator for self-hosted servers)
///
/// vLLM speaks the same protocol as the default and is only selected explicitly.
///
/// # Examples
///
/// ```
/// use ai_sentinel::{detect_provider_type, ProviderType};
///
/// assert_eq!(
///     detect_provider_type("https://my-res.openai.azure.com"),
///     ProviderType::AzureOpenAI
/// );
/// assert_eq!(
///     detect_provider_type("http://localhost:11434"),
///     ProviderType::Ollama
/// );
/// assert_eq!(
///     detect_provider_type("http://localhost:8000/v1"),
///     ProviderType::OpenAI
/// );
/// ```
pub fn detect_provider_type(url: &str) -> ProviderType {
    let url = url.to_lowercase();
    if url.contains(".openai.azure.com") {
        return ProviderType::AzureOpenAI;
    }
    if url.contains("generativelanguage.googleapis.com") {
        return ProviderType::Gemini;
    }
    if url.contains(":11434") {
        return ProviderType::Ollama;
    }
    ProviderType::OpenAI
}

/// Construct the adapter described by `config`
///
/// All construction-time validation (credential, model, timeout, endpoint)
/// happens here, before any network traffic.
///
/// # Errors
///
/// `SentinelError::Configuration` when the adapter rejects its settings.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>, SentinelError> {
    let provider: Box<dyn LlmProvider> = match config.clone() {
        ProviderConfig::AzureOpenAI(c) => Box::new(AzureOpenAIProvider::new(c)?),
        ProviderConfig::Gemini(c) => Box::new(GeminiProvider::new(c)?),
        ProviderConfig::OpenAI(c) => Box::new(OpenAIProvider::new(c)?),
        ProviderConfig::Vllm(c) => Box::new(VllmProvider::new(c)?),
        ProviderConfig::Ollama(c) => Box::new(OllamaProvider::new(c)?),
    };
    log::debug!(
        "Created {} provider for model {}",
        provider.provider_name(),
        provider.describe().model
    );
    Ok(provider)
}
