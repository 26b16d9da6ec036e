//! LLM-as-a-judge toxicity guard
//!
//! A provider-agnostic LLM client (Azure OpenAI, Gemini, OpenAI-compatible
//! servers, vLLM, Ollama) normalised into one response envelope, and a
//! toxicity guard that turns the judge's reply into a validated verdict.

pub mod blocking;
pub mod config;
pub mod constants;
mod error;
pub mod guards;
pub mod models;
mod output;
mod provider;
pub mod providers;
mod response;

pub use blocking::{run_blocking, BlockingLlmProvider};
pub use config::{load_config, load_config_file, ConfigOverrides, ProviderConfig, SentinelConfig};
pub use error::SentinelError;
pub use guards::toxicity::{
    Assessment, StructuredOutputRegistry, ToxicityCategory, ToxicityGuard, ToxicityScore,
    ToxicityVerdict, VerdictError,
};
pub use models::{ChatMessage, ResponseFormat, Role};
pub use output::{CliOutput, ErrorInfo, Metadata};
pub use provider::{
    ClientInfo, ClientSettings, GenerateRequest, LlmProvider, ProviderType, StructuredOutputSpec,
};
pub use providers::{
    create_provider, detect_provider_type, AzureOpenAIConfig, AzureOpenAIProvider, GeminiConfig,
    GeminiProvider, OllamaConfig, OllamaProvider, OpenAIConfig, OpenAIProvider, VllmConfig,
    VllmProvider,
};
pub use response::{LlmResponse, TokenUsage};

/// Build a guard (client plus optional custom system prompt) from configuration
pub fn build_guard(config: &SentinelConfig) -> Result<ToxicityGuard, SentinelError> {
    let client = create_provider(&config.provider)?;
    let guard = ToxicityGuard::new(client).with_batch_concurrency(config.batch_concurrency);
    Ok(match config.load_system_prompt()? {
        Some(prompt) => {
            log::debug!("Using custom system prompt from configuration");
            guard.with_system_prompt(prompt)
        }
        None => guard,
    })
}

/// Assess one text and wrap the outcome in a `CliOutput`
///
/// Every failure is returned as `Err`; rendering it is left to the caller.
pub async fn evaluate(config: &SentinelConfig, text: &str) -> Result<CliOutput, SentinelError> {
    let guard = build_guard(config)?;
    let assessment = guard.assess(text).await?;
    let metadata = Metadata::from_response(guard.client().provider_name(), &assessment.response);
    Ok(CliOutput::success(assessment.verdict, metadata))
}
