use crate::{
    constants::client_defaults,
    error::SentinelError,
    models::{ChatMessage, ResponseFormat},
    response::LlmResponse,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

/// Provider-specific instructions for forcing machine-parseable output
///
/// Each backend accepts exactly one of these shapes; an adapter handed a
/// shape it does not understand rejects the request with
/// `SentinelError::InvalidInput`.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutputSpec {
    /// OpenAI chat-completions `response_format` (OpenAI-compatible, vLLM, Azure)
    ResponseFormat(ResponseFormat),
    /// Gemini `responseMimeType` + `responseSchema`; both are required together
    ResponseSchema { mime_type: String, schema: Value },
    /// Ollama `format` (JSON schema)
    Format(Value),
}

impl StructuredOutputSpec {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResponseFormat(_) => "response_format",
            Self::ResponseSchema { .. } => "response_schema",
            Self::Format(_) => "format",
        }
    }
}

/// Parameters for one generation call
///
/// # Example
///
/// ```ignore
/// let request = GenerateRequest::new("Is this toxic?")
///     .system_prompt("You are a moderator.")
///     .temperature(0.0);
/// let response = provider.generate(request).await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// Current user turn (must be non-empty)
    pub prompt: &'a str,

    /// Optional system instruction
    pub system_prompt: Option<&'a str>,

    /// Prior conversation turns, oldest first
    pub context: &'a [ChatMessage],

    /// Sampling temperature (None = backend default)
    pub temperature: Option<f32>,

    /// Constrained-output request; None = plain completion
    pub structured_output: Option<&'a StructuredOutputSpec>,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            system_prompt: None,
            context: &[],
            temperature: None,
            structured_output: None,
        }
    }

    pub fn system_prompt(mut self, system_prompt: &'a str) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }

    pub fn context(mut self, context: &'a [ChatMessage]) -> Self {
        self.context = context;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn structured_output(mut self, spec: &'a StructuredOutputSpec) -> Self {
        self.structured_output = Some(spec);
        self
    }

    /// Reject empty prompts before any network call
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.prompt.trim().is_empty() {
            return Err(SentinelError::InvalidInput(
                "Prompt must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }

    /// Message sequence: system instruction, context turns, then the prompt
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.context.len() + 2);
        if let Some(system) = self.system_prompt.filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(self.context.iter().cloned());
        messages.push(ChatMessage::user(self.prompt));
        messages
    }
}

/// Non-sensitive description of a configured client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub provider: String,
    pub model: String,
    pub timeout_secs: f64,
    pub extra_config: BTreeMap<String, String>,
}

/// Settings shared by every adapter, validated at construction
#[derive(Clone)]
pub struct ClientSettings {
    api_key: String,
    model: String,
    timeout_secs: f64,
    timeout: Duration,
}

impl ClientSettings {
    /// # Errors
    ///
    /// `SentinelError::Configuration` if the credential or model is empty, or
    /// the timeout is not strictly positive or too large for a `Duration`.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: f64,
    ) -> Result<Self, SentinelError> {
        let api_key = api_key.into();
        let model = model.into();
        require_non_empty("API key", &api_key)?;
        require_non_empty("Model", &model)?;
        if !(timeout_secs.is_finite() && timeout_secs > 0.0) {
            return Err(SentinelError::Configuration(format!(
                "Timeout must be positive, got {timeout_secs}"
            )));
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs).map_err(|e| {
            SentinelError::Configuration(format!("Invalid timeout {timeout_secs}: {e}"))
        })?;
        Ok(Self {
            api_key,
            model,
            timeout_secs,
            timeout,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout_secs(&self) -> f64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True when the credential is the placeholder used by keyless servers
    pub fn has_placeholder_key(&self) -> bool {
        self.api_key == client_defaults::PLACEHOLDER_API_KEY
    }

    pub(crate) fn info(&self, provider: &str, extra: &[(&str, &str)]) -> ClientInfo {
        ClientInfo {
            provider: provider.to_string(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            extra_config: extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Fail with a configuration error when `value` is empty
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), SentinelError> {
    if value.trim().is_empty() {
        return Err(SentinelError::Configuration(format!(
            "{field} must be a non-empty string"
        )));
    }
    Ok(())
}

/// LLM client capability interface
///
/// Every backend adapter implements this trait so callers (the toxicity
/// guard in particular) never depend on a concrete provider.
///
/// # Implementations
///
/// - `AzureOpenAIProvider` - Azure OpenAI deployments
/// - `GeminiProvider` - Google Gemini API
/// - `OpenAIProvider` - self-hosted OpenAI-compatible servers
/// - `VllmProvider` - vLLM OpenAI-compatible servers
/// - `OllamaProvider` - local Ollama runtime
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `request`
    ///
    /// Fails with `InvalidInput` for an empty prompt before touching the
    /// network. Backend errors are returned as generation failures and are
    /// never retried here.
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<LlmResponse, SentinelError>;

    /// Minimal read-only call against the backend
    ///
    /// Never fails: authentication or any other error is logged and
    /// reported as `false`.
    async fn validate_credentials(&self) -> bool;

    /// Stable identifier used to pick the structured-output shape
    fn provider_name(&self) -> &'static str;

    /// Provider, model, timeout and endpoint settings. Never includes credentials.
    fn describe(&self) -> ClientInfo;
}

/// Backend kinds selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    AzureOpenAI,
    Gemini,
    OpenAI,
    Vllm,
    Ollama,
}

impl ProviderType {
    /// Same string the adapter reports through `provider_name()`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureOpenAI => "azure_openai",
            Self::Gemini => "google_gemini",
            Self::OpenAI => "openai",
            Self::Vllm => "vllm",
            Self::Ollama => "ollama",
        }
    }

    pub fn all() -> [Self; 5] {
        [
            Self::AzureOpenAI,
            Self::Gemini,
            Self::OpenAI,
            Self::Vllm,
            Self::Ollama,
        ]
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = SentinelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure_openai" | "azure" => Ok(Self::AzureOpenAI),
            "google_gemini" | "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "vllm" => Ok(Self::Vllm),
            "ollama" => Ok(Self::Ollama),
            other => Err(SentinelError::Configuration(format!(
                "Unknown provider '{other}'. Valid values: azure_openai, google_gemini, openai, vllm, ollama"
            ))),
        }
    }
}
