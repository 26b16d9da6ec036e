use crate::{
    constants::{client_defaults::PLACEHOLDER_API_KEY, guard_defaults::DEFAULT_BATCH_CONCURRENCY},
    error::SentinelError,
    provider::ProviderType,
    providers::{
        detect_provider_type, AzureOpenAIConfig, GeminiConfig, OllamaConfig, OpenAIConfig,
        VllmConfig,
    },
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Prefix of environment variables that override file values (`__` separates nesting)
pub const ENV_PREFIX: &str = "SENTINEL_";

/// Backend selection plus that backend's settings
///
/// Tagged by `type`:
///
/// ```toml
/// [provider]
/// type = "ollama"
/// model = "llama3.1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "azure_openai", alias = "azure")]
    AzureOpenAI(AzureOpenAIConfig),
    #[serde(rename = "google_gemini", alias = "gemini")]
    Gemini(GeminiConfig),
    #[serde(rename = "openai")]
    OpenAI(OpenAIConfig),
    #[serde(rename = "vllm")]
    Vllm(VllmConfig),
    #[serde(rename = "ollama")]
    Ollama(OllamaConfig),
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::AzureOpenAI(_) => ProviderType::AzureOpenAI,
            Self::Gemini(_) => ProviderType::Gemini,
            Self::OpenAI(_) => ProviderType::OpenAI,
            Self::Vllm(_) => ProviderType::Vllm,
            Self::Ollama(_) => ProviderType::Ollama,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::AzureOpenAI(c) => &c.model,
            Self::Gemini(c) => &c.model,
            Self::OpenAI(c) => &c.model,
            Self::Vllm(c) => &c.model,
            Self::Ollama(c) => &c.model,
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            Self::AzureOpenAI(c) => &c.api_key,
            Self::Gemini(c) => &c.api_key,
            Self::OpenAI(c) => &c.api_key,
            Self::Vllm(c) => &c.api_key,
            Self::Ollama(c) => &c.api_key,
        }
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        match self {
            Self::AzureOpenAI(c) => c.api_key = api_key,
            Self::Gemini(c) => c.api_key = api_key,
            Self::OpenAI(c) => c.api_key = api_key,
            Self::Vllm(c) => c.api_key = api_key,
            Self::Ollama(c) => c.api_key = api_key,
        }
    }
}

/// Name of the endpoint field for each backend's config table
fn endpoint_field(provider: ProviderType) -> &'static str {
    match provider {
        ProviderType::AzureOpenAI => "azure_endpoint",
        ProviderType::Vllm => "api_base",
        ProviderType::Gemini | ProviderType::OpenAI | ProviderType::Ollama => "base_url",
    }
}

fn default_batch_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

/// Complete configuration for a guard instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelConfig {
    pub provider: ProviderConfig,

    /// Environment variable holding the credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_name: Option<String>,

    /// Replacement moderation system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,

    /// Judge calls in flight for `ToxicityGuard::assess_all`
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl SentinelConfig {
    /// Read the credential from `api_key_name` when the provider has no key
    ///
    /// A key already present in the provider table (anything other than empty
    /// or the `EMPTY` placeholder) wins and the variable is not consulted.
    ///
    /// # Errors
    ///
    /// `SentinelError::Configuration` if the named variable is needed but
    /// unset or empty.
    pub fn resolve_credentials(&mut self) -> Result<(), SentinelError> {
        let Some(name) = self.api_key_name.as_deref() else {
            return Ok(());
        };
        let current = self.provider.api_key().trim();
        if !current.is_empty() && current != PLACEHOLDER_API_KEY {
            log::debug!("Provider api_key is set; not reading {name}");
            return Ok(());
        }
        let value = std::env::var(name).map_err(|_| {
            SentinelError::Configuration(format!(
                "Environment variable '{name}' (api_key_name) is not set"
            ))
        })?;
        if value.trim().is_empty() {
            return Err(SentinelError::Configuration(format!(
                "Environment variable '{name}' (api_key_name) is empty"
            )));
        }
        log::debug!("API key loaded from environment variable {name}");
        self.provider.set_api_key(value);
        Ok(())
    }

    /// Contents of `system_prompt_file`, if configured
    pub fn load_system_prompt(&self) -> Result<Option<String>, SentinelError> {
        let Some(path) = self.system_prompt_file.as_ref() else {
            return Ok(None);
        };
        let prompt = fs::read_to_string(path).map_err(|e| {
            SentinelError::FileNotFound(format!(
                "Failed to read system prompt file '{}': {e}",
                path.display()
            ))
        })?;
        if prompt.trim().is_empty() {
            return Err(SentinelError::Configuration(format!(
                "System prompt file '{}' is empty",
                path.display()
            )));
        }
        Ok(Some(prompt))
    }
}

/// Values that take priority over the config file and environment (CLI flags)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
    /// Mapped onto the endpoint field of the selected backend
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_key_name: Option<String>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<f64>,
    pub system_prompt_file: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Nested document merged on top of the file layers
    fn to_document(&self, provider: ProviderType) -> Value {
        let mut table = Map::new();
        table.insert("type".to_string(), Value::from(provider.as_str()));
        if let Some(model) = &self.model {
            table.insert("model".to_string(), Value::from(model.as_str()));
        }
        if let Some(url) = &self.base_url {
            table.insert(endpoint_field(provider).to_string(), Value::from(url.as_str()));
        }
        if let Some(api_key) = &self.api_key {
            table.insert("api_key".to_string(), Value::from(api_key.as_str()));
        }
        if let Some(api_version) = &self.api_version {
            table.insert("api_version".to_string(), Value::from(api_version.as_str()));
        }
        if let Some(timeout) = self.timeout_secs {
            table.insert("timeout_secs".to_string(), Value::from(timeout));
        }

        let mut document = Map::new();
        document.insert("provider".to_string(), Value::Object(table));
        if let Some(name) = &self.api_key_name {
            document.insert("api_key_name".to_string(), Value::from(name.as_str()));
        }
        if let Some(path) = &self.system_prompt_file {
            document.insert(
                "system_prompt_file".to_string(),
                Value::from(path.display().to_string()),
            );
        }
        Value::Object(document)
    }
}

fn file_layer(path: &Path) -> Result<Figment, SentinelError> {
    if !path.exists() {
        return Err(SentinelError::FileNotFound(format!(
            "Config file '{}' does not exist",
            path.display()
        )));
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(SentinelError::Configuration(
            "Config file must have .json or .toml extension".to_string(),
        )),
    }
}

/// Merge config file < `SENTINEL_*` environment < `overrides`, then resolve credentials
///
/// The backend type comes from the overrides, else the file, else is
/// inferred from the override base URL.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<SentinelConfig, SentinelError> {
    let mut figment = match path {
        Some(path) => file_layer(path)?,
        None => Figment::new(),
    };
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let provider = match overrides.provider {
        Some(provider) => Some(provider),
        None => match figment.extract_inner::<String>("provider.type") {
            Ok(name) => Some(name.parse::<ProviderType>()?),
            Err(_) => overrides.base_url.as_deref().map(detect_provider_type),
        },
    };
    let Some(provider) = provider else {
        return Err(SentinelError::Configuration(
            "No provider configured: set provider.type in the config file, --provider, or --base-url"
                .to_string(),
        ));
    };
    log::debug!("Using provider type {provider}");

    let mut config: SentinelConfig = figment
        .merge(Serialized::defaults(overrides.to_document(provider)))
        .extract()
        .map_err(|e| SentinelError::Configuration(format!("Failed to load configuration: {e}")))?;

    // A key given directly beats one named indirectly in a lower layer
    if overrides.api_key.is_some() && overrides.api_key_name.is_none() {
        config.api_key_name = None;
    }
    if config.batch_concurrency == 0 {
        return Err(SentinelError::Configuration(
            "batch_concurrency must be at least 1".to_string(),
        ));
    }
    config.resolve_credentials()?;
    Ok(config)
}

/// Load a config file (JSON or TOML by extension) with environment overrides
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<SentinelConfig, SentinelError> {
    load_config(Some(path.as_ref()), &ConfigOverrides::default())
}
