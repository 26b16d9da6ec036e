use crate::guards::toxicity::VerdictError;
use thiserror::Error;

/// Errors surfaced by the client layer, the guard and the CLI
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Invalid construction-time arguments (empty credential, bad timeout, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid call-time input, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend replied with an error or an unusable body
    #[error("Generation failed ({provider}): {message}")]
    GenerationFailed { provider: String, message: String },

    /// Backend rejected the credential during generation
    #[error("Authentication failed ({provider}): {message}")]
    AuthenticationFailed { provider: String, message: String },

    /// Transport-level failure talking to the backend
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Judge reply is not a JSON object
    #[error("Malformed judge output: {message}. Raw content: {raw_content}")]
    MalformedJudgeOutput {
        message: String,
        raw_content: String,
    },

    /// Judge reply parsed but violates the verdict invariants
    #[error("Verdict validation failed: {source}. Raw content: {raw_content}")]
    VerdictValidation {
        #[source]
        source: VerdictError,
        raw_content: String,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The isolated worker used by the blocking bridge could not be started
    #[error("Worker runtime error: {0}")]
    WorkerRuntime(String),
}

impl SentinelError {
    pub(crate) fn generation(provider: &str, message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::GenerationFailed { .. } | Self::Http(_) => "GENERATION_FAILED",
            Self::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            Self::MalformedJudgeOutput { .. } => "MALFORMED_JUDGE_OUTPUT",
            Self::VerdictValidation { .. } => "VERDICT_VALIDATION_FAILED",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::WorkerRuntime(_) => "WORKER_RUNTIME_ERROR",
        }
    }

    /// Process exit code used by the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::InvalidInput(_) => 2,
            Self::FileNotFound(_) => 3,
            Self::GenerationFailed { .. } | Self::Http(_) | Self::WorkerRuntime(_) => 4,
            Self::AuthenticationFailed { .. } => 5,
            Self::MalformedJudgeOutput { .. } | Self::VerdictValidation { .. } => 6,
        }
    }

    /// True for failures raised by the backend call itself
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed { .. } | Self::AuthenticationFailed { .. } | Self::Http(_)
        )
    }
}
