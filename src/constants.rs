//! Shared defaults

/// Client defaults shared by every adapter
pub mod client_defaults {
    /// Request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

    /// Placeholder credential for servers that do not check keys
    pub const PLACEHOLDER_API_KEY: &str = "EMPTY";

    /// Maximum number of response-body characters written to debug logs
    pub const MAX_LOGGED_BODY_CHARS: usize = 2_000;
}

/// Default endpoints per backend
pub mod endpoints {
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
}

/// Toxicity guard defaults
pub mod guard_defaults {
    /// Judge sampling temperature (deterministic classification)
    pub const JUDGE_TEMPERATURE: f32 = 0.0;

    /// Confidence strictly above this is HIGH
    pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

    /// Confidence at or below this is LOW
    pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

    /// Outstanding judge calls in `analyze_batch` when unset
    pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

    /// Name given to the verdict schema in structured-output requests
    pub const VERDICT_SCHEMA_NAME: &str = "toxicity_verdict";
}
