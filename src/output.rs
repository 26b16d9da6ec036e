//! JSON document emitted by the CLI and `evaluate`

use crate::{
    guards::ToxicityVerdict,
    provider::ClientInfo,
    response::{LlmResponse, TokenUsage},
};
use serde::{Deserialize, Serialize};

/// Run metadata; never contains credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// RFC 3339
    pub timestamp: String,
}

impl Metadata {
    /// Metadata for a run that never reached a configured client
    pub fn unknown() -> Self {
        Self {
            provider: "unknown".to_string(),
            model: "unknown".to_string(),
            response_time_ms: None,
            usage: None,
            finish_reason: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Metadata for a configured client with no judge reply
    pub fn for_client(info: &ClientInfo) -> Self {
        Self {
            provider: info.provider.clone(),
            model: info.model.clone(),
            ..Self::unknown()
        }
    }

    /// Metadata taken from a judge reply
    pub fn from_response(provider: &str, response: &LlmResponse) -> Self {
        Self {
            provider: provider.to_string(),
            model: response.model().to_string(),
            response_time_ms: response.response_time_ms(),
            usage: response.usage().copied(),
            finish_reason: response.finish_reason().map(str::to_string),
            timestamp: response.timestamp().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliOutput {
    /// "success" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ToxicityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub metadata: Metadata,
}

impl CliOutput {
    fn empty(status: &str, metadata: Metadata) -> Self {
        Self {
            status: status.to_string(),
            verdict: None,
            credentials_valid: None,
            client: None,
            error: None,
            metadata,
        }
    }

    pub fn success(verdict: ToxicityVerdict, metadata: Metadata) -> Self {
        Self {
            verdict: Some(verdict),
            ..Self::empty("success", metadata)
        }
    }

    pub fn error(code: String, message: String, metadata: Metadata) -> Self {
        Self {
            error: Some(ErrorInfo { code, message }),
            ..Self::empty("error", metadata)
        }
    }

    /// Result of a credential probe; a rejected credential is reported as an error
    pub fn credentials(valid: bool, metadata: Metadata) -> Self {
        let mut output = if valid {
            Self::empty("success", metadata)
        } else {
            Self::error(
                "INVALID_CREDENTIALS".to_string(),
                "The backend rejected the configured credentials or could not be reached"
                    .to_string(),
                metadata,
            )
        };
        output.credentials_valid = Some(valid);
        output
    }

    pub fn described(info: ClientInfo) -> Self {
        let metadata = Metadata::for_client(&info);
        Self {
            client: Some(info),
            ..Self::empty("success", metadata)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
