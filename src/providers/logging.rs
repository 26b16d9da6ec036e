use crate::constants::client_defaults::MAX_LOGGED_BODY_CHARS;
use serde::Serialize;

/// Debug-log an outgoing request body (credentials travel in headers, never here)
pub(crate) fn log_request<T: Serialize>(provider: &str, request: &T) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match serde_json::to_string(request) {
        Ok(body) => log::debug!("{provider} request: {}", truncate(&body)),
        Err(e) => log::debug!("{provider} request could not be serialized for logging: {e}"),
    }
}

/// Debug-log a raw response body
pub(crate) fn log_response(provider: &str, body: &str) {
    log::debug!("{provider} response: {}", truncate(body));
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_LOGGED_BODY_CHARS {
        return body.to_string();
    }
    let head: String = body.chars().take(MAX_LOGGED_BODY_CHARS).collect();
    format!("{head}... [truncated]")
}
