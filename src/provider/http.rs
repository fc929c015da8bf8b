//! Shared HTTP client and response utilities for provider adapters.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::SamvadError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// The client timeout is the only timeout policy: it applies at the provider
/// call boundary and surfaces as a network error, never mid-append.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status to an API error, extracting the
/// provider's error message from the body when one is recognizable.
pub fn status_to_error(status: u16, body: &str) -> SamvadError {
    SamvadError::api(status, extract_error_message(body))
}

/// Best-effort extraction of a human-readable message from an error body.
///
/// Understands `{"error": {"message": ...}}` and `{"error": "..."}`;
/// anything else is passed through verbatim.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = value.get("error").and_then(|e| e.as_str()) {
            return msg.to_string();
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_error_message() {
        let body = r#"{"error": {"message": "model not found", "code": 404}}"#;
        assert_eq!(extract_error_message(body), "model not found");
    }

    #[test]
    fn extracts_flat_error_string() {
        assert_eq!(extract_error_message(r#"{"error": "bad key"}"#), "bad key");
    }

    #[test]
    fn passes_through_unrecognized_bodies() {
        assert_eq!(extract_error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn status_maps_to_api_error() {
        let err = status_to_error(401, r#"{"error": {"message": "invalid key"}}"#);
        assert_eq!(err.to_string(), "API error (status 401): invalid key");
    }
}
