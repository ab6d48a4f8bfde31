//! Shared HTTP client and auth utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::ConvoError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
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

/// Build headers for an `api-key` style API (Qdrant).
pub fn api_key_headers(api_key: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key {
        if let Ok(val) = HeaderValue::from_str(key) {
            headers.insert("api-key", val);
        }
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> ConvoError {
    match status {
        401 | 403 => ConvoError::Authentication(extract_message(body)),
        _ => ConvoError::api(status, extract_message(body)),
    }
}

/// Pull `error.message` out of a JSON error body, else return the body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(status_to_error(401, "no"), ConvoError::Authentication(_)));
        assert!(matches!(
            status_to_error(429, "slow down"),
            ConvoError::Api { status: 429, .. }
        ));
    }

    #[test]
    fn openai_error_message_is_extracted() {
        let body = r#"{"error": {"message": "quota exceeded", "type": "insufficient_quota"}}"#;
        match status_to_error(429, body) {
            ConvoError::Api { message, .. } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn string_error_and_raw_bodies_pass_through() {
        match status_to_error(500, r#"{"error": "boom"}"#) {
            ConvoError::Api { message, .. } => assert_eq!(message, "boom"),
            other => panic!("expected Api, got {other:?}"),
        }
        match status_to_error(502, "Bad Gateway") {
            ConvoError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn bearer_header_is_set() {
        let headers = bearer_headers("sk-1");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-1");
    }
}
